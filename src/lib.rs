mod catalog;
mod checkout;
mod commands;
mod config;
mod control;
mod error;
mod notification;
mod paths;
mod registry;
mod server;
mod shell;
mod validation;

use std::sync::Arc;

pub use catalog::{
    find_tariff, latest_version, supported_versions, tariffs, BuildVariant, TariffPlan,
    VIP_PLAN_ID,
};
pub use checkout::{
    CallbackResponse, ChargeRequest, Checkout, CheckoutOutcome, PaymentCallback, PaymentSink,
    PaymentWidget, Redirect, Route, SimulatedWidget,
};
pub use config::{AppConfig, PaymentConfig, RegistryConfig};
pub use control::{PlayerAction, ServerControl, UploadReceipt, VipUpdate};
pub use error::{AppError, ErrorKind, Result};
pub use notification::{Notification, NotificationLevel};
pub use registry::{RegistryEvent, RegistryEventReason, ServerRegistry};
pub use server::{
    change_plan, create_server, delete_server, get_server, list_servers, restart_server,
    seed_demo_server, toggle_server_power, ServerRecord, ServerStatus,
};

use config::load_config;
use shell::Shell;

pub fn run() {
    let config = load_config().unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        Arc::new(AppConfig::default())
    });

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    if runtime.block_on(serve(&config)).is_err() {
        std::process::exit(1);
    }
}

async fn serve(config: &AppConfig) -> Result<()> {
    let registry = Arc::new(ServerRegistry::new(config.registry.clone()));
    if config.seed_demo_server {
        let demo = seed_demo_server(&registry);
        log::info!("Seeded demo server {}", demo.id);
    }

    let widget: Arc<dyn PaymentWidget> = Arc::new(SimulatedWidget);
    let (shell, inbox) = Shell::new(registry, Some(widget), config.payment.clone());
    println!("mchost ready. Type `help` for commands.");
    shell.run(inbox).await
}
