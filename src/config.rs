use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::paths::{config_path, ensure_data_dirs};

static CONFIG_CACHE: OnceLock<RwLock<Arc<AppConfig>>> = OnceLock::new();

fn load_config_from_disk() -> Result<AppConfig> {
    ensure_data_dirs()?;
    load_or_init_config(&config_path())
}

/// Load the config at `path`, writing defaults there first if it is missing.
fn load_or_init_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        let config = AppConfig::default();
        save_config_to_path(path, &config)?;
        log::info!("Wrote default config to {}", path.display());
        return Ok(config);
    }
    load_config_from_path(path)
}

fn save_config_to_path(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content).map_err(|e| AppError::config(e.to_string()))
}

fn get_config_cache() -> Result<&'static RwLock<Arc<AppConfig>>> {
    if let Some(cache) = CONFIG_CACHE.get() {
        return Ok(cache);
    }

    let config = load_config_from_disk()?;
    let _ = CONFIG_CACHE.set(RwLock::new(Arc::new(config)));

    CONFIG_CACHE
        .get()
        .ok_or_else(|| AppError::config("CONFIG_CACHE not initialized"))
}

/// Read and parse a config file without touching the cache.
pub fn load_config_from_path(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path).map_err(|e| AppError::config(e.to_string()))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<AppConfig> {
    let content = content.trim_start_matches('\u{feff}');
    Ok(toml::from_str(content)?)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
    /// Insert the sample server on startup.
    #[serde(default = "default_true")]
    pub seed_demo_server: bool,
    /// Default log filter, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            registry: RegistryConfig::default(),
            payment: PaymentConfig::default(),
            seed_demo_server: true,
            log_level: default_log_level(),
        }
    }
}

/// Timings and defaults applied to newly created servers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Delay between `create` and the server reporting online.
    pub provision_delay_ms: u64,
    /// Delay between power-on (or restart) and the server reporting online.
    pub power_on_delay_ms: u64,
    pub default_max_players: u32,
    pub default_plan: String,
    /// Domain suffix for synthesized connection addresses.
    pub address_domain: String,
    pub address_port: u16,
    /// Capacity of the registry event channel.
    pub event_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            provision_delay_ms: 3000,
            power_on_delay_ms: 2000,
            default_max_players: 20,
            default_plan: "free".to_string(),
            address_domain: "mchost.example".to_string(),
            address_port: 25565,
            event_capacity: 128,
        }
    }
}

impl RegistryConfig {
    pub fn provision_delay(&self) -> Duration {
        Duration::from_millis(self.provision_delay_ms)
    }

    pub fn power_on_delay(&self) -> Duration {
        Duration::from_millis(self.power_on_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PaymentConfig {
    /// Merchant id handed to the payment widget.
    pub public_id: String,
    pub currency: String,
    /// Delay before navigating home after a successful payment.
    pub redirect_delay_ms: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            public_id: "pk_mchost_demo".to_string(),
            currency: "RUB".to_string(),
            redirect_delay_ms: 2000,
        }
    }
}

impl PaymentConfig {
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

pub fn load_config() -> Result<Arc<AppConfig>> {
    let cache = get_config_cache()?;
    let config = cache.read().unwrap_or_else(|e| e.into_inner());
    Ok(Arc::clone(&config))
}
