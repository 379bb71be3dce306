//! Per-server control panel session.
//!
//! Console output, plugins, players and VIP settings are session state: they
//! start from sample data when the panel opens and are dropped with it.

mod console;
mod files;
mod players;
mod plugins;
mod vip;

use std::sync::Arc;
use std::time::Duration;

pub use console::ConsoleLog;
pub use files::{sample_files, FileEntry};
pub use players::{OnlinePlayer, PlayerAction};
pub use plugins::PluginRecord;
pub use vip::{
    AdvancedSettings, BackupInterval, CpuPriority, DdosProtection, Difficulty, GameMode,
    VipSettings, VipUpdate,
};

use crate::catalog::{find_tariff, TariffPlan, VIP_PLAN_ID};
use crate::error::{AppError, Result};
use crate::notification::Notification;
use crate::registry::ServerRegistry;
use crate::server::{self, ServerRecord, ServerStatus};

const UPLOAD_CONFIRM_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub started: Notification,
    pub completed: Notification,
    pub after: Duration,
}

pub struct ServerControl {
    registry: Arc<ServerRegistry>,
    /// Record as it was when the panel opened; refreshed on every read.
    server: ServerRecord,
    console: ConsoleLog,
    plugins: Vec<PluginRecord>,
    players: Vec<OnlinePlayer>,
    vip: VipSettings,
}

impl ServerControl {
    /// Open the control panel for a server.
    pub fn open(registry: Arc<ServerRegistry>, server_id: &str) -> Result<Self> {
        let server = server::get_server(&registry, server_id)?;
        log::debug!("Opened control panel for server {}", server.id);

        Ok(Self {
            registry,
            server,
            console: ConsoleLog::new(),
            plugins: plugins::default_plugins(),
            players: players::sample_players(),
            vip: VipSettings::default(),
        })
    }

    pub fn server_id(&self) -> &str {
        &self.server.id
    }

    /// Current record, or the last known one if it has since been deleted.
    pub fn server(&mut self) -> &ServerRecord {
        if let Some(current) = self.registry.get(&self.server.id) {
            self.server = current;
        }
        &self.server
    }

    pub fn console(&self) -> &ConsoleLog {
        &self.console
    }

    /// Run a console command. Blank input is ignored and returns `None`.
    pub fn execute_command(&mut self, command: &str) -> Option<String> {
        let max_players = self.server().max_players;
        let online = self.players.len();
        self.console
            .execute(command, online, max_players)
            .map(str::to_string)
    }

    pub fn plugins(&self) -> &[PluginRecord] {
        &self.plugins
    }

    pub fn toggle_plugin(&mut self, name: &str) -> Result<Notification> {
        let enabled = plugins::toggle_plugin(&mut self.plugins, name)?;
        let state = if enabled { "enabled" } else { "disabled" };
        log::info!("Plugin {} {} on server {}", name, state, self.server.id);
        Ok(Notification::success(format!("Plugin {} {}", name, state)))
    }

    /// Accept a server build archive (`.jar`/`.zip`). The caller shows
    /// `started` now and `completed` once `after` has elapsed.
    pub fn upload_build(&self, file_name: &str) -> Result<UploadReceipt> {
        let file_name = plugins::check_upload(file_name)?;
        log::info!("Build {} uploaded to server {}", file_name, self.server.id);
        Ok(UploadReceipt {
            started: Notification::success(format!("Build {} uploading...", file_name)),
            completed: Notification::success("Build uploaded successfully!"),
            after: UPLOAD_CONFIRM_DELAY,
        })
    }

    pub fn players(&self) -> &[OnlinePlayer] {
        &self.players
    }

    pub fn player_action(&self, player: &str, action: PlayerAction) -> Result<Notification> {
        let player = players::find_player(&self.players, player)?;
        Ok(Notification::success(action.message(&player.name)))
    }

    pub fn files(&self) -> &'static [FileEntry] {
        sample_files()
    }

    pub fn toggle_power(&self) -> Result<Notification> {
        let status = server::toggle_server_power(&self.registry, &self.server.id)?;
        Ok(match status {
            ServerStatus::Offline => Notification::success("Server stopped"),
            _ => Notification::success("Server is starting..."),
        })
    }

    pub fn restart(&self) -> Result<Notification> {
        server::restart_server(&self.registry, &self.server.id)?;
        Ok(Notification::success("Server is restarting..."))
    }

    fn ensure_vip(&mut self) -> Result<()> {
        let unlocked = find_tariff(&self.server().plan).is_ok_and(TariffPlan::has_vip_panel);
        if unlocked {
            Ok(())
        } else {
            Err(AppError::plan_required(VIP_PLAN_ID))
        }
    }

    pub fn vip(&mut self) -> Result<&VipSettings> {
        self.ensure_vip()?;
        Ok(&self.vip)
    }

    pub fn apply_vip(&mut self, update: VipUpdate) -> Result<Notification> {
        self.ensure_vip()?;
        let message = self.vip.apply(update)?;
        Ok(Notification::success(message))
    }
}
