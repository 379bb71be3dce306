//! Server lifecycle management (power toggle/restart).

use std::sync::Arc;

use super::types::ServerStatus;
use crate::error::{AppError, Result};
use crate::registry::ServerRegistry;
use crate::validation::validate_server_id;

fn begin_start(registry: &Arc<ServerRegistry>, server_id: &str) {
    registry.schedule_online(server_id, registry.settings().power_on_delay());
}

/// Flip a server's power.
///
/// `online` stops immediately. `offline` moves to `starting` and comes online
/// after the power-on delay. A server that is still `starting` cannot be
/// toggled. Returns the new status.
pub fn toggle_server_power(
    registry: &Arc<ServerRegistry>,
    server_id: &str,
) -> Result<ServerStatus> {
    validate_server_id(server_id)?;

    let status = registry.update(server_id, |record| {
        record.status = match record.status {
            ServerStatus::Online => ServerStatus::Offline,
            ServerStatus::Offline => ServerStatus::Starting,
            ServerStatus::Starting => return Err(AppError::server_starting(server_id)),
        };
        Ok(record.status)
    })?;

    if status == ServerStatus::Starting {
        begin_start(registry, server_id);
    }
    Ok(status)
}

/// Restart a server: back to `starting`, online again after the power-on
/// delay. Works from `online` and `offline`.
pub fn restart_server(registry: &Arc<ServerRegistry>, server_id: &str) -> Result<()> {
    validate_server_id(server_id)?;

    registry.update(server_id, |record| {
        if record.status == ServerStatus::Starting {
            return Err(AppError::server_starting(server_id));
        }
        record.status = ServerStatus::Starting;
        Ok(())
    })?;

    log::info!("Restarting server {}", server_id);
    begin_start(registry, server_id);
    Ok(())
}
