//! In-memory server registry and its delayed status transitions.

mod manager;
mod transitions;

use serde::Serialize;

use crate::server::ServerStatus;

pub use manager::ServerRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "status", rename_all = "snake_case")]
pub enum RegistryEventReason {
    Created,
    Deleted,
    StatusChanged(ServerStatus),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEvent {
    pub server_id: String,
    pub reason: RegistryEventReason,
}
