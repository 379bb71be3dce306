//! Server-related type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::BuildVariant;

/// Lifecycle label of a simulated server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerStatus {
    Starting,
    Online,
    Offline,
}

impl ServerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One simulated hosting instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    pub id: String,
    pub name: String,
    pub version: String,
    pub build: BuildVariant,
    pub status: ServerStatus,
    pub players: u32,
    pub max_players: u32,
    /// Tariff id.
    pub plan: String,
    /// Display-only connection address; nothing listens on it.
    pub address: String,
    pub created_at: String,
}

impl ServerRecord {
    pub fn player_count(&self) -> String {
        format!("{}/{}", self.players, self.max_players)
    }
}
