use serde::Serialize;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnlinePlayer {
    pub name: String,
    pub ping_ms: u32,
    /// Display-only, e.g. `2h 15m`.
    pub playtime: String,
}

pub(super) fn sample_players() -> Vec<OnlinePlayer> {
    [("Steve", 45, "2h 15m"), ("Alex", 32, "1h 30m"), ("Herobrine", 67, "45m")]
        .into_iter()
        .map(|(name, ping_ms, playtime)| OnlinePlayer {
            name: name.to_string(),
            ping_ms,
            playtime: playtime.to_string(),
        })
        .collect()
}

/// Moderation buttons on the players tab. None of them change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    GiveDonation,
    GiveOp,
    Ban,
    Unban,
}

impl PlayerAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "donate" | "give_donation" => Some(Self::GiveDonation),
            "op" | "give_op" => Some(Self::GiveOp),
            "ban" => Some(Self::Ban),
            "unban" => Some(Self::Unban),
            _ => None,
        }
    }

    pub(super) fn message(self, player: &str) -> String {
        match self {
            Self::GiveDonation => format!("Donation granted to {}", player),
            Self::GiveOp => format!("OP granted to {}", player),
            Self::Ban => format!("Player {} banned", player),
            Self::Unban => format!("Player {} unbanned", player),
        }
    }
}

pub(super) fn find_player<'a>(players: &'a [OnlinePlayer], name: &str) -> Result<&'a OnlinePlayer> {
    players
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| AppError::player_not_found(name))
}
