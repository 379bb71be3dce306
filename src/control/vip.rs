//! Settings panel reserved for the top tariff.

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::validation::require_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupInterval {
    Every30Minutes,
    Hourly,
    Every3Hours,
    Every6Hours,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuPriority {
    /// 90%
    Maximum,
    /// 75%
    High,
    /// 50%
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DdosProtection {
    Maximum,
    High,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Peaceful,
    Easy,
    Normal,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Survival,
    Creative,
    Adventure,
    Spectator,
}

impl BackupInterval {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "30m" => Some(Self::Every30Minutes),
            "1h" => Some(Self::Hourly),
            "3h" => Some(Self::Every3Hours),
            "6h" => Some(Self::Every6Hours),
            _ => None,
        }
    }
}

impl CpuPriority {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "max" | "90" => Some(Self::Maximum),
            "high" | "75" => Some(Self::High),
            "medium" | "50" => Some(Self::Medium),
            _ => None,
        }
    }

    pub fn percent(self) -> u8 {
        match self {
            Self::Maximum => 90,
            Self::High => 75,
            Self::Medium => 50,
        }
    }
}

impl DdosProtection {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "max" => Some(Self::Maximum),
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            _ => None,
        }
    }
}

impl Difficulty {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "peaceful" => Some(Self::Peaceful),
            "easy" => Some(Self::Easy),
            "normal" => Some(Self::Normal),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

impl GameMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "survival" => Some(Self::Survival),
            "creative" => Some(Self::Creative),
            "adventure" => Some(Self::Adventure),
            "spectator" => Some(Self::Spectator),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvancedSettings {
    pub max_players: u32,
    pub difficulty: Difficulty,
    pub game_mode: GameMode,
    pub pvp: bool,
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            max_players: 999,
            difficulty: Difficulty::Normal,
            game_mode: GameMode::Survival,
            pvp: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VipSettings {
    pub dedicated_ip: Option<String>,
    pub whitelist: Vec<String>,
    pub backup_interval: BackupInterval,
    pub cpu_priority: CpuPriority,
    pub ddos_protection: DdosProtection,
    pub custom_domain: Option<String>,
    pub advanced: AdvancedSettings,
}

impl Default for VipSettings {
    fn default() -> Self {
        Self {
            dedicated_ip: None,
            whitelist: Vec::new(),
            backup_interval: BackupInterval::Every30Minutes,
            cpu_priority: CpuPriority::Maximum,
            ddos_protection: DdosProtection::Maximum,
            custom_domain: None,
            advanced: AdvancedSettings::default(),
        }
    }
}

/// One "apply" button on the VIP panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VipUpdate {
    DedicatedIp(String),
    /// Comma separated player names.
    Whitelist(String),
    BackupInterval(BackupInterval),
    CpuPriority(CpuPriority),
    DdosProtection(DdosProtection),
    CustomDomain(String),
    Advanced(AdvancedSettings),
}

impl VipSettings {
    /// Apply an update and return the confirmation message.
    pub fn apply(&mut self, update: VipUpdate) -> Result<&'static str> {
        match update {
            VipUpdate::DedicatedIp(ip) => {
                self.dedicated_ip = Some(require_text("dedicated_ip", &ip)?.to_string());
                Ok("Dedicated IP configured")
            }
            VipUpdate::Whitelist(names) => {
                let names: Vec<String> = names
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect();
                if names.is_empty() {
                    return Err(AppError::field_required("whitelist"));
                }
                self.whitelist = names;
                Ok("Whitelist updated")
            }
            VipUpdate::BackupInterval(interval) => {
                self.backup_interval = interval;
                Ok("Backup schedule configured")
            }
            VipUpdate::CpuPriority(priority) => {
                self.cpu_priority = priority;
                Ok("CPU priority changed")
            }
            VipUpdate::DdosProtection(level) => {
                self.ddos_protection = level;
                Ok("Protection level set")
            }
            VipUpdate::CustomDomain(domain) => {
                self.custom_domain = Some(require_text("custom_domain", &domain)?.to_string());
                Ok("Domain bound to server")
            }
            VipUpdate::Advanced(advanced) => {
                if advanced.max_players == 0 {
                    return Err(AppError::field_required("max_players"));
                }
                self.advanced = advanced;
                Ok("Server settings saved")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn whitelist_is_split_and_trimmed() {
        let mut vip = VipSettings::default();
        vip.apply(VipUpdate::Whitelist(" Steve, ,Alex ".to_string()))
            .expect("whitelist");
        assert_eq!(vip.whitelist, vec!["Steve", "Alex"]);
    }

    #[test]
    fn blank_text_inputs_are_rejected() {
        let mut vip = VipSettings::default();
        for update in [
            VipUpdate::DedicatedIp(" ".to_string()),
            VipUpdate::CustomDomain(String::new()),
            VipUpdate::Whitelist(" , ".to_string()),
        ] {
            let err = vip.apply(update).expect_err("blank");
            assert_eq!(err.kind(), ErrorKind::FieldRequired);
        }
        assert_eq!(vip, VipSettings::default());
    }

    #[test]
    fn selections_replace_previous_values() {
        let mut vip = VipSettings::default();
        let priority = CpuPriority::parse("75").expect("parse");
        vip.apply(VipUpdate::CpuPriority(priority)).expect("cpu");
        assert_eq!(vip.cpu_priority.percent(), 75);

        vip.apply(VipUpdate::Advanced(AdvancedSettings {
            max_players: 50,
            difficulty: Difficulty::Hard,
            game_mode: GameMode::Creative,
            pvp: false,
        }))
        .expect("advanced");
        assert_eq!(vip.advanced.max_players, 50);
        assert!(!vip.advanced.pvp);
    }
}
