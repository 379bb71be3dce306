use serde::Serialize;

use crate::error::{AppError, Result};

/// Plan id that unlocks the VIP control panel.
pub const VIP_PLAN_ID: &str = "all-or-nothing";

/// A hosting plan as offered on the pricing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TariffPlan {
    pub id: &'static str,
    pub name: &'static str,
    /// Monthly price in whole currency units.
    pub price: u32,
    pub disk_gb: u32,
    pub ram_gb: u32,
    pub cpu_percent: u8,
    /// `None` means unlimited.
    pub max_players: Option<u32>,
    pub features: &'static [&'static str],
    pub badge: Option<&'static str>,
    pub highlight: bool,
}

impl TariffPlan {
    pub fn is_free(&self) -> bool {
        self.price == 0
    }

    pub fn has_vip_panel(&self) -> bool {
        self.id == VIP_PLAN_ID
    }
}

const TARIFFS: &[TariffPlan] = &[
    TariffPlan {
        id: "free",
        name: "Free",
        price: 0,
        disk_gb: 10,
        ram_gb: 2,
        cpu_percent: 30,
        max_players: Some(2999),
        features: &[
            "Up to 2999 players",
            "2 GB RAM",
            "10 GB disk",
            "DDoS protection",
            "24/7 online",
        ],
        badge: Some("FREE"),
        highlight: false,
    },
    TariffPlan {
        id: "pro",
        name: "Pro",
        price: 299,
        disk_gb: 25,
        ram_gb: 4,
        cpu_percent: 50,
        max_players: None,
        features: &[
            "Unlimited players",
            "4 GB RAM",
            "25 GB SSD",
            "Priority support",
            "Backups every 6h",
            "Custom domain",
        ],
        badge: Some("POPULAR"),
        highlight: true,
    },
    TariffPlan {
        id: "premium",
        name: "Premium",
        price: 599,
        disk_gb: 50,
        ram_gb: 8,
        cpu_percent: 70,
        max_players: None,
        features: &[
            "Unlimited players",
            "8 GB RAM",
            "50 GB NVMe",
            "VIP support",
            "Backups every 3h",
            "Dedicated IP",
        ],
        badge: Some("VIP"),
        highlight: false,
    },
    TariffPlan {
        id: "unlimited",
        name: "Unlimited",
        price: 999,
        disk_gb: 100,
        ram_gb: 16,
        cpu_percent: 85,
        max_players: None,
        features: &[
            "Unlimited players",
            "16 GB RAM",
            "100 GB NVMe",
            "Personal support",
            "Hourly backups",
            "Dedicated server",
            "All add-ons",
        ],
        badge: Some("VIP"),
        highlight: false,
    },
    TariffPlan {
        id: VIP_PLAN_ID,
        name: "All or Nothing",
        price: 5999,
        disk_gb: 999,
        ram_gb: 999,
        cpu_percent: 90,
        max_players: Some(999),
        features: &[
            "999 concurrent players",
            "999 GB RAM",
            "999 GB NVMe disk",
            "90% CPU share",
            "Personal manager",
            "Backups every 30 minutes",
            "Priority dedicated server",
            "All add-ons and custom settings",
        ],
        badge: Some("NEW"),
        highlight: true,
    },
];

pub fn tariffs() -> &'static [TariffPlan] {
    TARIFFS
}

pub fn find_tariff(id: &str) -> Result<&'static TariffPlan> {
    TARIFFS
        .iter()
        .find(|tariff| tariff.id == id)
        .ok_or_else(|| AppError::tariff_not_found(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_single_free_plan() {
        let free: Vec<_> = tariffs().iter().filter(|t| t.is_free()).collect();
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].id, "free");
    }

    #[test]
    fn only_top_plan_unlocks_vip_panel() {
        let vip: Vec<_> = tariffs().iter().filter(|t| t.has_vip_panel()).collect();
        assert_eq!(vip.len(), 1);
        assert_eq!(vip[0].price, 5999);
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(find_tariff("pro").expect("pro").price, 299);
        let err = find_tariff("gold").expect_err("missing");
        assert_eq!(err.kind(), crate::error::ErrorKind::TariffNotFound);
    }
}
