//! Static catalogs: game versions, server builds and tariff plans.

mod builds;
mod tariffs;
mod versions;

pub use builds::BuildVariant;
pub use tariffs::{find_tariff, tariffs, TariffPlan, VIP_PLAN_ID};
pub use versions::{ensure_supported_version, latest_version, supported_versions};
