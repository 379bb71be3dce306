//! Simulated server management.
//!
//! Records live in the [`ServerRegistry`](crate::registry::ServerRegistry);
//! the functions here apply validation and the cosmetic provisioning delays
//! on top of it:
//! - create: `starting`, then `online` after the provisioning delay
//! - power toggle: `online -> offline` at once, `offline -> starting -> online`
//! - restart: `starting`, then `online` after the power-on delay

mod crud;
mod lifecycle;
pub(crate) mod types;

pub use types::{ServerRecord, ServerStatus};

pub use crud::{
    change_plan, create_server, delete_server, get_server, list_servers, seed_demo_server,
};

pub use lifecycle::{restart_server, toggle_server_power};
