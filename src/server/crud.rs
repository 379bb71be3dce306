//! Server CRUD operations.

use std::sync::Arc;

use super::types::{ServerRecord, ServerStatus};
use crate::catalog::{ensure_supported_version, find_tariff, latest_version, BuildVariant};
use crate::error::{AppError, Result};
use crate::registry::ServerRegistry;
use crate::validation::{validate_server_id, validate_server_name};

fn synthesize_address(registry: &ServerRegistry, id: &str) -> String {
    let settings = registry.settings();
    let short: String = id.chars().take(8).collect();
    format!(
        "play-{}.{}:{}",
        short, settings.address_domain, settings.address_port
    )
}

fn new_record(
    registry: &ServerRegistry,
    name: &str,
    version: &str,
    build: BuildVariant,
    status: ServerStatus,
) -> ServerRecord {
    let id = uuid::Uuid::new_v4().to_string();
    let settings = registry.settings();

    ServerRecord {
        address: synthesize_address(registry, &id),
        id,
        name: name.to_string(),
        version: version.to_string(),
        build,
        status,
        players: 0,
        max_players: settings.default_max_players,
        plan: settings.default_plan.clone(),
        created_at: chrono::Utc::now().to_rfc3339(),
    }
}

/// Create a new server. It starts in `starting` and comes online after the
/// provisioning delay.
pub fn create_server(
    registry: &Arc<ServerRegistry>,
    name: &str,
    version: &str,
    build: BuildVariant,
) -> Result<ServerRecord> {
    let name = validate_server_name(name)?;
    ensure_supported_version(version)?;

    let record = new_record(registry, name, version, build, ServerStatus::Starting);
    registry.insert(record.clone());
    registry.schedule_online(&record.id, registry.settings().provision_delay());

    log::info!(
        "Creating server {} ({}, {} {})",
        record.id,
        record.name,
        record.version,
        record.build
    );
    Ok(record)
}

/// Delete a server. Any pending transition for it is cancelled.
pub fn delete_server(registry: &ServerRegistry, server_id: &str) -> Result<ServerRecord> {
    validate_server_id(server_id)?;

    let removed = registry
        .remove(server_id)
        .ok_or_else(|| AppError::server_not_found(server_id))?;
    log::info!("Deleted server {} ({})", removed.id, removed.name);
    Ok(removed)
}

pub fn get_server(registry: &ServerRegistry, server_id: &str) -> Result<ServerRecord> {
    validate_server_id(server_id)?;
    registry
        .get(server_id)
        .ok_or_else(|| AppError::server_not_found(server_id))
}

/// Move a server onto another tariff. Player limits stay as created.
pub fn change_plan(registry: &ServerRegistry, server_id: &str, tariff_id: &str) -> Result<()> {
    validate_server_id(server_id)?;
    let tariff = find_tariff(tariff_id)?;

    registry.update(server_id, |record| {
        record.plan = tariff.id.to_string();
        Ok(())
    })?;
    log::info!("Server {} moved to plan {}", server_id, tariff.id);
    Ok(())
}

/// List all servers in creation order.
pub fn list_servers(registry: &ServerRegistry) -> Vec<ServerRecord> {
    registry.list()
}

/// Insert the sample server shown to first-time visitors.
pub fn seed_demo_server(registry: &ServerRegistry) -> ServerRecord {
    let mut record = new_record(
        registry,
        "My survival server",
        latest_version(),
        BuildVariant::Vanilla,
        ServerStatus::Online,
    );
    record.players = 3;
    registry.insert(record.clone());
    record
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::ErrorKind;

    fn registry() -> Arc<ServerRegistry> {
        Arc::new(ServerRegistry::default())
    }

    #[tokio::test(start_paused = true)]
    async fn blank_name_adds_nothing() {
        let registry = registry();
        let err = create_server(&registry, "   ", "1.20.4", BuildVariant::Vanilla)
            .expect_err("blank name");
        assert_eq!(err.kind(), ErrorKind::InvalidServerName);
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unsupported_version_adds_nothing() {
        let registry = registry();
        let err = create_server(&registry, "Lobby", "1.7.10", BuildVariant::Vanilla)
            .expect_err("old version");
        assert_eq!(err.kind(), ErrorKind::VersionNotSupported);
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn created_server_comes_online_after_provisioning() {
        let registry = registry();
        let record = create_server(&registry, " Lobby ", "1.19.4", BuildVariant::Paper)
            .expect("create");

        assert_eq!(record.name, "Lobby");
        assert_eq!(record.status, ServerStatus::Starting);
        assert_eq!(record.player_count(), "0/20");
        assert_eq!(record.plan, "free");
        assert!(record.address.starts_with("play-"));
        assert!(record.address.ends_with(".mchost.example:25565"));
        assert_eq!(registry.len(), 1);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(
            get_server(&registry, &record.id).expect("get").status,
            ServerStatus::Starting
        );

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(
            get_server(&registry, &record.id).expect("get").status,
            ServerStatus::Online
        );
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_creations_do_not_interfere() {
        let registry = registry();
        let a = create_server(&registry, "A", "1.20.4", BuildVariant::Vanilla).expect("a");
        tokio::time::sleep(Duration::from_secs(2)).await;
        let b = create_server(&registry, "B", "1.20.4", BuildVariant::Vanilla).expect("b");
        assert_ne!(a.id, b.id);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(registry.get(&a.id).map(|s| s.status), Some(ServerStatus::Online));
        assert_eq!(registry.get(&b.id).map(|s| s.status), Some(ServerStatus::Starting));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(registry.get(&b.id).map(|s| s.status), Some(ServerStatus::Online));
    }

    #[tokio::test(start_paused = true)]
    async fn delete_removes_only_that_server() {
        let registry = registry();
        let keep = seed_demo_server(&registry);
        let doomed = create_server(&registry, "Temp", "1.20.4", BuildVariant::Vanilla)
            .expect("create");

        let removed = delete_server(&registry, &doomed.id).expect("delete");
        assert_eq!(removed.id, doomed.id);
        assert_eq!(list_servers(&registry), vec![keep]);
        assert!(!registry.has_pending_transition(&doomed.id));

        let err = delete_server(&registry, &doomed.id).expect_err("already gone");
        assert_eq!(err.kind(), ErrorKind::ServerNotFound);
    }

    #[test]
    fn delete_rejects_malformed_ids() {
        let registry = registry();
        let err = delete_server(&registry, "1700000000000").expect_err("bad id");
        assert_eq!(err.kind(), ErrorKind::InvalidServerId);
    }

    #[test]
    fn change_plan_validates_tariff() {
        let registry = registry();
        let demo = seed_demo_server(&registry);

        change_plan(&registry, &demo.id, "premium").expect("upgrade");
        assert_eq!(registry.get(&demo.id).map(|s| s.plan), Some("premium".to_string()));

        let err = change_plan(&registry, &demo.id, "diamond").expect_err("unknown tariff");
        assert_eq!(err.kind(), ErrorKind::TariffNotFound);
        assert_eq!(registry.get(&demo.id).map(|s| s.max_players), Some(20));
    }

    #[test]
    fn demo_server_is_online_with_players() {
        let registry = registry();
        let demo = seed_demo_server(&registry);
        assert_eq!(demo.status, ServerStatus::Online);
        assert_eq!(demo.player_count(), "3/20");
        assert!(!registry.has_pending_transition(&demo.id));
    }
}
