//! Server record storage and transition scheduling.

use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::Duration;

use tokio::sync::broadcast;

use super::transitions::TransitionTable;
use super::{RegistryEvent, RegistryEventReason};
use crate::config::RegistryConfig;
use crate::error::{AppError, Result};
use crate::server::{ServerRecord, ServerStatus};

/// Owns every simulated server record.
///
/// Lock order is `transitions` before `servers`; neither lock is held across
/// an `.await`.
pub struct ServerRegistry {
    servers: RwLock<Vec<ServerRecord>>,
    transitions: Mutex<TransitionTable>,
    settings: RegistryConfig,
    events: broadcast::Sender<RegistryEvent>,
}

impl ServerRegistry {
    pub fn new(settings: RegistryConfig) -> Self {
        let (events, _) = broadcast::channel(settings.event_capacity.max(1));

        Self {
            servers: RwLock::new(Vec::new()),
            transitions: Mutex::new(TransitionTable::default()),
            settings,
            events,
        }
    }

    pub fn settings(&self) -> &RegistryConfig {
        &self.settings
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    fn emit(&self, server_id: &str, reason: RegistryEventReason) {
        let _ = self.events.send(RegistryEvent {
            server_id: server_id.to_string(),
            reason,
        });
    }

    /// Append a record.
    pub fn insert(&self, record: ServerRecord) {
        let id = record.id.clone();
        let mut servers = self.servers.write().unwrap_or_else(|e| e.into_inner());
        servers.push(record);
        drop(servers);
        self.emit(&id, RegistryEventReason::Created);
    }

    /// Remove a record and cancel its pending transition, if any.
    pub fn remove(&self, server_id: &str) -> Option<ServerRecord> {
        let mut servers = self.servers.write().unwrap_or_else(|e| e.into_inner());
        let removed = servers
            .iter()
            .position(|s| s.id == server_id)
            .map(|index| servers.remove(index));
        drop(servers);

        let removed = removed?;
        let cancelled = self
            .transitions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cancel(server_id);
        if cancelled {
            log::debug!("Cancelled pending transition for deleted server {}", server_id);
        }
        self.emit(server_id, RegistryEventReason::Deleted);
        Some(removed)
    }

    pub fn get(&self, server_id: &str) -> Option<ServerRecord> {
        let servers = self.servers.read().unwrap_or_else(|e| e.into_inner());
        servers.iter().find(|s| s.id == server_id).cloned()
    }

    /// All records in creation order.
    pub fn list(&self) -> Vec<ServerRecord> {
        self.servers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.servers.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run a read-modify-write on one record while holding the write lock.
    /// Emits a status event if `f` changed the status.
    pub fn update<F, T>(&self, server_id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut ServerRecord) -> Result<T>,
    {
        let mut servers = self.servers.write().unwrap_or_else(|e| e.into_inner());
        let record = servers
            .iter_mut()
            .find(|s| s.id == server_id)
            .ok_or_else(|| AppError::server_not_found(server_id))?;

        let before = record.status;
        let result = f(record)?;
        let after = record.status;
        drop(servers);

        if before != after {
            log::info!("Server {} is now {} (was {})", server_id, after, before);
            self.emit(server_id, RegistryEventReason::StatusChanged(after));
        }
        Ok(result)
    }

    /// Schedule `starting -> online` for a server after `delay`, replacing any
    /// transition already pending for it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule_online(self: &Arc<Self>, server_id: &str, delay: Duration) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let id = server_id.to_string();

        let mut transitions = self.transitions.lock().unwrap_or_else(|e| e.into_inner());
        let generation = transitions.next_generation();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(registry) = weak.upgrade() {
                registry.complete_transition(&id, generation);
            }
        });
        transitions.insert(server_id, generation, handle);
        drop(transitions);

        log::debug!(
            "Server {} scheduled to come online in {:?} (generation {})",
            server_id,
            delay,
            generation
        );
    }

    fn complete_transition(&self, server_id: &str, generation: u64) {
        let mut transitions = self.transitions.lock().unwrap_or_else(|e| e.into_inner());
        if !transitions.finish(server_id, generation) {
            log::debug!(
                "Ignoring stale transition for server {} (generation {})",
                server_id,
                generation
            );
            return;
        }

        let result = self.update(server_id, |record| {
            if record.status == ServerStatus::Starting {
                record.status = ServerStatus::Online;
            }
            Ok(())
        });
        drop(transitions);

        if let Err(e) = result {
            log::warn!("Transition fired for missing server {}: {}", server_id, e);
        }
    }

    pub fn has_pending_transition(&self, server_id: &str) -> bool {
        self.transitions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(server_id)
    }

    /// Abort every pending transition.
    pub fn shutdown(&self) {
        let count = self
            .transitions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cancel_all();
        if count > 0 {
            log::info!("Cancelled {} pending server transitions", count);
        }
    }
}

impl Default for ServerRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BuildVariant;

    fn record(id: &str, status: ServerStatus) -> ServerRecord {
        ServerRecord {
            id: id.to_string(),
            name: format!("server {}", id),
            version: "1.20.4".to_string(),
            build: BuildVariant::Vanilla,
            status,
            players: 0,
            max_players: 20,
            plan: "free".to_string(),
            address: format!("play-{}.mchost.example:25565", id),
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn list_keeps_creation_order() {
        let registry = ServerRegistry::default();
        registry.insert(record("b", ServerStatus::Online));
        registry.insert(record("a", ServerStatus::Offline));
        let ids: Vec<String> = registry.list().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn update_emits_only_on_status_change() {
        let registry = ServerRegistry::default();
        registry.insert(record("a", ServerStatus::Online));
        let mut rx = registry.subscribe();

        registry
            .update("a", |r| {
                r.name = "renamed".to_string();
                Ok(())
            })
            .expect("rename");
        assert!(rx.try_recv().is_err());

        registry
            .update("a", |r| {
                r.status = ServerStatus::Offline;
                Ok(())
            })
            .expect("stop");
        let event = rx.try_recv().expect("status event");
        assert_eq!(
            event.reason,
            RegistryEventReason::StatusChanged(ServerStatus::Offline)
        );
    }

    #[test]
    fn update_on_unknown_server_is_not_found() {
        let registry = ServerRegistry::default();
        let err = registry.update("nope", |_| Ok(())).expect_err("missing");
        assert_eq!(err.kind(), crate::error::ErrorKind::ServerNotFound);
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_transition_brings_server_online() {
        let registry = Arc::new(ServerRegistry::default());
        registry.insert(record("a", ServerStatus::Starting));
        registry.schedule_online("a", Duration::from_secs(3));
        assert!(registry.has_pending_transition("a"));

        tokio::time::sleep(Duration::from_millis(2999)).await;
        assert_eq!(registry.get("a").map(|s| s.status), Some(ServerStatus::Starting));

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(registry.get("a").map(|s| s.status), Some(ServerStatus::Online));
        assert!(!registry.has_pending_transition("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_supersedes_previous_timer() {
        let registry = Arc::new(ServerRegistry::default());
        registry.insert(record("a", ServerStatus::Starting));
        registry.schedule_online("a", Duration::from_secs(1));
        registry.schedule_online("a", Duration::from_secs(5));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(registry.get("a").map(|s| s.status), Some(ServerStatus::Starting));

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(registry.get("a").map(|s| s.status), Some(ServerStatus::Online));
    }

    #[tokio::test(start_paused = true)]
    async fn removing_cancels_pending_transition() {
        let registry = Arc::new(ServerRegistry::default());
        registry.insert(record("a", ServerStatus::Starting));
        registry.schedule_online("a", Duration::from_secs(3));
        let mut rx = registry.subscribe();

        assert!(registry.remove("a").is_some());
        assert!(!registry.has_pending_transition("a"));

        tokio::time::sleep(Duration::from_secs(10)).await;
        let event = rx.try_recv().expect("deleted event");
        assert_eq!(event.reason, RegistryEventReason::Deleted);
        assert!(rx.try_recv().is_err());
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_aborts_everything() {
        let registry = Arc::new(ServerRegistry::default());
        registry.insert(record("a", ServerStatus::Starting));
        registry.insert(record("b", ServerStatus::Starting));
        registry.schedule_online("a", Duration::from_secs(1));
        registry.schedule_online("b", Duration::from_secs(1));

        registry.shutdown();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(registry
            .list()
            .iter()
            .all(|s| s.status == ServerStatus::Starting));
    }
}
