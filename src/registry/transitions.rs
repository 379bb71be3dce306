//! Bookkeeping for pending `starting -> online` transitions.

use std::collections::HashMap;

use tokio::task::JoinHandle;

struct PendingTransition {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Pending transitions keyed by server id; at most one per server.
///
/// Every scheduled transition gets a fresh generation so a timer that fires
/// after being superseded can tell it is stale.
#[derive(Default)]
pub(super) struct TransitionTable {
    next_generation: u64,
    pending: HashMap<String, PendingTransition>,
}

impl TransitionTable {
    pub(super) fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Track a transition, aborting the one it replaces.
    pub(super) fn insert(&mut self, server_id: &str, generation: u64, handle: JoinHandle<()>) {
        if let Some(previous) = self.pending.insert(
            server_id.to_string(),
            PendingTransition { generation, handle },
        ) {
            previous.handle.abort();
        }
    }

    /// Abort the pending transition for a server. Returns whether one existed.
    pub(super) fn cancel(&mut self, server_id: &str) -> bool {
        match self.pending.remove(server_id) {
            Some(pending) => {
                pending.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Called by a fired timer. Removes the entry and returns `true` only if
    /// the timer is still the current one for that server.
    pub(super) fn finish(&mut self, server_id: &str, generation: u64) -> bool {
        match self.pending.get(server_id) {
            Some(pending) if pending.generation == generation => {
                self.pending.remove(server_id);
                true
            }
            _ => false,
        }
    }

    pub(super) fn contains(&self, server_id: &str) -> bool {
        self.pending.contains_key(server_id)
    }

    pub(super) fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        for (_, pending) in self.pending.drain() {
            pending.handle.abort();
        }
        count
    }
}
