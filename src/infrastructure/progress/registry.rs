//! Progress registry
//!
//! Holds the current snapshot for every in-flight upload session or
//! download operation and fans updates out to subscribers via
//! `CoalescingSender`/`CoalescingReceiver` pairs. One registry instance is
//! shared across the whole process.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tracing::debug;

use crate::domain::entities::progress::{ProgressSnapshot, ProgressState};
use crate::infrastructure::progress::channel::{coalescing_channel, CoalescingReceiver, CoalescingSender};

struct Entry {
    snapshot: ProgressSnapshot,
    subscribers: Vec<CoalescingSender<ProgressSnapshot>>,
}

pub struct ProgressRegistry {
    entries: Mutex<HashMap<String, Entry>>,
    subscriber_buffer_capacity: usize,
    retention_after_terminal: Duration,
}

fn is_terminal_snapshot(snapshot: &ProgressSnapshot) -> bool {
    snapshot.state.is_terminal()
}

impl ProgressRegistry {
    pub fn new(subscriber_buffer_capacity: usize, retention_after_terminal: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            subscriber_buffer_capacity,
            retention_after_terminal,
        }
    }

    pub fn register(&self, id: impl Into<String>, total_bytes: i64) {
        let id = id.into();
        let snapshot = ProgressSnapshot::new(id.clone(), total_bytes);
        self.entries.lock().unwrap().insert(
            id,
            Entry {
                snapshot,
                subscribers: Vec::new(),
            },
        );
    }

    pub fn publish(&self, id: &str, bytes_transferred: i64, message: impl Into<String>) {
        let mut entries = self.entries.lock().unwrap();
        let Some(entry) = entries.get_mut(id) else {
            return;
        };
        entry.snapshot.advance(bytes_transferred, message);
        let snapshot = entry.snapshot.clone();
        entry
            .subscribers
            .retain(|sub| {
                sub.push(snapshot.clone(), is_terminal_snapshot);
                true
            });
    }

    pub fn finish(&self, id: &str, state: ProgressState, message: impl Into<String>) {
        let snapshot = {
            let mut entries = self.entries.lock().unwrap();
            let Some(entry) = entries.get_mut(id) else {
                return;
            };
            entry.snapshot.finish(state, message);
            let snapshot = entry.snapshot.clone();
            for sub in &entry.subscribers {
                sub.push(snapshot.clone(), is_terminal_snapshot);
                sub.close();
            }
            snapshot
        };
        debug!(id = %id, state = ?snapshot.state, "progress reached terminal state");
    }

    /// Subscribes to updates for `id`. The current snapshot is delivered
    /// immediately as the first item. If `id` has no registry entry, the
    /// receiver is pre-loaded with a synthetic `NotFound` terminal
    /// snapshot and closed immediately, rather than returning `None` —
    /// callers always get a stream back, never an RPC-level error.
    pub fn subscribe(&self, id: &str) -> CoalescingReceiver<ProgressSnapshot> {
        let mut entries = self.entries.lock().unwrap();
        let (tx, rx) = coalescing_channel(self.subscriber_buffer_capacity);
        match entries.get_mut(id) {
            Some(entry) => {
                tx.push(entry.snapshot.clone(), is_terminal_snapshot);
                if entry.snapshot.state.is_terminal() {
                    tx.close();
                } else {
                    entry.subscribers.push(tx);
                }
            }
            None => {
                tx.push(ProgressSnapshot::not_found(id), is_terminal_snapshot);
                tx.close();
            }
        }
        rx
    }

    /// Drops bookkeeping for ids whose terminal snapshot has aged past
    /// the configured retention window. Called periodically by the same
    /// background sweep that evicts idle upload sessions.
    pub fn sweep_expired(&self, now: chrono::DateTime<chrono::Utc>) {
        let retention = self.retention_after_terminal;
        self.entries.lock().unwrap().retain(|_, entry| {
            if !entry.snapshot.state.is_terminal() {
                return true;
            }
            let age = now - entry.snapshot.observed_at;
            age.to_std().map(|age| age < retention).unwrap_or(true)
        });
    }
}
