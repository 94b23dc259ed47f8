//! Shared ordered event log.
//!
//! Every scripted double records into one log, so tests can assert
//! cross-boundary ordering ("reissuance precedes the permission
//! report") instead of only per-double counts.

use std::sync::Arc;

use parking_lot::Mutex;

/// Ordered record of everything the doubles observed.
#[derive(Clone, Default)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    /// Snapshot of all entries in order.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Number of entries starting with `prefix`.
    pub fn count_with_prefix(&self, prefix: &str) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .count()
    }

    /// Position of the first entry starting with `prefix`.
    pub fn first_index_with_prefix(&self, prefix: &str) -> Option<usize> {
        self.entries
            .lock()
            .iter()
            .position(|entry| entry.starts_with(prefix))
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries.lock().iter()).finish()
    }
}
