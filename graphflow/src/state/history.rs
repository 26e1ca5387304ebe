//! Execution audit trail shared across state clones.
//!
//! Clones of a `State` made for parallel fan-out keep appending to the same
//! trail; the mutex keeps concurrent appends ordered. Serialization detaches
//! the trail into a plain list so a snapshot round-trips exactly.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// One executed node: id plus dispatch timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub node_id: String,
    pub at: DateTime<Utc>,
}

/// Ordered, append-only record of executed node ids.
///
/// `Clone` shares the underlying list: a cloned `State` keeps writing to the
/// same audit trail as its parent, which is the invariant parallel fan-out
/// relies on for a single per-run record.
#[derive(Debug, Clone, Default)]
pub struct SharedHistory {
    entries: Arc<Mutex<Vec<HistoryEntry>>>,
}

impl SharedHistory {
    /// Creates an empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached trail pre-filled with `entries`.
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    /// Appends a visit for `node_id`, stamped with the current time.
    pub fn record(&self, node_id: impl Into<String>) {
        let entry = HistoryEntry {
            node_id: node_id.into(),
            at: Utc::now(),
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    /// Copies the current trail out. The copy is detached from further appends.
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Node ids in append order.
    pub fn node_ids(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|e| e.node_id.clone())
            .collect()
    }

    /// Number of recorded visits.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for SharedHistory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.snapshot().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SharedHistory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<HistoryEntry>::deserialize(deserializer)?;
        Ok(Self::from_entries(entries))
    }
}
