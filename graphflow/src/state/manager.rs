//! Persistence boundary for run state: save/load by id.
//!
//! The engine depends only on this trait; the in-memory implementation is
//! sufficient for single-process runs, durable backends plug in behind the
//! same methods.

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

use super::State;

/// Error from a state store operation.
#[derive(Debug, Error)]
pub enum StateStoreError {
    /// No state with that id was ever saved.
    #[error("state not found: {0}")]
    NotFound(String),

    /// The backend could not encode or decode a state snapshot.
    #[error("state serialization failed: {0}")]
    Serialization(String),

    /// Backend-specific failure (I/O, connection, ...).
    #[error("state store backend failed: {0}")]
    Backend(String),
}

/// Save/load boundary for state snapshots.
///
/// **Interaction**: the `Graph` saves the final state at run end; callers may
/// load it later to inspect, resume, or fork a run.
#[async_trait]
pub trait StateManager: Send + Sync {
    /// Persists a snapshot of `state`, keyed by `state.id()`. Overwrites any
    /// earlier snapshot for the same id.
    async fn save_state(&self, state: &State) -> Result<(), StateStoreError>;

    /// Loads the snapshot saved under `id`.
    async fn load_state(&self, id: &str) -> Result<State, StateStoreError>;

    /// Removes the snapshot saved under `id`, if any.
    async fn delete_state(&self, id: &str) -> Result<(), StateStoreError>;

    /// Ids of all saved snapshots, in no particular order.
    async fn list_states(&self) -> Result<Vec<String>, StateStoreError>;
}

/// Concurrency-safe in-memory store keyed by state id.
///
/// Snapshots are detached copies: a saved state does not keep mutating when
/// the live run appends to its audit trail, and a loaded state is independent
/// of the stored one.
#[derive(Debug, Default)]
pub struct InMemoryStateManager {
    states: DashMap<String, State>,
}

impl InMemoryStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[async_trait]
impl StateManager for InMemoryStateManager {
    async fn save_state(&self, state: &State) -> Result<(), StateStoreError> {
        self.states
            .insert(state.id().to_string(), state.detached_snapshot());
        Ok(())
    }

    async fn load_state(&self, id: &str) -> Result<State, StateStoreError> {
        self.states
            .get(id)
            .map(|entry| entry.detached_snapshot())
            .ok_or_else(|| StateStoreError::NotFound(id.to_string()))
    }

    async fn delete_state(&self, id: &str) -> Result<(), StateStoreError> {
        self.states.remove(id);
        Ok(())
    }

    async fn list_states(&self) -> Result<Vec<String>, StateStoreError> {
        Ok(self.states.iter().map(|e| e.key().clone()).collect())
    }
}
