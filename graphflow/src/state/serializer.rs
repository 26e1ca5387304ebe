//! State serialization for durable `StateManager` backends.
//!
//! Any encoding that round-trips a `State` exactly is acceptable; JSON is the
//! provided one.

use super::{State, StateStoreError};

/// Encodes a state snapshot to bytes and back.
pub trait Serializer: Send + Sync {
    fn dumps(&self, state: &State) -> Result<Vec<u8>, StateStoreError>;
    fn loads(&self, bytes: &[u8]) -> Result<State, StateStoreError>;
}

/// JSON encoding of a state snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStateSerializer;

impl Serializer for JsonStateSerializer {
    fn dumps(&self, state: &State) -> Result<Vec<u8>, StateStoreError> {
        serde_json::to_vec(state).map_err(|e| StateStoreError::Serialization(e.to_string()))
    }

    fn loads(&self, bytes: &[u8]) -> Result<State, StateStoreError> {
        serde_json::from_slice(bytes).map_err(|e| StateStoreError::Serialization(e.to_string()))
    }
}
