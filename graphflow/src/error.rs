//! Run-level error taxonomy.
//!
//! Build-time problems live in [`crate::graph::BuildError`]; node-internal
//! failures in [`crate::node::NodeError`]. This enum is what a run returns.

use std::time::Duration;

use thiserror::Error;

use crate::node::NodeError;
use crate::state::StateStoreError;

/// Fatal run error. A halt with no resolvable transition is *not* one of
/// these; it surfaces as `RunStatus::Halted`.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A node's execute returned an error (or panicked); the run failed there.
    #[error("node '{node_id}' failed: {source}")]
    Node {
        node_id: String,
        #[source]
        source: NodeError,
    },

    /// The iteration cap was reached, usually a routing cycle. Distinct from
    /// node failures so callers can resume with a higher cap.
    #[error("iteration limit of {limit} exceeded")]
    IterationLimitExceeded { limit: u32 },

    /// The wall-clock budget elapsed.
    #[error("execution deadline of {timeout:?} exceeded")]
    DeadlineExceeded { timeout: Duration },

    /// The run was cancelled by the caller before any deadline.
    #[error("execution cancelled")]
    Cancelled,

    /// The loop reached a node id with no registered node. Build validation
    /// makes this unreachable for built graphs.
    #[error("no node registered with id '{0}'")]
    NodeNotFound(String),

    /// State persistence failed.
    #[error(transparent)]
    StateStore(#[from] StateStoreError),
}

impl ExecutionError {
    /// True for the bounded-run errors (iteration cap, deadline): callers may
    /// extend the budget and re-run, unlike node failures.
    pub fn is_limit(&self) -> bool {
        matches!(
            self,
            ExecutionError::IterationLimitExceeded { .. } | ExecutionError::DeadlineExceeded { .. }
        )
    }
}
