//! Graph construction errors.
//!
//! Returned by `GraphBuilder::build`. Topology problems are caught here,
//! never at runtime.

use thiserror::Error;

/// Error when assembling a graph.
#[derive(Debug, Error)]
pub enum BuildError {
    /// An edge, entry point, or exit point references an id with no node.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// Two nodes were registered under the same id.
    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    /// No entry point was set.
    #[error("graph has no entry point")]
    MissingEntryPoint,

    /// More than one start node was registered; a graph has a unique source.
    #[error("graph has {0} start nodes, expected at most one")]
    MultipleStartNodes(usize),

    /// A non-decision node has more than one unconditional outgoing edge.
    #[error("node '{0}' has more than one unconditional outgoing edge")]
    AmbiguousEdges(String),
}
