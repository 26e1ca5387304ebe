//! Streaming observation of a running graph.
//!
//! `Graph::stream` emits these events through a channel-backed stream while
//! the run progresses. Pure observation; dropping the receiver never affects
//! the run's outcome.

use std::collections::HashSet;

use crate::state::State;

/// Which kinds of events to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamMode {
    /// Full state snapshot after each node's output merges.
    Values,
    /// Node id plus state after that node.
    Updates,
}

impl From<StreamMode> for HashSet<StreamMode> {
    fn from(mode: StreamMode) -> Self {
        HashSet::from_iter([mode])
    }
}

/// One event emitted during a streamed run.
#[derive(Clone, Debug)]
pub enum StreamEvent {
    /// State snapshot after a node finished.
    Values(State),
    /// Incremental update: the node that just ran and the state after it.
    Updates { node_id: String, state: State },
}
