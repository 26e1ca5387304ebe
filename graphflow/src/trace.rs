//! Execution tracing hooks.
//!
//! A tracer is injected explicitly through `GraphExecutor` or `RunContext`;
//! there is no process-wide default. Absence of a tracer never changes
//! execution semantics.

use std::time::Duration;

use crate::node::NodeKind;
use crate::state::RunStatus;

/// Span emitter invoked at graph and node boundaries.
///
/// All hooks default to no-ops so implementations pick the events they care
/// about. Hooks must not block; they run inline with the step loop.
pub trait ExecutionTracer: Send + Sync {
    fn on_graph_start(&self, _graph_id: &str, _state_id: &str) {}

    fn on_node_start(&self, _node_id: &str, _kind: NodeKind) {}

    fn on_node_end(&self, _node_id: &str, _kind: NodeKind, _elapsed: Duration, _ok: bool) {}

    fn on_graph_end(&self, _graph_id: &str, _status: RunStatus, _elapsed: Duration) {}
}

/// Tracer that emits structured log events via the `tracing` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracer;

impl ExecutionTracer for LogTracer {
    fn on_graph_start(&self, graph_id: &str, state_id: &str) {
        tracing::info!(graph_id, state_id, "graph execution started");
    }

    fn on_node_start(&self, node_id: &str, kind: NodeKind) {
        tracing::debug!(node_id, kind = %kind, "node started");
    }

    fn on_node_end(&self, node_id: &str, kind: NodeKind, elapsed: Duration, ok: bool) {
        tracing::debug!(node_id, kind = %kind, elapsed_ms = elapsed.as_millis() as u64, ok, "node finished");
    }

    fn on_graph_end(&self, graph_id: &str, status: RunStatus, elapsed: Duration) {
        tracing::info!(graph_id, status = %status, elapsed_ms = elapsed.as_millis() as u64, "graph execution finished");
    }
}
