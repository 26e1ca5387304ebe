//! Executable graph: node/edge registry plus the single-run step loop.
//!
//! Built by `GraphBuilder::build`; immutable afterwards. One `execute` call
//! drives one run: resolve current node, execute it, merge its output, resolve
//! the next node, until a terminal node, a halt, an error, or a context bound.

use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::error::ExecutionError;
use crate::graph::{Edge, RunContext};
use crate::node::{panic_message, Node, NodeError, NodeKind};
use crate::state::{RunStatus, State, StateManager};
use crate::stream::{StreamEvent, StreamMode};

/// Validated, immutable workflow graph.
///
/// **Interaction**: produced by `GraphBuilder`; driven by `GraphExecutor` or
/// directly via [`Graph::execute`]. Holds the run's `StateManager` and saves
/// the final state at run end.
#[derive(Clone)]
pub struct Graph {
    pub(super) id: String,
    pub(super) name: String,
    pub(super) nodes: HashMap<String, Arc<dyn Node>>,
    /// Adjacency by source node id; per-source insertion order is preserved
    /// so conditional edges evaluate deterministically.
    pub(super) edges: HashMap<String, Vec<Edge>>,
    pub(super) entry_point: String,
    pub(super) exit_points: HashSet<String>,
    pub(super) state_manager: Arc<dyn StateManager>,
}

impl Graph {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn node(&self, id: &str) -> Option<&Arc<dyn Node>> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn state_manager(&self) -> &Arc<dyn StateManager> {
        &self.state_manager
    }

    /// Runs the graph to completion against `state`.
    ///
    /// Returns the terminal status (`Completed` or `Halted`) or the fatal
    /// error; in every case `state` holds the result of the last successfully
    /// merged step, and the final state is saved through the state manager.
    /// Bounding (iteration cap, deadline) comes from `ctx`; a default context
    /// runs unbounded.
    pub async fn execute(
        &self,
        ctx: &RunContext,
        state: &mut State,
    ) -> Result<RunStatus, ExecutionError> {
        let run_started = Instant::now();
        if !self.nodes.contains_key(&self.entry_point) {
            return Err(ExecutionError::NodeNotFound(self.entry_point.clone()));
        }

        if let Some(tracer) = ctx.tracer() {
            tracer.on_graph_start(&self.id, state.id());
        }
        state.set_status(RunStatus::Running);
        let mut current = self.entry_point.clone();
        let mut iterations: u32 = 0;

        loop {
            if ctx.is_cancelled() {
                return self.fail(ctx, state, run_started, self.cancellation_error(ctx)).await;
            }
            if let Some(limit) = ctx.max_iterations() {
                if iterations >= limit {
                    return self
                        .fail(ctx, state, run_started, ExecutionError::IterationLimitExceeded { limit })
                        .await;
                }
            }

            let node = match self.nodes.get(&current) {
                Some(node) => node.clone(),
                None => {
                    return self
                        .fail(ctx, state, run_started, ExecutionError::NodeNotFound(current))
                        .await;
                }
            };

            let kind = node.kind();
            debug!(graph_id = %self.id, node_id = %current, kind = %kind, "executing node");
            if let Some(tracer) = ctx.tracer() {
                tracer.on_node_start(&current, kind);
            }
            let node_started = Instant::now();
            let result = AssertUnwindSafe(node.execute(ctx, state))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(NodeError::Panicked(panic_message(panic))));
            if let Some(tracer) = ctx.tracer() {
                tracer.on_node_end(&current, kind, node_started.elapsed(), result.is_ok());
            }

            let output = match result {
                Ok(output) => output,
                Err(NodeError::Cancelled) => {
                    return self.fail(ctx, state, run_started, self.cancellation_error(ctx)).await;
                }
                Err(source) => {
                    let error = ExecutionError::Node {
                        node_id: current,
                        source,
                    };
                    return self.fail(ctx, state, run_started, error).await;
                }
            };

            let next_override = output.next_node.clone();
            state.apply(output, &current);
            iterations += 1;
            self.emit_stream_events(ctx, &current, state).await;

            let next = match next_override {
                Some(id) => Some(id),
                None => self.resolve_edge(&current, state),
            };

            match next {
                Some(id) => current = id,
                None => {
                    let status = if self.is_terminal(&current) {
                        RunStatus::Completed
                    } else {
                        RunStatus::Halted
                    };
                    state.set_status(status);
                    self.persist(state).await;
                    if let Some(tracer) = ctx.tracer() {
                        tracer.on_graph_end(&self.id, status, run_started.elapsed());
                    }
                    return Ok(status);
                }
            }
        }
    }

    /// Streams a run: the graph executes on a spawned task while events are
    /// delivered through the returned stream. Dropping the receiver does not
    /// stop the run.
    pub fn stream(
        &self,
        state: State,
        mode: impl Into<HashSet<StreamMode>>,
    ) -> ReceiverStream<StreamEvent> {
        let (tx, rx) = mpsc::channel(128);
        let graph = self.clone();
        let mode_set: HashSet<StreamMode> = mode.into();

        tokio::spawn(async move {
            let ctx = RunContext::new().with_stream(tx, mode_set);
            let mut state = state;
            if let Err(error) = graph.execute(&ctx, &mut state).await {
                warn!(graph_id = %graph.id, %error, "streamed run failed");
            }
        });

        ReceiverStream::new(rx)
    }

    /// Resolves the outgoing edge for `from`: conditional edges in insertion
    /// order first, then the single unconditional fallback.
    fn resolve_edge(&self, from: &str, state: &State) -> Option<String> {
        let edges = self.edges.get(from)?;
        for edge in edges {
            if let Some(condition) = &edge.condition {
                if condition.evaluate(state) {
                    return Some(edge.to.clone());
                }
            }
        }
        edges
            .iter()
            .find(|edge| edge.condition.is_none())
            .map(|edge| edge.to.clone())
    }

    /// A node is terminal when it is an `End` node or a declared exit point.
    fn is_terminal(&self, id: &str) -> bool {
        if self.exit_points.contains(id) {
            return true;
        }
        self.nodes
            .get(id)
            .is_some_and(|node| node.kind() == NodeKind::End)
    }

    fn cancellation_error(&self, ctx: &RunContext) -> ExecutionError {
        if ctx.deadline_exceeded() {
            ExecutionError::DeadlineExceeded {
                timeout: ctx.timeout().unwrap_or(Duration::ZERO),
            }
        } else {
            ExecutionError::Cancelled
        }
    }

    /// Marks the run failed, saves the state, closes the trace, and returns
    /// the error.
    async fn fail(
        &self,
        ctx: &RunContext,
        state: &mut State,
        run_started: Instant,
        error: ExecutionError,
    ) -> Result<RunStatus, ExecutionError> {
        state.set_status(RunStatus::Failed);
        self.persist(state).await;
        if let Some(tracer) = ctx.tracer() {
            tracer.on_graph_end(&self.id, RunStatus::Failed, run_started.elapsed());
        }
        Err(error)
    }

    /// End-of-run save is best-effort: a store outage must not mask the run's
    /// actual outcome.
    async fn persist(&self, state: &State) {
        if let Err(error) = self.state_manager.save_state(state).await {
            warn!(graph_id = %self.id, state_id = %state.id(), %error, "failed to save final state");
        }
    }

    async fn emit_stream_events(&self, ctx: &RunContext, node_id: &str, state: &State) {
        let Some(tx) = ctx.stream_tx() else {
            return;
        };
        if ctx.stream_mode().contains(&StreamMode::Values) {
            let _ = tx.send(StreamEvent::Values(state.detached_snapshot())).await;
        }
        if ctx.stream_mode().contains(&StreamMode::Updates) {
            let _ = tx
                .send(StreamEvent::Updates {
                    node_id: node_id.to_string(),
                    state: state.detached_snapshot(),
                })
                .await;
        }
    }
}
