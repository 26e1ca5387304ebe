//! Per-run context flowing from the executor through the loop into every node.
//!
//! Carries the cancellation token, the optional deadline and iteration cap,
//! the injected tracer, and the optional stream channel. `Graph::execute`
//! with a default context runs unbounded and silent.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::stream::{StreamEvent, StreamMode};
use crate::trace::ExecutionTracer;

/// Context for one run. Cheap to clone; clones share the cancellation token.
#[derive(Clone, Default)]
pub struct RunContext {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
    timeout: Option<Duration>,
    max_iterations: Option<u32>,
    tracer: Option<Arc<dyn ExecutionTracer>>,
    stream_tx: Option<mpsc::Sender<StreamEvent>>,
    stream_mode: HashSet<StreamMode>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `token` for cancellation instead of a fresh never-cancelled one.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Records the wall-clock budget; the matching token cancel is driven by
    /// the executor's watchdog.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self.timeout = Some(timeout);
        self
    }

    /// Caps the number of node executions for this run.
    pub fn with_max_iterations(mut self, limit: u32) -> Self {
        self.max_iterations = Some(limit);
        self
    }

    pub fn with_tracer(mut self, tracer: Arc<dyn ExecutionTracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub(crate) fn with_stream(
        mut self,
        tx: mpsc::Sender<StreamEvent>,
        mode: HashSet<StreamMode>,
    ) -> Self {
        self.stream_tx = Some(tx);
        self.stream_mode = mode;
        self
    }

    /// The run's cancellation token; nodes race long calls against it.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Resolves when the run is cancelled (timeout or caller-initiated).
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// True once the configured deadline has passed. Distinguishes a timeout
    /// cancel from a caller-initiated one.
    pub fn deadline_exceeded(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn max_iterations(&self) -> Option<u32> {
        self.max_iterations
    }

    pub fn tracer(&self) -> Option<&Arc<dyn ExecutionTracer>> {
        self.tracer.as_ref()
    }

    pub(crate) fn stream_tx(&self) -> Option<&mpsc::Sender<StreamEvent>> {
        self.stream_tx.as_ref()
    }

    pub(crate) fn stream_mode(&self) -> &HashSet<StreamMode> {
        &self.stream_mode
    }
}
