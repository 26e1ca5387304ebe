//! Run-level wrapper: bounds, tracing, structured result.
//!
//! Wraps a single `Graph::execute` call with an iteration cap, a wall-clock
//! budget enforced through cancellation, and optional tracing, and packages
//! the outcome as an [`ExecutionResult`].

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::ExecutionError;
use crate::graph::{Graph, RunContext};
use crate::state::{RunStatus, State};
use crate::trace::{ExecutionTracer, LogTracer};

/// Bounds and observability for one executor run.
#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    /// Hard cap on node executions; exceeding it fails the run with
    /// `IterationLimitExceeded`. `None` runs unbounded.
    pub max_iterations: Option<u32>,
    /// Wall-clock budget; elapsing fails the run with `DeadlineExceeded`.
    pub timeout: Option<Duration>,
    /// When set, the executor's tracer observes node and graph transitions.
    pub enable_tracing: bool,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            max_iterations: Some(100),
            timeout: None,
            enable_tracing: false,
        }
    }
}

/// Outcome of one executor run.
///
/// `execution_id` is generated per call and independent of the state id, so
/// several runs can reuse or fork the same state lineage.
#[derive(Debug)]
pub struct ExecutionResult {
    pub execution_id: String,
    pub status: RunStatus,
    pub duration: Duration,
    pub final_state: State,
    pub error: Option<ExecutionError>,
}

impl ExecutionResult {
    /// True when the run completed through a terminal node.
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// Bounded runner over [`Graph::execute`].
pub struct GraphExecutor {
    options: ExecutorOptions,
    tracer: Arc<dyn ExecutionTracer>,
}

impl Default for GraphExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphExecutor {
    pub fn new() -> Self {
        Self::with_options(ExecutorOptions::default())
    }

    pub fn with_options(options: ExecutorOptions) -> Self {
        Self {
            options,
            tracer: Arc::new(LogTracer),
        }
    }

    /// Replaces the default log-based tracer; effective when
    /// `options.enable_tracing` is set.
    pub fn with_tracer(mut self, tracer: Arc<dyn ExecutionTracer>) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    /// Runs `graph` against `state` under the configured bounds.
    ///
    /// Never returns early on error: the result always carries the final
    /// state as of the last successful step, plus the error if the run failed.
    pub async fn execute(&self, graph: &Graph, state: State) -> ExecutionResult {
        let execution_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        let token = CancellationToken::new();
        let mut ctx = RunContext::new().with_cancellation(token.clone());
        if let Some(limit) = self.options.max_iterations {
            ctx = ctx.with_max_iterations(limit);
        }
        if let Some(timeout) = self.options.timeout {
            ctx = ctx.with_timeout(timeout);
            let watchdog = token.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = watchdog.cancelled() => {}
                    _ = tokio::time::sleep(timeout) => watchdog.cancel(),
                }
            });
        }
        if self.options.enable_tracing {
            ctx = ctx.with_tracer(self.tracer.clone());
        }

        let mut state = state;
        let outcome = graph.execute(&ctx, &mut state).await;
        // Reap the watchdog task if the run beat the deadline.
        token.cancel();

        let (status, error) = match outcome {
            Ok(status) => (status, None),
            Err(error) => (RunStatus::Failed, Some(error)),
        };
        ExecutionResult {
            execution_id,
            status,
            duration: started.elapsed(),
            final_state: state,
            error,
        }
    }
}
