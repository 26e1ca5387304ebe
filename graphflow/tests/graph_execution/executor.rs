//! Executor bounds: iteration caps, wall-clock timeouts, tracing injection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use graphflow::node::NodeKind;
use graphflow::{
    ExecutionError, ExecutionTracer, ExecutorOptions, GraphBuilder, GraphExecutor, MockTool,
    RunStatus, State, ToolNode,
};

use crate::common::cyclic_graph;

/// **Scenario**: a cyclic graph under MaxIterations = 10 terminates with an
/// iteration-limit error after exactly 10 transitions.
#[tokio::test]
async fn iteration_cap_stops_cycle() {
    let graph = cyclic_graph();
    let executor = GraphExecutor::with_options(ExecutorOptions {
        max_iterations: Some(10),
        timeout: None,
        enable_tracing: false,
    });

    let result = executor.execute(&graph, State::new(graph.id())).await;
    assert_eq!(result.status, RunStatus::Failed);
    match result.error {
        Some(ExecutionError::IterationLimitExceeded { limit }) => assert_eq!(limit, 10),
        other => panic!("expected IterationLimitExceeded, got {other:?}"),
    }
    assert_eq!(
        result.final_state.history().len(),
        10,
        "exactly 10 transitions before the cap"
    );
    assert_eq!(result.final_state.get_i64("laps"), Some(10));
}

/// **Scenario**: the limit error is classified as a limit, so callers can
/// resume with a larger budget rather than treat it as a node failure.
#[tokio::test]
async fn limit_errors_are_resumable_class() {
    let graph = cyclic_graph();
    let executor = GraphExecutor::with_options(ExecutorOptions {
        max_iterations: Some(2),
        ..ExecutorOptions::default()
    });
    let result = executor.execute(&graph, State::new(graph.id())).await;
    assert!(result.error.as_ref().is_some_and(ExecutionError::is_limit));
}

/// **Scenario**: a node blocked on slow I/O returns promptly when the
/// executor timeout elapses; the run fails with a deadline error.
#[tokio::test]
async fn timeout_cancels_blocked_node() {
    let graph = GraphBuilder::new("stuck")
        .add_start_node("start")
        .add_node(Arc::new(ToolNode::new(
            "slow",
            Arc::new(MockTool::new("tarpit").with_delay(Duration::from_secs(60))),
        )))
        .add_end_node("end")
        .from("start")
        .to("slow")
        .to("end")
        .build()
        .unwrap();

    let executor = GraphExecutor::with_options(ExecutorOptions {
        max_iterations: Some(100),
        timeout: Some(Duration::from_millis(50)),
        enable_tracing: false,
    });

    let started = std::time::Instant::now();
    let result = executor.execute(&graph, State::new(graph.id())).await;
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "timeout must preempt the blocked node, took {:?}",
        started.elapsed()
    );
    assert_eq!(result.status, RunStatus::Failed);
    assert_eq!(result.final_state.status(), RunStatus::Failed);
    match result.error {
        Some(ExecutionError::DeadlineExceeded { timeout }) => {
            assert_eq!(timeout, Duration::from_millis(50));
        }
        other => panic!("expected DeadlineExceeded, got {other:?}"),
    }
}

/// Tracer double that counts node transitions.
#[derive(Default)]
struct CountingTracer {
    node_starts: AtomicUsize,
    node_ends: AtomicUsize,
    graph_ends: AtomicUsize,
}

impl ExecutionTracer for CountingTracer {
    fn on_node_start(&self, _node_id: &str, _kind: NodeKind) {
        self.node_starts.fetch_add(1, Ordering::SeqCst);
    }
    fn on_node_end(&self, _node_id: &str, _kind: NodeKind, _elapsed: Duration, _ok: bool) {
        self.node_ends.fetch_add(1, Ordering::SeqCst);
    }
    fn on_graph_end(&self, _graph_id: &str, _status: RunStatus, _elapsed: Duration) {
        self.graph_ends.fetch_add(1, Ordering::SeqCst);
    }
}

/// **Scenario**: with tracing enabled, the injected tracer observes one
/// start/end pair per node and one graph end; disabled, it observes nothing.
#[tokio::test]
async fn tracer_sees_transitions_only_when_enabled() {
    let graph = crate::common::linear_graph();

    let tracer = Arc::new(CountingTracer::default());
    let traced = GraphExecutor::with_options(ExecutorOptions {
        enable_tracing: true,
        ..ExecutorOptions::default()
    })
    .with_tracer(tracer.clone());
    let result = traced.execute(&graph, State::new(graph.id())).await;
    assert!(result.is_success());
    assert_eq!(tracer.node_starts.load(Ordering::SeqCst), 3);
    assert_eq!(tracer.node_ends.load(Ordering::SeqCst), 3);
    assert_eq!(tracer.graph_ends.load(Ordering::SeqCst), 1);

    let silent_tracer = Arc::new(CountingTracer::default());
    let untraced = GraphExecutor::new().with_tracer(silent_tracer.clone());
    let result = untraced.execute(&graph, State::new(graph.id())).await;
    assert!(result.is_success(), "absence of tracing must not change semantics");
    assert_eq!(silent_tracer.node_starts.load(Ordering::SeqCst), 0);
}
