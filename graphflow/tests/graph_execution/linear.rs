//! Straight-line execution: termination, history, state persistence.

use std::sync::Arc;

use graphflow::{
    GraphBuilder, GraphExecutor, InMemoryStateManager, RunContext, RunStatus, State, StateManager,
};

use crate::common::{linear_graph, set_flag};

/// **Scenario**: a 3-node linear run completes with `processed == true` and
/// the history records dispatch order.
#[tokio::test]
async fn linear_graph_completes() {
    let graph = linear_graph();
    let mut state = State::new(graph.id());

    let status = graph.execute(&RunContext::new(), &mut state).await.unwrap();
    assert_eq!(status, RunStatus::Completed);
    assert_eq!(state.status(), RunStatus::Completed);
    assert_eq!(state.get_bool("processed"), Some(true));
    assert_eq!(state.history().node_ids(), vec!["start", "process", "end"]);
    assert_eq!(state.current_node(), Some("end"));
}

/// **Scenario**: the same run through the executor yields a successful
/// ExecutionResult with the processed flag set.
#[tokio::test]
async fn linear_graph_through_executor() {
    let graph = linear_graph();
    let result = GraphExecutor::new()
        .execute(&graph, State::new(graph.id()))
        .await;
    assert!(result.is_success());
    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.final_state.get_bool("processed"), Some(true));
}

/// **Scenario**: the final state is retrievable from the graph's state
/// manager after the run.
#[tokio::test]
async fn final_state_lands_in_state_manager() {
    let manager = Arc::new(InMemoryStateManager::new());
    let graph = GraphBuilder::new("persisting")
        .with_state_manager(manager.clone())
        .add_start_node("start")
        .add_transform_node("process", set_flag("processed"))
        .add_end_node("end")
        .from("start")
        .to("process")
        .to("end")
        .build()
        .unwrap();

    let state = State::with_id("run-42", graph.id());
    let result = GraphExecutor::new().execute(&graph, state).await;
    assert!(result.is_success());

    let saved = manager.load_state("run-42").await.unwrap();
    assert_eq!(saved.status(), RunStatus::Completed);
    assert_eq!(saved.get_bool("processed"), Some(true));
}

/// **Scenario**: a run that dead-ends on a non-terminal node halts without
/// error and the caller sees Halted on both the return and the state.
#[tokio::test]
async fn dead_end_is_halted_not_error() {
    let graph = GraphBuilder::new("open")
        .add_start_node("start")
        .add_transform_node("work", set_flag("worked"))
        .from("start")
        .to("work")
        .build()
        .unwrap();
    let mut state = State::new(graph.id());

    let status = graph.execute(&RunContext::new(), &mut state).await.unwrap();
    assert_eq!(status, RunStatus::Halted);
    assert_eq!(state.get_bool("worked"), Some(true), "work ran before the halt");
}
