//! Decision nodes and conditional edges inside full runs.

use std::sync::Arc;

use graphflow::{
    DecisionNode, FnCondition, GraphBuilder, GraphExecutor, RunContext, RunStatus, State,
};

use crate::common::{increment, set_flag};

/// **Scenario**: a decision routes to the branch whose condition matches the
/// current state; only that branch runs.
#[tokio::test]
async fn decision_routes_to_matching_branch() {
    let graph = GraphBuilder::new("router")
        .add_start_node("start")
        .add_decision_node(
            DecisionNode::new("route")
                .when_fn(|s: &State| s.get_str("kind") == Some("a"), "handle-a")
                .when_fn(|s: &State| s.get_str("kind") == Some("b"), "handle-b")
                .otherwise("handle-default"),
        )
        .add_transform_node("handle-a", set_flag("a_ran"))
        .add_transform_node("handle-b", set_flag("b_ran"))
        .add_transform_node("handle-default", set_flag("default_ran"))
        .add_end_node("end")
        .add_edge("start", "route")
        .add_edge("handle-a", "end")
        .add_edge("handle-b", "end")
        .add_edge("handle-default", "end")
        .build()
        .unwrap();

    let mut state = State::new(graph.id());
    state.set("kind", "b");

    let status = graph.execute(&RunContext::new(), &mut state).await.unwrap();
    assert_eq!(status, RunStatus::Completed);
    assert_eq!(state.get_bool("b_ran"), Some(true));
    assert!(state.get_bool("a_ran").is_none());
    assert!(state.get_bool("default_ran").is_none());
}

/// **Scenario**: with no matching condition, the default target runs.
#[tokio::test]
async fn decision_falls_back_to_default_target() {
    let graph = GraphBuilder::new("router")
        .add_start_node("start")
        .add_decision_node(
            DecisionNode::new("route")
                .when_fn(|s: &State| s.get_str("kind") == Some("a"), "handle-a")
                .otherwise("handle-default"),
        )
        .add_transform_node("handle-a", set_flag("a_ran"))
        .add_transform_node("handle-default", set_flag("default_ran"))
        .add_end_node("end")
        .add_edge("start", "route")
        .add_edge("handle-a", "end")
        .add_edge("handle-default", "end")
        .build()
        .unwrap();

    let mut state = State::new(graph.id());
    let status = graph.execute(&RunContext::new(), &mut state).await.unwrap();
    assert_eq!(status, RunStatus::Completed);
    assert_eq!(state.get_bool("default_ran"), Some(true));
}

/// **Scenario**: no match and no default halts the run with the
/// no_condition_met marker in data.
#[tokio::test]
async fn decision_without_match_halts_run() {
    let graph = GraphBuilder::new("router")
        .add_start_node("start")
        .add_decision_node(
            DecisionNode::new("route")
                .when_fn(|s: &State| s.get_bool("never") == Some(true), "unreachable"),
        )
        .add_transform_node("unreachable", set_flag("ran"))
        .add_edge("start", "route")
        .build()
        .unwrap();

    let mut state = State::new(graph.id());
    let status = graph.execute(&RunContext::new(), &mut state).await.unwrap();
    assert_eq!(status, RunStatus::Halted);
    assert_eq!(state.get_str("decision"), Some("no_condition_met"));
    assert!(state.get_bool("ran").is_none());
}

/// **Scenario**: a decision-closed loop iterates until its exit condition
/// holds, then completes through the end node.
#[tokio::test]
async fn decision_loop_exits_on_condition() {
    let graph = GraphBuilder::new("loop")
        .add_start_node("start")
        .add_transform_node("work", increment("laps"))
        .add_decision_node(
            DecisionNode::new("check")
                .when_fn(|s: &State| s.get_i64("laps").unwrap_or(0) >= 3, "end")
                .otherwise("work"),
        )
        .add_end_node("end")
        .add_edge("start", "work")
        .add_edge("work", "check")
        .build()
        .unwrap();

    let result = GraphExecutor::new()
        .execute(&graph, State::new(graph.id()))
        .await;
    assert!(result.is_success());
    assert_eq!(result.final_state.get_i64("laps"), Some(3));
}

/// **Scenario**: conditional edges on a plain node are evaluated in insertion
/// order before the unconditional fallback.
#[tokio::test]
async fn conditional_edges_take_precedence() {
    let graph = GraphBuilder::new("gated")
        .add_start_node("start")
        .add_transform_node("fork", set_flag("forked"))
        .add_transform_node("special", set_flag("special_ran"))
        .add_transform_node("normal", set_flag("normal_ran"))
        .add_end_node("end")
        .add_edge("start", "fork")
        .add_conditional_edge(
            "fork",
            "special",
            Arc::new(FnCondition::new(|s: &State| {
                s.get_bool("vip") == Some(true)
            })),
        )
        .add_edge("fork", "normal")
        .add_edge("special", "end")
        .add_edge("normal", "end")
        .build()
        .unwrap();

    // Condition holds: the gated edge wins over the unconditional fallback.
    let mut vip_state = State::new(graph.id());
    vip_state.set("vip", true);
    graph.execute(&RunContext::new(), &mut vip_state).await.unwrap();
    assert_eq!(vip_state.get_bool("special_ran"), Some(true));
    assert!(vip_state.get_bool("normal_ran").is_none());

    // Condition fails: fallback edge.
    let mut plain_state = State::new(graph.id());
    graph.execute(&RunContext::new(), &mut plain_state).await.unwrap();
    assert_eq!(plain_state.get_bool("normal_ran"), Some(true));
    assert!(plain_state.get_bool("special_ran").is_none());
}
