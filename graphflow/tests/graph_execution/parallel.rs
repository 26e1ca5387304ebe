//! Parallel fan-out exercised through full graph runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use graphflow::node::{Node, NodeError};
use graphflow::{
    ExecutionError, GraphBuilder, GraphExecutor, MockTool, ParallelNode, RunStatus, State, ToolNode,
    TransformNode,
};

fn branch(id: &str, value: i64) -> Arc<dyn Node> {
    let key = id.to_string();
    Arc::new(TransformNode::new(id, move |_| {
        let mut out = HashMap::new();
        out.insert(key.clone(), json!(value));
        Ok(out)
    }))
}

/// **Scenario**: branch outputs merge into the parent state under namespaced
/// keys plus the aggregate results array, and a downstream node can read them.
#[tokio::test]
async fn fan_out_merges_into_parent_state() {
    let branches: Vec<Arc<dyn Node>> = vec![branch("left", 1), branch("right", 2)];
    let graph = GraphBuilder::new("fanout")
        .add_start_node("start")
        .add_parallel_node("fan", branches, 2)
        .add_transform_node("sum", |data| {
            let results = data
                .get("results")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default();
            let total: i64 = results
                .iter()
                .flat_map(|entry| entry.as_object())
                .flat_map(|obj| obj.values())
                .filter_map(|v| v.as_i64())
                .sum();
            let mut out = HashMap::new();
            out.insert("total".to_string(), json!(total));
            Ok(out)
        })
        .add_end_node("end")
        .from("start")
        .to("fan")
        .to("sum")
        .to("end")
        .build()
        .unwrap();

    let result = GraphExecutor::new()
        .execute(&graph, State::new(graph.id()))
        .await;
    assert!(result.is_success());

    let state = &result.final_state;
    assert_eq!(state.get("0_left").unwrap()["left"], 1);
    assert_eq!(state.get("1_right").unwrap()["right"], 2);
    assert_eq!(state.get_i64("total"), Some(3));

    let results = state.get("results").unwrap().as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["left"], 1, "results keeps launch order");
    assert_eq!(results[1]["right"], 2);
}

/// **Scenario**: tool branches run concurrently; total wall-clock stays well
/// under the serial sum of their delays.
#[tokio::test]
async fn tool_branches_run_concurrently() {
    let slow_tool = |name: &str| {
        Arc::new(
            MockTool::new(name)
                .with_result("ok", true)
                .with_delay(Duration::from_millis(80)),
        )
    };
    let branches: Vec<Arc<dyn Node>> = vec![
        Arc::new(ToolNode::new("t1", slow_tool("alpha"))),
        Arc::new(ToolNode::new("t2", slow_tool("beta"))),
        Arc::new(ToolNode::new("t3", slow_tool("gamma"))),
    ];
    let graph = GraphBuilder::new("concurrent")
        .add_start_node("start")
        .add_parallel_node("fan", branches, 3)
        .add_end_node("end")
        .from("start")
        .to("fan")
        .to("end")
        .build()
        .unwrap();

    let started = std::time::Instant::now();
    let result = GraphExecutor::new()
        .execute(&graph, State::new(graph.id()))
        .await;
    assert!(result.is_success());
    assert!(
        started.elapsed() < Duration::from_millis(200),
        "three 80ms branches should overlap, took {:?}",
        started.elapsed()
    );
}

/// **Scenario**: one failing branch fails the whole run with a Branch error
/// naming the culprit; sibling results are not committed.
#[tokio::test]
async fn failing_branch_fails_the_run() {
    let branches: Vec<Arc<dyn Node>> = vec![
        branch("good", 1),
        Arc::new(ToolNode::new(
            "bad",
            Arc::new(MockTool::new("broken").failing("backend down")),
        )),
    ];
    let graph = GraphBuilder::new("failing-fan")
        .add_start_node("start")
        .add_parallel_node("fan", branches, 2)
        .add_end_node("end")
        .from("start")
        .to("fan")
        .to("end")
        .build()
        .unwrap();

    let result = GraphExecutor::new()
        .execute(&graph, State::new(graph.id()))
        .await;
    assert_eq!(result.status, RunStatus::Failed);
    match result.error {
        Some(ExecutionError::Node { node_id, source }) => {
            assert_eq!(node_id, "fan");
            assert!(matches!(source, NodeError::Branch { ref branch_id, .. } if branch_id == "bad"));
        }
        other => panic!("expected Node error from the parallel node, got {other:?}"),
    }
    assert!(
        result.final_state.get("0_good").is_none(),
        "no partial commit from sibling branches"
    );
    assert!(result.final_state.get("results").is_none());
}
