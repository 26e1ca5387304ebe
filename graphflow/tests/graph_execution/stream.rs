//! Streamed observation of a run.

use tokio_stream::StreamExt;

use graphflow::{State, StreamEvent, StreamMode};

use crate::common::linear_graph;

/// **Scenario**: streaming with Values emits one snapshot per node and the
/// last snapshot carries the completed run.
#[tokio::test]
async fn stream_values_snapshots_per_node() {
    let graph = linear_graph();
    let events: Vec<_> = graph
        .stream(State::new(graph.id()), StreamMode::Values)
        .collect()
        .await;

    assert_eq!(events.len(), 3, "one Values event per node");
    match events.last() {
        Some(StreamEvent::Values(state)) => {
            assert_eq!(state.get_bool("processed"), Some(true));
        }
        other => panic!("expected Values event, got {:?}", other.is_some()),
    }
}

/// **Scenario**: streaming with Updates emits node ids in dispatch order.
#[tokio::test]
async fn stream_updates_in_dispatch_order() {
    let graph = linear_graph();
    let events: Vec<_> = graph
        .stream(State::new(graph.id()), StreamMode::Updates)
        .collect()
        .await;

    let ids: Vec<_> = events
        .iter()
        .map(|event| match event {
            StreamEvent::Updates { node_id, .. } => node_id.clone(),
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    assert_eq!(ids, vec!["start", "process", "end"]);
}

/// **Scenario**: both modes together interleave Values then Updates per node.
#[tokio::test]
async fn stream_both_modes_interleaves() {
    use std::collections::HashSet;

    let graph = linear_graph();
    let modes: HashSet<StreamMode> = [StreamMode::Values, StreamMode::Updates].into();
    let events: Vec<_> = graph.stream(State::new(graph.id()), modes).collect().await;

    assert_eq!(events.len(), 6, "three nodes, two events each");
    assert!(matches!(events[0], StreamEvent::Values(_)));
    assert!(matches!(events[1], StreamEvent::Updates { .. }));
}
