//! Shared node doubles and graph builders for the integration suite.

use std::collections::HashMap;

use serde_json::{json, Value};

use graphflow::node::NodeError;
use graphflow::{Graph, GraphBuilder};

/// Transform that sets `key = true`.
pub fn set_flag(
    key: &'static str,
) -> impl Fn(&HashMap<String, Value>) -> Result<HashMap<String, Value>, NodeError> {
    move |_| {
        let mut out = HashMap::new();
        out.insert(key.to_string(), json!(true));
        Ok(out)
    }
}

/// Transform that increments the integer under `key` (absent counts as 0).
pub fn increment(
    key: &'static str,
) -> impl Fn(&HashMap<String, Value>) -> Result<HashMap<String, Value>, NodeError> {
    move |data| {
        let current = data.get(key).and_then(Value::as_i64).unwrap_or(0);
        let mut out = HashMap::new();
        out.insert(key.to_string(), json!(current + 1));
        Ok(out)
    }
}

/// `start -> process -> end`, with `process` setting `processed = true`.
pub fn linear_graph() -> Graph {
    GraphBuilder::new("linear")
        .add_start_node("start")
        .add_transform_node("process", set_flag("processed"))
        .add_end_node("end")
        .from("start")
        .to("process")
        .to("end")
        .build()
        .expect("linear graph builds")
}

/// Two transforms wired into a cycle: `a -> b -> a`. Never terminates on its
/// own; exists to exercise iteration caps.
pub fn cyclic_graph() -> Graph {
    GraphBuilder::new("cycle")
        .add_transform_node("a", increment("laps"))
        .add_transform_node("b", increment("laps"))
        .set_entry_point("a")
        .add_edge("a", "b")
        .add_edge("b", "a")
        .build()
        .expect("cyclic graph builds")
}
