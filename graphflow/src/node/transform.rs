//! Transform node: pure function over state data.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{Node, NodeError, NodeKind, NodeMeta, NodeOutput};
use crate::graph::RunContext;
use crate::state::State;

/// Pure function from the current data map to a set of changes. The returned
/// map is merged into `State.data`, last writer wins.
pub type TransformFn =
    Arc<dyn Fn(&HashMap<String, Value>) -> Result<HashMap<String, Value>, NodeError> + Send + Sync>;

/// Node that rewrites state data through a stored function.
pub struct TransformNode {
    meta: NodeMeta,
    transform: TransformFn,
}

impl TransformNode {
    pub fn new<F>(id: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&HashMap<String, Value>) -> Result<HashMap<String, Value>, NodeError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            meta: NodeMeta::new(id),
            transform: Arc::new(transform),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.meta = NodeMeta::new(self.meta.id()).with_description(description);
        self
    }
}

#[async_trait]
impl Node for TransformNode {
    fn id(&self) -> &str {
        self.meta.id()
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Transform
    }

    fn description(&self) -> &str {
        self.meta.description()
    }

    async fn execute(&self, _ctx: &RunContext, state: &State) -> Result<NodeOutput, NodeError> {
        let data = (self.transform)(state.data())?;
        Ok(NodeOutput {
            data,
            ..NodeOutput::default()
        })
    }
}
