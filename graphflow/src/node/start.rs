//! Start node: no-op pass-through marking the graph entry.

use async_trait::async_trait;

use super::{Node, NodeError, NodeKind, NodeMeta, NodeOutput};
use crate::graph::RunContext;
use crate::state::State;

/// The unique source of a graph. Executes as a no-op.
pub struct StartNode {
    meta: NodeMeta,
}

impl StartNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            meta: NodeMeta::new(id).with_description("graph entry"),
        }
    }
}

#[async_trait]
impl Node for StartNode {
    fn id(&self) -> &str {
        self.meta.id()
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Start
    }

    fn description(&self) -> &str {
        self.meta.description()
    }

    async fn execute(&self, _ctx: &RunContext, _state: &State) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new())
    }
}
