//! End node: no-op terminal marker.

use async_trait::async_trait;

use super::{Node, NodeError, NodeKind, NodeMeta, NodeOutput};
use crate::graph::RunContext;
use crate::state::State;

/// Terminal marker. A graph may declare one or more; reaching one with no
/// outgoing transition completes the run.
pub struct EndNode {
    meta: NodeMeta,
}

impl EndNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            meta: NodeMeta::new(id).with_description("graph exit"),
        }
    }
}

#[async_trait]
impl Node for EndNode {
    fn id(&self) -> &str {
        self.meta.id()
    }

    fn kind(&self) -> NodeKind {
        NodeKind::End
    }

    fn description(&self) -> &str {
        self.meta.description()
    }

    async fn execute(&self, _ctx: &RunContext, _state: &State) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new())
    }
}
