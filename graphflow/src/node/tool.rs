//! Tool node: thin adapter around an external callable.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{Node, NodeError, NodeKind, NodeMeta, NodeOutput};
use crate::graph::RunContext;
use crate::state::State;
use crate::tools::Tool;

/// Projects declared input keys out of state data, invokes the tool, and
/// merges its result under the declared output key.
///
/// The call races against run cancellation, so a hung tool cannot stall a
/// timed-out run.
pub struct ToolNode {
    meta: NodeMeta,
    tool: Arc<dyn Tool>,
    input_keys: Vec<String>,
    output_key: String,
}

impl ToolNode {
    pub fn new(id: impl Into<String>, tool: Arc<dyn Tool>) -> Self {
        let meta = NodeMeta::new(id);
        let output_key = format!("{}_result", tool.name());
        Self {
            meta,
            tool,
            input_keys: Vec::new(),
            output_key,
        }
    }

    /// Keys copied from `State.data` into the tool input. Missing keys are
    /// simply absent from the input map.
    pub fn with_input_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Key the tool's result object is stored under. Defaults to
    /// `"{tool_name}_result"`.
    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = key.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.meta = NodeMeta::new(self.meta.id()).with_description(description);
        self
    }
}

#[async_trait]
impl Node for ToolNode {
    fn id(&self) -> &str {
        self.meta.id()
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Tool
    }

    fn description(&self) -> &str {
        self.meta.description()
    }

    async fn execute(&self, ctx: &RunContext, state: &State) -> Result<NodeOutput, NodeError> {
        let input: HashMap<String, Value> = self
            .input_keys
            .iter()
            .filter_map(|key| state.get(key).map(|v| (key.clone(), v.clone())))
            .collect();

        debug!(node_id = self.id(), tool = self.tool.name(), "invoking tool");
        let result = tokio::select! {
            _ = ctx.cancelled() => Err(NodeError::Cancelled),
            result = self.tool.execute(input) => result.map_err(|source| NodeError::Tool {
                name: self.tool.name().to_string(),
                source,
            }),
        }?;

        let object: serde_json::Map<String, Value> = result.into_iter().collect();
        Ok(NodeOutput::new().with_data(self.output_key.clone(), Value::Object(object)))
    }
}
