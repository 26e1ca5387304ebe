//! Tool boundary: opaque external callables invoked by `ToolNode`.
//!
//! The engine treats tools as black boxes: a named async map-in/map-out call
//! plus advisory schema metadata. Retries and side-effect semantics belong to
//! the tool, not the engine.

mod mock;

pub use mock::MockTool;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Tool-side failure, surfaced through `NodeError::Tool`.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool ran and failed.
    #[error("tool execution failed: {0}")]
    Execution(String),

    /// The tool rejected its input before running.
    #[error("invalid tool input: {0}")]
    InvalidInput(String),
}

/// Advisory description of a tool, suitable for handing to a model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

/// An external, possibly side-effecting callable.
///
/// **Interaction**: held by `ToolNode` as `Arc<dyn Tool>`; also listed in
/// `GenerateRequest.tools` as specs so a model may request calls.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// JSON schema of the expected input. Advisory metadata only; the engine
    /// never validates against it.
    fn schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    /// Runs the tool against a subset of run state data.
    async fn execute(
        &self,
        input: HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>, ToolError>;

    /// Spec view of this tool for provider requests.
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: if self.description().is_empty() {
                None
            } else {
                Some(self.description().to_string())
            },
            input_schema: self.schema(),
        }
    }
}
