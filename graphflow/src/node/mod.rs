//! Execution units of the graph.
//!
//! One trait, one concrete type per node kind; composition over embedding.
//! Nodes receive the state read-only and communicate every change through a
//! [`NodeOutput`], which the graph loop merges — the contract that makes
//! parallel isolation possible.

mod decision;
mod end;
mod model;
mod parallel;
mod start;
mod tool;
mod transform;

pub use decision::{DecisionNode, Route};
pub use end::EndNode;
pub use model::ModelCallNode;
pub use parallel::{ParallelNode, DEFAULT_MAX_CONCURRENCY};
pub use start::StartNode;
pub use tool::ToolNode;
pub use transform::{TransformFn, TransformNode};

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::graph::RunContext;
use crate::llm::ProviderError;
use crate::message::Message;
use crate::state::State;
use crate::tools::ToolError;

/// Kind tag for dispatch-free introspection (tracing, validation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Start,
    End,
    Transform,
    Tool,
    ModelCall,
    Decision,
    Parallel,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::End => "end",
            NodeKind::Transform => "transform",
            NodeKind::Tool => "tool",
            NodeKind::ModelCall => "model_call",
            NodeKind::Decision => "decision",
            NodeKind::Parallel => "parallel",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity shared by all node types: id plus human-readable description.
#[derive(Debug, Clone)]
pub struct NodeMeta {
    id: String,
    description: String,
}

impl NodeMeta {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Node-level failure. Always returned, never panicked; the graph loop turns
/// a caught panic into `Panicked`.
#[derive(Debug, Error)]
pub enum NodeError {
    /// An external tool call failed.
    #[error("tool '{name}' failed: {source}")]
    Tool {
        name: String,
        #[source]
        source: ToolError,
    },

    /// A model provider call failed.
    #[error("model call failed: {0}")]
    Model(#[from] ProviderError),

    /// A transform function rejected the state.
    #[error("transform failed: {0}")]
    Transform(String),

    /// The run context was cancelled while the node was in flight.
    #[error("node execution cancelled")]
    Cancelled,

    /// The node panicked; the payload is the panic message.
    #[error("node panicked: {0}")]
    Panicked(String),

    /// A parallel branch failed; the source is the branch's own error.
    #[error("parallel branch '{branch_id}' failed: {source}")]
    Branch {
        branch_id: String,
        #[source]
        source: Box<NodeError>,
    },
}

/// Changes a node wants applied to the run state.
///
/// **Interaction**: returned by every `Node::execute`; merged into `State`
/// by the graph loop, one output at a time. `next_node` overrides normal edge
/// resolution (used by `DecisionNode`).
#[derive(Debug, Clone, Default)]
pub struct NodeOutput {
    /// Merged into `State.data`, last writer wins.
    pub data: HashMap<String, Value>,
    /// Appended to `State.messages` in order.
    pub messages: Vec<Message>,
    /// Explicit next node, bypassing edge lookup.
    pub next_node: Option<String>,
    /// Merged into `State.metadata`.
    pub metadata: HashMap<String, Value>,
}

impl NodeOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_next(mut self, node_id: impl Into<String>) -> Self {
        self.next_node = Some(node_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// True when the output carries no changes and no routing override.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
            && self.messages.is_empty()
            && self.next_node.is_none()
            && self.metadata.is_empty()
    }
}

/// Extracts a printable message from a caught panic payload.
pub(crate) fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// A unit of work in the graph.
///
/// Contract: never mutate `state` (the signature already forbids it), honor
/// `ctx` cancellation promptly in long-running implementations, and report
/// failures as errors rather than panics.
#[async_trait]
pub trait Node: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> NodeKind;

    fn description(&self) -> &str {
        ""
    }

    async fn execute(&self, ctx: &RunContext, state: &State) -> Result<NodeOutput, NodeError>;
}
