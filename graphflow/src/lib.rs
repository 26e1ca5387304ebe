//! # graphflow
//!
//! A graph-based workflow execution engine: typed nodes connected by
//! optionally conditional edges, executing over a shared, versionable
//! **state** with conversation history.
//!
//! ## Design Principles
//!
//! - **State in, output out**: nodes read the run state and return a
//!   [`NodeOutput`]; the graph loop is the single place state mutates, which
//!   is what makes parallel fan-out safe without locks on the state itself.
//! - **Validate at build time**: [`GraphBuilder::build`] rejects unknown edge
//!   endpoints, duplicate ids, and ambiguous branching, so a built [`Graph`]
//!   never fails topology checks mid-run.
//! - **Bounds live outside the loop**: `Graph::execute` is unbounded;
//!   [`GraphExecutor`] adds the iteration cap, wall-clock budget, and tracing
//!   for production runs.
//!
//! ## Main Modules
//!
//! - [`graph`]: [`GraphBuilder`], [`Graph`], edges and conditions, the run
//!   context.
//! - [`node`]: the [`Node`] trait and the built-in kinds — start, end,
//!   transform, tool, model call, decision, parallel fan-out.
//! - [`state`]: [`State`], the audit trail, and the [`StateManager`]
//!   persistence boundary.
//! - [`executor`]: [`GraphExecutor`] and [`ExecutionResult`].
//! - [`llm`] / [`tools`]: provider and tool boundaries with mock
//!   implementations for tests.
//! - [`trace`] / [`stream`]: execution observation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use graphflow::{GraphBuilder, GraphExecutor, State};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let graph = GraphBuilder::new("greeter")
//!     .add_start_node("start")
//!     .add_transform_node("greet", |data| {
//!         let name = data.get("name").and_then(|v| v.as_str()).unwrap_or("world");
//!         let mut out = std::collections::HashMap::new();
//!         out.insert("greeting".to_string(), format!("hello, {name}").into());
//!         Ok(out)
//!     })
//!     .add_end_node("end")
//!     .from("start")
//!     .to("greet")
//!     .to("end")
//!     .build()
//!     .expect("valid graph");
//!
//! let mut state = State::new(graph.id());
//! state.set("name", "ada");
//!
//! let result = GraphExecutor::new().execute(&graph, state).await;
//! assert_eq!(result.final_state.get_str("greeting"), Some("hello, ada"));
//! # }
//! ```

pub mod error;
pub mod executor;
pub mod graph;
pub mod llm;
pub mod message;
pub mod node;
pub mod state;
pub mod stream;
pub mod tools;
pub mod trace;

pub use error::ExecutionError;
pub use executor::{ExecutionResult, ExecutorOptions, GraphExecutor};
pub use graph::{BuildError, Edge, EdgeCondition, FnCondition, Graph, GraphBuilder, RunContext};
pub use llm::{
    Choice, GenerateRequest, GenerateResponse, MockProvider, ModelProvider, ProviderError,
    ToolCallRequest, Usage,
};
pub use message::Message;
pub use node::{
    DecisionNode, EndNode, ModelCallNode, Node, NodeError, NodeKind, NodeOutput, ParallelNode,
    StartNode, ToolNode, TransformNode,
};
pub use state::{
    HistoryEntry, InMemoryStateManager, JsonStateSerializer, RunStatus, SharedHistory, State,
    StateManager, StateStoreError,
};
pub use stream::{StreamEvent, StreamMode};
pub use tools::{MockTool, Tool, ToolError, ToolSpec};
pub use trace::{ExecutionTracer, LogTracer};
