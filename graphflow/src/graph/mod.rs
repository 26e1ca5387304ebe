//! Graph assembly and execution.
//!
//! `GraphBuilder` validates topology at build time and produces an immutable
//! [`Graph`]; `Graph::execute` runs the step-loop state machine against one
//! [`crate::state::State`]. Bounded runs go through
//! [`crate::executor::GraphExecutor`].

mod build_error;
mod builder;
mod edge;
#[allow(clippy::module_inception)]
mod graph;
mod run_context;

pub use build_error::BuildError;
pub use builder::{EdgeCursor, GraphBuilder};
pub use edge::{Edge, EdgeCondition, FnCondition};
pub use graph::Graph;
pub use run_context::RunContext;
