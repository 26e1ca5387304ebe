//! Fluent construction DSL producing a validated [`Graph`].
//!
//! Register nodes with the typed `add_*` helpers (or `add_node` for custom
//! implementations), wire them with `add_edge` / `from(..).to(..)` chains,
//! then `build()`. All topology problems surface at build time as
//! [`BuildError`]; a built graph never fails validation at runtime.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use super::build_error::BuildError;
use super::edge::{Edge, EdgeCondition};
use super::graph::Graph;
use crate::llm::ModelProvider;
use crate::node::{
    DecisionNode, EndNode, ModelCallNode, Node, NodeError, NodeKind, ParallelNode, StartNode,
    ToolNode, TransformNode,
};
use crate::state::{InMemoryStateManager, StateManager};
use crate::tools::Tool;

/// Builder for [`Graph`]. Construction problems are recorded as they happen
/// and reported by [`GraphBuilder::build`], so call chains stay fluent.
pub struct GraphBuilder {
    id: String,
    name: String,
    nodes: HashMap<String, Arc<dyn Node>>,
    edges: Vec<Edge>,
    entry_point: Option<String>,
    exit_points: HashSet<String>,
    state_manager: Option<Arc<dyn StateManager>>,
    errors: Vec<BuildError>,
}

impl GraphBuilder {
    /// Creates a builder for a graph named `name`, with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            nodes: HashMap::new(),
            edges: Vec::new(),
            entry_point: None,
            exit_points: HashSet::new(),
            state_manager: None,
            errors: Vec::new(),
        }
    }

    /// Overrides the generated graph id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Registers any node implementation. Duplicate ids are a build error.
    pub fn add_node(mut self, node: Arc<dyn Node>) -> Self {
        let id = node.id().to_string();
        if self.nodes.insert(id.clone(), node).is_some() {
            self.errors.push(BuildError::DuplicateNode(id));
        }
        self
    }

    /// Adds the graph's start node. Becomes the entry point unless one was
    /// already set explicitly.
    pub fn add_start_node(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if self.entry_point.is_none() {
            self.entry_point = Some(id.clone());
        }
        self.add_node(Arc::new(StartNode::new(id)))
    }

    /// Adds a terminal marker node.
    pub fn add_end_node(self, id: impl Into<String>) -> Self {
        self.add_node(Arc::new(EndNode::new(id)))
    }

    /// Adds a pure data transform.
    pub fn add_transform_node<F>(self, id: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&HashMap<String, Value>) -> Result<HashMap<String, Value>, NodeError>
            + Send
            + Sync
            + 'static,
    {
        self.add_node(Arc::new(TransformNode::new(id, transform)))
    }

    /// Adds a tool adapter node reading `input_keys` and writing `output_key`.
    pub fn add_tool_node<I, S>(
        self,
        id: impl Into<String>,
        tool: Arc<dyn Tool>,
        input_keys: I,
        output_key: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_node(Arc::new(
            ToolNode::new(id, tool)
                .with_input_keys(input_keys)
                .with_output_key(output_key),
        ))
    }

    /// Adds a model-call node with the given prompt template. Use
    /// [`GraphBuilder::add_node`] with a configured [`ModelCallNode`] for
    /// model/tokens/tools settings beyond the defaults.
    pub fn add_llm_node(
        self,
        id: impl Into<String>,
        provider: Arc<dyn ModelProvider>,
        prompt_template: impl Into<String>,
        output_key: impl Into<String>,
    ) -> Self {
        self.add_node(Arc::new(
            ModelCallNode::new(id, provider, prompt_template).with_output_key(output_key),
        ))
    }

    /// Adds a decision node; build its routing table with
    /// [`DecisionNode::when`] / [`DecisionNode::otherwise`] first.
    pub fn add_decision_node(self, node: DecisionNode) -> Self {
        self.add_node(Arc::new(node))
    }

    /// Adds a parallel fan-out node over `branches`.
    pub fn add_parallel_node(
        self,
        id: impl Into<String>,
        branches: Vec<Arc<dyn Node>>,
        max_concurrency: usize,
    ) -> Self {
        self.add_node(Arc::new(
            ParallelNode::new(id, branches).with_max_concurrency(max_concurrency),
        ))
    }

    /// Adds an unconditional edge.
    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edges.push(Edge::new(from, to));
        self
    }

    /// Adds an edge gated by `condition`, evaluated before the unconditional
    /// fallback in insertion order.
    pub fn add_conditional_edge(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        condition: Arc<dyn EdgeCondition>,
    ) -> Self {
        self.edges.push(Edge::conditional(from, to, condition));
        self
    }

    /// Starts an edge chain at `id`: `from("a").to("b").to("c")` wires
    /// `a -> b -> c` left-to-right, mirroring execution order.
    pub fn from(self, id: impl Into<String>) -> EdgeCursor {
        EdgeCursor {
            builder: self,
            current: id.into(),
        }
    }

    pub fn set_entry_point(mut self, id: impl Into<String>) -> Self {
        self.entry_point = Some(id.into());
        self
    }

    /// Declares `id` as a terminal node in addition to any `End` nodes.
    pub fn add_exit_point(mut self, id: impl Into<String>) -> Self {
        self.exit_points.insert(id.into());
        self
    }

    /// Uses `manager` instead of a fresh in-memory store.
    pub fn with_state_manager(mut self, manager: Arc<dyn StateManager>) -> Self {
        self.state_manager = Some(manager);
        self
    }

    /// Validates the topology and produces the immutable graph.
    ///
    /// Checks: no recorded construction errors, entry point set and
    /// registered, every edge endpoint and exit point registered, at most one
    /// start node, and at most one unconditional outgoing edge per
    /// non-decision node.
    pub fn build(mut self) -> Result<Graph, BuildError> {
        if !self.errors.is_empty() {
            return Err(self.errors.remove(0));
        }

        let entry_point = self.entry_point.ok_or(BuildError::MissingEntryPoint)?;
        if !self.nodes.contains_key(&entry_point) {
            return Err(BuildError::NodeNotFound(entry_point));
        }

        for edge in &self.edges {
            if !self.nodes.contains_key(&edge.from) {
                return Err(BuildError::NodeNotFound(edge.from.clone()));
            }
            if !self.nodes.contains_key(&edge.to) {
                return Err(BuildError::NodeNotFound(edge.to.clone()));
            }
        }
        for exit in &self.exit_points {
            if !self.nodes.contains_key(exit) {
                return Err(BuildError::NodeNotFound(exit.clone()));
            }
        }

        let start_count = self
            .nodes
            .values()
            .filter(|node| node.kind() == NodeKind::Start)
            .count();
        if start_count > 1 {
            return Err(BuildError::MultipleStartNodes(start_count));
        }

        let mut adjacency: HashMap<String, Vec<Edge>> = HashMap::new();
        for edge in self.edges {
            adjacency.entry(edge.from.clone()).or_default().push(edge);
        }
        for (from, edges) in &adjacency {
            let unconditional = edges.iter().filter(|edge| !edge.is_conditional()).count();
            if unconditional > 1 {
                return Err(BuildError::AmbiguousEdges(from.clone()));
            }
        }

        Ok(Graph {
            id: self.id,
            name: self.name,
            nodes: self.nodes,
            edges: adjacency,
            entry_point,
            exit_points: self.exit_points,
            state_manager: self
                .state_manager
                .unwrap_or_else(|| Arc::new(InMemoryStateManager::new())),
        })
    }
}

/// Cursor returned by [`GraphBuilder::from`]; each [`EdgeCursor::to`] call
/// appends an unconditional edge and moves the cursor forward.
pub struct EdgeCursor {
    builder: GraphBuilder,
    current: String,
}

impl EdgeCursor {
    /// Connects the cursor's node to `id` and advances the cursor there.
    pub fn to(mut self, id: impl Into<String>) -> EdgeCursor {
        let id = id.into();
        self.builder.edges.push(Edge::new(self.current, id.clone()));
        self.current = id;
        self
    }

    /// Starts a new chain from another node.
    pub fn from(self, id: impl Into<String>) -> EdgeCursor {
        self.builder.from(id)
    }

    /// Returns to plain builder calls.
    pub fn done(self) -> GraphBuilder {
        self.builder
    }

    /// Finishes the graph; shorthand for `.done().build()`.
    pub fn build(self) -> Result<Graph, BuildError> {
        self.builder.build()
    }
}
