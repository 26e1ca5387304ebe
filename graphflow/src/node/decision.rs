//! Decision node: ordered condition table routing to the next node.

use std::sync::Arc;

use async_trait::async_trait;

use super::{Node, NodeError, NodeKind, NodeMeta, NodeOutput};
use crate::graph::{EdgeCondition, FnCondition, RunContext};
use crate::state::State;

/// Value written under `data["decision"]` when no route matches and no
/// default is set. The graph loop then halts the run without error.
pub const NO_CONDITION_MET: &str = "no_condition_met";

/// One routing entry: target node plus gating condition.
pub struct Route {
    pub target: String,
    pub condition: Arc<dyn EdgeCondition>,
}

/// Routes to the first entry whose condition holds.
///
/// The table is evaluated in insertion order and short-circuits on the first
/// match, so routing stays deterministic for a fixed state regardless of how
/// many later conditions would also hold. Falls back to the default target;
/// with neither, the run halts.
pub struct DecisionNode {
    meta: NodeMeta,
    routes: Vec<Route>,
    default_target: Option<String>,
}

impl DecisionNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            meta: NodeMeta::new(id),
            routes: Vec::new(),
            default_target: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.meta = NodeMeta::new(self.meta.id()).with_description(description);
        self
    }

    /// Appends a route. Order of `when` calls is evaluation order.
    pub fn when<C>(mut self, condition: C, target: impl Into<String>) -> Self
    where
        C: EdgeCondition + 'static,
    {
        self.routes.push(Route {
            target: target.into(),
            condition: Arc::new(condition),
        });
        self
    }

    /// Appends a closure-backed route.
    pub fn when_fn<F>(self, predicate: F, target: impl Into<String>) -> Self
    where
        F: Fn(&State) -> bool + Send + Sync + 'static,
    {
        self.when(FnCondition::new(predicate), target)
    }

    /// Target used when no condition matches.
    pub fn otherwise(mut self, target: impl Into<String>) -> Self {
        self.default_target = Some(target.into());
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn default_target(&self) -> Option<&str> {
        self.default_target.as_deref()
    }
}

#[async_trait]
impl Node for DecisionNode {
    fn id(&self) -> &str {
        self.meta.id()
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Decision
    }

    fn description(&self) -> &str {
        self.meta.description()
    }

    async fn execute(&self, _ctx: &RunContext, state: &State) -> Result<NodeOutput, NodeError> {
        for route in &self.routes {
            if route.condition.evaluate(state) {
                return Ok(NodeOutput::new().with_next(route.target.clone()));
            }
        }
        if let Some(default) = &self.default_target {
            return Ok(NodeOutput::new().with_next(default.clone()));
        }
        Ok(NodeOutput::new().with_data("decision", NO_CONDITION_MET))
    }
}
