//! Directed connections between nodes, optionally gated by a predicate.

use std::fmt;
use std::sync::Arc;

use crate::state::State;

/// Predicate over run state gating an edge or a decision route.
///
/// Conditions are pure reads: they must not depend on evaluation order side
/// effects, because a decision table short-circuits on the first match.
pub trait EdgeCondition: Send + Sync {
    fn evaluate(&self, state: &State) -> bool;

    /// Human-readable label used in traces and `Debug` output.
    fn describe(&self) -> &str {
        "condition"
    }
}

/// Closure-backed condition.
pub struct FnCondition<F>
where
    F: Fn(&State) -> bool + Send + Sync,
{
    predicate: F,
    description: String,
}

impl<F> FnCondition<F>
where
    F: Fn(&State) -> bool + Send + Sync,
{
    pub fn new(predicate: F) -> Self {
        Self {
            predicate,
            description: "fn condition".to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl<F> EdgeCondition for FnCondition<F>
where
    F: Fn(&State) -> bool + Send + Sync,
{
    fn evaluate(&self, state: &State) -> bool {
        (self.predicate)(state)
    }

    fn describe(&self) -> &str {
        &self.description
    }
}

/// Directed edge. At most one unconditional edge may leave a node that is not
/// a decision node; the builder enforces this.
#[derive(Clone)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub condition: Option<Arc<dyn EdgeCondition>>,
    pub description: String,
}

impl Edge {
    /// Unconditional edge.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            condition: None,
            description: String::new(),
        }
    }

    /// Edge taken only when `condition` evaluates true.
    pub fn conditional(
        from: impl Into<String>,
        to: impl Into<String>,
        condition: Arc<dyn EdgeCondition>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            condition: Some(condition),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Edge");
        s.field("from", &self.from).field("to", &self.to);
        if let Some(condition) = &self.condition {
            s.field("condition", &condition.describe());
        }
        s.finish()
    }
}
