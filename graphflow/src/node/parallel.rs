//! Parallel node: bounded fan-out over isolated state clones, full fan-in.

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::{panic_message, Node, NodeError, NodeKind, NodeMeta, NodeOutput};
use crate::graph::RunContext;
use crate::state::State;

/// Concurrency bound used when none is configured.
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// Executes its branches concurrently against independent clones of the
/// current state and merges the outputs back in launch order.
///
/// Guarantees:
/// - at most `max_concurrency` branches run at once;
/// - the fan-in barrier waits for every dispatched branch, success or not;
/// - any branch error fails the node with the first error seen in completion
///   order, discarding sibling results (no partial commit);
/// - on success, each branch's data is namespaced under `"{index}_{id}"` and
///   an aggregate `results` array holds branch outputs in launch order.
///
/// Branch `next_node` overrides are ignored: branches cannot redirect the
/// parent run's control flow.
pub struct ParallelNode {
    meta: NodeMeta,
    branches: Vec<Arc<dyn Node>>,
    max_concurrency: usize,
}

impl ParallelNode {
    pub fn new(id: impl Into<String>, branches: Vec<Arc<dyn Node>>) -> Self {
        Self {
            meta: NodeMeta::new(id),
            branches,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Bounds concurrent branches; zero falls back to the default.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = if max_concurrency == 0 {
            DEFAULT_MAX_CONCURRENCY
        } else {
            max_concurrency
        };
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.meta = NodeMeta::new(self.meta.id()).with_description(description);
        self
    }

    pub fn add_branch(mut self, branch: Arc<dyn Node>) -> Self {
        self.branches.push(branch);
        self
    }

    pub fn branches(&self) -> &[Arc<dyn Node>] {
        &self.branches
    }
}

#[async_trait]
impl Node for ParallelNode {
    fn id(&self) -> &str {
        self.meta.id()
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Parallel
    }

    fn description(&self) -> &str {
        self.meta.description()
    }

    async fn execute(&self, ctx: &RunContext, state: &State) -> Result<NodeOutput, NodeError> {
        if self.branches.is_empty() {
            return Ok(NodeOutput::new());
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks: JoinSet<(usize, Result<NodeOutput, NodeError>)> = JoinSet::new();

        for (index, branch) in self.branches.iter().enumerate() {
            // Launch-order bookkeeping: the shared trail records dispatch
            // order, not completion order.
            state.history().record(branch.id());

            let branch = branch.clone();
            let branch_state = state.clone();
            let branch_ctx = ctx.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let permit = tokio::select! {
                    _ = branch_ctx.cancelled() => return (index, Err(NodeError::Cancelled)),
                    permit = semaphore.acquire_owned() => permit,
                };
                let _permit = match permit {
                    Ok(permit) => permit,
                    Err(_) => return (index, Err(NodeError::Cancelled)),
                };
                let result = std::panic::AssertUnwindSafe(branch.execute(&branch_ctx, &branch_state))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| Err(NodeError::Panicked(panic_message(panic))));
                (index, result)
            });
        }

        // Full fan-in barrier: drain every branch before deciding the outcome,
        // even after a failure.
        let mut slots: Vec<Option<NodeOutput>> = self.branches.iter().map(|_| None).collect();
        let mut first_error: Option<NodeError> = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(output))) => slots[index] = Some(output),
                Ok((index, Err(error))) => {
                    warn!(node_id = self.id(), branch = self.branches[index].id(), %error, "parallel branch failed");
                    if first_error.is_none() {
                        first_error = Some(NodeError::Branch {
                            branch_id: self.branches[index].id().to_string(),
                            source: Box::new(error),
                        });
                    }
                }
                Err(join_error) => {
                    if first_error.is_none() {
                        first_error = Some(NodeError::Panicked(join_error.to_string()));
                    }
                }
            }
        }

        if let Some(error) = first_error {
            return Err(error);
        }

        debug!(node_id = self.id(), branches = self.branches.len(), "parallel fan-in complete");
        let mut merged = NodeOutput::new();
        let mut results = Vec::with_capacity(self.branches.len());
        for (index, slot) in slots.into_iter().enumerate() {
            let output = match slot {
                Some(output) => output,
                None => {
                    return Err(NodeError::Panicked(format!(
                        "branch {index} finished without a result"
                    )))
                }
            };
            let branch_data: serde_json::Map<String, Value> =
                output.data.into_iter().collect();
            merged.data.insert(
                format!("{}_{}", index, self.branches[index].id()),
                Value::Object(branch_data.clone()),
            );
            results.push(Value::Object(branch_data));
            merged.messages.extend(output.messages);
            merged.metadata.extend(output.metadata);
        }
        merged.data.insert("results".to_string(), Value::Array(results));
        Ok(merged)
    }
}
