//! Run state: keyed data, conversation history, audit trail.
//!
//! One `State` per graph run. Nodes never mutate it directly; the graph loop
//! applies each `NodeOutput` through [`State::apply`], the single merge point.
//! `Clone` gives the isolation parallel fan-out needs: `data`, `metadata` and
//! `messages` are deep-copied, the audit trail stays shared.

mod history;
mod manager;
mod serializer;

pub use history::{HistoryEntry, SharedHistory};
pub use manager::{InMemoryStateManager, StateManager, StateStoreError};
pub use serializer::{JsonStateSerializer, Serializer};

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::message::Message;
use crate::node::NodeOutput;

/// Lifecycle of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Created, not yet executing.
    Pending,
    /// Inside the graph loop.
    Running,
    /// Reached a terminal node (an `End` node or a declared exit point).
    Completed,
    /// A node failed, a limit was exceeded, or the run was cancelled.
    Failed,
    /// A non-terminal node had no resolvable next node. Not an error; the
    /// caller decides how to classify it.
    Halted,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Halted => "halted",
        };
        f.write_str(s)
    }
}

/// Mutable execution context threaded through one graph run.
///
/// **Interaction**: created by the caller (or `GraphExecutor`), mutated only
/// by the graph loop via [`State::apply`], persisted through a
/// [`StateManager`] at run end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    id: String,
    graph_id: String,
    status: RunStatus,
    current_node: Option<String>,
    data: HashMap<String, Value>,
    messages: Vec<Message>,
    history: SharedHistory,
    metadata: HashMap<String, Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl State {
    /// Creates a fresh pending state for a run of `graph_id`, with a generated id.
    pub fn new(graph_id: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), graph_id)
    }

    /// Creates a fresh pending state with a caller-chosen id.
    pub fn with_id(id: impl Into<String>, graph_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            graph_id: graph_id.into(),
            status: RunStatus::Pending,
            current_node: None,
            data: HashMap::new(),
            messages: Vec::new(),
            history: SharedHistory::new(),
            metadata: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn graph_id(&self) -> &str {
        &self.graph_id
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn set_status(&mut self, status: RunStatus) {
        self.status = status;
        self.touch();
    }

    /// Id of the last node whose output was merged, if any.
    pub fn current_node(&self) -> Option<&str> {
        self.current_node.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Sets one data key. Last writer wins.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
        self.touch();
    }

    /// Merges a batch of data keys. Last writer wins per key.
    pub fn set_multiple(&mut self, values: HashMap<String, Value>) {
        self.data.extend(values);
        self.touch();
    }

    /// Raw value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// String value for `key`; `None` on absence or type mismatch.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Integer value for `key`; `None` on absence or type mismatch.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.data.get(key).and_then(Value::as_i64)
    }

    /// Float value for `key`; `None` on absence or type mismatch.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.data.get(key).and_then(Value::as_f64)
    }

    /// Bool value for `key`; `None` on absence or type mismatch.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.data.get(key).and_then(Value::as_bool)
    }

    /// Full data map, for nodes that transform it wholesale.
    pub fn data(&self) -> &HashMap<String, Value> {
        &self.data
    }

    /// Appends one conversation turn.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.touch();
    }

    /// Conversation so far, in append order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Cross-cutting annotations (token usage, provider names, ...). Never
    /// used for control flow.
    pub fn metadata(&self) -> &HashMap<String, Value> {
        &self.metadata
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
        self.touch();
    }

    /// The shared audit trail of executed nodes.
    pub fn history(&self) -> &SharedHistory {
        &self.history
    }

    /// Records a node visit: appends to the trail and marks it current.
    pub fn record_visit(&mut self, node_id: &str) {
        self.history.record(node_id);
        self.current_node = Some(node_id.to_string());
        self.touch();
    }

    /// Merges one node's output: data and metadata last-writer-wins, messages
    /// appended, the node recorded as visited. The only mutation path the
    /// graph loop uses.
    pub fn apply(&mut self, output: NodeOutput, node_id: &str) {
        self.data.extend(output.data);
        self.messages.extend(output.messages);
        self.metadata.extend(output.metadata);
        self.record_visit(node_id);
    }

    /// Deep copy with a detached audit trail, suitable for persistence.
    /// Unlike `clone()`, later appends to this state's trail do not leak into
    /// the snapshot.
    pub fn detached_snapshot(&self) -> State {
        let mut copy = self.clone();
        copy.history = SharedHistory::from_entries(self.history.snapshot());
        copy
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
