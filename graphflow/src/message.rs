//! Conversation turns carried by graph state.
//!
//! One enum variant per role; model-call nodes append `User` and `Assistant`
//! turns, tool adapters may append `Tool` turns. Serializable so state
//! round-trips through a `StateManager` backend.

use serde::{Deserialize, Serialize};

/// One conversation turn: role + content.
///
/// **Interaction**: `State.messages` is an append-only `Vec<Message>`;
/// `ModelCallNode` reads the whole sequence as rolling context and appends
/// new turns via `NodeOutput.messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Message {
    /// System instruction, usually the first turn.
    System(String),
    /// User turn; model-call nodes append the rendered prompt as one of these.
    User(String),
    /// Assistant turn produced by a model provider.
    Assistant(String),
    /// Tool result surfaced back into the conversation.
    Tool(String),
}

impl Message {
    /// Role name as the wire-level string providers expect.
    pub fn role(&self) -> &'static str {
        match self {
            Message::System(_) => "system",
            Message::User(_) => "user",
            Message::Assistant(_) => "assistant",
            Message::Tool(_) => "tool",
        }
    }

    /// Text content of the turn, regardless of role.
    pub fn content(&self) -> &str {
        match self {
            Message::System(s) | Message::User(s) | Message::Assistant(s) | Message::Tool(s) => s,
        }
    }

    /// True when this is a `User` turn. Model-call nodes use this to avoid
    /// appending a duplicate user turn on retry.
    pub fn is_user(&self) -> bool {
        matches!(self, Message::User(_))
    }
}
