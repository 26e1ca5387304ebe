//! Model provider boundary for `ModelCallNode`.
//!
//! The node depends only on this shape: messages in, choices plus usage out.
//! Retries and backoff for provider failures are the provider's concern.

mod mock;

pub use mock::MockProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::message::Message;
use crate::tools::ToolSpec;

/// Provider-side failure, surfaced through `NodeError::Model`.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The completion call failed (network, auth, rate limit, ...).
    #[error("model provider call failed: {0}")]
    Call(String),

    /// The provider answered with zero choices.
    #[error("model provider returned no choices")]
    EmptyResponse,
}

/// One completion request.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub messages: Vec<Message>,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Tools the model may request calls for. Advisory; the engine only
    /// forwards them.
    pub tools: Vec<ToolSpec>,
}

/// A tool invocation the model asked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// One completion candidate.
#[derive(Debug, Clone)]
pub struct Choice {
    pub message: Message,
    pub finish_reason: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

/// Token accounting for one completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// One completion response.
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

/// Model provider: messages in, completion out.
///
/// **Interaction**: held by `ModelCallNode` as `Arc<dyn ModelProvider>`;
/// `MockProvider` serves tests and examples.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name, recorded into run metadata.
    fn name(&self) -> &str;

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ProviderError>;
}
