//! Mock model provider: fixed assistant reply, optional tool calls and delay.

use std::time::Duration;

use async_trait::async_trait;

use super::{Choice, GenerateRequest, GenerateResponse, ModelProvider, ProviderError, ToolCallRequest, Usage};
use crate::message::Message;

/// Provider that answers every request with a configured assistant message.
///
/// The delay knob simulates slow completions for cancellation tests.
pub struct MockProvider {
    content: String,
    tool_calls: Vec<ToolCallRequest>,
    usage: Usage,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Creates a mock that always answers with `content`.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            usage: Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
            delay: None,
        }
    }

    /// Adds tool-call requests to every response.
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCallRequest>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    /// Sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(GenerateResponse {
            choices: vec![Choice {
                message: Message::Assistant(self.content.clone()),
                finish_reason: Some("stop".to_string()),
                tool_calls: self.tool_calls.clone(),
            }],
            usage: self.usage,
        })
    }
}
