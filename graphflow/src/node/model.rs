//! Model-call node: render prompt, invoke provider, append the exchange.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{Node, NodeError, NodeKind, NodeMeta, NodeOutput};
use crate::graph::RunContext;
use crate::llm::{GenerateRequest, ModelProvider, ProviderError};
use crate::message::Message;
use crate::state::State;
use crate::tools::ToolSpec;

/// Renders `{{key}}` placeholders in `template` against the state data map.
/// String values render verbatim, everything else as compact JSON; unknown
/// keys render empty.
fn render_template(template: &str, state: &State) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("}}") {
            Some(close) => {
                let key = after[..close].trim();
                if let Some(value) = state.get(key) {
                    match value {
                        Value::String(s) => rendered.push_str(s),
                        other => rendered.push_str(&other.to_string()),
                    }
                }
                rest = &after[close + 2..];
            }
            None => {
                // Unterminated placeholder: keep the raw tail.
                rendered.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    rendered.push_str(rest);
    rendered
}

/// Calls a model provider with the conversation plus a rendered prompt.
///
/// The rendered prompt is appended as a `User` turn only when the last turn
/// is not already one, so a retried step does not duplicate it. The assistant
/// reply is appended and stored under the output key; tool-call requests the
/// model made are surfaced under `"{output_key}_tool_calls"`. Token usage and
/// provider identity land in metadata.
pub struct ModelCallNode {
    meta: NodeMeta,
    provider: Arc<dyn ModelProvider>,
    prompt_template: String,
    model: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    tools: Vec<ToolSpec>,
    output_key: String,
}

impl ModelCallNode {
    pub fn new(
        id: impl Into<String>,
        provider: Arc<dyn ModelProvider>,
        prompt_template: impl Into<String>,
    ) -> Self {
        Self {
            meta: NodeMeta::new(id),
            provider,
            prompt_template: prompt_template.into(),
            model: String::new(),
            max_tokens: None,
            temperature: None,
            tools: Vec::new(),
            output_key: "response".to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Tool specs forwarded to the provider so the model may request calls.
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    /// Key the assistant content is stored under. Defaults to `"response"`.
    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = key.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.meta = NodeMeta::new(self.meta.id()).with_description(description);
        self
    }
}

#[async_trait]
impl Node for ModelCallNode {
    fn id(&self) -> &str {
        self.meta.id()
    }

    fn kind(&self) -> NodeKind {
        NodeKind::ModelCall
    }

    fn description(&self) -> &str {
        self.meta.description()
    }

    async fn execute(&self, ctx: &RunContext, state: &State) -> Result<NodeOutput, NodeError> {
        let prompt = render_template(&self.prompt_template, state);

        let mut request_messages = state.messages().to_vec();
        let append_user = !request_messages.last().is_some_and(Message::is_user);
        if append_user {
            request_messages.push(Message::User(prompt.clone()));
        }

        let request = GenerateRequest {
            messages: request_messages,
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            tools: self.tools.clone(),
        };

        debug!(node_id = self.id(), provider = self.provider.name(), model = %self.model, "invoking model provider");
        let response = tokio::select! {
            _ = ctx.cancelled() => Err(NodeError::Cancelled),
            result = self.provider.generate(request) => result.map_err(NodeError::Model),
        }?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(NodeError::Model(ProviderError::EmptyResponse))?;
        let content = choice.message.content().to_string();

        let mut output = NodeOutput::new();
        if append_user {
            output.messages.push(Message::User(prompt));
        }
        output.messages.push(Message::Assistant(content.clone()));
        output.data.insert(self.output_key.clone(), json!(content));
        if !choice.tool_calls.is_empty() {
            output.data.insert(
                format!("{}_tool_calls", self.output_key),
                json!(choice.tool_calls),
            );
        }

        output
            .metadata
            .insert("provider".to_string(), json!(self.provider.name()));
        if !self.model.is_empty() {
            output.metadata.insert("model".to_string(), json!(self.model));
        }
        if let Some(reason) = choice.finish_reason {
            output.metadata.insert("finish_reason".to_string(), json!(reason));
        }
        output.metadata.insert(
            "usage".to_string(),
            json!({
                "prompt_tokens": response.usage.prompt_tokens,
                "completion_tokens": response.usage.completion_tokens,
                "total_tokens": response.usage.total_tokens,
            }),
        );

        Ok(output)
    }
}
