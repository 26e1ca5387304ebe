//! Mock tool for tests and examples: fixed result, optional delay or failure.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{Tool, ToolError};

/// Tool that returns a configured result map.
///
/// The optional delay makes it usable in cancellation and concurrency tests;
/// `failing` turns every call into an execution error.
pub struct MockTool {
    name: String,
    description: String,
    result: HashMap<String, Value>,
    delay: Option<Duration>,
    failure: Option<String>,
}

impl MockTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            result: HashMap::new(),
            delay: None,
            failure: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets one key of the fixed result map.
    pub fn with_result(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.result.insert(key.into(), value.into());
        self
    }

    /// Sleeps this long before returning, to simulate slow I/O.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes every call fail with this message.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }
}

#[async_trait]
impl Tool for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(
        &self,
        _input: HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>, ToolError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(ToolError::Execution(message.clone()));
        }
        Ok(self.result.clone())
    }
}
