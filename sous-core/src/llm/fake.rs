//! Fake LLM provider for testing.
//!
//! This provider returns deterministic responses based on prompt matching,
//! allowing tests to run without network access or API costs.

use super::{ChatMessage, Generation, LlmError, LlmProvider, Role};
use async_trait::async_trait;
use std::sync::{Mutex, RwLock};
use std::time::Duration;

/// A fake LLM provider for testing.
///
/// Responses are matched by checking if the non-system messages contain a registered
/// substring, in registration order. If no match is found, returns a default response
/// or error. Every conversation it receives is recorded.
#[derive(Debug)]
pub struct FakeProvider {
    /// Prompt substring -> response, checked in insertion order
    responses: RwLock<Vec<(String, String)>>,
    /// Default response if no match found
    default_response: Option<String>,
    /// Artificial delay before answering
    latency: Option<Duration>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            responses: RwLock::new(Vec::new()),
            default_response: Some("{}".to_string()),
            latency: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeProvider {
    /// Create a new FakeProvider with no registered responses.
    pub fn new() -> Self {
        Self {
            default_response: None,
            ..Self::default()
        }
    }

    /// Create a FakeProvider that returns a specific response for prompts containing a substring.
    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let provider = Self::new();
        provider.add_response(prompt_contains, response);
        provider
    }

    /// Add a response for prompts containing a specific substring.
    pub fn add_response(&self, prompt_contains: &str, response: &str) {
        self.responses
            .write()
            .unwrap()
            .push((prompt_contains.to_string(), response.to_string()));
    }

    /// Set the default response when no pattern matches.
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    /// Wait this long before every response.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Conversations received so far, oldest first.
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of generate calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<Generation, LlmError> {
        self.calls.lock().unwrap().push(messages.to_vec());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let prompt: String = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let prompt_lower = prompt.to_lowercase();

        // Find first matching pattern (case-insensitive)
        let responses = self.responses.read().unwrap();
        for (pattern, response) in responses.iter() {
            if prompt_lower.contains(&pattern.to_lowercase()) {
                return Ok(Generation::new(response.clone()));
            }
        }

        match &self.default_response {
            Some(response) => Ok(Generation::new(response.clone())),
            None => Err(LlmError::RequestFailed(format!(
                "FakeProvider: No response configured for prompt (first 100 chars): {}",
                prompt.chars().take(100).collect::<String>()
            ))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}
