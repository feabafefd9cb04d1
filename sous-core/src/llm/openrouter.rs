//! OpenRouter provider (OpenAI-compatible chat completions API).

use super::http::send_json;
use super::{ChatMessage, Generation, LlmError, LlmProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Provider for any OpenAI-compatible chat completions endpoint, OpenRouter by default.
#[derive(Debug)]
pub struct OpenRouterProvider {
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: Option<f32>,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        max_tokens: u32,
        temperature: Option<f32>,
    ) -> Self {
        Self {
            api_key,
            base_url,
            model,
            max_tokens,
            temperature,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<Generation, LlmError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let parsed: ChatCompletionResponse = send_json(
            self.client
                .post(self.endpoint())
                .bearer_auth(&self.api_key)
                .json(&request),
        )
        .await?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::ParseError("No choices in response".to_string()))?
            .message
            .content
            .unwrap_or_default();

        Ok(Generation::new(text))
    }

    fn provider_name(&self) -> &'static str {
        "openrouter"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
