//! Claude (Anthropic) LLM provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http::send_json;
use super::{ChatMessage, Generation, LlmError, LlmProvider, Role};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Claude API provider.
#[derive(Debug)]
pub struct ClaudeProvider {
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: Option<f32>,
    client: reqwest::Client,
}

impl ClaudeProvider {
    /// Create a new ClaudeProvider with the given API key and model.
    pub fn new(api_key: String, model: String, max_tokens: u32, temperature: Option<f32>) -> Self {
        Self {
            api_key,
            model,
            max_tokens,
            temperature,
            client: reqwest::Client::new(),
        }
    }

    /// Split a conversation into Claude's top-level system prompt and turn list.
    fn build_request(&self, messages: &[ChatMessage]) -> ClaudeRequest {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        ClaudeRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: if system.is_empty() {
                None
            } else {
                Some(system.join("\n\n"))
            },
            messages: messages
                .iter()
                .filter(|m| m.role != Role::System)
                .map(|m| ClaudeMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
        }
    }
}

/// Claude API request format.
#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ClaudeMessage>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

/// Claude API response format.
#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<Generation, LlmError> {
        let request = self.build_request(messages);

        let response: ClaudeResponse = send_json(
            self.client
                .post(MESSAGES_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", API_VERSION)
                .json(&request),
        )
        .await?;

        // Claude may split output across several text blocks
        let text: String = response
            .content
            .into_iter()
            .filter(|c| c.content_type == "text")
            .filter_map(|c| c.text)
            .collect();

        Ok(Generation::new(text))
    }

    fn provider_name(&self) -> &'static str {
        "claude"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_messages_move_to_top_level() {
        let provider = ClaudeProvider::new(
            "key".to_string(),
            "claude-sonnet-4-20250514".to_string(),
            1024,
            None,
        );
        let request = provider.build_request(&[
            ChatMessage::system("你是一名专业主厨"),
            ChatMessage::user("生成菜谱"),
        ]);

        assert_eq!(request.system.as_deref(), Some("你是一名专业主厨"));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
        assert_eq!(request.max_tokens, 1024);

        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_no_system_field_without_system_messages() {
        let provider = ClaudeProvider::new("key".to_string(), "m".to_string(), 64, Some(0.2));
        let request = provider.build_request(&[ChatMessage::user("hi")]);
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("system").is_none());
        assert!(body.get("temperature").is_some());
    }
}
