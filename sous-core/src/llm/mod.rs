//! LLM provider abstraction for the workflow's generation calls.
//!
//! This module provides a trait-based abstraction over different LLM providers
//! (Claude, OpenRouter) with support for caching and testing.

mod caching;
mod claude;
mod fake;
mod http;
mod openrouter;
mod types;

pub use caching::{CacheStats, CachingProvider};
pub use claude::ClaudeProvider;
pub use fake::FakeProvider;
pub use openrouter::OpenRouterProvider;
pub use types::{ChatMessage, Generation, Role};

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{AiConfig, ProviderKind};

/// Error type for LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Cache error: {0}")]
    CacheError(String),
}

/// Trait for LLM providers.
///
/// Implementations should be stateless and thread-safe. The provider is responsible
/// for making API calls and returning the model's text response.
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    /// Send an ordered conversation to the LLM and get its text response.
    async fn generate(&self, messages: &[ChatMessage]) -> Result<Generation, LlmError>;

    /// Get the provider name (e.g., "claude", "openrouter", "fake").
    fn provider_name(&self) -> &'static str;

    /// Get the model name (e.g., "openai/gpt-4.1-mini").
    fn model_name(&self) -> &str;
}

/// Shared providers, so a caller can keep a handle on a provider it hands to an agent.
#[async_trait]
impl<P: LlmProvider + ?Sized> LlmProvider for Arc<P> {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<Generation, LlmError> {
        (**self).generate(messages).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Build a provider for `model` according to the configured provider kind.
///
/// When `config.cache_dir` is set the provider is wrapped in a [`CachingProvider`].
pub fn create_provider(config: &AiConfig, model: &str) -> Result<Box<dyn LlmProvider>, LlmError> {
    let inner: Box<dyn LlmProvider> = match config.provider {
        ProviderKind::Fake => Box::new(FakeProvider::default()),
        ProviderKind::Claude => Box::new(ClaudeProvider::new(
            require_api_key(config, "ANTHROPIC_API_KEY")?,
            model.to_string(),
            config.max_tokens,
            config.temperature,
        )),
        ProviderKind::OpenRouter => Box::new(OpenRouterProvider::new(
            require_api_key(config, "OPENROUTER_API_KEY")?,
            config.base_url.clone(),
            model.to_string(),
            config.max_tokens,
            config.temperature,
        )),
    };

    match &config.cache_dir {
        Some(dir) => Ok(Box::new(CachingProvider::new(inner, dir.clone()))),
        None => Ok(inner),
    }
}

fn require_api_key(config: &AiConfig, var: &str) -> Result<String, LlmError> {
    config
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| LlmError::NotConfigured(format!("{} not set", var)))
}
