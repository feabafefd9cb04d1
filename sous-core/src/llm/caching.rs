//! Disk cache in front of any LLM provider.
//!
//! Entries live at `<cache_dir>/<provider>/<model>/<conversation hash>.json`, so
//! re-running a workflow with the same request and models replays the stored
//! generations instead of paying for new ones.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{ChatMessage, Generation, LlmError, LlmProvider};

/// One stored generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    provider: String,
    model: String,
    conversation_hash: String,
    /// Number of messages in the conversation, for eyeballing cache files
    turns: usize,
    stored_at: DateTime<Utc>,
    generation: Generation,
}

impl CacheEntry {
    fn load(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn store(&self, path: &Path) -> Result<(), LlmError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| LlmError::CacheError(e.to_string()))?;
        }
        let content =
            serde_json::to_string_pretty(self).map_err(|e| LlmError::CacheError(e.to_string()))?;
        fs::write(path, content).map_err(|e| LlmError::CacheError(e.to_string()))
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub cached_responses: usize,
}

/// Replays stored generations for conversations it has already seen.
///
/// The key covers every message, system persona included, so changing an
/// agent's instructions never returns a stale answer.
#[derive(Debug)]
pub struct CachingProvider {
    inner: Box<dyn LlmProvider>,
    cache_dir: PathBuf,
}

impl CachingProvider {
    pub fn new(inner: Box<dyn LlmProvider>, cache_dir: PathBuf) -> Self {
        Self { inner, cache_dir }
    }

    /// First 16 bytes of the SHA-256 of the serialized conversation, hex encoded.
    fn conversation_hash(messages: &[ChatMessage]) -> String {
        let serialized = serde_json::to_vec(messages).unwrap_or_default();
        let digest = Sha256::digest(&serialized);
        hex::encode(&digest[..16])
    }

    fn model_dir(&self) -> PathBuf {
        let model = self.inner.model_name().replace(['/', ':'], "_");
        self.cache_dir.join(self.inner.provider_name()).join(model)
    }

    fn entry_path(&self, hash: &str) -> PathBuf {
        self.model_dir().join(format!("{}.json", hash))
    }

    /// Count the entries stored for this provider and model.
    pub fn cache_stats(&self) -> CacheStats {
        let cached_responses = fs::read_dir(self.model_dir())
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
                    .count()
            })
            .unwrap_or(0);

        CacheStats { cached_responses }
    }
}

#[async_trait]
impl LlmProvider for CachingProvider {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<Generation, LlmError> {
        let hash = Self::conversation_hash(messages);
        let path = self.entry_path(&hash);

        if let Some(entry) = CacheEntry::load(&path) {
            tracing::debug!(
                provider = self.inner.provider_name(),
                model = self.inner.model_name(),
                hash = %hash,
                "LLM cache hit"
            );
            return Ok(entry.generation);
        }

        tracing::debug!(
            provider = self.inner.provider_name(),
            model = self.inner.model_name(),
            hash = %hash,
            "LLM cache miss"
        );
        let generation = self.inner.generate(messages).await?;

        // A blank reply fails the workflow; storing it would fail every replay too
        if generation.text.trim().is_empty() {
            return Ok(generation);
        }

        let entry = CacheEntry {
            provider: self.inner.provider_name().to_string(),
            model: self.inner.model_name().to_string(),
            conversation_hash: hash,
            turns: messages.len(),
            stored_at: Utc::now(),
            generation,
        };
        if let Err(e) = entry.store(&path) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to cache LLM response");
        }

        Ok(entry.generation)
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FakeProvider;
    use tempfile::TempDir;

    fn caching(fake: FakeProvider, dir: &TempDir) -> CachingProvider {
        CachingProvider::new(Box::new(fake), dir.path().to_path_buf())
    }

    #[tokio::test]
    async fn test_second_call_replays_entry() {
        let temp_dir = TempDir::new().unwrap();
        let messages = [ChatMessage::user("分析食材")];

        let first = caching(FakeProvider::with_response("食材", "{\"servings\": 2}"), &temp_dir);
        assert_eq!(first.generate(&messages).await.unwrap().text, "{\"servings\": 2}");
        assert_eq!(first.cache_stats().cached_responses, 1);

        // No responses configured: this would fail if the inner provider were called
        let second = caching(FakeProvider::new(), &temp_dir);
        assert_eq!(second.generate(&messages).await.unwrap().text, "{\"servings\": 2}");
    }

    #[tokio::test]
    async fn test_system_prompt_is_part_of_key() {
        let temp_dir = TempDir::new().unwrap();
        let provider = caching(FakeProvider::with_response("hello", "world"), &temp_dir);

        provider
            .generate(&[ChatMessage::system("a"), ChatMessage::user("hello")])
            .await
            .unwrap();
        provider
            .generate(&[ChatMessage::system("b"), ChatMessage::user("hello")])
            .await
            .unwrap();

        assert_eq!(provider.cache_stats().cached_responses, 2);
    }

    #[tokio::test]
    async fn test_blank_responses_are_not_cached() {
        let temp_dir = TempDir::new().unwrap();
        let provider = caching(FakeProvider::with_response("hello", "   "), &temp_dir);

        provider.generate(&[ChatMessage::user("hello")]).await.unwrap();
        assert_eq!(provider.cache_stats().cached_responses, 0);
    }

    #[tokio::test]
    async fn test_entry_layout_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let provider = caching(FakeProvider::with_response("hello", "world"), &temp_dir);
        let messages = [ChatMessage::user("hello")];

        provider.generate(&messages).await.unwrap();

        let hash = CachingProvider::conversation_hash(&messages);
        assert_eq!(hash.len(), 32);
        let path = temp_dir
            .path()
            .join("fake")
            .join("fake-model")
            .join(format!("{}.json", hash));
        let entry = CacheEntry::load(&path).unwrap();
        assert_eq!(entry.turns, 1);
        assert_eq!(entry.generation.text, "world");
    }
}
