//! Workflow step trait and the generation call the steps share.

use std::time::Duration;

use async_trait::async_trait;

use crate::agents::AgentRegistry;
use crate::error::WorkflowError;
use crate::llm::ChatMessage;

/// Metadata about a workflow step.
#[derive(Debug, Clone)]
pub struct StepMetadata {
    /// Unique identifier for this step (e.g., "analyze-ingredients")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
}

/// One generation stage: typed input in, validated typed output out.
#[async_trait]
pub trait WorkflowStep: Send + Sync {
    type Input: Send + Sync;
    type Output: Send;

    /// Return metadata about this step.
    fn metadata(&self) -> StepMetadata;

    /// Name of the agent this step generates with.
    fn agent_name(&self) -> &str;

    /// Execute the step. `None` fails with `MissingInput` before any generation.
    async fn execute(&self, input: Option<&Self::Input>) -> Result<Self::Output, WorkflowError>;
}

/// Send `prompt` to the named agent as a single user message and return the trimmed reply.
pub(crate) async fn generate_text(
    registry: &AgentRegistry,
    agent_name: &str,
    prompt: String,
    timeout: Duration,
) -> Result<String, WorkflowError> {
    let agent = registry
        .resolve(agent_name)
        .ok_or_else(|| WorkflowError::Lookup(agent_name.to_string()))?;

    let messages = [ChatMessage::user(prompt)];
    let generation = tokio::time::timeout(timeout, agent.generate(&messages))
        .await
        .map_err(|_| WorkflowError::GenerationTimeout {
            agent: agent_name.to_string(),
            timeout,
        })?
        .map_err(|source| WorkflowError::Generation {
            agent: agent_name.to_string(),
            source,
        })?;

    let text = generation.text.trim();
    if text.is_empty() {
        return Err(WorkflowError::EmptyGeneration {
            agent: agent_name.to_string(),
        });
    }

    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Agent;
    use crate::llm::FakeProvider;

    fn registry_with(provider: FakeProvider) -> AgentRegistry {
        let mut registry = AgentRegistry::new();
        registry.register(Agent::new("chef", "Chef", "", Box::new(provider)));
        registry
    }

    #[tokio::test]
    async fn test_returns_trimmed_text() {
        let registry = registry_with(FakeProvider::default().with_default_response("  {\"a\":1}\n"));
        let text = generate_text(&registry, "chef", "做菜".to_string(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(text, r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_unknown_agent() {
        let registry = registry_with(FakeProvider::default());
        let err = generate_text(&registry, "sous-chef", String::new(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Lookup(name) if name == "sous-chef"));
    }

    #[tokio::test]
    async fn test_whitespace_reply_is_empty_generation() {
        let registry = registry_with(FakeProvider::default().with_default_response(" \n\t "));
        let err = generate_text(&registry, "chef", "做菜".to_string(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::EmptyGeneration { agent } if agent == "chef"));
    }

    #[tokio::test]
    async fn test_slow_agent_times_out() {
        let registry =
            registry_with(FakeProvider::default().with_latency(Duration::from_millis(500)));
        let err = generate_text(&registry, "chef", "做菜".to_string(), Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::GenerationTimeout { timeout, .. } if timeout == Duration::from_millis(20)
        ));
    }

    #[tokio::test]
    async fn test_provider_failure_keeps_source() {
        let registry = registry_with(FakeProvider::new());
        let err = generate_text(&registry, "chef", "做菜".to_string(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Generation { ref agent, .. } if agent == "chef"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
