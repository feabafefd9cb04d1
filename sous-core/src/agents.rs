//! Named agents and the registry the workflow resolves them from.
//!
//! An agent is a persona (system instructions) bound to one LLM provider and model.
//! Stages look agents up by name, so which model serves which stage is purely a
//! matter of configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::AiConfig;
use crate::llm::{create_provider, ChatMessage, Generation, LlmError, LlmProvider};
use crate::prompts::personas::{
    INGREDIENT_ANALYST_INSTRUCTIONS, INGREDIENT_ANALYST_NAME, RECIPE_CRAFTER_INSTRUCTIONS,
    RECIPE_CRAFTER_NAME,
};

/// Registry name of the ingredient analysis agent.
pub const INGREDIENT_AGENT: &str = "ingredientAgent";

/// Registry name of the recipe crafting agent.
pub const RECIPE_AGENT: &str = "recipeAgent";

/// A named generation capability: persona instructions plus a provider binding.
#[derive(Debug)]
pub struct Agent {
    name: String,
    display_name: String,
    instructions: String,
    provider: Box<dyn LlmProvider>,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        instructions: impl Into<String>,
        provider: Box<dyn LlmProvider>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            instructions: instructions.into(),
            provider,
        }
    }

    /// The ingredient analyst persona on the given provider.
    pub fn ingredient_analyst(provider: Box<dyn LlmProvider>) -> Self {
        Self::new(
            INGREDIENT_AGENT,
            INGREDIENT_ANALYST_NAME,
            INGREDIENT_ANALYST_INSTRUCTIONS,
            provider,
        )
    }

    /// The recipe crafter persona on the given provider.
    pub fn recipe_crafter(provider: Box<dyn LlmProvider>) -> Self {
        Self::new(
            RECIPE_AGENT,
            RECIPE_CRAFTER_NAME,
            RECIPE_CRAFTER_INSTRUCTIONS,
            provider,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Generate a response, prefixing the conversation with the persona instructions.
    pub async fn generate(&self, messages: &[ChatMessage]) -> Result<Generation, LlmError> {
        let mut conversation = Vec::with_capacity(messages.len() + 1);
        if !self.instructions.is_empty() {
            conversation.push(ChatMessage::system(self.instructions.clone()));
        }
        conversation.extend_from_slice(messages);

        tracing::debug!(
            agent = %self.name,
            provider = self.provider.provider_name(),
            model = self.provider.model_name(),
            messages = conversation.len(),
            "Calling agent"
        );

        let generation = self.provider.generate(&conversation).await?;

        tracing::debug!(
            agent = %self.name,
            chars = generation.text.chars().count(),
            "Agent responded"
        );

        Ok(generation)
    }
}

/// Registry that maps agent names to agents.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: BTreeMap<String, Arc<Agent>>,
}

impl AgentRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the standard two-agent registry from provider configuration.
    ///
    /// The ingredient analyst runs on `config.ingredient_model` and the recipe
    /// crafter on `config.recipe_model`.
    pub fn from_config(config: &AiConfig) -> Result<Self, LlmError> {
        let mut registry = Self::new();
        registry.register(Agent::ingredient_analyst(create_provider(
            config,
            &config.ingredient_model,
        )?));
        registry.register(Agent::recipe_crafter(create_provider(
            config,
            &config.recipe_model,
        )?));
        Ok(registry)
    }

    /// Register an agent, replacing any agent with the same name.
    pub fn register(&mut self, agent: Agent) {
        self.agents.insert(agent.name().to_string(), Arc::new(agent));
    }

    /// Look up an agent by name.
    pub fn resolve(&self, name: &str) -> Option<Arc<Agent>> {
        self.agents.get(name).cloned()
    }

    /// Registered agents, ordered by name.
    pub fn agents(&self) -> impl Iterator<Item = &Arc<Agent>> {
        self.agents.values()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;
    use crate::llm::FakeProvider;

    #[tokio::test]
    async fn test_agent_prepends_instructions() {
        let provider = Arc::new(FakeProvider::with_response("菜谱", "ok"));
        let agent = Agent::new("chef", "Chef", "你是一名专业主厨", Box::new(provider.clone()));

        let generation = agent.generate(&[ChatMessage::user("生成菜谱")]).await.unwrap();
        assert_eq!(generation.text, "ok");

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            vec![
                ChatMessage::system("你是一名专业主厨"),
                ChatMessage::user("生成菜谱")
            ]
        );
    }

    #[tokio::test]
    async fn test_agent_without_instructions_sends_messages_as_is() {
        let agent = Agent::new("plain", "Plain", "", Box::new(FakeProvider::default()));
        assert_eq!(agent.instructions(), "");
        let generation = agent.generate(&[ChatMessage::user("hi")]).await.unwrap();
        assert_eq!(generation.text, "{}");
    }

    #[test]
    fn test_resolve_by_name() {
        let mut registry = AgentRegistry::new();
        registry.register(Agent::ingredient_analyst(Box::new(FakeProvider::default())));

        let agent = registry.resolve(INGREDIENT_AGENT).unwrap();
        assert_eq!(agent.display_name(), INGREDIENT_ANALYST_NAME);
        assert!(registry.resolve(RECIPE_AGENT).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_from_config_binds_models_per_agent() {
        let config = AiConfig {
            provider: ProviderKind::Fake,
            ..AiConfig::default()
        };
        let registry = AgentRegistry::from_config(&config).unwrap();

        let names: Vec<&str> = registry.agents().map(|a| a.name()).collect();
        assert_eq!(names, vec![INGREDIENT_AGENT, RECIPE_AGENT]);
        assert_eq!(
            registry.resolve(RECIPE_AGENT).unwrap().display_name(),
            RECIPE_CRAFTER_NAME
        );
    }
}
