//! Stage 1: turn the cook's request into an ingredient plan.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::step::{generate_text, StepMetadata, WorkflowStep};
use crate::agents::AgentRegistry;
use crate::defaults::backfill_plan;
use crate::error::WorkflowError;
use crate::extract::parse_json_from_text;
use crate::prompts::analyze_ingredients::ANALYZE_INGREDIENTS_PROMPT_NAME;
use crate::prompts::render_analyze_ingredients_prompt;
use crate::schema::{IngredientPlan, RecipeRequest};

/// Step that asks the ingredient agent to normalize ingredients and plan the flavor.
pub struct AnalyzeIngredientsStep {
    registry: Arc<AgentRegistry>,
    agent: String,
    timeout: Duration,
}

impl AnalyzeIngredientsStep {
    /// Step name constant.
    pub const NAME: &'static str = "analyze-ingredients";

    pub fn new(registry: Arc<AgentRegistry>, agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            registry,
            agent: agent.into(),
            timeout,
        }
    }
}

#[async_trait]
impl WorkflowStep for AnalyzeIngredientsStep {
    type Input = RecipeRequest;
    type Output = IngredientPlan;

    fn metadata(&self) -> StepMetadata {
        StepMetadata {
            name: Self::NAME,
            description: "Normalize ingredients and set the flavor direction",
        }
    }

    fn agent_name(&self) -> &str {
        &self.agent
    }

    async fn execute(&self, input: Option<&RecipeRequest>) -> Result<IngredientPlan, WorkflowError> {
        let request = input.ok_or(WorkflowError::MissingInput {
            step: Self::NAME,
            what: "recipe request",
        })?;

        let request_json = serde_json::to_string_pretty(request).unwrap_or_default();
        let prompt = render_analyze_ingredients_prompt(&request_json);
        tracing::debug!(
            prompt = ANALYZE_INGREDIENTS_PROMPT_NAME,
            chars = prompt.chars().count(),
            "Rendered prompt"
        );

        let text = generate_text(&self.registry, &self.agent, prompt, self.timeout).await?;
        let value = parse_json_from_text(&text)?;
        let plan = IngredientPlan::validate(&value)?;

        let plan = backfill_plan(plan, request);
        tracing::debug!(
            ingredients = plan.normalized_ingredients.len(),
            missing = plan.missing_items.len(),
            servings = plan.servings,
            "Ingredient plan ready"
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Agent;
    use crate::llm::{FakeProvider, Role};

    const PLAN_RESPONSE: &str = r#"```json
{
  "normalizedIngredients": [
    { "name": "豆腐", "category": "protein", "prep": "切块焯水", "flavorRole": "吸收酱汁" }
  ],
  "missingItems": [],
  "tasteDirection": { "requestedProfile": "", "balanceNotes": [], "aromatics": ["葱"] }
}
```"#;

    fn step_with(provider: Arc<FakeProvider>) -> AnalyzeIngredientsStep {
        let mut registry = AgentRegistry::new();
        registry.register(Agent::ingredient_analyst(Box::new(provider)));
        AnalyzeIngredientsStep::new(
            Arc::new(registry),
            crate::agents::INGREDIENT_AGENT,
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_plan_is_backfilled_from_request() {
        let provider = Arc::new(FakeProvider::default().with_default_response(PLAN_RESPONSE));
        let step = step_with(provider.clone());
        let request = RecipeRequest::new(["豆腐"], "咸鲜").with_servings(3);

        let plan = step.execute(Some(&request)).await.unwrap();

        assert_eq!(plan.normalized_ingredients[0].name, "豆腐");
        assert_eq!(plan.taste_direction.requested_profile, "咸鲜");
        assert_eq!(plan.servings, 3);

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        let user = &calls[0][1];
        assert_eq!(user.role, Role::User);
        assert!(user.content.contains("\"taste\": \"咸鲜\""));
    }

    #[tokio::test]
    async fn test_missing_input_skips_generation() {
        let provider = Arc::new(FakeProvider::default());
        let step = step_with(provider.clone());

        let err = step.execute(None).await.unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::MissingInput { step: AnalyzeIngredientsStep::NAME, .. }
        ));
        assert_eq!(provider.call_count(), 0);
    }
}
