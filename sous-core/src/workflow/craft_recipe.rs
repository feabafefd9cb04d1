//! Stage 2: turn the ingredient plan into a cookable recipe.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::step::{generate_text, StepMetadata, WorkflowStep};
use crate::agents::AgentRegistry;
use crate::defaults::backfill_recipe;
use crate::error::WorkflowError;
use crate::extract::parse_json_from_text;
use crate::prompts::craft_recipe::CRAFT_RECIPE_PROMPT_NAME;
use crate::prompts::render_craft_recipe_prompt;
use crate::schema::{IngredientPlan, RecipeOutput};

/// Step that asks the recipe agent to write the recipe from the plan.
pub struct CraftRecipeStep {
    registry: Arc<AgentRegistry>,
    agent: String,
    timeout: Duration,
}

impl CraftRecipeStep {
    /// Step name constant.
    pub const NAME: &'static str = "craft-recipe";

    pub fn new(registry: Arc<AgentRegistry>, agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            registry,
            agent: agent.into(),
            timeout,
        }
    }
}

#[async_trait]
impl WorkflowStep for CraftRecipeStep {
    type Input = IngredientPlan;
    type Output = RecipeOutput;

    fn metadata(&self) -> StepMetadata {
        StepMetadata {
            name: Self::NAME,
            description: "Write a step-by-step recipe from the ingredient plan",
        }
    }

    fn agent_name(&self) -> &str {
        &self.agent
    }

    async fn execute(&self, input: Option<&IngredientPlan>) -> Result<RecipeOutput, WorkflowError> {
        let plan = input.ok_or(WorkflowError::MissingInput {
            step: Self::NAME,
            what: "ingredient plan",
        })?;

        let plan_json = serde_json::to_string_pretty(plan).unwrap_or_default();
        let prompt = render_craft_recipe_prompt(&plan_json);
        tracing::debug!(
            prompt = CRAFT_RECIPE_PROMPT_NAME,
            chars = prompt.chars().count(),
            "Rendered prompt"
        );

        let text = generate_text(&self.registry, &self.agent, prompt, self.timeout).await?;
        let value = parse_json_from_text(&text)?;
        let recipe = RecipeOutput::validate(&value)?;

        let recipe = backfill_recipe(recipe, plan);
        tracing::debug!(
            recipe = %recipe.recipe_name,
            steps = recipe.steps.len(),
            servings = recipe.servings,
            "Recipe ready"
        );
        Ok(recipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{Agent, RECIPE_AGENT};
    use crate::llm::FakeProvider;
    use crate::schema::TasteDirection;

    fn plan(servings: u32) -> IngredientPlan {
        IngredientPlan {
            normalized_ingredients: Vec::new(),
            missing_items: Vec::new(),
            taste_direction: TasteDirection {
                requested_profile: "酸甜".to_string(),
                ..TasteDirection::default()
            },
            servings,
            dietary_notes: None,
        }
    }

    fn step_answering(response: &str) -> (CraftRecipeStep, Arc<FakeProvider>) {
        let provider = Arc::new(FakeProvider::default().with_default_response(response));
        let mut registry = AgentRegistry::new();
        registry.register(Agent::recipe_crafter(Box::new(provider.clone())));
        let step = CraftRecipeStep::new(Arc::new(registry), RECIPE_AGENT, Duration::from_secs(5));
        (step, provider)
    }

    #[tokio::test]
    async fn test_recipe_servings_come_from_plan() {
        let (step, provider) = step_answering(
            r#"{"recipeName": "糖醋里脊", "overview": "酸甜酥脆", "ingredientList": [], "steps": []}"#,
        );

        let recipe = step.execute(Some(&plan(4))).await.unwrap();

        assert_eq!(recipe.recipe_name, "糖醋里脊");
        assert_eq!(recipe.servings, 4);
        assert!(provider.calls()[0][1].content.contains("\"requestedProfile\": \"酸甜\""));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_reported_raw() {
        let (step, _) = step_answering("这道菜我不会做");
        let err = step.execute(Some(&plan(2))).await.unwrap_err();
        assert!(matches!(err, WorkflowError::MalformedModelOutput { ref raw, .. } if raw == "这道菜我不会做"));
    }

    #[tokio::test]
    async fn test_missing_steps_fails_validation() {
        let (step, _) = step_answering(
            r#"{"recipeName": "糖醋里脊", "overview": "酸甜酥脆", "ingredientList": []}"#,
        );
        let err = step.execute(Some(&plan(2))).await.unwrap_err();
        assert_eq!(err.violation_paths(), vec!["steps"]);
    }

    #[tokio::test]
    async fn test_missing_plan() {
        let (step, provider) = step_answering("{}");
        let err = step.execute(None).await.unwrap_err();
        assert!(matches!(err, WorkflowError::MissingInput { what: "ingredient plan", .. }));
        assert_eq!(provider.call_count(), 0);
    }
}
