//! Two-stage recipe workflow.
//!
//! - Stage 1 (`AnalyzeIngredientsStep`) turns the request into an `IngredientPlan`
//! - Stage 2 (`CraftRecipeStep`) turns that plan, verbatim, into a `RecipeOutput`
//! - Each stage generates with its own configured agent and timeout
//! - Any failure ends the run; nothing is retried

mod analyze_ingredients;
mod craft_recipe;
mod step;

pub use analyze_ingredients::AnalyzeIngredientsStep;
pub use craft_recipe::CraftRecipeStep;
pub use step::{StepMetadata, WorkflowStep};

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tracing::{info_span, Instrument};

use crate::agents::AgentRegistry;
use crate::config::WorkflowConfig;
use crate::error::WorkflowError;
use crate::schema::{IngredientPlan, RecipeOutput, RecipeRequest};

/// Where a run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    AnalyzingIngredients,
    CraftingRecipe,
    Done,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::AnalyzingIngredients => "analyzing_ingredients",
            WorkflowState::CraftingRecipe => "crafting_recipe",
            WorkflowState::Done => "done",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing for one completed stage.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub step: &'static str,
    pub agent: String,
    pub duration_ms: u64,
}

/// Everything a successful run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRun {
    pub plan: IngredientPlan,
    pub recipe: RecipeOutput,
    pub steps: Vec<StepReport>,
}

/// The recipe generation workflow.
///
/// Holds only shared immutable state, so one instance can serve concurrent runs.
pub struct RecipeWorkflow {
    analyze: AnalyzeIngredientsStep,
    craft: CraftRecipeStep,
}

impl RecipeWorkflow {
    pub fn new(registry: Arc<AgentRegistry>, config: WorkflowConfig) -> Self {
        Self {
            analyze: AnalyzeIngredientsStep::new(
                registry.clone(),
                config.ingredient_agent,
                config.stage_timeout,
            ),
            craft: CraftRecipeStep::new(registry, config.recipe_agent, config.stage_timeout),
        }
    }

    /// Generate a recipe for `request`.
    pub async fn run(&self, request: &RecipeRequest) -> Result<RecipeOutput, WorkflowError> {
        Ok(self.run_with_report(request).await?.recipe)
    }

    /// Validate raw request JSON, then generate a recipe for it.
    pub async fn run_json(&self, input: &Value) -> Result<RecipeOutput, WorkflowError> {
        if input.is_null() {
            return Err(WorkflowError::MissingInput {
                step: AnalyzeIngredientsStep::NAME,
                what: "recipe request",
            });
        }
        let request = RecipeRequest::validate(input)?;
        self.run(&request).await
    }

    /// Generate a recipe and keep the intermediate plan and per-stage timings.
    pub async fn run_with_report(&self, request: &RecipeRequest) -> Result<WorkflowRun, WorkflowError> {
        request.check()?;

        let mut steps = Vec::with_capacity(2);

        transition(WorkflowState::AnalyzingIngredients);
        let (plan, report) = run_step(&self.analyze, request).await?;
        steps.push(report);

        transition(WorkflowState::CraftingRecipe);
        let (recipe, report) = run_step(&self.craft, &plan).await?;
        steps.push(report);

        transition(WorkflowState::Done);
        Ok(WorkflowRun {
            plan,
            recipe,
            steps,
        })
    }
}

fn transition(state: WorkflowState) {
    tracing::info!(state = %state, "Workflow state");
}

async fn run_step<S: WorkflowStep>(
    step: &S,
    input: &S::Input,
) -> Result<(S::Output, StepReport), WorkflowError> {
    let meta = step.metadata();
    let start = Instant::now();

    let result = step
        .execute(Some(input))
        .instrument(info_span!("workflow_step", step = meta.name, agent = %step.agent_name()))
        .await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(output) => Ok((
            output,
            StepReport {
                step: meta.name,
                agent: step.agent_name().to_string(),
                duration_ms,
            },
        )),
        Err(e) => {
            tracing::warn!(step = meta.name, duration_ms, error = %e, "Workflow step failed");
            Err(e)
        }
    }
}
