pub mod agents;
pub mod config;
pub mod defaults;
pub mod error;
pub mod extract;
pub mod llm;
pub mod prompts;
pub mod schema;
pub mod workflow;

pub use agents::{Agent, AgentRegistry, INGREDIENT_AGENT, RECIPE_AGENT};
pub use config::{AiConfig, ConfigError, ProviderKind, WorkflowConfig};
pub use error::{FieldViolation, WorkflowError};
pub use extract::{
    extract_json_candidate, extract_json_candidate_with_method, parse_json_from_text,
    ExtractionMethod,
};
pub use schema::{
    IngredientDetails, IngredientPlan, MissingItem, RecipeIngredient, RecipeOutput, RecipeRequest,
    RecipeStep, TasteDirection,
};
pub use workflow::{
    AnalyzeIngredientsStep, CraftRecipeStep, RecipeWorkflow, StepReport, WorkflowRun,
    WorkflowState,
};
