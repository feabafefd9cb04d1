//! Prompt templates for the two workflow stages and the agent personas.

pub mod analyze_ingredients;
pub mod craft_recipe;
pub mod personas;

pub use analyze_ingredients::render_analyze_ingredients_prompt;
pub use craft_recipe::render_craft_recipe_prompt;
