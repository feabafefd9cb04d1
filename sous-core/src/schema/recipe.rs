use serde::Serialize;
use serde_json::{Map, Value};

use super::{FieldReader, UNSET_SERVINGS};
use crate::error::WorkflowError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    pub item: String,
    /// Explicit units, or "适量" with how to judge the amount.
    pub quantity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeStep {
    pub order: u32,
    pub instruction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taste_focus: Option<String>,
}

/// Stage 2 output and the workflow's final result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeOutput {
    pub recipe_name: String,
    pub servings: u32,
    pub overview: String,
    pub ingredient_list: Vec<RecipeIngredient>,
    pub steps: Vec<RecipeStep>,
    pub finishing_touches: Vec<String>,
    pub tasting_notes: Vec<String>,
}

impl RecipeOutput {
    pub const SCHEMA: &'static str = "RecipeOutput";

    /// Validate parsed model output.
    ///
    /// `recipeName`, `overview`, `ingredientList` and `steps` are required;
    /// a missing `steps` fails rather than producing a recipe with nothing to do.
    /// `servings` may be absent and is then [`UNSET_SERVINGS`].
    pub fn validate(value: &Value) -> Result<Self, WorkflowError> {
        let mut reader = FieldReader::new();
        let Some(obj) = reader.object(value, "") else {
            return Err(reader.into_error(Self::SCHEMA));
        };

        let recipe = Self {
            recipe_name: reader.required_str(obj, "", "recipeName"),
            servings: reader
                .optional_integer(obj, "", "servings")
                .unwrap_or(UNSET_SERVINGS),
            overview: reader.required_str(obj, "", "overview"),
            ingredient_list: reader.object_array(obj, "", "ingredientList", true, read_ingredient),
            steps: reader.object_array(obj, "", "steps", true, read_step),
            finishing_touches: reader.string_array(obj, "", "finishingTouches"),
            tasting_notes: reader.string_array(obj, "", "tastingNotes"),
        };

        reader.finish(Self::SCHEMA, recipe)
    }
}

fn read_ingredient(reader: &mut FieldReader, obj: &Map<String, Value>, path: &str) -> RecipeIngredient {
    RecipeIngredient {
        item: reader.required_str(obj, path, "item"),
        quantity: reader.required_str(obj, path, "quantity"),
        prep: reader.optional_str(obj, path, "prep"),
        purpose: reader.optional_str(obj, path, "purpose"),
    }
}

fn read_step(reader: &mut FieldReader, obj: &Map<String, Value>, path: &str) -> RecipeStep {
    RecipeStep {
        order: reader.required_integer(obj, path, "order"),
        instruction: reader.required_str(obj, path, "instruction"),
        timing: reader.optional_str(obj, path, "timing"),
        taste_focus: reader.optional_str(obj, path, "tasteFocus"),
    }
}
