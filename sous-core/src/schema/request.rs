use serde::Serialize;
use serde_json::Value;

use super::FieldReader;
use crate::error::WorkflowError;

pub const DEFAULT_SERVINGS: u32 = 2;
pub const MIN_SERVINGS: u32 = 1;
pub const MAX_SERVINGS: u32 = 12;

/// What the cook has and what they want it to taste like.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRequest {
    pub ingredients: Vec<String>,
    pub taste: String,
    pub servings: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary_notes: Option<String>,
}

impl RecipeRequest {
    pub const SCHEMA: &'static str = "RecipeRequest";

    /// Start a request for two servings with no dietary notes.
    pub fn new<I, S>(ingredients: I, taste: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            taste: taste.into(),
            servings: DEFAULT_SERVINGS,
            dietary_notes: None,
        }
    }

    pub fn with_servings(mut self, servings: u32) -> Self {
        self.servings = servings;
        self
    }

    pub fn with_dietary_notes(mut self, notes: impl Into<String>) -> Self {
        self.dietary_notes = Some(notes.into());
        self
    }

    /// Validate caller-supplied JSON into a request.
    pub fn validate(value: &Value) -> Result<Self, WorkflowError> {
        let mut reader = FieldReader::new();
        let Some(obj) = reader.object(value, "") else {
            return Err(reader.into_error(Self::SCHEMA));
        };

        let ingredients = match reader.array(obj, "", "ingredients", true) {
            Some(items) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| reader.string(item, &format!("ingredients[{}]", i)))
                .collect(),
            None => Vec::new(),
        };
        let taste = reader.required_str(obj, "", "taste");
        let servings = reader
            .optional_integer(obj, "", "servings")
            .unwrap_or(DEFAULT_SERVINGS);
        let dietary_notes = reader.optional_str(obj, "", "dietaryNotes");

        let request = Self {
            ingredients,
            taste,
            servings,
            dietary_notes,
        };
        request.check_into(&mut reader);
        reader.finish(Self::SCHEMA, request)
    }

    /// Check the value constraints on an already-typed request.
    pub fn check(&self) -> Result<(), WorkflowError> {
        let mut reader = FieldReader::new();
        self.check_into(&mut reader);
        reader.finish(Self::SCHEMA, ())
    }

    /// Fields that already failed their type check are not checked again.
    fn check_into(&self, reader: &mut FieldReader) {
        if self.ingredients.is_empty() && !reader.has_violation_at("ingredients") {
            reader.violation("ingredients", "至少提供一种食材");
        }
        for (i, ingredient) in self.ingredients.iter().enumerate() {
            if ingredient.trim().is_empty() {
                reader.violation(&format!("ingredients[{}]", i), "ingredient must not be blank");
            }
        }
        if self.taste.trim().is_empty() && !reader.has_violation_at("taste") {
            reader.violation("taste", "请提供期望的口味");
        }
        if !(MIN_SERVINGS..=MAX_SERVINGS).contains(&self.servings)
            && !reader.has_violation_at("servings")
        {
            reader.violation(
                "servings",
                format!(
                    "must be between {} and {}, found {}",
                    MIN_SERVINGS, MAX_SERVINGS, self.servings
                ),
            );
        }
    }
}
