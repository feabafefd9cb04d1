use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde_json::Value;
use sous_core::{
    extract_json_candidate_with_method, parse_json_from_text, IngredientPlan, RecipeOutput,
    RecipeRequest,
};

/// Schema to validate parsed output against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Schema {
    Request,
    Plan,
    Recipe,
}

impl Schema {
    fn validate(self, value: &Value) -> Result<Value> {
        let validated = match self {
            Schema::Request => serde_json::to_value(RecipeRequest::validate(value)?)?,
            Schema::Plan => serde_json::to_value(IngredientPlan::validate(value)?)?,
            Schema::Recipe => serde_json::to_value(RecipeOutput::validate(value)?)?,
        };
        Ok(validated)
    }
}

pub fn parse(file: &Path, schema: Option<Schema>) -> Result<()> {
    let raw = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let (_, method) = extract_json_candidate_with_method(raw.trim());
    tracing::info!(file = %file.display(), method = method.as_str(), "Extracted JSON");

    let mut value = parse_json_from_text(&raw)?;
    if let Some(schema) = schema {
        value = schema.validate(&value)?;
    }

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_validation_normalizes_output() {
        let value = json!({ "ingredients": ["豆腐"], "taste": "咸鲜", "extra": true });
        let validated = Schema::Request.validate(&value).unwrap();
        assert_eq!(
            validated,
            json!({ "ingredients": ["豆腐"], "taste": "咸鲜", "servings": 2 })
        );
    }

    #[test]
    fn test_schema_violation_is_an_error() {
        let err = Schema::Recipe.validate(&json!({})).unwrap_err();
        assert!(err.to_string().contains("RecipeOutput failed validation"));
    }
}
