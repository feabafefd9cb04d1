use serde::Serialize;
use serde_json::{Map, Value};

use super::{FieldReader, UNSET_SERVINGS};
use crate::error::WorkflowError;

/// One of the cook's ingredients, as the analyst understood it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientDetails {
    pub name: String,
    /// protein | vegetable | carb | condiment | garnish | other
    pub category: String,
    pub prep: String,
    pub flavor_role: String,
}

/// Something the dish needs that the cook didn't list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingItem {
    pub item: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitution: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TasteDirection {
    pub requested_profile: String,
    pub balance_notes: Vec<String>,
    pub aromatics: Vec<String>,
}

/// Stage 1 output: the ingredient analysis that recipe crafting works from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientPlan {
    pub normalized_ingredients: Vec<IngredientDetails>,
    pub missing_items: Vec<MissingItem>,
    pub taste_direction: TasteDirection,
    pub servings: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary_notes: Option<String>,
}

impl IngredientPlan {
    pub const SCHEMA: &'static str = "IngredientPlan";

    /// Validate parsed model output.
    ///
    /// Every field is optional here: arrays default to empty, `tasteDirection`
    /// to an empty profile and `servings` to [`UNSET_SERVINGS`]. Present fields
    /// must still have the right types.
    pub fn validate(value: &Value) -> Result<Self, WorkflowError> {
        let mut reader = FieldReader::new();
        let Some(obj) = reader.object(value, "") else {
            return Err(reader.into_error(Self::SCHEMA));
        };

        let normalized_ingredients =
            reader.object_array(obj, "", "normalizedIngredients", false, read_ingredient);
        let missing_items = reader.object_array(obj, "", "missingItems", false, read_missing_item);
        let taste_direction = reader
            .optional_object(obj, "", "tasteDirection")
            .map(|td| read_taste_direction(&mut reader, td, "tasteDirection"))
            .unwrap_or_default();
        let servings = reader
            .optional_integer(obj, "", "servings")
            .unwrap_or(UNSET_SERVINGS);
        let dietary_notes = reader.optional_str(obj, "", "dietaryNotes");

        reader.finish(
            Self::SCHEMA,
            Self {
                normalized_ingredients,
                missing_items,
                taste_direction,
                servings,
                dietary_notes,
            },
        )
    }
}

fn read_ingredient(reader: &mut FieldReader, obj: &Map<String, Value>, path: &str) -> IngredientDetails {
    IngredientDetails {
        name: reader.required_str(obj, path, "name"),
        category: reader.required_str(obj, path, "category"),
        prep: reader.required_str(obj, path, "prep"),
        flavor_role: reader.required_str(obj, path, "flavorRole"),
    }
}

fn read_missing_item(reader: &mut FieldReader, obj: &Map<String, Value>, path: &str) -> MissingItem {
    MissingItem {
        item: reader.required_str(obj, path, "item"),
        reason: reader.required_str(obj, path, "reason"),
        substitution: reader.optional_str(obj, path, "substitution"),
    }
}

fn read_taste_direction(reader: &mut FieldReader, obj: &Map<String, Value>, path: &str) -> TasteDirection {
    TasteDirection {
        requested_profile: reader.str_or_default(obj, path, "requestedProfile"),
        balance_notes: reader.string_array(obj, path, "balanceNotes"),
        aromatics: reader.string_array(obj, path, "aromatics"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_object_takes_defaults() {
        let plan = IngredientPlan::validate(&json!({})).unwrap();

        assert!(plan.normalized_ingredients.is_empty());
        assert!(plan.missing_items.is_empty());
        assert_eq!(plan.taste_direction, TasteDirection::default());
        assert_eq!(plan.servings, UNSET_SERVINGS);
        assert!(plan.dietary_notes.is_none());
    }

    #[test]
    fn test_full_plan() {
        let plan = IngredientPlan::validate(&json!({
            "normalizedIngredients": [
                { "name": "鸡胸肉", "category": "protein", "prep": "切丁，用料酒腌制10分钟", "flavorRole": "主体蛋白" },
                { "name": "青椒", "category": "vegetable", "prep": "切块", "flavorRole": "清香微辣" }
            ],
            "missingItems": [
                { "item": "干辣椒", "reason": "提供微辣", "substitution": "辣椒粉" },
                { "item": "蒜", "reason": "增香" }
            ],
            "tasteDirection": {
                "requestedProfile": "微辣",
                "balanceNotes": ["少量糖平衡辣味"],
                "aromatics": ["蒜", "姜"]
            },
            "servings": 2,
            "unexpected": "ignored"
        }))
        .unwrap();

        assert_eq!(plan.normalized_ingredients.len(), 2);
        assert_eq!(plan.normalized_ingredients[1].flavor_role, "清香微辣");
        assert_eq!(plan.missing_items[0].substitution.as_deref(), Some("辣椒粉"));
        assert!(plan.missing_items[1].substitution.is_none());
        assert_eq!(plan.taste_direction.aromatics, vec!["蒜", "姜"]);
        assert_eq!(plan.servings, 2);

        let round_trip = serde_json::to_value(&plan).unwrap();
        assert!(round_trip.get("unexpected").is_none());
        assert_eq!(round_trip["normalizedIngredients"][0]["flavorRole"], "主体蛋白");
    }

    #[test]
    fn test_partial_taste_direction_gets_field_defaults() {
        let plan = IngredientPlan::validate(&json!({
            "tasteDirection": { "aromatics": ["葱"] }
        }))
        .unwrap();

        assert_eq!(plan.taste_direction.requested_profile, "");
        assert!(plan.taste_direction.balance_notes.is_empty());
        assert_eq!(plan.taste_direction.aromatics, vec!["葱"]);
    }

    #[test]
    fn test_wrong_types_are_not_coerced() {
        let err = IngredientPlan::validate(&json!({
            "normalizedIngredients": [
                { "name": "鸡胸肉", "category": "protein", "prep": "切丁" }
            ],
            "missingItems": "none",
            "tasteDirection": { "requestedProfile": 3, "aromatics": ["蒜", null] },
            "servings": "2"
        }))
        .unwrap_err();

        assert_eq!(
            err.violation_paths(),
            vec![
                "normalizedIngredients[0].flavorRole",
                "missingItems",
                "tasteDirection.requestedProfile",
                "tasteDirection.aromatics[1]",
                "servings",
            ]
        );
    }

    #[test]
    fn test_non_object_root() {
        let err = IngredientPlan::validate(&json!(["鸡胸肉"])).unwrap_err();
        assert_eq!(err.violation_paths(), vec!["$"]);
    }
}
