//! Cross-stage defaulting applied after schema validation.
//!
//! Models routinely leave out fields they were told to echo back. These passes
//! fill them from the upstream input so later stages never see a blank profile
//! or an unset servings count.

use crate::schema::{IngredientPlan, RecipeOutput, RecipeRequest, DEFAULT_SERVINGS, UNSET_SERVINGS};

/// Fill plan fields the analyst left empty from the original request.
pub fn backfill_plan(mut plan: IngredientPlan, request: &RecipeRequest) -> IngredientPlan {
    if plan.taste_direction.requested_profile.trim().is_empty() {
        plan.taste_direction.requested_profile = request.taste.clone();
    }
    if plan.servings == UNSET_SERVINGS {
        plan.servings = request.servings;
    }
    if is_blank(plan.dietary_notes.as_deref()) {
        plan.dietary_notes = request.dietary_notes.clone();
    }
    plan
}

/// Fill recipe servings from the plan, falling back to two.
pub fn backfill_recipe(mut recipe: RecipeOutput, plan: &IngredientPlan) -> RecipeOutput {
    if recipe.servings == UNSET_SERVINGS {
        recipe.servings = if plan.servings == UNSET_SERVINGS {
            DEFAULT_SERVINGS
        } else {
            plan.servings
        };
    }
    recipe
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |s| s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TasteDirection;

    fn empty_plan() -> IngredientPlan {
        IngredientPlan {
            normalized_ingredients: Vec::new(),
            missing_items: Vec::new(),
            taste_direction: TasteDirection::default(),
            servings: UNSET_SERVINGS,
            dietary_notes: None,
        }
    }

    fn recipe_with_servings(servings: u32) -> RecipeOutput {
        RecipeOutput {
            recipe_name: "麻婆豆腐".to_string(),
            servings,
            overview: "麻辣鲜香".to_string(),
            ingredient_list: Vec::new(),
            steps: Vec::new(),
            finishing_touches: Vec::new(),
            tasting_notes: Vec::new(),
        }
    }

    #[test]
    fn test_plan_takes_request_values() {
        let request = RecipeRequest::new(["豆腐"], "麻辣")
            .with_servings(3)
            .with_dietary_notes("不吃猪肉");

        let plan = backfill_plan(empty_plan(), &request);

        assert_eq!(plan.taste_direction.requested_profile, "麻辣");
        assert_eq!(plan.servings, 3);
        assert_eq!(plan.dietary_notes.as_deref(), Some("不吃猪肉"));
    }

    #[test]
    fn test_plan_keeps_model_values() {
        let request = RecipeRequest::new(["豆腐"], "麻辣").with_dietary_notes("不吃猪肉");
        let mut plan = empty_plan();
        plan.taste_direction.requested_profile = "微麻微辣".to_string();
        plan.servings = 4;
        plan.dietary_notes = Some("素食".to_string());

        let plan = backfill_plan(plan, &request);

        assert_eq!(plan.taste_direction.requested_profile, "微麻微辣");
        assert_eq!(plan.servings, 4);
        assert_eq!(plan.dietary_notes.as_deref(), Some("素食"));
    }

    #[test]
    fn test_blank_plan_strings_count_as_missing() {
        let request = RecipeRequest::new(["豆腐"], "清淡");
        let mut plan = empty_plan();
        plan.taste_direction.requested_profile = "   ".to_string();
        plan.dietary_notes = Some(String::new());

        let plan = backfill_plan(plan, &request);

        assert_eq!(plan.taste_direction.requested_profile, "清淡");
        assert!(plan.dietary_notes.is_none());
    }

    #[test]
    fn test_recipe_servings_fallback_chain() {
        let mut plan = empty_plan();
        assert_eq!(backfill_recipe(recipe_with_servings(0), &plan).servings, 2);

        plan.servings = 5;
        assert_eq!(backfill_recipe(recipe_with_servings(0), &plan).servings, 5);
        assert_eq!(backfill_recipe(recipe_with_servings(1), &plan).servings, 1);
    }
}
