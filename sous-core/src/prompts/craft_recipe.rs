//! Stage 2 prompt: turn an ingredient plan into a step-by-step recipe.

/// Prompt name used in logs.
pub const CRAFT_RECIPE_PROMPT_NAME: &str = "craft_recipe";

/// Render the recipe crafting prompt around the pretty-printed ingredient plan JSON.
pub fn render_craft_recipe_prompt(plan_json: &str) -> String {
    format!(
        r#"你将得到一道菜的原料规划，请基于这些信息生成结构化 JSON（不要额外解释），必须符合：
{{
  "recipeName": "string",
  "servings": number,
  "overview": "string",
  "ingredientList": [
    {{ "item": "string", "quantity": "string", "prep": "string", "purpose": "string" }}
  ],
  "steps": [
    {{ "order": number, "instruction": "string", "timing": "string", "tasteFocus": "string" }}
  ],
  "finishingTouches": ["string"],
  "tastingNotes": ["string"]
}}

准则：
- steps 至少 5 步，覆盖准备、烹饪和收尾；timing 写具体分钟或火候
- 所有用量请给出具体单位（克、毫升、茶匙等），如未知可给“适量”并说明判断方法
- 在 overview 中概括口味与口感
- tastingNotes 解释最终味型如何对应用户需求
- 所有文本使用中文
- 仅输出 JSON

食材规划：
{plan_json}
"#,
        plan_json = plan_json
    )
}
