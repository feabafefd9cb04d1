//! Stage 1 prompt: turn the raw request into a structured ingredient plan.

/// Prompt name used in logs.
pub const ANALYZE_INGREDIENTS_PROMPT_NAME: &str = "analyze_ingredients";

/// Render the ingredient analysis prompt around the pretty-printed request JSON.
pub fn render_analyze_ingredients_prompt(request_json: &str) -> String {
    format!(
        r#"你将收到一组家庭厨房可用的食材信息与口味偏好，请输出严格 JSON（不要添加说明文字），结构如下：
{{
  "normalizedIngredients": [
    {{ "name": "string", "category": "protein | vegetable | carb | condiment | garnish | other", "prep": "string", "flavorRole": "string" }}
  ],
  "missingItems": [
    {{ "item": "string", "reason": "string", "substitution": "string" }}
  ],
  "tasteDirection": {{
    "requestedProfile": "string",
    "balanceNotes": ["string"],
    "aromatics": ["string"]
  }},
  "servings": number,
  "dietaryNotes": "string"
}}

规则：
- 如果用户未提供某些调味料，但为了达到口味有必要，请放在 missingItems，并注明替代方案
- prep 字段要指出具体处理方式（如“切丝”“冷水下锅焯30秒”）
- flavorRole 用简短文字描述该食材在味型中的作用
- 所有文本使用中文
- 仅返回 JSON

原始输入：
{request_json}
"#,
        request_json = request_json
    )
}
