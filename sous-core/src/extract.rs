//! Pull a JSON document out of free-form model output.
//!
//! Models wrap their JSON in markdown fences, lead with a sentence of chatter,
//! or trail off with a sign-off. Extraction tries each method in order and
//! takes the first that matches; parsing then happens on that candidate only.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::error::WorkflowError;

/// First markdown code fence, with an optional `json` tag (case-insensitive)
static FENCED_BLOCK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```(?:json)?\s*(.*?)```").expect("Invalid fenced block regex")
});

/// How a JSON candidate was located in model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    FencedBlock,
    BraceSpan,
    Raw,
}

impl ExtractionMethod {
    /// Every method, in the order they are tried.
    pub const ALL: [ExtractionMethod; 3] = [
        ExtractionMethod::FencedBlock,
        ExtractionMethod::BraceSpan,
        ExtractionMethod::Raw,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::FencedBlock => "fenced_block",
            ExtractionMethod::BraceSpan => "brace_span",
            ExtractionMethod::Raw => "raw",
        }
    }

    /// Apply this method alone; `None` if it doesn't match.
    pub fn extract<'t>(&self, text: &'t str) -> Option<&'t str> {
        match self {
            ExtractionMethod::FencedBlock => {
                let inner = FENCED_BLOCK_REGEX.captures(text)?.get(1)?.as_str().trim();
                (!inner.is_empty()).then_some(inner)
            }
            ExtractionMethod::BraceSpan => {
                let start = text.find('{')?;
                let end = text.rfind('}')?;
                (end > start).then(|| text[start..=end].trim())
            }
            ExtractionMethod::Raw => Some(text.trim()),
        }
    }
}

/// Locate the JSON candidate in `text` and report which method found it.
pub fn extract_json_candidate_with_method(text: &str) -> (&str, ExtractionMethod) {
    for method in ExtractionMethod::ALL {
        if let Some(candidate) = method.extract(text) {
            return (candidate, method);
        }
    }
    // Raw always matches
    (text.trim(), ExtractionMethod::Raw)
}

/// Locate the JSON candidate in `text`. Never fails; the candidate may not be JSON.
pub fn extract_json_candidate(text: &str) -> &str {
    extract_json_candidate_with_method(text).0
}

/// Parse the JSON document embedded in model output.
///
/// On failure the error carries the full original text, not just the candidate.
pub fn parse_json_from_text(raw: &str) -> Result<Value, WorkflowError> {
    let (candidate, method) = extract_json_candidate_with_method(raw.trim());
    tracing::debug!(
        method = method.as_str(),
        chars = candidate.chars().count(),
        "Extracted JSON candidate"
    );

    serde_json::from_str(candidate).map_err(|e| WorkflowError::MalformedModelOutput {
        message: e.to_string(),
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_json_is_a_fixed_point() {
        let text = r#"{"recipeName": "青椒鸡丁", "servings": 2}"#;
        assert_eq!(extract_json_candidate(text), text);
        assert_eq!(
            extract_json_candidate_with_method(text).1,
            ExtractionMethod::BraceSpan
        );
    }

    #[test]
    fn test_fenced_block_wins_over_stray_braces() {
        let text = "Here is {the} plan:\n```json\n{\"servings\": 2}\n```\nEnjoy {it}!";
        let (candidate, method) = extract_json_candidate_with_method(text);
        assert_eq!(candidate, r#"{"servings": 2}"#);
        assert_eq!(method, ExtractionMethod::FencedBlock);
    }

    #[test]
    fn test_fence_tag_is_case_insensitive_and_optional() {
        assert_eq!(extract_json_candidate("```JSON\n[1]\n```"), "[1]");
        assert_eq!(extract_json_candidate("```\n{\"a\":1}\n```"), r#"{"a":1}"#);
    }

    #[test]
    fn test_empty_fence_falls_through() {
        let text = "``` ```\n{\"a\": 1}";
        let (candidate, method) = extract_json_candidate_with_method(text);
        assert_eq!(candidate, r#"{"a": 1}"#);
        assert_eq!(method, ExtractionMethod::BraceSpan);
    }

    #[test]
    fn test_brace_span_strips_chatter() {
        let text = "好的，这是结果：{\"a\": {\"b\": 1}} 希望有帮助";
        assert_eq!(extract_json_candidate(text), r#"{"a": {"b": 1}}"#);
    }

    #[test]
    fn test_reversed_braces_use_raw_text() {
        let text = "  } nothing here {  ";
        let (candidate, method) = extract_json_candidate_with_method(text);
        assert_eq!(candidate, "} nothing here {");
        assert_eq!(method, ExtractionMethod::Raw);
    }

    #[test]
    fn test_parse_fenced_output() {
        let value = parse_json_from_text("Sure!\n```json\n{\"servings\": 2}\n```").unwrap();
        assert_eq!(value, json!({ "servings": 2 }));
    }

    #[test]
    fn test_unbalanced_braces_report_raw_text() {
        let raw = "结果如下 {\"recipeName\": \"青椒鸡丁\", \"steps\": [ }";
        let err = parse_json_from_text(raw).unwrap_err();

        match &err {
            WorkflowError::MalformedModelOutput { raw: reported, .. } => assert_eq!(reported, raw),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("结果如下"));
    }

    #[test]
    fn test_prose_only_is_malformed() {
        let err = parse_json_from_text("抱歉，我无法生成菜谱。").unwrap_err();
        assert!(matches!(err, WorkflowError::MalformedModelOutput { .. }));
    }
}
