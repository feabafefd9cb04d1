//! Schema contracts for the data flowing through the workflow.
//!
//! Each contract validates a parsed `serde_json::Value` into a typed struct:
//! required fields must be present with the right JSON type, absent optional
//! fields take their declared defaults, and nothing is coerced. Every violation
//! found is reported together, keyed by its JSON path.

mod plan;
mod recipe;
mod request;

pub use plan::{IngredientDetails, IngredientPlan, MissingItem, TasteDirection};
pub use recipe::{RecipeIngredient, RecipeOutput, RecipeStep};
pub use request::{RecipeRequest, DEFAULT_SERVINGS, MAX_SERVINGS, MIN_SERVINGS};

use serde_json::{Map, Value};

use crate::error::{FieldViolation, WorkflowError};

/// Servings value meaning "the model did not say"; the defaulting pass replaces it.
pub const UNSET_SERVINGS: u32 = 0;

/// Collects violations while reading fields out of a JSON value.
///
/// Readers return a placeholder (empty string, empty vec, zero) after recording
/// a violation so that validation can continue and report every problem at once.
/// The placeholder never escapes: `finish` fails if anything was recorded.
pub(crate) struct FieldReader {
    violations: Vec<FieldViolation>,
}

impl FieldReader {
    pub(crate) fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    pub(crate) fn violation(&mut self, path: &str, message: impl Into<String>) {
        let path = if path.is_empty() { "$" } else { path };
        self.violations.push(FieldViolation::new(path, message));
    }

    /// Whether a violation was already recorded at exactly `path`.
    pub(crate) fn has_violation_at(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path == path)
    }

    /// Require `value` to be an object.
    pub(crate) fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            other => {
                self.violation(path, expected("object", other));
                None
            }
        }
    }

    /// Present, non-null value for `key`; `null` counts as absent.
    fn present<'v>(obj: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
        obj.get(key).filter(|v| !v.is_null())
    }

    pub(crate) fn required_str(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> String {
        let field_path = child_path(path, key);
        match obj.get(key) {
            None => {
                self.violation(&field_path, "required field is missing");
                String::new()
            }
            Some(value) => self.string(value, &field_path).unwrap_or_default(),
        }
    }

    pub(crate) fn optional_str(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        key: &str,
    ) -> Option<String> {
        let value = Self::present(obj, key)?;
        self.string(value, &child_path(path, key))
    }

    /// Optional string that defaults to "" when absent.
    pub(crate) fn str_or_default(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> String {
        self.optional_str(obj, path, key).unwrap_or_default()
    }

    pub(crate) fn string(&mut self, value: &Value, path: &str) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            other => {
                self.violation(path, expected("string", other));
                None
            }
        }
    }

    /// Array field; absent (or null) is `None` and recorded as a violation only when `required`.
    pub(crate) fn array<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        path: &str,
        key: &str,
        required: bool,
    ) -> Option<&'v Vec<Value>> {
        let field_path = child_path(path, key);
        let value = match obj.get(key) {
            None => {
                if required {
                    self.violation(&field_path, "required field is missing");
                }
                return None;
            }
            Some(Value::Null) if !required => return None,
            Some(value) => value,
        };

        match value {
            Value::Array(items) => Some(items),
            other => {
                self.violation(&field_path, expected("array", other));
                None
            }
        }
    }

    /// Array of objects, each read by `read_item` at its indexed path.
    pub(crate) fn object_array<T>(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        key: &str,
        required: bool,
        mut read_item: impl FnMut(&mut Self, &Map<String, Value>, &str) -> T,
    ) -> Vec<T> {
        let field_path = child_path(path, key);
        let Some(items) = self.array(obj, path, key, required) else {
            return Vec::new();
        };

        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let item_path = index_path(&field_path, i);
                let item_obj = self.object(item, &item_path)?;
                Some(read_item(self, item_obj, &item_path))
            })
            .collect()
    }

    /// Optional array of strings that defaults to empty.
    pub(crate) fn string_array(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> Vec<String> {
        let field_path = child_path(path, key);
        let Some(items) = self.array(obj, path, key, false) else {
            return Vec::new();
        };

        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| self.string(item, &index_path(&field_path, i)))
            .collect()
    }

    /// Non-negative integer. Integral floats such as `2.0` are accepted.
    pub(crate) fn integer(&mut self, value: &Value, path: &str) -> Option<u32> {
        let Value::Number(n) = value else {
            self.violation(path, expected("integer", value));
            return None;
        };

        let parsed = n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
                .map(|f| f as u64)
        });

        match parsed.and_then(|v| u32::try_from(v).ok()) {
            Some(v) => Some(v),
            None => {
                self.violation(path, format!("expected non-negative integer, found {}", n));
                None
            }
        }
    }

    pub(crate) fn required_integer(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> u32 {
        let field_path = child_path(path, key);
        match obj.get(key) {
            None => {
                self.violation(&field_path, "required field is missing");
                0
            }
            Some(value) => self.integer(value, &field_path).unwrap_or_default(),
        }
    }

    pub(crate) fn optional_integer(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        key: &str,
    ) -> Option<u32> {
        let value = Self::present(obj, key)?;
        self.integer(value, &child_path(path, key))
    }

    /// Nested object field that may be absent; `None` when absent or invalid.
    pub(crate) fn optional_object<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        path: &str,
        key: &str,
    ) -> Option<&'v Map<String, Value>> {
        let value = Self::present(obj, key)?;
        self.object(value, &child_path(path, key))
    }

    /// The violations recorded so far, as an error.
    pub(crate) fn into_error(self, schema: &'static str) -> WorkflowError {
        WorkflowError::SchemaViolation {
            schema,
            violations: self.violations,
        }
    }

    /// Succeed with `value` if nothing was recorded.
    pub(crate) fn finish<T>(self, schema: &'static str, value: T) -> Result<T, WorkflowError> {
        if self.violations.is_empty() {
            Ok(value)
        } else {
            Err(self.into_error(schema))
        }
    }
}

pub(crate) fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

pub(crate) fn index_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expected(what: &str, found: &Value) -> String {
    format!("expected {}, found {}", what, json_type(found))
}
