use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::llm::LlmError;

/// A single field that failed schema validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// JSON path of the offending field, e.g. `steps[2].instruction`. `$` is the root.
    pub path: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Errors that terminate a workflow invocation.
///
/// None of these are recovered from inside the workflow; they propagate to the
/// caller with enough context (agent name, field paths, raw model text) to
/// find the root cause.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Missing input for {step}: {what}")]
    MissingInput {
        step: &'static str,
        what: &'static str,
    },

    #[error("Agent not found: {0}")]
    Lookup(String),

    #[error("Agent {agent} returned an empty response")]
    EmptyGeneration { agent: String },

    #[error("Failed to parse model output as JSON: {message}\nRaw output: {raw}")]
    MalformedModelOutput { message: String, raw: String },

    #[error("{schema} failed validation: {}", format_violations(.violations))]
    SchemaViolation {
        schema: &'static str,
        violations: Vec<FieldViolation>,
    },

    #[error("Agent {agent} did not respond within {timeout:?}")]
    GenerationTimeout { agent: String, timeout: Duration },

    #[error("Agent {agent} failed to generate: {source}")]
    Generation {
        agent: String,
        #[source]
        source: LlmError,
    },
}

impl WorkflowError {
    /// Field paths reported by a `SchemaViolation`, empty for every other kind.
    pub fn violation_paths(&self) -> Vec<&str> {
        match self {
            WorkflowError::SchemaViolation { violations, .. } => {
                violations.iter().map(|v| v.path.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
