//! Review Record — the validated result of the structured `evaluate_resume` call.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::review::schema::{is_review_field, REVIEW_FIELDS};

/// Optional narrative spillover the model may add next to the declared fields.
pub const REVIEW_TEXT_FIELD: &str = "review_text";

/// Why a structured response did not produce a usable record.
#[derive(Debug, Error)]
pub enum ExtractionFailure {
    #[error("response contained no function call")]
    NoFunctionCall,

    #[error("model invoked unexpected function '{0}'")]
    UnexpectedFunction(String),

    #[error("function arguments are not valid JSON: {0}")]
    MalformedArguments(#[from] serde_json::Error),

    #[error("function arguments are not a JSON object")]
    NotAnObject,

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// All twenty declared fields, in the order the model returned them, followed
/// by `review_text` when the model supplied one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReviewRecord(Map<String, Value>);

impl ReviewRecord {
    /// Decodes and validates the JSON-encoded function arguments.
    ///
    /// Validity is all-or-nothing: any missing (or null) declared field
    /// rejects the whole record. Keys that are neither declared nor
    /// `review_text` are dropped.
    pub fn from_arguments(arguments: &str) -> Result<Self, ExtractionFailure> {
        let value: Value = serde_json::from_str(arguments)?;
        let Value::Object(fields) = value else {
            return Err(ExtractionFailure::NotAnObject);
        };

        let missing: Vec<&'static str> = REVIEW_FIELDS
            .iter()
            .map(|f| f.name)
            .filter(|name| fields.get(*name).map_or(true, Value::is_null))
            .collect();
        if !missing.is_empty() {
            return Err(ExtractionFailure::MissingFields(missing));
        }

        let mut ordered = Map::new();
        let mut review_text = None;
        for (key, value) in fields {
            if key == REVIEW_TEXT_FIELD {
                review_text = Some(value);
            } else if is_review_field(&key) {
                ordered.insert(key, value);
            }
        }
        if let Some(review_text) = review_text {
            ordered.insert(REVIEW_TEXT_FIELD.to_string(), review_text);
        }

        Ok(Self(ordered))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// The narrative spillover, if the model supplied a non-blank one.
    pub fn review_text(&self) -> Option<&str> {
        self.0
            .get(REVIEW_TEXT_FIELD)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn overall_score(&self) -> Option<f64> {
        self.0.get("overall_score").and_then(Value::as_f64)
    }
}
