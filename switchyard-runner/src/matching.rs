//! Success matching
//!
//! Classifies a job result as successful by looking for the match expression
//! in the stringified result, either as a literal substring or as a regular
//! expression.
//!
//! An empty expression is contained in every result, so it always succeeds in
//! both modes.

use regex::Regex;
use serde_json::Value as JsonValue;
use switchyard_core::domain::job::MatchMode;

/// Renders a result the way match expressions see it
///
/// JSON strings are used verbatim; anything else is rendered as compact JSON.
pub fn stringify(result: &JsonValue) -> String {
    match result {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Evaluates the match expression against a result
///
/// Fails only when a regex expression does not compile.
pub fn evaluate(
    mode: MatchMode,
    expression: &str,
    result: &JsonValue,
) -> Result<bool, regex::Error> {
    let haystack = stringify(result);

    match mode {
        MatchMode::Substring => Ok(haystack.contains(expression)),
        MatchMode::Regex => Ok(Regex::new(expression)?.is_match(&haystack)),
    }
}
