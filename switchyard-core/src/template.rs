//! Variable substitution
//!
//! Expands `{{ name }}` placeholders against an explicit binding environment.
//! Only variables the caller placed in [`Bindings`] can be substituted; an
//! unknown placeholder is an error rather than being left in place.

use regex::{Captures, Regex};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

/// Matches `{{ name }}` where name is a dotted identifier
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)\s*\}\}")
        .expect("valid regex")
});

/// Substitution failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubstitutionError {
    #[error("Unknown template variable '{0}'")]
    UnknownVariable(String),
}

/// Template variable environment
///
/// A mapping from variable name to string value, built deliberately by the
/// dispatcher for each execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    vars: BTreeMap<String, String>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable, returning the extended environment
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Adds every scalar top-level entry of a JSON object under `prefix.`
    ///
    /// Nested objects, arrays and nulls are not bindable.
    pub fn insert_scalars(&mut self, prefix: &str, values: &serde_json::Map<String, JsonValue>) {
        for (key, value) in values {
            let rendered = match value {
                JsonValue::String(s) => s.clone(),
                JsonValue::Number(n) => n.to_string(),
                JsonValue::Bool(b) => b.to_string(),
                _ => continue,
            };
            self.insert(format!("{}.{}", prefix, key), rendered);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

/// Returns true if the text contains at least one placeholder
pub fn has_placeholders(text: &str) -> bool {
    PLACEHOLDER_RE.is_match(text)
}

/// Expands every placeholder in `template`
pub fn substitute(template: &str, bindings: &Bindings) -> Result<String, SubstitutionError> {
    let mut missing = None;

    let expanded = PLACEHOLDER_RE.replace_all(template, |caps: &Captures| {
        let name = &caps[1];
        match bindings.get(name) {
            Some(value) => value.to_string(),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(SubstitutionError::UnknownVariable(name)),
        None => Ok(expanded.into_owned()),
    }
}

/// Expands placeholders in every string leaf of a JSON value
pub fn substitute_json(
    value: &JsonValue,
    bindings: &Bindings,
) -> Result<JsonValue, SubstitutionError> {
    Ok(match value {
        JsonValue::String(s) => JsonValue::String(substitute(s, bindings)?),
        JsonValue::Array(items) => JsonValue::Array(
            items
                .iter()
                .map(|item| substitute_json(item, bindings))
                .collect::<Result<_, _>>()?,
        ),
        JsonValue::Object(map) => JsonValue::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), substitute_json(v, bindings)?)))
                .collect::<Result<_, SubstitutionError>>()?,
        ),
        other => other.clone(),
    })
}
