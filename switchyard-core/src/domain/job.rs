//! Job definition domain types
//!
//! A job ("service") is a named, typed automation definition. The job type is
//! a tagged variant: the discriminator selects the executor and carries the
//! type-specific configuration.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;
use uuid::Uuid;

use crate::template;

/// Immutable description of one automation job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDefinition {
    pub id: Uuid,

    /// Unique job name, also the first half of the run retrieval key
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Run per-device executions concurrently instead of one after another
    #[serde(default)]
    pub multiprocessing: bool,

    pub config: JobConfig,
}

impl JobDefinition {
    /// Discriminator of the configured job type
    pub fn kind(&self) -> JobKind {
        self.config.kind()
    }

    /// Validates the definition
    ///
    /// Called when a definition is stored and again by executors before a
    /// run, so an invalid definition fails the run instead of being guessed at.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        match &self.config {
            JobConfig::HttpCall(config) => config.validate(),
        }
    }
}

/// Type-specific job configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobConfig {
    HttpCall(HttpCallConfig),
}

impl JobConfig {
    pub fn kind(&self) -> JobKind {
        match self {
            JobConfig::HttpCall(_) => JobKind::HttpCall,
        }
    }
}

/// Job type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    HttpCall,
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobKind::HttpCall => write!(f, "http_call"),
        }
    }
}

/// Configuration of an HTTP-call job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpCallConfig {
    pub call_type: HttpVerb,

    /// URL template, expanded against the run bindings
    pub url: String,

    /// Payload template; string leaves are expanded against the run bindings
    #[serde(default)]
    pub payload: Map<String, JsonValue>,

    #[serde(default)]
    pub credentials: Option<Credentials>,

    /// Encode the payload as XML instead of JSON
    #[serde(default)]
    pub convert_to_xml: bool,

    /// Success-match template, expanded against the bindings plus `result`
    #[serde(default)]
    pub content_match: String,

    #[serde(default)]
    pub match_mode: MatchMode,
}

impl HttpCallConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingUrl);
        }

        // Templated patterns can only be checked once expanded
        if self.match_mode == MatchMode::Regex && !template::has_placeholders(&self.content_match)
        {
            regex::Regex::new(&self.content_match)
                .map_err(|e| ValidationError::InvalidPattern(e.to_string()))?;
        }

        Ok(())
    }
}

/// HTTP verb of an HTTP-call job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    /// GET and DELETE send no payload and ask for JSON explicitly
    pub fn sends_payload(&self) -> bool {
        matches!(self, HttpVerb::Post | HttpVerb::Put)
    }
}

impl std::fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpVerb::Get => write!(f, "GET"),
            HttpVerb::Post => write!(f, "POST"),
            HttpVerb::Put => write!(f, "PUT"),
            HttpVerb::Delete => write!(f, "DELETE"),
        }
    }
}

/// Basic-auth credentials
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// How the success-match expression is applied to the stringified result
///
/// Exactly one mode is active per job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Expression must occur as a literal substring
    #[default]
    Substring,

    /// Expression is a regular expression searched anywhere in the result
    Regex,
}

/// Invalid job definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Job name cannot be empty")]
    EmptyName,

    #[error("HTTP call job requires a URL")]
    MissingUrl,

    #[error("Invalid content match pattern: {0}")]
    InvalidPattern(String),
}
