//! HTTP-call executor
//!
//! Performs one HTTP request per execution:
//! - URL and payload templates are expanded against the run bindings
//! - GET/DELETE ask for JSON; POST/PUT send the payload as JSON or XML
//! - The response body is parsed as JSON whatever the status code
//! - Success is decided by the job's match expression, expanded against the
//!   bindings plus `result`

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value as JsonValue;
use switchyard_core::domain::job::{HttpCallConfig, HttpVerb, JobConfig, JobDefinition, JobKind};
use switchyard_core::domain::run::ExecutionResult;
use switchyard_core::template::{self, Bindings};
use tracing::{debug, warn};

use crate::config::ExecutorConfig;
use crate::matching;
use crate::payload;
use crate::service::execution::JobExecutor;

/// Executor for `http_call` jobs
#[derive(Clone)]
pub struct HttpCallExecutor {
    client: Client,
}

impl HttpCallExecutor {
    /// Creates an executor with its own HTTP client
    pub fn new(config: &ExecutorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_client(client))
    }

    /// Creates an executor sharing an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Sends the request and parses the response body
    async fn call(&self, config: &HttpCallConfig, url: &str, bindings: &Bindings) -> Result<JsonValue> {
        let mut request = self.client.request(method(config.call_type), url);

        if config.call_type.sends_payload() {
            let template = JsonValue::Object(config.payload.clone());
            let expanded = template::substitute_json(&template, bindings)?;
            let encoded = payload::encode(&expanded, config.convert_to_xml)?;
            request = request
                .header(CONTENT_TYPE, encoded.content_type)
                .body(encoded.body);
        } else {
            request = request.header(ACCEPT, "application/json");
        }

        if let Some(credentials) = &config.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("{} {} failed", config.call_type, url))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .context("Failed to read response body")?;

        debug!("{} {} returned {}", config.call_type, url, status);

        serde_json::from_slice(&body)
            .with_context(|| format!("Response body is not valid JSON (status {})", status))
    }
}

fn method(verb: HttpVerb) -> Method {
    match verb {
        HttpVerb::Get => Method::GET,
        HttpVerb::Post => Method::POST,
        HttpVerb::Put => Method::PUT,
        HttpVerb::Delete => Method::DELETE,
    }
}

#[async_trait]
impl JobExecutor for HttpCallExecutor {
    fn kind(&self) -> JobKind {
        JobKind::HttpCall
    }

    async fn execute(&self, job: &JobDefinition, bindings: &Bindings) -> ExecutionResult {
        if let Err(e) = job.validate() {
            warn!("Refusing to run job '{}': {}", job.name, e);
            return ExecutionResult::failed(format!("Invalid job definition: {}", e));
        }

        let JobConfig::HttpCall(config) = &job.config;

        let url = match template::substitute(&config.url, bindings) {
            Ok(url) => url,
            Err(e) => return ExecutionResult::failed(e),
        };

        let result = match self.call(config, &url, bindings).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Job '{}' call to {} failed: {:#}", job.name, url, e);
                return ExecutionResult::failed(format!("{:#}", e)).with_url(url);
            }
        };

        let match_bindings = bindings
            .clone()
            .with("result", matching::stringify(&result));

        let expression = match template::substitute(&config.content_match, &match_bindings) {
            Ok(expression) => expression,
            Err(e) => return ExecutionResult::failed(e).with_url(url),
        };

        match matching::evaluate(config.match_mode, &expression, &result) {
            Ok(success) => ExecutionResult {
                success,
                result,
                url: Some(url),
            },
            Err(e) => ExecutionResult::failed(format!("Invalid content match pattern: {}", e))
                .with_url(url),
        }
    }
}
