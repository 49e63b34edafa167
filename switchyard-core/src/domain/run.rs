//! Run domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};
use uuid::Uuid;

use crate::runtime::RuntimeToken;

/// One execution instance of a job
///
/// Identified by (service name, runtime token). Created at dispatch time with
/// status `Pending`; status and result are written by the execution unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub runtime: RuntimeToken,
    pub service_name: String,
    pub creator: String,
    pub trigger: Trigger,
    pub status: RunStatus,
    pub target_devices: Vec<Uuid>,
    pub target_pools: Vec<Uuid>,

    /// Caller-supplied payload
    pub payload: Map<String, JsonValue>,

    /// Task that triggered this run, if scheduled
    pub task: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<ExecutionResult>,
}

impl Run {
    /// Creates a pending run
    pub fn pending(
        runtime: RuntimeToken,
        service_name: impl Into<String>,
        creator: impl Into<String>,
        trigger: Trigger,
    ) -> Self {
        Self {
            runtime,
            service_name: service_name.into(),
            creator: creator.into(),
            trigger,
            status: RunStatus::Pending,
            target_devices: Vec::new(),
            target_pools: Vec::new(),
            payload: Map::new(),
            task: None,
            created_at: Utc::now(),
            completed_at: None,
            result: None,
        }
    }

    pub fn has_targets(&self) -> bool {
        !self.target_devices.is_empty() || !self.target_pools.is_empty()
    }
}

/// Run lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl RunStatus {
    /// Terminal status for an execution outcome
    pub fn from_success(success: bool) -> Self {
        if success {
            RunStatus::Succeeded
        } else {
            RunStatus::Failed
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Succeeded | RunStatus::Failed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Pending => write!(f, "Pending"),
            RunStatus::Running => write!(f, "Running"),
            RunStatus::Succeeded => write!(f, "Succeeded"),
            RunStatus::Failed => write!(f, "Failed"),
        }
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(RunStatus::Pending),
            "Running" => Ok(RunStatus::Running),
            "Succeeded" => Ok(RunStatus::Succeeded),
            "Failed" => Ok(RunStatus::Failed),
            other => Err(format!("Unknown run status '{}'", other)),
        }
    }
}

/// What started a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    /// Called through the REST API
    Rest,

    /// Started from a scheduled task
    Scheduler,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::Rest => write!(f, "REST"),
            Trigger::Scheduler => write!(f, "Scheduler"),
        }
    }
}

impl std::str::FromStr for Trigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REST" => Ok(Trigger::Rest),
            "Scheduler" => Ok(Trigger::Scheduler),
            other => Err(format!("Unknown trigger '{}'", other)),
        }
    }
}

/// Outcome of one job executor invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,

    /// Job-specific payload; the parsed response body for HTTP calls
    pub result: JsonValue,

    /// Fully substituted request URL (HTTP-call jobs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ExecutionResult {
    pub fn success(result: JsonValue) -> Self {
        Self {
            success: true,
            result,
            url: None,
        }
    }

    /// Failed result carrying a diagnostic under `error`
    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            result: json!({ "error": error.to_string() }),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Aggregates per-device results into a single run result
    ///
    /// The run succeeds only if every device succeeded. Each device keeps its
    /// own substituted `url` under `result.devices`; the aggregate has none.
    pub fn from_devices(results: Vec<(String, ExecutionResult)>) -> Self {
        let success = results.iter().all(|(_, r)| r.success);
        let devices: Map<String, JsonValue> = results
            .into_iter()
            .map(|(name, r)| (name, serde_json::to_value(r).unwrap_or(JsonValue::Null)))
            .collect();

        Self {
            success,
            result: json!({ "devices": devices }),
            url: None,
        }
    }
}
