//! Run DTOs for the REST interface

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::domain::run::{ExecutionResult, RunStatus};
use crate::runtime::RuntimeToken;

/// Message returned when a (service, runtime) pair has no recorded run
pub const NO_RESULTS_MESSAGE: &str =
    "There are no results or on-going services for the requested service and runtime.";

/// Placeholder result of a run that has not finished yet
pub const NO_RESULTS_YET: &str = "No results yet.";

/// Raw target specifiers supplied by a caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    #[serde(default)]
    pub devices: Vec<String>,

    #[serde(default)]
    pub ip_addresses: Vec<String>,

    #[serde(default)]
    pub pools: Vec<String>,
}

/// Request to run a service
///
/// Any field not listed here is kept as caller payload and made available to
/// templates as `payload.<key>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunServiceRequest {
    pub name: String,

    #[serde(default)]
    pub devices: Vec<String>,

    #[serde(default)]
    pub ip_addresses: Vec<String>,

    #[serde(default)]
    pub pools: Vec<String>,

    /// Return immediately with a runtime token instead of waiting
    #[serde(default, rename = "async")]
    pub run_async: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,

    #[serde(flatten)]
    pub payload: Map<String, JsonValue>,
}

impl RunServiceRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            devices: Vec::new(),
            ip_addresses: Vec::new(),
            pools: Vec::new(),
            run_async: false,
            creator: None,
            payload: Map::new(),
        }
    }

    pub fn targets(&self) -> TargetSpec {
        TargetSpec {
            devices: self.devices.clone(),
            ip_addresses: self.ip_addresses.clone(),
            pools: self.pools.clone(),
        }
    }
}

/// Request to run a scheduled task now
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTaskRequest {
    pub task_id: Uuid,
}

/// Response to a run request
///
/// Variant order matters for deserialization: the most specific shape first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DispatchOutcome {
    /// Synchronous run finished
    Completed {
        #[serde(flatten)]
        result: ExecutionResult,
        runtime: RuntimeToken,
        errors: Vec<String>,
    },

    /// Asynchronous run started
    Started {
        runtime: RuntimeToken,
        errors: Vec<String>,
    },

    /// Target resolution failed; nothing was executed
    Rejected { errors: Vec<String> },
}

impl DispatchOutcome {
    pub fn errors(&self) -> &[String] {
        match self {
            DispatchOutcome::Completed { errors, .. }
            | DispatchOutcome::Started { errors, .. }
            | DispatchOutcome::Rejected { errors } => errors,
        }
    }

    pub fn runtime(&self) -> Option<&RuntimeToken> {
        match self {
            DispatchOutcome::Completed { runtime, .. }
            | DispatchOutcome::Started { runtime, .. } => Some(runtime),
            DispatchOutcome::Rejected { .. } => None,
        }
    }
}

/// Query identifying one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultQuery {
    pub name: String,
    pub runtime: RuntimeToken,
}

/// Response to a result lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultResponse {
    Found { status: RunStatus, result: JsonValue },
    Missing { error: String },
}

impl ResultResponse {
    pub fn missing() -> Self {
        ResultResponse::Missing {
            error: NO_RESULTS_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_service_request_keeps_extra_fields_as_payload() {
        let req: RunServiceRequest = serde_json::from_value(json!({
            "name": "backup",
            "devices": ["r1"],
            "async": true,
            "vlan": 42
        }))
        .unwrap();

        assert_eq!(req.name, "backup");
        assert!(req.run_async);
        assert_eq!(req.targets().devices, vec!["r1".to_string()]);
        assert!(req.targets().pools.is_empty());
        assert_eq!(req.payload.get("vlan"), Some(&json!(42)));
        assert!(!req.payload.contains_key("async"));
    }

    #[test]
    fn test_dispatch_outcome_shapes() {
        let rejected = DispatchOutcome::Rejected {
            errors: vec!["No device with the name 'x'".to_string()],
        };
        assert_eq!(
            serde_json::to_value(&rejected).unwrap(),
            json!({ "errors": ["No device with the name 'x'"] })
        );

        let started = DispatchOutcome::Started {
            runtime: RuntimeToken::from("2026-01-01 00:00:00.000001"),
            errors: vec![],
        };
        assert_eq!(
            serde_json::to_value(&started).unwrap(),
            json!({ "runtime": "2026-01-01 00:00:00.000001", "errors": [] })
        );

        let completed = DispatchOutcome::Completed {
            result: ExecutionResult::success(json!({ "version": "1.2" })).with_url("http://r1"),
            runtime: RuntimeToken::from("2026-01-01 00:00:00.000002"),
            errors: vec![],
        };
        let value = serde_json::to_value(&completed).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["url"], json!("http://r1"));
        assert_eq!(value["result"]["version"], json!("1.2"));
    }

    #[test]
    fn test_dispatch_outcome_deserializes_most_specific_variant() {
        let completed: DispatchOutcome = serde_json::from_value(json!({
            "success": false,
            "result": { "error": "boom" },
            "runtime": "2026-01-01 00:00:00.000002",
            "errors": []
        }))
        .unwrap();
        assert!(matches!(completed, DispatchOutcome::Completed { .. }));

        let started: DispatchOutcome = serde_json::from_value(json!({
            "runtime": "2026-01-01 00:00:00.000001",
            "errors": []
        }))
        .unwrap();
        assert!(matches!(started, DispatchOutcome::Started { .. }));

        let rejected: DispatchOutcome =
            serde_json::from_value(json!({ "errors": ["nope"] })).unwrap();
        assert_eq!(rejected.errors(), ["nope".to_string()]);
        assert!(rejected.runtime().is_none());
    }

    #[test]
    fn test_result_response_shapes() {
        assert_eq!(
            serde_json::to_value(ResultResponse::missing()).unwrap(),
            json!({ "error": NO_RESULTS_MESSAGE })
        );

        let found: ResultResponse = serde_json::from_value(json!({
            "status": "Running",
            "result": NO_RESULTS_YET
        }))
        .unwrap();
        assert_eq!(
            found,
            ResultResponse::Found {
                status: RunStatus::Running,
                result: json!(NO_RESULTS_YET),
            }
        );
    }
}
