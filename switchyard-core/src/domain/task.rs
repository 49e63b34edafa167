//! Task domain types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

/// A persisted schedule entry that triggers a service run
///
/// The target set is stored as identifiers, so runs started from a task
/// skip target resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub service_name: String,

    /// User who last (re)scheduled the task; recorded as the run creator
    pub last_scheduled_by: String,

    /// Payload merged into every run started by this task
    #[serde(default)]
    pub initial_payload: Map<String, JsonValue>,

    #[serde(default)]
    pub devices: Vec<Uuid>,

    #[serde(default)]
    pub pools: Vec<Uuid>,
}
