//! Result Service
//!
//! Looks up a run by (service name, runtime token) for polling callers.

use serde_json::json;
use switchyard_core::dto::run::{NO_RESULTS_YET, ResultQuery, ResultResponse};

use crate::repository::{RunRepository, StoreError};

/// Returns the status and result of a run
///
/// An unknown (service, runtime) pair is reported as data, not as an error.
pub async fn lookup(
    runs: &dyn RunRepository,
    query: &ResultQuery,
) -> Result<ResultResponse, StoreError> {
    let Some(run) = runs.find_run(&query.name, &query.runtime).await? else {
        tracing::debug!("No run of '{}' at {}", query.name, query.runtime);
        return Ok(ResultResponse::missing());
    };

    let result = match run.result {
        Some(result) => serde_json::to_value(result)
            .map_err(|e| StoreError::Corrupt(format!("run result: {}", e)))?,
        None => json!(NO_RESULTS_YET),
    };

    Ok(ResultResponse::Found {
        status: run.status,
        result,
    })
}
