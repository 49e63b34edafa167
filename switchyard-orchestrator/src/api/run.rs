//! Run API Handlers
//!
//! HTTP endpoints for dispatching services and polling their results.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use switchyard_core::dto::run::{
    DispatchOutcome, ResultQuery, ResultResponse, RunServiceRequest, RunTaskRequest,
};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::result_service;

// =============================================================================
// Dispatch Endpoints
// =============================================================================

/// POST /rest/run_service
/// Run a service inline, or in the background when `async` is set
///
/// Unresolved targets are reported in `errors` with status 200.
pub async fn run_service(
    State(state): State<AppState>,
    Json(req): Json<RunServiceRequest>,
) -> ApiResult<Json<DispatchOutcome>> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Service name cannot be empty".to_string()));
    }

    tracing::info!("Run requested for service: {}", req.name);

    let outcome = state.dispatcher.dispatch_service(req).await?;

    Ok(Json(outcome))
}

/// POST /rest/run_task
/// Run a scheduled task now; always in the background
pub async fn run_task(
    State(state): State<AppState>,
    Json(req): Json<RunTaskRequest>,
) -> ApiResult<(StatusCode, Json<DispatchOutcome>)> {
    tracing::info!("Run requested for task: {}", req.task_id);

    let runtime = state.dispatcher.dispatch_task(req.task_id).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DispatchOutcome::Started {
            runtime,
            errors: Vec::new(),
        }),
    ))
}

// =============================================================================
// Result Endpoints
// =============================================================================

/// GET /rest/result?name=<service>&runtime=<token>
/// Get the status and result of one run
pub async fn get_result(
    State(state): State<AppState>,
    Query(query): Query<ResultQuery>,
) -> ApiResult<Json<ResultResponse>> {
    tracing::debug!("Getting result of {} at {}", query.name, query.runtime);

    let response = result_service::lookup(state.runs.as_ref(), &query).await?;

    Ok(Json(response))
}
