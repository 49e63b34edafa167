//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod health;
pub mod run;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::repository::RunRepository;
use crate::service::JobDispatcher;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: JobDispatcher,
    pub runs: Arc<dyn RunRepository>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Dispatch endpoints
        .route("/rest/run_service", post(run::run_service))
        .route("/rest/run_task", post(run::run_task))
        // Result endpoints
        .route("/rest/result", get(run::get_result))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::MemoryStore;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Map, Value as JsonValue, json};
    use switchyard_core::domain::job::{
        HttpCallConfig, HttpVerb, JobConfig, JobDefinition, JobKind, MatchMode,
    };
    use switchyard_core::domain::run::ExecutionResult;
    use switchyard_core::domain::task::Task;
    use switchyard_core::dto::run::NO_RESULTS_MESSAGE;
    use switchyard_core::template::Bindings;
    use switchyard_runner::{ExecutorRegistry, JobExecutor};
    use tower::ServiceExt;
    use uuid::Uuid;

    struct OkExecutor;

    #[async_trait]
    impl JobExecutor for OkExecutor {
        fn kind(&self) -> JobKind {
            JobKind::HttpCall
        }

        async fn execute(&self, _job: &JobDefinition, bindings: &Bindings) -> ExecutionResult {
            ExecutionResult::success(json!({ "device": bindings.get("device.name") }))
                .with_url("http://device.test/api")
        }
    }

    fn router() -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.add_device("r1", "10.0.0.1");
        store.add_service(JobDefinition {
            id: Uuid::new_v4(),
            name: "backup".to_string(),
            description: None,
            multiprocessing: false,
            config: JobConfig::HttpCall(HttpCallConfig {
                call_type: HttpVerb::Get,
                url: "http://device.test/api".to_string(),
                payload: Map::new(),
                credentials: None,
                convert_to_xml: false,
                content_match: String::new(),
                match_mode: MatchMode::Substring,
            }),
        });

        let mut executors = ExecutorRegistry::new();
        executors.register(Arc::new(OkExecutor));

        let dispatcher =
            JobDispatcher::new(store.clone(), store.clone(), store.clone(), executors, 2);
        let state = AppState {
            dispatcher,
            runs: store.clone(),
        };

        (create_router(state), store)
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, JsonValue) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: JsonValue) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = router();
        let response = router.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_run_service_sync() {
        let (router, _) = router();
        let (status, body) = send(
            router,
            post_json("/rest/run_service", json!({ "name": "backup", "devices": ["r1"] })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["errors"], json!([]));
        assert!(body["runtime"].is_string());
        assert_eq!(body["result"]["devices"]["r1"]["result"]["device"], json!("r1"));
    }

    #[tokio::test]
    async fn test_run_service_async_returns_token_only() {
        let (router, _) = router();
        let (status, body) = send(
            router,
            post_json("/rest/run_service", json!({ "name": "backup", "async": true })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["runtime"].is_string());
        assert_eq!(body["errors"], json!([]));
        assert!(body.get("result").is_none());
        assert!(body.get("success").is_none());
    }

    #[tokio::test]
    async fn test_run_service_reports_resolution_errors() {
        let (router, store) = router();
        let (status, body) = send(
            router,
            post_json(
                "/rest/run_service",
                json!({ "name": "backup", "devices": ["r1", "ghost"] }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "errors": ["No device with the name 'ghost'"] }));
        assert_eq!(store.run_count(), 0);
    }

    #[tokio::test]
    async fn test_run_service_unknown_service_is_404() {
        let (router, _) = router();
        let (status, body) = send(
            router,
            post_json("/rest/run_service", json!({ "name": "missing" })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], json!("Service 'missing' not found"));
    }

    #[tokio::test]
    async fn test_run_service_empty_name_is_400() {
        let (router, _) = router();
        let (status, _) = send(router, post_json("/rest/run_service", json!({ "name": " " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_run_task_is_accepted() {
        let (router, store) = router();
        let task = Task {
            id: Uuid::new_v4(),
            name: "nightly".to_string(),
            service_name: "backup".to_string(),
            last_scheduled_by: "ops".to_string(),
            initial_payload: Map::new(),
            devices: Vec::new(),
            pools: Vec::new(),
        };
        store.add_task(task.clone());

        let (status, body) = send(
            router.clone(),
            post_json("/rest/run_task", json!({ "task_id": task.id })),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(body["runtime"].is_string());

        let (status, _) = send(
            router,
            post_json("/rest/run_task", json!({ "task_id": Uuid::new_v4() })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_result_lookup() {
        let (router, _) = router();

        let (status, body) = send(
            router.clone(),
            get_request("/rest/result?name=backup&runtime=2026-01-01%2000:00:00.000001"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "error": NO_RESULTS_MESSAGE }));

        let (_, dispatched) = send(
            router.clone(),
            post_json("/rest/run_service", json!({ "name": "backup" })),
        )
        .await;
        let runtime = dispatched["runtime"].as_str().unwrap().replace(' ', "%20");

        let (status, body) = send(
            router,
            get_request(&format!("/rest/result?name=backup&runtime={}", runtime)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("Succeeded"));
        assert_eq!(body["result"]["success"], json!(true));
        assert_eq!(body["result"]["url"], json!("http://device.test/api"));
    }
}
