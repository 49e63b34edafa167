//! Run-related API endpoints

use crate::SwitchyardClient;
use crate::error::Result;
use switchyard_core::dto::run::{
    DispatchOutcome, ResultResponse, RunServiceRequest, RunTaskRequest,
};
use switchyard_core::runtime::RuntimeToken;
use uuid::Uuid;

impl SwitchyardClient {
    // =============================================================================
    // Dispatch
    // =============================================================================

    /// Run a service
    ///
    /// # Arguments
    /// * `req` - Service name, targets, payload and the `async` flag
    ///
    /// # Returns
    /// The dispatch outcome; unresolved targets come back as
    /// [`DispatchOutcome::Rejected`] rather than as an error
    pub async fn run_service(&self, req: &RunServiceRequest) -> Result<DispatchOutcome> {
        let url = format!("{}/rest/run_service", self.base_url);
        tracing::debug!("Running service '{}'", req.name);
        let response = self.client.post(&url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Run a scheduled task now
    ///
    /// # Returns
    /// The runtime token of the background run
    pub async fn run_task(&self, task_id: Uuid) -> Result<DispatchOutcome> {
        let url = format!("{}/rest/run_task", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&RunTaskRequest { task_id })
            .send()
            .await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Results
    // =============================================================================

    /// Get the status and result of one run
    ///
    /// # Arguments
    /// * `name` - The service name
    /// * `runtime` - The runtime token returned at dispatch
    pub async fn get_result(&self, name: &str, runtime: &RuntimeToken) -> Result<ResultResponse> {
        let url = format!("{}/rest/result", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("name", name), ("runtime", runtime.as_str())])
            .send()
            .await?;

        self.handle_response(response).await
    }
}
