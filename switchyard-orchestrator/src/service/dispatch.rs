//! Job Dispatcher
//!
//! Resolves targets, mints a runtime token and records a pending run, then
//! either executes the run inline or hands it to the background pool.
//!
//! Background runs are plain tokio tasks gated by a semaphore sized by
//! `max_background_runs`; a task waiting for a permit stays queued. They
//! report only through the run store, so their store failures are logged and
//! never reach the original caller.

use std::sync::Arc;
use switchyard_core::domain::inventory::Device;
use switchyard_core::domain::job::JobDefinition;
use switchyard_core::domain::run::{ExecutionResult, Run, RunStatus, Trigger};
use switchyard_core::dto::run::{DispatchOutcome, RunServiceRequest};
use switchyard_core::runtime::{RuntimeToken, RuntimeTokenGenerator};
use switchyard_core::template::Bindings;
use switchyard_runner::ExecutorRegistry;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::repository::{InventoryRepository, RunRepository, ServiceRepository, StoreError};
use crate::service::resolver;

/// Creator recorded when a REST caller does not name one
pub const DEFAULT_CREATOR: &str = "admin";

/// Dispatch failure
///
/// Unresolved targets are not an error: they come back as
/// [`DispatchOutcome::Rejected`].
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Service '{0}' not found")]
    ServiceNotFound(String),

    #[error("Task {0} not found")]
    TaskNotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Execution task failed: {0}")]
    Execution(String),
}

/// Dispatches runs of job definitions
///
/// Cheap to clone; clones share the token generator and background pool.
#[derive(Clone)]
pub struct JobDispatcher {
    inventory: Arc<dyn InventoryRepository>,
    services: Arc<dyn ServiceRepository>,
    runs: Arc<dyn RunRepository>,
    executors: Arc<ExecutorRegistry>,
    tokens: Arc<RuntimeTokenGenerator>,
    background: Arc<Semaphore>,
}

impl JobDispatcher {
    /// Creates a dispatcher
    ///
    /// # Arguments
    /// * `inventory` - Device and pool lookups
    /// * `services` - Job definition and task lookups
    /// * `runs` - Run persistence
    /// * `executors` - Executors by job type
    /// * `max_background_runs` - Background runs allowed to execute at once
    pub fn new(
        inventory: Arc<dyn InventoryRepository>,
        services: Arc<dyn ServiceRepository>,
        runs: Arc<dyn RunRepository>,
        executors: ExecutorRegistry,
        max_background_runs: usize,
    ) -> Self {
        Self {
            inventory,
            services,
            runs,
            executors: Arc::new(executors),
            tokens: Arc::new(RuntimeTokenGenerator::new()),
            background: Arc::new(Semaphore::new(max_background_runs)),
        }
    }

    /// Runs a service on behalf of a REST caller
    ///
    /// Nothing is recorded when target resolution fails.
    pub async fn dispatch_service(
        &self,
        request: RunServiceRequest,
    ) -> Result<DispatchOutcome, DispatchError> {
        let job = self
            .services
            .service_by_name(&request.name)
            .await?
            .ok_or_else(|| DispatchError::ServiceNotFound(request.name.clone()))?;

        let targets = resolver::resolve(self.inventory.as_ref(), &request.targets()).await?;
        if !targets.is_resolved() {
            return Ok(DispatchOutcome::Rejected {
                errors: targets.errors,
            });
        }

        let creator = request
            .creator
            .unwrap_or_else(|| DEFAULT_CREATOR.to_string());

        let runtime = self.tokens.next();
        let mut run = Run::pending(runtime.clone(), job.name.clone(), creator, Trigger::Rest);
        run.target_devices = targets.devices;
        run.target_pools = targets.pools;
        run.payload = request.payload;

        self.runs.create_run(&run).await?;

        info!(
            "Dispatching '{}' (runtime {}, async: {})",
            job.name, runtime, request.run_async
        );

        if request.run_async {
            self.spawn_background(job, run);
            return Ok(DispatchOutcome::Started {
                runtime,
                errors: Vec::new(),
            });
        }

        // Inline runs execute on their own task; the run outlives a dropped request
        let dispatcher = self.clone();
        let result = tokio::spawn(async move { dispatcher.execute_run(&job, &run).await })
            .await
            .map_err(|e| DispatchError::Execution(e.to_string()))??;

        Ok(DispatchOutcome::Completed {
            result,
            runtime,
            errors: Vec::new(),
        })
    }

    /// Runs the service of a scheduled task in the background
    ///
    /// The task's persisted targets are used as-is, without re-resolution.
    pub async fn dispatch_task(&self, task_id: Uuid) -> Result<RuntimeToken, DispatchError> {
        let task = self
            .services
            .task_by_id(task_id)
            .await?
            .ok_or(DispatchError::TaskNotFound(task_id))?;

        let job = self
            .services
            .service_by_name(&task.service_name)
            .await?
            .ok_or_else(|| DispatchError::ServiceNotFound(task.service_name.clone()))?;

        let runtime = self.tokens.next();
        let mut run = Run::pending(
            runtime.clone(),
            job.name.clone(),
            task.last_scheduled_by,
            Trigger::Scheduler,
        );
        run.target_devices = task.devices;
        run.target_pools = task.pools;
        run.payload = task.initial_payload;
        run.task = Some(task.id);

        self.runs.create_run(&run).await?;

        info!(
            "Dispatching '{}' from task '{}' (runtime {})",
            job.name, task.name, runtime
        );

        self.spawn_background(job, run);

        Ok(runtime)
    }

    /// Spawns a run onto the background pool
    fn spawn_background(&self, job: JobDefinition, run: Run) {
        let dispatcher = self.clone();

        tokio::spawn(async move {
            let _permit = match Arc::clone(&dispatcher.background).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("Background pool closed, dropping run {}: {}", run.runtime, e);
                    return;
                }
            };

            if let Err(e) = dispatcher.execute_run(&job, &run).await {
                error!(
                    "Background run {} of '{}' failed: {}",
                    run.runtime, job.name, e
                );
            }
            // Permit is released when dropped
        });
    }

    /// Executes a recorded run and persists its result
    ///
    /// When a store call fails midway, a failed result is still recorded on a
    /// best-effort basis so the run does not stay `Running`.
    async fn execute_run(
        &self,
        job: &JobDefinition,
        run: &Run,
    ) -> Result<ExecutionResult, StoreError> {
        match self.advance_run(job, run).await {
            Ok(result) => Ok(result),
            Err(e) => {
                let aborted = ExecutionResult::failed(format!("Run aborted: {}", e));
                if let Err(persist_err) = self
                    .runs
                    .persist_result(&run.service_name, &run.runtime, &aborted)
                    .await
                {
                    error!(
                        "Could not record failure of run {}: {}",
                        run.runtime, persist_err
                    );
                }
                Err(e)
            }
        }
    }

    async fn advance_run(
        &self,
        job: &JobDefinition,
        run: &Run,
    ) -> Result<ExecutionResult, StoreError> {
        self.runs
            .update_status(&run.service_name, &run.runtime, RunStatus::Running)
            .await?;

        let devices = self.expand_targets(run).await?;
        let bindings = run_bindings(run);

        if devices.is_empty() && run.has_targets() {
            warn!(
                "Targets of run {} expand to no devices, executing once",
                run.runtime
            );
        }

        let result = if devices.is_empty() {
            self.executors.execute(job, &bindings).await
        } else if job.multiprocessing {
            self.execute_concurrently(job, &bindings, devices).await
        } else {
            self.execute_sequentially(job, &bindings, devices).await
        };

        self.runs
            .persist_result(&run.service_name, &run.runtime, &result)
            .await?;

        info!(
            "Run {} of '{}' finished (success: {})",
            run.runtime, job.name, result.success
        );

        Ok(result)
    }

    /// Explicit devices plus every member of the target pools, deduplicated
    async fn expand_targets(&self, run: &Run) -> Result<Vec<Device>, StoreError> {
        let mut devices = self.inventory.devices_by_ids(&run.target_devices).await?;

        for pool_id in &run.target_pools {
            for device in self.inventory.pool_devices(*pool_id).await? {
                if !devices.iter().any(|d| d.id == device.id) {
                    devices.push(device);
                }
            }
        }

        Ok(devices)
    }

    async fn execute_sequentially(
        &self,
        job: &JobDefinition,
        bindings: &Bindings,
        devices: Vec<Device>,
    ) -> ExecutionResult {
        let mut results = Vec::with_capacity(devices.len());

        for device in devices {
            debug!("Running '{}' on {}", job.name, device.name);
            let result = self
                .executors
                .execute(job, &device_bindings(bindings, &device))
                .await;
            results.push((device.name, result));
        }

        ExecutionResult::from_devices(results)
    }

    async fn execute_concurrently(
        &self,
        job: &JobDefinition,
        bindings: &Bindings,
        devices: Vec<Device>,
    ) -> ExecutionResult {
        let handles: Vec<_> = devices
            .into_iter()
            .map(|device| {
                let executors = Arc::clone(&self.executors);
                let job = job.clone();
                let bindings = device_bindings(bindings, &device);

                let handle =
                    tokio::spawn(async move { executors.execute(&job, &bindings).await });
                (device.name, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    warn!("Execution task for {} panicked: {}", name, e);
                    ExecutionResult::failed(format!("Execution task failed: {}", e))
                }
            };
            results.push((name, result));
        }

        ExecutionResult::from_devices(results)
    }
}

/// Variables every execution of a run can use
fn run_bindings(run: &Run) -> Bindings {
    let mut bindings = Bindings::new()
        .with("runtime", run.runtime.as_str())
        .with("service.name", run.service_name.as_str())
        .with("creator", run.creator.as_str());
    bindings.insert_scalars("payload", &run.payload);
    bindings
}

/// Run variables extended with one target device
fn device_bindings(bindings: &Bindings, device: &Device) -> Bindings {
    bindings
        .clone()
        .with("device.id", device.id.to_string())
        .with("device.name", device.name.as_str())
        .with("device.ip_address", device.ip_address.as_str())
}
