//! Execution service
//!
//! Defines the executor contract and the registry mapping job types to
//! executors. Executors report every failure through the returned
//! [`ExecutionResult`]; nothing they do can abort the caller.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use switchyard_core::domain::job::{JobDefinition, JobKind};
use switchyard_core::domain::run::ExecutionResult;
use switchyard_core::template::Bindings;
use tracing::warn;

use crate::config::ExecutorConfig;
use crate::service::http_call::HttpCallExecutor;

/// Executor for one job type
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// Job type handled by this executor
    fn kind(&self) -> JobKind;

    /// Executes a job once
    ///
    /// # Arguments
    /// * `job` - The job definition
    /// * `bindings` - Variables available to the job's templates
    ///
    /// # Returns
    /// The execution result; failures are reported with `success: false`
    async fn execute(&self, job: &JobDefinition, bindings: &Bindings) -> ExecutionResult;
}

/// Routes job definitions to executors by job type
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
    executors: HashMap<JobKind, Arc<dyn JobExecutor>>,
}

impl ExecutorRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in executor
    pub fn standard(config: &ExecutorConfig) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(HttpCallExecutor::new(config)?));
        Ok(registry)
    }

    /// Registers an executor, replacing any previous one for the same type
    pub fn register(&mut self, executor: Arc<dyn JobExecutor>) {
        self.executors.insert(executor.kind(), executor);
    }

    pub fn get(&self, kind: JobKind) -> Option<Arc<dyn JobExecutor>> {
        self.executors.get(&kind).cloned()
    }

    /// Executes a job with the executor registered for its type
    pub async fn execute(&self, job: &JobDefinition, bindings: &Bindings) -> ExecutionResult {
        match self.get(job.kind()) {
            Some(executor) => executor.execute(job, bindings).await,
            None => {
                warn!("No executor registered for job type '{}'", job.kind());
                ExecutionResult::failed(format!(
                    "No executor registered for job type '{}'",
                    job.kind()
                ))
            }
        }
    }
}
