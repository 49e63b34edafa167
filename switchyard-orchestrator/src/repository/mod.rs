//! Repository Module
//!
//! Data access layer for the orchestrator.
//!
//! The dispatcher only sees the store contracts defined here. [`PgStore`]
//! implements all of them on Postgres; each entity's queries live in their
//! own submodule.

pub mod inventory;
#[cfg(test)]
pub mod memory;
pub mod run;
pub mod service;

use async_trait::async_trait;
use sqlx::PgPool;
use switchyard_core::domain::inventory::{Device, Pool};
use switchyard_core::domain::job::JobDefinition;
use switchyard_core::domain::run::{ExecutionResult, Run, RunStatus};
use switchyard_core::domain::task::Task;
use switchyard_core::runtime::RuntimeToken;
use thiserror::Error;
use uuid::Uuid;

/// Store failure
///
/// Distinct from "not found", which every lookup reports as `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be decoded into a domain value
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Devices and pools
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn device_by_name(&self, name: &str) -> Result<Option<Device>, StoreError>;

    async fn device_by_ip_address(&self, ip_address: &str) -> Result<Option<Device>, StoreError>;

    async fn pool_by_name(&self, name: &str) -> Result<Option<Pool>, StoreError>;

    /// Fetches devices by id; unknown ids are skipped
    async fn devices_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Device>, StoreError>;

    /// Member devices of a pool
    async fn pool_devices(&self, pool_id: Uuid) -> Result<Vec<Device>, StoreError>;
}

/// Job definitions and schedule entries
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn service_by_name(&self, name: &str) -> Result<Option<JobDefinition>, StoreError>;

    async fn task_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError>;
}

/// Runs and their results, keyed by (service name, runtime token)
#[async_trait]
pub trait RunRepository: Send + Sync {
    async fn create_run(&self, run: &Run) -> Result<(), StoreError>;

    async fn update_status(
        &self,
        service_name: &str,
        runtime: &RuntimeToken,
        status: RunStatus,
    ) -> Result<(), StoreError>;

    /// Writes the result and the matching terminal status
    async fn persist_result(
        &self,
        service_name: &str,
        runtime: &RuntimeToken,
        result: &ExecutionResult,
    ) -> Result<(), StoreError>;

    async fn find_run(
        &self,
        service_name: &str,
        runtime: &RuntimeToken,
    ) -> Result<Option<Run>, StoreError>;
}

/// Postgres implementation of every store contract
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
