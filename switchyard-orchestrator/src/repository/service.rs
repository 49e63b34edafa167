//! Service Repository
//!
//! Job definitions and schedule entries on Postgres. A definition's
//! type-specific configuration is stored as tagged JSON.

use async_trait::async_trait;
use switchyard_core::domain::job::JobDefinition;
use switchyard_core::domain::task::Task;
use uuid::Uuid;

use super::{PgStore, ServiceRepository, StoreError};

#[async_trait]
impl ServiceRepository for PgStore {
    async fn service_by_name(&self, name: &str) -> Result<Option<JobDefinition>, StoreError> {
        let row = sqlx::query_as::<_, ServiceRow>(
            r#"
            SELECT id, name, description, multiprocessing, config
            FROM services
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(JobDefinition::try_from).transpose()
    }

    async fn task_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, name, service_name, last_scheduled_by, initial_payload, devices, pools
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Task::try_from).transpose()
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ServiceRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    multiprocessing: bool,
    config: serde_json::Value,
}

impl TryFrom<ServiceRow> for JobDefinition {
    type Error = StoreError;

    fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
        let config = serde_json::from_value(row.config).map_err(|e| {
            StoreError::Corrupt(format!("service '{}' has an invalid config: {}", row.name, e))
        })?;

        Ok(JobDefinition {
            id: row.id,
            name: row.name,
            description: row.description,
            multiprocessing: row.multiprocessing,
            config,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    name: String,
    service_name: String,
    last_scheduled_by: String,
    initial_payload: serde_json::Value,
    devices: Vec<Uuid>,
    pools: Vec<Uuid>,
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let initial_payload = match row.initial_payload {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(StoreError::Corrupt(format!(
                    "task {} has a non-object initial payload: {}",
                    row.id, other
                )));
            }
        };

        Ok(Task {
            id: row.id,
            name: row.name,
            service_name: row.service_name,
            last_scheduled_by: row.last_scheduled_by,
            initial_payload,
            devices: row.devices,
            pools: row.pools,
        })
    }
}
