//! Run Repository
//!
//! Handles all database operations related to runs and their results.

use async_trait::async_trait;
use switchyard_core::domain::run::{ExecutionResult, Run, RunStatus};
use switchyard_core::runtime::RuntimeToken;
use uuid::Uuid;

use super::{PgStore, RunRepository, StoreError};

#[async_trait]
impl RunRepository for PgStore {
    async fn create_run(&self, run: &Run) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO runs (service_name, runtime, creator, run_trigger, status,
                              target_devices, target_pools, payload, task_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&run.service_name)
        .bind(run.runtime.as_str())
        .bind(&run.creator)
        .bind(run.trigger.to_string())
        .bind(run.status.to_string())
        .bind(&run.target_devices)
        .bind(&run.target_pools)
        .bind(serde_json::Value::Object(run.payload.clone()))
        .bind(run.task)
        .bind(run.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_status(
        &self,
        service_name: &str,
        runtime: &RuntimeToken,
        status: RunStatus,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE runs
            SET status = $1
            WHERE service_name = $2 AND runtime = $3
            "#,
        )
        .bind(status.to_string())
        .bind(service_name)
        .bind(runtime.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn persist_result(
        &self,
        service_name: &str,
        runtime: &RuntimeToken,
        result: &ExecutionResult,
    ) -> Result<(), StoreError> {
        let now = chrono::Utc::now();
        let status = RunStatus::from_success(result.success);
        let result = serde_json::to_value(result)
            .map_err(|e| StoreError::Corrupt(format!("unserializable result: {}", e)))?;

        sqlx::query(
            r#"
            UPDATE runs
            SET status = $1, completed_at = $2, result = $3
            WHERE service_name = $4 AND runtime = $5
            "#,
        )
        .bind(status.to_string())
        .bind(now)
        .bind(result)
        .bind(service_name)
        .bind(runtime.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_run(
        &self,
        service_name: &str,
        runtime: &RuntimeToken,
    ) -> Result<Option<Run>, StoreError> {
        let row = sqlx::query_as::<_, RunRow>(
            r#"
            SELECT service_name, runtime, creator, run_trigger, status, target_devices,
                   target_pools, payload, task_id, created_at, completed_at, result
            FROM runs
            WHERE service_name = $1 AND runtime = $2
            "#,
        )
        .bind(service_name)
        .bind(runtime.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Run::try_from).transpose()
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct RunRow {
    service_name: String,
    runtime: String,
    creator: String,
    run_trigger: String,
    status: String,
    target_devices: Vec<Uuid>,
    target_pools: Vec<Uuid>,
    payload: serde_json::Value,
    task_id: Option<Uuid>,
    created_at: chrono::DateTime<chrono::Utc>,
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
    result: Option<serde_json::Value>,
}

impl TryFrom<RunRow> for Run {
    type Error = StoreError;

    fn try_from(row: RunRow) -> Result<Self, Self::Error> {
        let trigger = row.run_trigger.parse().map_err(StoreError::Corrupt)?;
        let status = row.status.parse().map_err(StoreError::Corrupt)?;

        let payload = match row.payload {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };

        let result = row
            .result
            .map(serde_json::from_value::<ExecutionResult>)
            .transpose()
            .map_err(|e| StoreError::Corrupt(format!("run result: {}", e)))?;

        Ok(Run {
            runtime: RuntimeToken::from(row.runtime),
            service_name: row.service_name,
            creator: row.creator,
            trigger,
            status,
            target_devices: row.target_devices,
            target_pools: row.target_pools,
            payload,
            task: row.task_id,
            created_at: row.created_at,
            completed_at: row.completed_at,
            result,
        })
    }
}
