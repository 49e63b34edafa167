//! Inventory Repository
//!
//! Device and pool lookups on Postgres.

use async_trait::async_trait;
use switchyard_core::domain::inventory::{Device, Pool};
use uuid::Uuid;

use super::{InventoryRepository, PgStore, StoreError};

#[async_trait]
impl InventoryRepository for PgStore {
    async fn device_by_name(&self, name: &str) -> Result<Option<Device>, StoreError> {
        let row = sqlx::query_as::<_, DeviceRow>(
            "SELECT id, name, ip_address FROM devices WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn device_by_ip_address(&self, ip_address: &str) -> Result<Option<Device>, StoreError> {
        // Several devices may share an address; the lowest name wins
        let row = sqlx::query_as::<_, DeviceRow>(
            r#"
            SELECT id, name, ip_address
            FROM devices
            WHERE ip_address = $1
            ORDER BY name
            LIMIT 1
            "#,
        )
        .bind(ip_address)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn pool_by_name(&self, name: &str) -> Result<Option<Pool>, StoreError> {
        let row = sqlx::query_as::<_, PoolRow>("SELECT id, name FROM pools WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn devices_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Device>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, DeviceRow>(
            r#"
            SELECT id, name, ip_address
            FROM devices
            WHERE id = ANY($1)
            ORDER BY name
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn pool_devices(&self, pool_id: Uuid) -> Result<Vec<Device>, StoreError> {
        let rows = sqlx::query_as::<_, DeviceRow>(
            r#"
            SELECT d.id, d.name, d.ip_address
            FROM devices d
            JOIN pool_devices pd ON pd.device_id = d.id
            WHERE pd.pool_id = $1
            ORDER BY d.name
            "#,
        )
        .bind(pool_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct DeviceRow {
    id: Uuid,
    name: String,
    ip_address: String,
}

impl From<DeviceRow> for Device {
    fn from(row: DeviceRow) -> Self {
        Device {
            id: row.id,
            name: row.name,
            ip_address: row.ip_address,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PoolRow {
    id: Uuid,
    name: String,
}

impl From<PoolRow> for Pool {
    fn from(row: PoolRow) -> Self {
        Pool {
            id: row.id,
            name: row.name,
        }
    }
}
