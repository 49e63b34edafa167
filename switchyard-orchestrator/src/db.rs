use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Inventory
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS devices (
            id UUID PRIMARY KEY,
            name VARCHAR(255) NOT NULL UNIQUE,
            ip_address VARCHAR(64) NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pools (
            id UUID PRIMARY KEY,
            name VARCHAR(255) NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pool_devices (
            pool_id UUID NOT NULL REFERENCES pools(id) ON DELETE CASCADE,
            device_id UUID NOT NULL REFERENCES devices(id) ON DELETE CASCADE,
            PRIMARY KEY (pool_id, device_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_devices_ip_address ON devices(ip_address)")
        .execute(pool)
        .await?;

    // Job definitions and schedule entries
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS services (
            id UUID PRIMARY KEY,
            name VARCHAR(255) NOT NULL UNIQUE,
            description TEXT,
            multiprocessing BOOLEAN NOT NULL DEFAULT FALSE,
            config JSONB NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id UUID PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            service_name VARCHAR(255) NOT NULL,
            last_scheduled_by VARCHAR(255) NOT NULL,
            initial_payload JSONB NOT NULL DEFAULT '{}',
            devices UUID[] NOT NULL DEFAULT '{}',
            pools UUID[] NOT NULL DEFAULT '{}'
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Runs, keyed by (service name, runtime token)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS runs (
            service_name VARCHAR(255) NOT NULL,
            runtime VARCHAR(32) NOT NULL,
            creator VARCHAR(255) NOT NULL,
            run_trigger VARCHAR(20) NOT NULL,
            status VARCHAR(20) NOT NULL,
            target_devices UUID[] NOT NULL DEFAULT '{}',
            target_pools UUID[] NOT NULL DEFAULT '{}',
            payload JSONB NOT NULL DEFAULT '{}',
            task_id UUID,
            created_at TIMESTAMPTZ NOT NULL,
            completed_at TIMESTAMPTZ,
            result JSONB,
            PRIMARY KEY (service_name, runtime)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_runs_status ON runs(status)")
        .execute(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
