//! Switchyard Orchestrator
//!
//! Runs named automation jobs ("services") against inventory devices and
//! pools, inline or in the background, and serves their results.
//!
//! Architecture:
//! - Configuration: Load settings from environment or defaults
//! - Repositories: Store contracts with a Postgres implementation
//! - Services: Target resolution, dispatch and result lookup
//! - API: axum handlers on top of the services

use anyhow::{Context, Result};
use std::sync::Arc;
use switchyard_runner::ExecutorRegistry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod db;
pub mod repository;
pub mod service;

use crate::api::AppState;
use crate::config::Config;
use crate::repository::PgStore;
use crate::service::JobDispatcher;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "switchyard_orchestrator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Switchyard Orchestrator...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    tracing::info!(
        "Loaded configuration: bind_addr={}, max_background_runs={}, http_timeout={:?}",
        config.bind_addr,
        config.max_background_runs,
        config.http_timeout
    );

    tracing::info!("Connecting to database...");

    let pool = db::create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to create database pool")?;

    tracing::info!("Database connection pool created");

    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let executors = ExecutorRegistry::standard(&config.executor_config())
        .context("Failed to initialize job executors")?;

    let store = Arc::new(PgStore::new(pool));
    let dispatcher = JobDispatcher::new(
        store.clone(),
        store.clone(),
        store.clone(),
        executors,
        config.max_background_runs,
    );

    // Build router with all API endpoints
    let app = api::create_router(AppState {
        dispatcher,
        runs: store,
    });

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
