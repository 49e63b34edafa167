//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod health;
mod result;
mod run;

use anyhow::Result;
use clap::Subcommand;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a service against devices and pools
    Run {
        /// Service name
        service: String,

        /// Target device by name (repeatable)
        #[arg(long = "device")]
        devices: Vec<String>,

        /// Target device by IP address (repeatable)
        #[arg(long = "ip")]
        ip_addresses: Vec<String>,

        /// Target pool by name (repeatable)
        #[arg(long = "pool")]
        pools: Vec<String>,

        /// Return immediately with a runtime token
        #[arg(long = "async")]
        run_async: bool,

        /// Payload entry as key=value; JSON values are parsed (repeatable)
        #[arg(long = "var", value_parser = run::parse_var)]
        vars: Vec<(String, JsonValue)>,

        /// Creator recorded on the run
        #[arg(long)]
        creator: Option<String>,
    },
    /// Run a scheduled task now
    Task {
        /// Task ID
        id: Uuid,
    },
    /// Get the status and result of a run
    Result {
        /// Service name
        service: String,

        /// Runtime token returned when the run was dispatched
        runtime: String,
    },
    /// Check that the orchestrator is up
    Health,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        Commands::Run {
            service,
            devices,
            ip_addresses,
            pools,
            run_async,
            vars,
            creator,
        } => {
            let request = run::build_request(
                service,
                devices,
                ip_addresses,
                pools,
                run_async,
                vars,
                creator,
            );
            run::run_service(&client, request).await
        }
        Commands::Task { id } => run::run_task(&client, id).await,
        Commands::Result { service, runtime } => {
            result::get_result(&client, &service, runtime).await
        }
        Commands::Health => health::check(&client).await,
    }
}
