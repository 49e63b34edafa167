//! Run command handlers
//!
//! Handles dispatching services and scheduled tasks.

use anyhow::{Context, Result};
use colored::*;
use serde_json::Value as JsonValue;
use switchyard_client::SwitchyardClient;
use switchyard_core::domain::run::ExecutionResult;
use switchyard_core::dto::run::{DispatchOutcome, RunServiceRequest};
use uuid::Uuid;

/// Parses a `key=value` payload entry
///
/// The value is read as JSON when it parses (`42`, `true`, `{"a":1}`) and
/// as a plain string otherwise.
pub fn parse_var(raw: &str) -> Result<(String, JsonValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{}'", raw));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| JsonValue::String(value.to_string()));

    Ok((key.to_string(), value))
}

/// Builds a run request from command-line arguments
pub fn build_request(
    service: String,
    devices: Vec<String>,
    ip_addresses: Vec<String>,
    pools: Vec<String>,
    run_async: bool,
    vars: Vec<(String, JsonValue)>,
    creator: Option<String>,
) -> RunServiceRequest {
    let mut request = RunServiceRequest::new(service);
    request.devices = devices;
    request.ip_addresses = ip_addresses;
    request.pools = pools;
    request.run_async = run_async;
    request.creator = creator;
    request.payload.extend(vars);
    request
}

/// Run a service and print the outcome
pub async fn run_service(client: &SwitchyardClient, request: RunServiceRequest) -> Result<()> {
    let service = request.name.clone();
    let outcome = client
        .run_service(&request)
        .await
        .with_context(|| format!("Failed to run service '{}'", service))?;

    match outcome {
        DispatchOutcome::Rejected { errors } => {
            println!("{}", "✗ Targets could not be resolved:".red().bold());
            for error in errors {
                println!("  {} {}", "▸".red(), error);
            }
            anyhow::bail!("service '{}' was not run", service);
        }
        DispatchOutcome::Started { runtime, .. } => {
            println!("{}", "✓ Run started in the background".green().bold());
            println!("  Service: {}", service.bold());
            println!("  Runtime: {}", runtime.to_string().cyan());
            println!(
                "  Poll with: {}",
                format!("switchyard result {} \"{}\"", service, runtime).dimmed()
            );
        }
        DispatchOutcome::Completed {
            result, runtime, ..
        } => {
            print_result(&service, &result);
            println!("  Runtime: {}", runtime.to_string().dimmed());
        }
    }

    Ok(())
}

/// Run a scheduled task now
pub async fn run_task(client: &SwitchyardClient, id: Uuid) -> Result<()> {
    let outcome = client
        .run_task(id)
        .await
        .with_context(|| format!("Failed to run task {}", id))?;

    println!("{}", "✓ Task run started".green().bold());
    println!("  Task:    {}", id.to_string().dimmed());
    if let Some(runtime) = outcome.runtime() {
        println!("  Runtime: {}", runtime.to_string().cyan());
    }

    Ok(())
}

fn print_result(service: &str, result: &ExecutionResult) {
    if result.success {
        println!("{}", format!("✓ {} succeeded", service).green().bold());
    } else {
        println!("{}", format!("✗ {} failed", service).red().bold());
    }

    if let Some(url) = &result.url {
        println!("  URL:     {}", url.dimmed());
    }

    let rendered =
        serde_json::to_string_pretty(&result.result).unwrap_or_else(|_| result.result.to_string());
    println!("  Result:");
    for line in rendered.lines() {
        println!("    {}", line);
    }
}
