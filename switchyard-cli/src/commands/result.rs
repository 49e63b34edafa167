//! Result command handler

use anyhow::{Context, Result};
use colored::*;
use switchyard_client::SwitchyardClient;
use switchyard_core::domain::run::RunStatus;
use switchyard_core::dto::run::ResultResponse;
use switchyard_core::runtime::RuntimeToken;

/// Get and display the result of one run
pub async fn get_result(client: &SwitchyardClient, service: &str, runtime: String) -> Result<()> {
    let runtime = RuntimeToken::from(runtime);
    let response = client
        .get_result(service, &runtime)
        .await
        .with_context(|| format!("Failed to get result of '{}' at {}", service, runtime))?;

    match response {
        ResultResponse::Missing { error } => {
            println!("{}", error.yellow());
        }
        ResultResponse::Found { status, result } => {
            println!("{}", "Run Details:".bold());
            println!("  Service: {}", service.bold());
            println!("  Runtime: {}", runtime.to_string().cyan());
            println!("  Status:  {}", colored_status(status));

            let rendered =
                serde_json::to_string_pretty(&result).unwrap_or_else(|_| result.to_string());
            println!("\n{}", "Result:".bold());
            for line in rendered.lines() {
                println!("  {}", line);
            }
        }
    }

    Ok(())
}

fn colored_status(status: RunStatus) -> ColoredString {
    let label = status.to_string();
    match status {
        RunStatus::Succeeded => label.green(),
        RunStatus::Failed => label.red(),
        RunStatus::Pending | RunStatus::Running => label.yellow(),
    }
}
