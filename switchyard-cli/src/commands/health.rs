//! Health command handler

use anyhow::{Context, Result};
use colored::*;
use switchyard_client::SwitchyardClient;

/// Check the orchestrator health endpoint
pub async fn check(client: &SwitchyardClient) -> Result<()> {
    client
        .health()
        .await
        .with_context(|| format!("Orchestrator at {} is not healthy", client.base_url()))?;

    println!(
        "{} Orchestrator at {} is up",
        "✓".green(),
        client.base_url()
    );

    Ok(())
}
