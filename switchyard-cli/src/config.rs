//! Configuration module
//!
//! Handles CLI configuration including the orchestrator URL.

use switchyard_client::SwitchyardClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the orchestrator service
    pub orchestrator_url: String,
}

impl Config {
    /// Client for the configured orchestrator
    pub fn client(&self) -> SwitchyardClient {
        SwitchyardClient::new(&self.orchestrator_url)
    }
}
