//! Executor configuration
//!
//! Settings shared by every job executor. Built once by the orchestrator
//! from its own configuration and passed in at construction time.

use std::time::Duration;

/// Executor configuration
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum time a single outbound HTTP call may take
    pub http_timeout: Duration,

    /// User-Agent header sent on outbound calls
    pub user_agent: String,
}

impl ExecutorConfig {
    /// Creates a new configuration with the given HTTP timeout
    pub fn new(http_timeout: Duration) -> Self {
        Self {
            http_timeout,
            ..Self::default()
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.http_timeout.is_zero() {
            anyhow::bail!("http_timeout must be greater than 0");
        }

        if self.user_agent.trim().is_empty() {
            anyhow::bail!("user_agent cannot be empty");
        }

        Ok(())
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(30),
            user_agent: format!("switchyard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExecutorConfig::default();
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("switchyard/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ExecutorConfig::new(Duration::from_secs(5));
        assert!(config.validate().is_ok());

        config.http_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        config.http_timeout = Duration::from_secs(5);
        config.user_agent = String::new();
        assert!(config.validate().is_err());
    }
}
