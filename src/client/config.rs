//! Client configuration

use std::time::Duration;

use crate::transport::http::DEFAULT_TIMEOUT;

/// Configuration for an A2A client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the agent
    pub agent_url: String,

    /// Request timeout; minutes-scale since agents call slow backends
    pub timeout: Duration,

    /// Enable response validation
    pub validate_responses: bool,
}

impl ClientConfig {
    pub fn new(agent_url: impl Into<String>) -> Self {
        Self {
            agent_url: agent_url.into(),
            timeout: DEFAULT_TIMEOUT,
            validate_responses: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable response validation
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate_responses = enabled;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("")
    }
}
