//! A2A service request types

use std::{collections::HashMap, time::Duration};

use crate::protocol::operation::A2AOperation;

/// A request to the A2A service
///
/// This wraps an A2A operation with additional context needed for execution
#[derive(Debug, Clone)]
pub struct A2ARequest {
    /// The A2A operation to execute
    pub operation: A2AOperation,

    /// Request context (target, timeout, metadata)
    pub context: RequestContext,
}

impl A2ARequest {
    pub fn new(operation: A2AOperation, context: RequestContext) -> Self {
        Self { operation, context }
    }
}

/// Request context containing metadata and configuration
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Base URL of the target agent
    pub agent_url: String,

    /// Request timeout
    pub timeout: Option<Duration>,

    /// Additional metadata headers
    pub metadata: HashMap<String, String>,
}

impl RequestContext {
    pub fn new(agent_url: impl Into<String>) -> Self {
        Self {
            agent_url: agent_url.into(),
            timeout: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a metadata header
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_context_creation() {
        let context = RequestContext::new("http://localhost:8080")
            .with_timeout(Duration::from_secs(60))
            .with_metadata("x-agent", "critic");

        assert_eq!(context.agent_url, "http://localhost:8080");
        assert_eq!(context.timeout, Some(Duration::from_secs(60)));
        assert_eq!(context.metadata.get("x-agent"), Some(&"critic".to_string()));
    }
}
