//! Error types for A2A protocol operations

use std::time::Duration;

use thiserror::Error;

/// Main error type for A2A protocol operations
#[derive(Debug, Error)]
pub enum A2AError {
    /// Connection refused, reset, DNS failure and the like
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The remote agent did not answer within the client timeout
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    /// The remote agent answered with a non-200 HTTP status
    #[error("unexpected status code {status} from {url}")]
    Status { url: String, status: u16 },

    /// The remote agent answered with a JSON-RPC error envelope
    #[error("message/send error: '{message}' (code: {code})")]
    Rpc { code: i64, message: String },

    /// Protocol-level error (invalid envelope, unexpected response shape)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Validation error (invalid request or response)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Server lifecycle error (bind failure, shutdown misuse)
    #[error("Server error: {0}")]
    Server(String),

    /// Generic error with custom message
    #[error("{0}")]
    Other(String),
}

impl A2AError {
    /// Classify a reqwest failure against the URL and timeout that were in effect
    pub fn from_reqwest(err: reqwest::Error, url: &str, timeout: Duration) -> Self {
        if err.is_timeout() {
            A2AError::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else if err.is_connect() {
            A2AError::Transport {
                url: url.to_string(),
                message: format!("connection error: {err}"),
            }
        } else {
            A2AError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Result type alias for A2A operations
pub type A2AResult<T> = Result<T, A2AError>;

impl From<&str> for A2AError {
    fn from(s: &str) -> Self {
        A2AError::Other(s.to_string())
    }
}

impl From<String> for A2AError {
    fn from(s: String) -> Self {
        A2AError::Other(s)
    }
}
