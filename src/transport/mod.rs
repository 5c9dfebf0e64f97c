//! Transport abstraction layer for A2A protocol

pub mod http;
#[cfg(test)]
pub mod mock;

use std::{
    collections::HashMap,
    task::{Context, Poll},
    time::Duration,
};

pub use http::HttpTransport;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::protocol::error::A2AError;

/// Protocol-agnostic transport request
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// The endpoint path (e.g., "/", "/.well-known/agent-card.json")
    pub endpoint: String,

    /// HTTP method (e.g., "POST", "GET")
    pub method: String,

    /// Headers for the request
    pub headers: HashMap<String, String>,

    /// Request body as bytes
    pub body: Bytes,

    /// Upper bound for this exchange, overriding the transport default
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    pub fn new(endpoint: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: method.into(),
            headers: HashMap::new(),
            body: Bytes::new(),
            timeout: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a header to the request
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the request body
    pub fn body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }
}

/// Protocol-agnostic transport response
#[derive(Debug)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,

    pub headers: HashMap<String, String>,

    /// Response body as bytes
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the response body
    pub fn body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    /// Agents only ever answer 200; every other status is a failure
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Core transport trait for executing protocol-agnostic requests
#[async_trait]
pub trait Transport: Clone + Send + Sync + 'static {
    /// Check if the transport is ready to accept requests
    ///
    /// This is used by Tower's Service trait to implement backpressure
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), A2AError>>;

    /// Execute a transport request asynchronously
    ///
    /// Non-200 responses are returned as-is; mapping them to errors is the caller's job.
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, A2AError>;

    /// Base URL of the remote agent
    fn base_url(&self) -> &Url;

    /// Absolute URL for an endpoint path, used in error messages
    fn url_for(&self, endpoint: &str) -> String {
        self.base_url()
            .join(endpoint)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| format!("{}{}", self.base_url(), endpoint))
    }
}
