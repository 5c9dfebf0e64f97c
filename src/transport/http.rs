//! HTTP transport implementation for A2A protocol

use std::{
    task::{Context, Poll},
    time::Duration,
};

use async_trait::async_trait;
use url::Url;

use crate::protocol::error::A2AError;

use super::{Transport, TransportRequest, TransportResponse};

/// Default bound for one exchange; handlers may call slow model backends
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// HTTP transport implementation using reqwest
///
/// Every request is bounded by a timeout (the request's own, or the transport default). A
/// request that exceeds it fails with [`A2AError::Timeout`] naming the URL and the bound.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a new HTTP transport
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the agent (e.g., "<http://localhost:8080>")
    pub fn new(base_url: Url) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a new HTTP transport with a custom reqwest client
    pub fn with_client(base_url: Url, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the bound used for requests that carry none
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), A2AError>> {
        // HTTP client is always ready
        Poll::Ready(Ok(()))
    }

    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, A2AError> {
        let url = self.url_for(&request.endpoint);
        let timeout = request.timeout.unwrap_or(self.timeout);

        let mut req_builder = match request.method.as_str() {
            "POST" => self.client.post(&url),
            "GET" => self.client.get(&url),
            _ => {
                return Err(A2AError::Transport {
                    url,
                    message: format!("Unsupported HTTP method: {}", request.method),
                })
            }
        };
        req_builder = req_builder.timeout(timeout);

        for (key, value) in request.headers {
            req_builder = req_builder.header(key, value);
        }

        if !request.body.is_empty() {
            req_builder = req_builder.body(request.body);
        }

        tracing::debug!(%url, method = %request.method, ?timeout, "sending request");
        let response = req_builder
            .send()
            .await
            .map_err(|e| A2AError::from_reqwest(e, &url, timeout))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| A2AError::from_reqwest(e, &url, timeout))?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }
}
