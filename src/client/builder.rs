//! Client builder for constructing A2A clients with composable layers

use std::{sync::Arc, time::Duration};

use tower_layer::Layer;
use url::Url;

use crate::{
    client::{AgentClient, ClientConfig},
    codec::{Codec, JsonRpcCodec},
    layer::{A2AValidationLayer, A2AValidationService, StatsLayer, StatsService},
    protocol::error::A2AError,
    service::A2AProtocolService,
    stats::Stats,
    transport::{http::DEFAULT_TIMEOUT, HttpTransport, Transport},
};

/// Service stack assembled by [`A2AClientBuilder::build`]
pub type LayeredService<T> = StatsService<A2AValidationService<A2AProtocolService<T>>>;

/// Client talking HTTP to a remote agent
pub type HttpAgentClient = AgentClient<LayeredService<HttpTransport>>;

/// Builder for constructing A2A clients
///
/// This builder provides a fluent API for configuring and building an A2A client with a
/// customizable transport, timeout, validation and statistics collection.
///
/// # Example
///
/// ```rust,no_run
/// use refrax::prelude::*;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let url = "http://localhost:8080".parse().unwrap();
/// let client = A2AClientBuilder::new_http(url)
///     .with_timeout(Duration::from_secs(60))
///     .build()?;
///
/// let agent_card = client.discover().await?;
/// println!("Connected to: {}", agent_card.name);
/// # Ok(())
/// # }
/// ```
pub struct A2AClientBuilder<T: Transport> {
    agent_url: Url,
    transport: Option<T>,
    codec: Option<Arc<dyn Codec>>,
    timeout: Duration,
    validate_responses: bool,
    stats: Option<Arc<Stats>>,
}

impl<T: Transport> A2AClientBuilder<T> {
    /// Start a builder for a custom transport
    pub fn new(agent_url: Url) -> Self {
        Self {
            agent_url,
            transport: None,
            codec: None,
            timeout: DEFAULT_TIMEOUT,
            validate_responses: true,
            stats: None,
        }
    }

    /// Use a custom transport
    pub fn with_transport(mut self, transport: T) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom codec
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable response validation (default: true)
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate_responses = enabled;
        self
    }

    /// Record every exchange on the A2A channel of `stats`
    pub fn with_stats(mut self, stats: Arc<Stats>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Build the A2A client
    ///
    /// # Errors
    ///
    /// Returns an error if no transport has been configured
    pub fn build(self) -> Result<AgentClient<LayeredService<T>>, A2AError> {
        let transport = self.transport.ok_or_else(|| {
            A2AError::Protocol(
                "Transport not configured. Use new_http() or with_transport()".into(),
            )
        })?;

        let codec = self.codec.unwrap_or_else(|| Arc::new(JsonRpcCodec));

        let core = A2AProtocolService::new(transport, codec);
        let validated = A2AValidationLayer::new()
            .with_response_validation(self.validate_responses)
            .layer(core);
        let stats = match self.stats {
            Some(stats) => StatsLayer::new(stats),
            None => StatsLayer::disabled(),
        };
        let service = stats.layer(validated);

        let config = ClientConfig::new(self.agent_url)
            .with_timeout(self.timeout)
            .with_validation(self.validate_responses);

        Ok(AgentClient::new(service, config))
    }
}

impl A2AClientBuilder<HttpTransport> {
    /// Create a new client builder with HTTP transport
    ///
    /// # Arguments
    ///
    /// * `agent_url` - The base URL of the agent (e.g., "<http://localhost:8080>")
    pub fn new_http(agent_url: Url) -> Self {
        let transport = HttpTransport::new(agent_url.clone());
        Self::new(agent_url)
            .with_transport(transport)
            .with_codec(Arc::new(JsonRpcCodec))
    }
}
