//! High-level A2A agent client

use tower::ServiceExt;
use tower_service::Service;

use crate::{
    client::config::ClientConfig,
    protocol::{
        agent::AgentCard,
        error::A2AError,
        jsonrpc::MessageSendParams,
        message::Message,
        operation::A2AOperation,
    },
    service::{A2ARequest, A2AResponse, RequestContext},
};

/// High-level A2A client for interacting with agents
///
/// This client wraps a Tower service and provides convenient methods for the A2A operations.
/// Calls take `&self`: each one drives its own clone of the service, so a client can be shared
/// between tasks.
///
/// # Example
///
/// ```rust,no_run
/// use refrax::prelude::*;
///
/// # async fn example() -> Result<(), A2AError> {
/// let url = "http://localhost:8080".parse().unwrap();
/// let client = A2AClientBuilder::new_http(url).build()?;
///
/// let reply = client.send_message(Message::user("tell me a joke")).await?;
/// println!("{:?}", reply.first_text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AgentClient<S> {
    service: S,
    config: ClientConfig,
}

impl<S> AgentClient<S>
where
    S: Service<A2ARequest, Response = A2AResponse, Error = A2AError> + Clone + Send + Sync,
    S::Future: Send,
{
    /// Create a new agent client
    ///
    /// # Arguments
    ///
    /// * `service` - The Tower service that handles requests
    /// * `config` - Client configuration
    pub fn new(service: S, config: ClientConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn build_context(&self) -> RequestContext {
        RequestContext::new(self.config.agent_url.clone()).with_timeout(self.config.timeout)
    }

    async fn call(&self, operation: A2AOperation) -> Result<A2AResponse, A2AError> {
        let request = A2ARequest::new(operation, self.build_context());
        self.service.clone().oneshot(request).await
    }

    /// Send a message to the agent and wait for its reply
    ///
    /// # Errors
    ///
    /// Distinguishes a timeout, a transport failure, a non-200 status and an RPC error
    /// returned by the agent (which carries the remote code and message).
    pub async fn send_message(&self, message: Message) -> Result<Message, A2AError> {
        self.send(MessageSendParams::new(message)).await
    }

    /// Send `message/send` with explicit parameters
    pub async fn send(&self, params: MessageSendParams) -> Result<Message, A2AError> {
        let response = self.call(A2AOperation::SendMessage(params)).await?;

        response.into_message().ok_or_else(|| {
            A2AError::Protocol("Expected message response from send_message".into())
        })
    }

    /// Discover agent capabilities by fetching the Agent Card
    ///
    /// This retrieves the agent's metadata from `/.well-known/agent-card.json`
    pub async fn discover(&self) -> Result<AgentCard, A2AError> {
        let response = self.call(A2AOperation::DiscoverAgent).await?;

        response.into_agent_card().ok_or_else(|| {
            A2AError::Protocol("Expected agent card response from discover".into())
        })
    }
}
