//! Pluggable message handling

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::protocol::message::Message;

/// Per-call context handed to a [`MessageHandler`]
#[derive(Debug, Clone, Default)]
pub struct HandlerContext {
    cancellation: CancellationToken,
    metadata: HashMap<String, Value>,
}

impl HandlerContext {
    pub fn new(cancellation: CancellationToken) -> Self {
        Self {
            cancellation,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Whether the serving agent is shutting down
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Token that fires when the serving agent shuts down
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Metadata sent alongside the message in `message/send`
    pub fn metadata(&self) -> &HashMap<String, Value> {
        &self.metadata
    }
}

/// Handles the message carried by a `message/send` call
///
/// An error is reported to the caller as a JSON-RPC internal error carrying the full error
/// chain.
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    async fn handle(&self, message: Message, ctx: HandlerContext) -> anyhow::Result<Message>;
}
