//! A2A protocol operations and JSON-RPC method names

use std::fmt;

use super::{agent::AGENT_CARD_PATH, jsonrpc::MessageSendParams};

/// JSON-RPC methods known to the protocol
///
/// Only [`Method::SendMessage`] is served; the others are reserved names that an agent answers
/// with an "unsupported operation" error rather than "method not found".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    SendMessage,
    StreamMessage,
    GetTask,
    CancelTask,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::SendMessage => "message/send",
            Method::StreamMessage => "message/stream",
            Method::GetTask => "tasks/get",
            Method::CancelTask => "tasks/cancel",
        }
    }

    /// Resolve a wire method name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "message/send" => Some(Method::SendMessage),
            "message/stream" => Some(Method::StreamMessage),
            "tasks/get" => Some(Method::GetTask),
            "tasks/cancel" => Some(Method::CancelTask),
            _ => None,
        }
    }

    pub fn is_implemented(&self) -> bool {
        matches!(self, Method::SendMessage)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A2A protocol operations issued by a client
#[derive(Debug, Clone)]
pub enum A2AOperation {
    /// Send a message to an agent and wait for its reply
    SendMessage(MessageSendParams),

    /// Fetch the Agent Card
    DiscoverAgent,
}

impl A2AOperation {
    /// HTTP path for this operation, relative to the agent base URL
    pub fn endpoint(&self) -> &'static str {
        match self {
            A2AOperation::SendMessage(_) => "/",
            A2AOperation::DiscoverAgent => AGENT_CARD_PATH,
        }
    }

    /// HTTP method for this operation
    pub fn method(&self) -> &'static str {
        match self {
            A2AOperation::SendMessage(_) => "POST",
            A2AOperation::DiscoverAgent => "GET",
        }
    }

    /// JSON-RPC method, for operations carried in an envelope
    pub fn rpc_method(&self) -> Option<Method> {
        match self {
            A2AOperation::SendMessage(_) => Some(Method::SendMessage),
            A2AOperation::DiscoverAgent => None,
        }
    }
}
