//! Core A2A protocol types and definitions

pub mod agent;
pub mod error;
pub mod jsonrpc;
pub mod message;
pub mod operation;
pub mod part;

pub use agent::{AgentCapabilities, AgentCard, AgentProvider, AgentSkill, AGENT_CARD_PATH};
pub use error::{A2AError, A2AResult};
pub use jsonrpc::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, MessageSendConfiguration, MessageSendParams,
    RequestId,
};
pub use message::{Message, MessageBuilder, Role};
pub use operation::{A2AOperation, Method};
pub use part::{FileContent, FileWithBytes, FileWithUri, Metadata, Part, PartKind};
