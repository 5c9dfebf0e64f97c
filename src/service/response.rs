//! A2A service response types

use crate::protocol::{agent::AgentCard, message::Message};

/// Response from an A2A service operation
#[derive(Debug, Clone)]
pub enum A2AResponse {
    /// Reply message (from SendMessage)
    Message(Box<Message>),

    /// Agent card response (from DiscoverAgent)
    AgentCard(Box<AgentCard>),
}

impl A2AResponse {
    /// Extract the reply message, if present
    pub fn into_message(self) -> Option<Message> {
        match self {
            A2AResponse::Message(message) => Some(*message),
            _ => None,
        }
    }

    /// Extract an agent card from the response, if present
    pub fn into_agent_card(self) -> Option<AgentCard> {
        match self {
            A2AResponse::AgentCard(card) => Some(*card),
            _ => None,
        }
    }
}
