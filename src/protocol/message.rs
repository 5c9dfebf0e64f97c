//! A2A message types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{
    error::{A2AError, A2AResult},
    part::Part,
};

/// A message in the A2A protocol
///
/// Messages are the primary unit of communication between agents. Every message carries a
/// non-empty `messageId` and an ordered list of parts; the order of parts is preserved on the
/// wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Role of the message sender
    pub role: Role,

    /// Message content parts, in send order
    pub parts: Vec<Part>,

    /// Unique message identifier
    pub message_id: String,

    /// Always `"message"`
    #[serde(default)]
    pub kind: MessageKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,

    /// URIs of protocol extensions present in this message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_task_ids: Vec<String>,
}

impl Message {
    /// Create a new message with a fresh identifier
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self {
            role,
            parts,
            message_id: Uuid::now_v7().to_string(),
            kind: MessageKind::Message,
            task_id: None,
            context_id: None,
            metadata: None,
            extensions: Vec::new(),
            reference_task_ids: Vec::new(),
        }
    }

    /// Create a user message with a single text part
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Part::text(text)])
    }

    /// Create an agent message with a single text part
    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(Role::Agent, vec![Part::text(text)])
    }

    pub fn builder() -> MessageBuilder {
        MessageBuilder::new()
    }

    /// Add a metadata field to the message
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }

    /// Add a message part
    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Text of the first text part, if any
    pub fn first_text(&self) -> Option<&str> {
        self.parts.iter().find_map(Part::as_text)
    }

    /// Check the structural invariants of a message
    pub fn validate(&self) -> A2AResult<()> {
        if self.message_id.trim().is_empty() {
            return Err(A2AError::Validation("messageId cannot be empty".into()));
        }
        if self.parts.is_empty() {
            return Err(A2AError::Validation(
                "Message must have at least one part".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for constructing Message instances
#[derive(Debug, Default)]
pub struct MessageBuilder {
    role: Option<Role>,
    parts: Vec<Part>,
    message_id: Option<String>,
    task_id: Option<String>,
    context_id: Option<String>,
    metadata: Option<HashMap<String, Value>>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn parts(mut self, parts: Vec<Part>) -> Self {
        self.parts = parts;
        self
    }

    pub fn part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Use an explicit message ID instead of a generated one
    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    pub fn task_id(mut self, id: impl Into<String>) -> Self {
        self.task_id = Some(id.into());
        self
    }

    pub fn context_id(mut self, id: impl Into<String>) -> Self {
        self.context_id = Some(id.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }

    /// Build the message
    ///
    /// # Errors
    ///
    /// Fails if the role is not set, there are no parts, or the message ID is blank.
    pub fn build(self) -> A2AResult<Message> {
        let role = self
            .role
            .ok_or_else(|| A2AError::Validation("Message role is required".into()))?;

        let mut message = Message::new(role, self.parts);
        if let Some(id) = self.message_id {
            message.message_id = id;
        }
        message.task_id = self.task_id;
        message.context_id = self.context_id;
        message.metadata = self.metadata;

        message.validate()?;
        Ok(message)
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

/// Object discriminator carried by every message
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Message,
}
