//! Agent discovery and capability types

use serde::{Deserialize, Serialize};

/// Well-known path the Agent Card is served from
pub const AGENT_CARD_PATH: &str = "/.well-known/agent-card.json";

/// Agent Card for agent discovery
///
/// The Agent Card is published at `/.well-known/agent-card.json` and describes who the agent is,
/// where it lives and which skills it offers. It is built once and served read-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    /// Name of the agent
    pub name: String,

    /// Human-readable description of the agent
    pub description: String,

    /// Base URL the agent answers JSON-RPC calls on
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<AgentProvider>,

    /// Agent version
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,

    /// Agent capabilities
    #[serde(default)]
    pub capabilities: AgentCapabilities,

    #[serde(default)]
    pub default_input_modes: Vec<String>,

    #[serde(default)]
    pub default_output_modes: Vec<String>,

    #[serde(default)]
    pub skills: Vec<AgentSkill>,
}

impl AgentCard {
    /// Create a new agent card that accepts and produces text
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            url: url.into(),
            icon_url: None,
            provider: None,
            version: version.into(),
            documentation_url: None,
            capabilities: AgentCapabilities::default(),
            default_input_modes: vec!["text".to_string()],
            default_output_modes: vec!["text".to_string()],
            skills: Vec::new(),
        }
    }

    /// Declare a skill
    pub fn with_skill(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.skills.push(AgentSkill::new(id, name, description));
        self
    }

    pub fn with_provider(
        mut self,
        organization: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        self.provider = Some(AgentProvider {
            organization: organization.into(),
            url: url.into(),
        });
        self
    }

    pub fn with_capabilities(mut self, capabilities: AgentCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_documentation_url(mut self, url: impl Into<String>) -> Self {
        self.documentation_url = Some(url.into());
        self
    }
}

/// Organization that runs the agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentProvider {
    pub organization: String,
    pub url: String,
}

/// Agent capabilities
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    /// Supports streaming responses
    #[serde(default)]
    pub streaming: bool,

    /// Supports push notifications via webhooks
    #[serde(default)]
    pub push_notifications: bool,

    #[serde(default)]
    pub state_transition_history: bool,
}

/// A unit of work the agent offers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    pub description: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_modes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_modes: Vec<String>,
}

impl AgentSkill {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            tags: Vec::new(),
            examples: Vec::new(),
            input_modes: Vec::new(),
            output_modes: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_card_creation() {
        let card = AgentCard::new("critic", "Reviews code", "http://localhost:8081", "0.1.0")
            .with_skill("review", "Review", "Suggests improvements");

        assert_eq!(card.name, "critic");
        assert_eq!(card.skills.len(), 1);
        assert_eq!(card.skills[0].id, "review");
        assert!(!card.capabilities.streaming);
    }

    #[test]
    fn test_agent_card_wire_format() {
        let card = AgentCard::new("fixer", "Fixes code", "http://localhost:8082", "1.0")
            .with_provider("refrax", "https://example.com");
        let json = serde_json::to_value(&card).unwrap();

        assert_eq!(json["url"], "http://localhost:8082");
        assert_eq!(json["version"], "1.0");
        assert_eq!(json["defaultInputModes"][0], "text");
        assert_eq!(json["capabilities"]["pushNotifications"], false);
        assert_eq!(json["provider"]["organization"], "refrax");
        assert!(json.get("iconUrl").is_none());

        let back: AgentCard = serde_json::from_value(json).unwrap();
        assert_eq!(back, card);
    }
}
