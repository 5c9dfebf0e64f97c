//! The four refactoring roles
//!
//! Each role is a trait over [`Job`] and [`Artifacts`]. The in-process implementations
//! ([`CriticAgent`], [`FixerAgent`], [`ReviewerAgent`], [`FacilitatorAgent`]) double as
//! [`MessageHandler`]s so they can be served by an [`A2AServer`]; the `*Client` proxies implement
//! the same traits over the wire.

mod critic;
mod facilitator;
mod fixer;
mod prompts;
mod remote;
mod reviewer;

pub use critic::CriticAgent;
pub use facilitator::{FacilitatorAgent, PROJECT};
pub use fixer::FixerAgent;
pub use remote::{CriticClient, FacilitatorClient, FixerClient, ReviewerClient};
pub use reviewer::ReviewerAgent;

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use async_trait::async_trait;

use crate::{
    domain::{Artifacts, Job},
    protocol::agent::AgentCard,
    server::{A2AServer, MessageHandler},
};

/// Description a facilitator job must carry
pub const REFACTOR_REQUEST: &str = "refactor the project";

/// Description of the job sent to a reviewer
pub const REVIEW_REQUEST: &str = "review the project";

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Suggests improvements for the first class of a job
#[async_trait]
pub trait Critic: Send + Sync {
    async fn review(&self, job: Job) -> anyhow::Result<Artifacts>;
}

/// Applies the job's suggestions to its first class
#[async_trait]
pub trait Fixer: Send + Sync {
    async fn fix(&self, job: Job) -> anyhow::Result<Artifacts>;
}

/// Checks the project as a whole and reports what is still wrong
#[async_trait]
pub trait Reviewer: Send + Sync {
    async fn review(&self) -> anyhow::Result<Artifacts>;
}

/// Runs a complete refactoring over the classes of a job
#[async_trait]
pub trait Facilitator: Send + Sync {
    async fn refactor(&self, job: Job) -> anyhow::Result<Artifacts>;
}

/// Base URL an agent on `host:port` is reachable at
pub fn agent_url(host: IpAddr, port: u16) -> String {
    format!("http://{}", SocketAddr::new(host, port))
}

fn card(role: &str, description: &str, url: String, skill: (&str, &str, &str)) -> AgentCard {
    AgentCard::new(format!("{role} Agent"), description, url, VERSION)
        .with_skill(skill.0, skill.1, skill.2)
}

fn serve(
    role: &'static str,
    card: AgentCard,
    host: IpAddr,
    port: u16,
    handler: Arc<dyn MessageHandler>,
) -> A2AServer {
    A2AServer::new(card, port, handler)
        .with_host(host)
        .with_span(tracing::info_span!("agent", role, port))
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn test_agent_url() {
        let url = agent_url(IpAddr::V4(Ipv4Addr::LOCALHOST), 8081);
        assert_eq!(url, "http://127.0.0.1:8081");
    }

    #[test]
    fn test_cards() {
        let url = agent_url(IpAddr::V4(Ipv4Addr::LOCALHOST), 9000);
        let card = CriticAgent::card(url.clone());

        assert_eq!(card.name, "Critic Agent");
        assert_eq!(card.url, url);
        assert_eq!(card.version, VERSION);
        assert_eq!(card.skills.len(), 1);
        assert_eq!(FixerAgent::card(url.clone()).name, "Fixer Agent");
        assert_eq!(ReviewerAgent::card(url.clone()).name, "Reviewer Agent");
    }
}
