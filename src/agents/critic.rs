//! Critic agent: suggests improvements for a single class

use std::{net::IpAddr, sync::Arc};

use anyhow::Context as _;
use async_trait::async_trait;

use crate::{
    brain::Brain,
    domain::{Artifacts, Class, Description, Job, Suggestion},
    protocol::{agent::AgentCard, message::Message},
    server::{A2AServer, HandlerContext, MessageHandler},
    tool::{CombinedTool, Tool},
};

use super::{prompts, Critic};

/// Asks a brain for improvements to one class at a time
pub struct CriticAgent {
    brain: Arc<dyn Brain>,
    tools: CombinedTool,
}

impl CriticAgent {
    pub fn new(brain: Arc<dyn Brain>) -> Self {
        Self {
            brain,
            tools: CombinedTool::default(),
        }
    }

    /// Feed the findings of `tool` into every review
    pub fn with_tool(mut self, tool: Box<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn card(url: String) -> AgentCard {
        super::card(
            "Critic",
            "Reviews Java classes and suggests improvements",
            url,
            (
                "critic-java-code",
                "Critic Java Code",
                "Review Java code and suggest improvements",
            ),
        )
    }

    pub fn into_server(self, host: IpAddr, port: u16) -> A2AServer {
        let card = Self::card(super::agent_url(host, port));
        super::serve("critic", card, host, port, Arc::new(self))
    }
}

/// One suggestion per non-empty answer line, minus the "nothing found" marker
fn parse_answer(answer: &str, class_path: &str) -> Vec<Suggestion> {
    answer
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.eq_ignore_ascii_case(prompts::NOT_FOUND))
        .map(|line| Suggestion::new(line, class_path))
        .collect()
}

#[async_trait]
impl Critic for CriticAgent {
    async fn review(&self, job: Job) -> anyhow::Result<Artifacts> {
        let class = job
            .first_class()
            .context("critic job does not carry a class")?;
        tracing::info!(class = class.name(), "reviewing class");

        let prompt = prompts::critic(&class.content(), &self.tools.imperfections());
        tracing::debug!(class = class.name(), %prompt, "asking brain for critique");
        let answer = self
            .brain
            .ask(&prompt)
            .await
            .with_context(|| format!("failed to get critique for class {}", class.name()))?;

        let suggestions = parse_answer(&answer, class.path());
        for (i, suggestion) in suggestions.iter().enumerate() {
            tracing::debug!(class = class.name(), "#{}: {}", i + 1, suggestion.text);
        }
        tracing::info!(class = class.name(), count = suggestions.len(), "critique ready");

        Ok(
            Artifacts::new(Description::new(format!("Critique for class {}", class.name())))
                .with_suggestions(suggestions),
        )
    }
}

#[async_trait]
impl MessageHandler for CriticAgent {
    async fn handle(&self, message: Message, _ctx: HandlerContext) -> anyhow::Result<Message> {
        let job = Job::from_message(&message).context("failed to decode critic job")?;
        Ok(self.review(job).await?.to_message())
    }
}
