//! Fixer agent: rewrites a class according to suggestions

use std::{net::IpAddr, sync::Arc};

use anyhow::Context as _;
use async_trait::async_trait;

use crate::{
    brain::Brain,
    domain::{Artifacts, Class, Description, InMemoryClass, Job},
    protocol::{agent::AgentCard, message::Message},
    server::{A2AServer, HandlerContext, MessageHandler},
};

use super::{prompts, Fixer};

/// Asks a brain to rewrite a class according to suggestions
pub struct FixerAgent {
    brain: Arc<dyn Brain>,
}

impl FixerAgent {
    pub fn new(brain: Arc<dyn Brain>) -> Self {
        Self { brain }
    }

    pub fn card(url: String) -> AgentCard {
        super::card(
            "Fixer",
            "Applies suggested improvements to Java classes",
            url,
            (
                "fix-java-code",
                "Fix Java Code",
                "Fix a Java code based on suggestions",
            ),
        )
    }

    pub fn into_server(self, host: IpAddr, port: u16) -> A2AServer {
        let card = Self::card(super::agent_url(host, port));
        super::serve("fixer", card, host, port, Arc::new(self))
    }
}

/// Strip markdown fences, keeping the original's trailing newline convention
fn clean(answer: &str, original: &str) -> String {
    let code = answer.replace("```java", "").replace("```", "");
    let mut code = code.trim().to_string();
    if original.ends_with('\n') {
        code.push('\n');
    }
    code
}

#[async_trait]
impl Fixer for FixerAgent {
    async fn fix(&self, job: Job) -> anyhow::Result<Artifacts> {
        let class = job.first_class().context("fixer job does not carry a class")?;
        tracing::info!(
            class = class.name(),
            suggestions = job.suggestions.len(),
            "fixing class"
        );

        let suggestions = job
            .suggestions
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let example = job.examples.first().map(|example| example.content());
        let original = class.content();
        let prompt = prompts::fixer(class.name(), &original, &suggestions, example.as_deref());
        tracing::debug!(class = class.name(), %prompt, "asking brain for fix");

        let answer = self
            .brain
            .ask(&prompt)
            .await
            .with_context(|| format!("failed to get fix for class {}", class.name()))?;

        let fixed = InMemoryClass::new(class.name(), class.path(), clean(&answer, &original));
        Ok(Artifacts::new(Description::new(format!("Fixed class {}", class.name()))).with_class(fixed))
    }
}

#[async_trait]
impl MessageHandler for FixerAgent {
    async fn handle(&self, message: Message, _ctx: HandlerContext) -> anyhow::Result<Message> {
        let job = Job::from_message(&message).context("failed to decode fixer job")?;
        Ok(self.fix(job).await?.to_message())
    }
}
