//! Reviewer agent: runs project checks and turns failures into suggestions

use std::{
    net::IpAddr,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context as _};
use async_trait::async_trait;
use tokio::process::Command;

use crate::{
    brain::Brain,
    domain::{Artifacts, Description, Suggestion},
    protocol::{agent::AgentCard, message::Message},
    server::{A2AServer, HandlerContext, MessageHandler},
};

use super::{prompts, Reviewer};

/// Runs check commands over the project and turns failures into suggestions
pub struct ReviewerAgent {
    brain: Arc<dyn Brain>,
    commands: Vec<String>,
    workdir: PathBuf,
}

impl ReviewerAgent {
    pub fn new(brain: Arc<dyn Brain>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            brain,
            commands: Vec::new(),
            workdir: workdir.into(),
        }
    }

    /// Shell commands to run, in order; a non-zero exit status counts as a failure
    pub fn with_commands(mut self, commands: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.commands.extend(commands.into_iter().map(Into::into));
        self
    }

    pub fn card(url: String) -> AgentCard {
        super::card(
            "Reviewer",
            "Checks the project and reports remaining problems",
            url,
            (
                "review-project",
                "Review Project",
                "Run project checks and suggest fixes for failures",
            ),
        )
    }

    pub fn into_server(self, host: IpAddr, port: u16) -> A2AServer {
        let card = Self::card(super::agent_url(host, port));
        super::serve("reviewer", card, host, port, Arc::new(self))
    }

    async fn run(&self, command: &str) -> anyhow::Result<Vec<Suggestion>> {
        tracing::info!(%command, workdir = %self.workdir.display(), "running review command");
        let output = shell(command, &self.workdir)
            .output()
            .await
            .with_context(|| format!("failed to run command `{command}`"))?;
        if output.status.success() {
            tracing::info!(%command, "review command passed");
            return Ok(Vec::new());
        }

        tracing::info!(%command, status = %output.status, "review command failed, asking for suggestions");
        let prompt = prompts::reviewer(
            command,
            &self.workdir.display().to_string(),
            &output.status.to_string(),
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        );
        let answer = self
            .brain
            .ask(&prompt)
            .await
            .with_context(|| format!("failed to get suggestions for command `{command}`"))?;
        Ok(parse_suggestions(&answer))
    }
}

fn shell(command: &str, workdir: &Path) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command).current_dir(workdir).kill_on_drop(true);
    cmd
}

/// Parse `path: suggestion` lines; anything else is skipped
fn parse_suggestions(answer: &str) -> Vec<Suggestion> {
    answer
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match line.split_once(':') {
            Some((path, text)) if !path.trim().is_empty() && !text.trim().is_empty() => {
                Some(Suggestion::new(text.trim(), path.trim()))
            }
            _ => {
                tracing::warn!(%line, "skipping malformed suggestion line");
                None
            }
        })
        .collect()
}

#[async_trait]
impl Reviewer for ReviewerAgent {
    async fn review(&self) -> anyhow::Result<Artifacts> {
        let mut suggestions = Vec::new();
        for command in &self.commands {
            suggestions.extend(self.run(command).await?);
        }
        tracing::info!(
            commands = self.commands.len(),
            suggestions = suggestions.len(),
            "review finished"
        );
        Ok(Artifacts::new(Description::new("suggestions based on command outputs"))
            .with_suggestions(suggestions))
    }
}

#[async_trait]
impl MessageHandler for ReviewerAgent {
    async fn handle(&self, _message: Message, ctx: HandlerContext) -> anyhow::Result<Message> {
        if ctx.is_cancelled() {
            bail!("review cancelled: reviewer is shutting down");
        }
        Ok(self.review().await?.to_message())
    }
}
