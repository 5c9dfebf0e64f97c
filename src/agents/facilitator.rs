//! Facilitator agent: drives the critic, fixer and reviewer over a whole project

use std::{collections::HashMap, net::IpAddr, sync::Arc};

use anyhow::{bail, Context as _};
use async_trait::async_trait;

use crate::{
    domain::{Artifacts, Class, Description, InMemoryClass, Job, Project},
    engine::Engine,
    protocol::{agent::AgentCard, message::Message},
    server::{A2AServer, HandlerContext, MessageHandler},
};

use super::{Critic, Facilitator, Fixer, Reviewer, REFACTOR_REQUEST};

/// Job parameter naming the project being refactored
pub const PROJECT: &str = "project";

/// Drives the critic, fixer and reviewer over every class of a job
///
/// With a workspace attached, job classes are resolved to the workspace classes with the same path
/// so that the reviewer's checks see every change as soon as it is made.
pub struct FacilitatorAgent<C, F, R> {
    engine: Engine<C, F, R>,
    workspace: Option<Arc<dyn Project>>,
}

impl<C, F, R> FacilitatorAgent<C, F, R>
where
    C: Critic + 'static,
    F: Fixer + 'static,
    R: Reviewer + 'static,
{
    pub fn new(engine: Engine<C, F, R>) -> Self {
        Self {
            engine,
            workspace: None,
        }
    }

    pub fn with_workspace(mut self, workspace: Arc<dyn Project>) -> Self {
        self.workspace = Some(workspace);
        self
    }

    pub fn card(url: String) -> AgentCard {
        super::card(
            "Facilitator",
            "Coordinates the critic, fixer and reviewer agents",
            url,
            (
                "refactor-project",
                "Refactor Project",
                "Refactor the classes of a project within a change budget",
            ),
        )
    }

    pub fn into_server(self, host: IpAddr, port: u16) -> A2AServer {
        let card = Self::card(super::agent_url(host, port));
        super::serve("facilitator", card, host, port, Arc::new(self))
    }

    fn resolve(&self, job: Job) -> anyhow::Result<Vec<Arc<dyn Class>>> {
        let Some(workspace) = &self.workspace else {
            return Ok(job
                .classes
                .into_iter()
                .map(|class| Arc::new(class) as Arc<dyn Class>)
                .collect());
        };

        let mut available: HashMap<String, Arc<dyn Class>> = workspace
            .classes()
            .with_context(|| format!("failed to list classes of {workspace}"))?
            .into_iter()
            .map(|class| (class.path().to_string(), class))
            .collect();
        job.classes
            .into_iter()
            .map(|class| -> anyhow::Result<Arc<dyn Class>> {
                let target = available
                    .remove(class.path())
                    .with_context(|| format!("class {} is not part of {workspace}", class.path()))?;
                // The job carries the authoritative content
                target.set_content(&class.content())?;
                Ok(target)
            })
            .collect()
    }
}

#[async_trait]
impl<C, F, R> Facilitator for FacilitatorAgent<C, F, R>
where
    C: Critic + 'static,
    F: Fixer + 'static,
    R: Reviewer + 'static,
{
    async fn refactor(&self, job: Job) -> anyhow::Result<Artifacts> {
        if job.description.text != REFACTOR_REQUEST {
            bail!(
                "unsupported request '{}', expected '{REFACTOR_REQUEST}'",
                job.description.text
            );
        }
        let max_size = job.max_size();
        let project = job
            .param(PROJECT)
            .and_then(|value| value.as_str())
            .unwrap_or("unnamed")
            .to_string();

        let classes = self.resolve(job)?;
        let outcome = self.engine.run(&project, classes, max_size).await?;

        let description = Description::new(format!("refactored project {project}"))
            .with_meta("changed", outcome.changed)
            .with_meta("fixed", outcome.fixed)
            .with_meta("skipped", outcome.skipped);
        Ok(outcome
            .classes
            .iter()
            .fold(Artifacts::new(description), |artifacts, class| {
                artifacts.with_class(InMemoryClass::snapshot(class.as_ref()))
            }))
    }
}

#[async_trait]
impl<C, F, R> MessageHandler for FacilitatorAgent<C, F, R>
where
    C: Critic + 'static,
    F: Fixer + 'static,
    R: Reviewer + 'static,
{
    async fn handle(&self, message: Message, _ctx: HandlerContext) -> anyhow::Result<Message> {
        let job = Job::from_message(&message).context("failed to decode facilitator job")?;
        Ok(self.refactor(job).await?.to_message())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        agents::{CriticAgent, FixerAgent, ReviewerAgent},
        brain::MockBrain,
        domain::{job::MAX_SIZE, InMemoryProject},
    };

    use super::*;

    fn facilitator() -> FacilitatorAgent<CriticAgent, FixerAgent, ReviewerAgent> {
        let brain = Arc::new(MockBrain);
        let workdir = std::env::temp_dir();
        FacilitatorAgent::new(Engine::new(
            CriticAgent::new(brain.clone()),
            FixerAgent::new(brain.clone()),
            ReviewerAgent::new(brain, workdir),
        ))
    }

    fn job(project: &InMemoryProject) -> Job {
        let main = project.get("Main.java").unwrap();
        Job::new(
            Description::new(REFACTOR_REQUEST)
                .with_meta(MAX_SIZE, 200)
                .with_meta(PROJECT, "mock"),
        )
        .with_class(main)
    }

    #[tokio::test]
    async fn test_rejects_unknown_request() {
        let err = facilitator()
            .refactor(Job::new(Description::new("tell me a joke")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unsupported request"));
    }

    #[tokio::test]
    async fn test_refactors_mock_project() {
        let project = InMemoryProject::mock();

        let artifacts = facilitator().refactor(job(&project)).await.unwrap();

        assert_eq!(artifacts.classes.len(), 1);
        assert!(artifacts.classes[0]
            .content()
            .contains("System.out.println(\"Hello, World\");"));
        assert_eq!(artifacts.description.meta["fixed"], json!(["Main.java"]));
        assert_eq!(artifacts.description.meta["skipped"], json!([]));
        // The job held a copy, so the project itself is untouched
        assert!(project.get("Main.java").unwrap().content().contains("String m"));
    }

    #[tokio::test]
    async fn test_workspace_receives_changes() {
        let project = InMemoryProject::mock();
        let workspace: Arc<dyn Project> = Arc::new(InMemoryProject::mock());
        let agent = facilitator().with_workspace(workspace.clone());

        agent.refactor(job(&project)).await.unwrap();

        let classes = workspace.classes().unwrap();
        assert!(classes[0]
            .content()
            .contains("System.out.println(\"Hello, World\");"));
    }

    #[tokio::test]
    async fn test_unknown_workspace_class() {
        let workspace: Arc<dyn Project> = Arc::new(InMemoryProject::new(Vec::new()));
        let agent = facilitator().with_workspace(workspace);

        let err = agent
            .refactor(job(&InMemoryProject::mock()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("is not part of"));
    }
}
