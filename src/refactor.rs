//! One complete refactoring run
//!
//! [`run`] starts the critic, fixer, reviewer and facilitator as separate A2A servers on free
//! ports, waits for all of them, hands the project's classes to the facilitator in a single job
//! and writes the returned classes back. The agents are always shut down before returning.

use std::{collections::HashMap, sync::Arc};

use anyhow::{bail, Context as _};
use serde_json::Value;
use url::Url;

use crate::{
    agents::{
        agent_url, CriticAgent, CriticClient, Facilitator, FacilitatorAgent, FacilitatorClient,
        FixerAgent, FixerClient, ReviewerAgent, ReviewerClient, PROJECT, REFACTOR_REQUEST,
    },
    brain::{Brain, MetricBrain},
    config::RefactorConfig,
    domain::{job::MAX_SIZE, Artifacts, Class, Description, Job, Project},
    engine::Engine,
    server::Topology,
    stats::Stats,
    util::free_ports,
};

/// What a run did to the project
#[derive(Debug)]
pub struct Report {
    /// Paths of the classes the fixer rewrote
    pub fixed: Vec<String>,
    /// Paths of the classes left alone because the budget was spent
    pub skipped: Vec<String>,
    /// Changed lines, as counted by [`crate::diff::diff`]
    pub changed: usize,
    /// Combined statistics of all four agents, when enabled
    pub stats: Option<Stats>,
}

/// Per-agent statistics, each private to its agent until the run ends
struct AgentStats {
    critic: Arc<Stats>,
    fixer: Arc<Stats>,
    reviewer: Arc<Stats>,
    facilitator: Arc<Stats>,
}

impl AgentStats {
    fn new() -> Self {
        Self {
            critic: Arc::new(Stats::new("critic")),
            fixer: Arc::new(Stats::new("fixer")),
            reviewer: Arc::new(Stats::new("reviewer")),
            facilitator: Arc::new(Stats::new("facilitator")),
        }
    }

    fn total(&self) -> Stats {
        self.critic
            .add(&self.fixer)
            .add(&self.reviewer)
            .add(&self.facilitator)
    }
}

fn instrument(brain: &Arc<dyn Brain>, stats: Option<&Arc<Stats>>) -> Arc<dyn Brain> {
    match stats {
        Some(stats) => Arc::new(MetricBrain::new(brain.clone(), stats.clone())),
        None => brain.clone(),
    }
}

/// Refactor `project` with agents backed by `brain`
///
/// # Errors
///
/// Fails when the project has no classes, when any agent cannot be started, when the
/// facilitator reports an error, or when a class cannot be written back. Shutdown failures are
/// reported too, unless an earlier error is already being returned.
pub async fn run(
    project: Arc<dyn Project>,
    brain: Arc<dyn Brain>,
    config: &RefactorConfig,
) -> anyhow::Result<Report> {
    let classes = project
        .classes()
        .with_context(|| format!("failed to get classes from project {project}"))?;
    if classes.is_empty() {
        bail!("no java classes found in the project {project}");
    }
    tracing::info!(%project, classes = classes.len(), max_size = config.max_size, "starting refactoring");

    let stats = config.stats.then(AgentStats::new);
    let host = config.host;
    let [critic_port, fixer_port, reviewer_port, facilitator_port] =
        free_ports().context("failed to find free ports for the agents")?;
    let url = |port: u16| -> anyhow::Result<Url> {
        agent_url(host, port)
            .parse()
            .with_context(|| format!("invalid agent address {host}:{port}"))
    };

    let critic = config
        .tools
        .iter()
        .fold(
            CriticAgent::new(instrument(&brain, stats.as_ref().map(|s| &s.critic))),
            |critic, tool| critic.with_tool(Box::new(tool.clone())),
        )
        .into_server(host, critic_port);
    let fixer = FixerAgent::new(instrument(&brain, stats.as_ref().map(|s| &s.fixer)))
        .into_server(host, fixer_port);
    let reviewer = ReviewerAgent::new(
        instrument(&brain, stats.as_ref().map(|s| &s.reviewer)),
        config.workdir.clone(),
    )
    .with_commands(config.review_commands.iter().cloned())
    .into_server(host, reviewer_port);

    let outgoing = stats.as_ref().map(|s| s.facilitator.clone());
    let engine = Engine::new(
        CriticClient::connect(url(critic_port)?, config.rpc_timeout, outgoing.clone())?,
        FixerClient::connect(url(fixer_port)?, config.rpc_timeout, outgoing.clone())?,
        ReviewerClient::connect(url(reviewer_port)?, config.rpc_timeout, outgoing)?,
    );
    let facilitator = FacilitatorAgent::new(engine)
        .with_workspace(project.clone())
        .into_server(host, facilitator_port);
    let client = FacilitatorClient::connect(url(facilitator_port)?, config.rpc_timeout, None)?;

    let topology = Topology::start(vec![
        Arc::new(critic),
        Arc::new(fixer),
        Arc::new(reviewer),
        Arc::new(facilitator),
    ])
    .await
    .context("failed to start agents")?;
    tracing::info!(
        critic = critic_port,
        fixer = fixer_port,
        reviewer = reviewer_port,
        facilitator = facilitator_port,
        "all agents are ready"
    );

    let result = dispatch(&client, project.as_ref(), classes, config.max_size).await;

    let shutdown = topology.shutdown().await;
    let mut report = match (result, shutdown) {
        (Ok(report), Ok(())) => report,
        (Ok(_), Err(err)) => return Err(err).context("failed to shut down agents"),
        (Err(err), Ok(())) => {
            tracing::error!(%project, error = %format!("{err:#}"), "refactoring aborted");
            return Err(err);
        }
        (Err(err), Err(shutdown)) => {
            tracing::warn!(error = %shutdown, "failed to shut down agents");
            tracing::error!(%project, error = %format!("{err:#}"), "refactoring aborted");
            return Err(err);
        }
    };

    tracing::info!(
        %project,
        fixed = report.fixed.len(),
        skipped = report.skipped.len(),
        changed = report.changed,
        "refactoring is finished"
    );
    if let Some(stats) = stats {
        let total = stats.total();
        total.log();
        report.stats = Some(total);
    }
    Ok(report)
}

async fn dispatch(
    facilitator: &FacilitatorClient,
    project: &dyn Project,
    classes: Vec<Arc<dyn Class>>,
    max_size: usize,
) -> anyhow::Result<Report> {
    let job = classes.iter().fold(
        Job::new(
            Description::new(REFACTOR_REQUEST)
                .with_meta(MAX_SIZE, max_size)
                .with_meta(PROJECT, project.to_string()),
        ),
        |job, class| job.with_class(class.as_ref()),
    );
    let artifacts = facilitator
        .refactor(job)
        .await
        .with_context(|| format!("failed to refactor project {project}"))?;

    let by_path: HashMap<&str, &Arc<dyn Class>> =
        classes.iter().map(|class| (class.path(), class)).collect();
    for refactored in &artifacts.classes {
        let Some(class) = by_path.get(refactored.path()) else {
            tracing::warn!(path = refactored.path(), "facilitator returned an unknown class");
            continue;
        };
        let content = refactored.content();
        if class.content() != content {
            class
                .set_content(&content)
                .with_context(|| format!("failed to set content for class {}", class.name()))?;
        }
    }

    Ok(report(&artifacts))
}

fn report(artifacts: &Artifacts) -> Report {
    let meta = &artifacts.description.meta;
    let paths = |key: &str| -> Vec<String> {
        meta.get(key)
            .and_then(Value::as_array)
            .map(|paths| {
                paths
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    };
    Report {
        fixed: paths("fixed"),
        skipped: paths("skipped"),
        changed: meta
            .get("changed")
            .and_then(Value::as_u64)
            .and_then(|changed| usize::try_from(changed).ok())
            .unwrap_or_default(),
        stats: None,
    }
}
