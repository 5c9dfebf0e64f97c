//! Role implementations that forward to an agent over A2A

use std::{sync::Arc, time::Duration};

use anyhow::Context as _;
use async_trait::async_trait;
use url::Url;

use crate::{
    client::{A2AClientBuilder, HttpAgentClient},
    domain::{Artifacts, Description, Job},
    protocol::error::A2AResult,
    stats::Stats,
};

use super::{Critic, Facilitator, Fixer, Reviewer, REVIEW_REQUEST};

fn connect(url: Url, timeout: Duration, stats: Option<Arc<Stats>>) -> A2AResult<HttpAgentClient> {
    let mut builder = A2AClientBuilder::new_http(url).with_timeout(timeout);
    if let Some(stats) = stats {
        builder = builder.with_stats(stats);
    }
    builder.build()
}

async fn exchange(client: &HttpAgentClient, job: Job) -> anyhow::Result<Artifacts> {
    let url = &client.config().agent_url;
    let reply = client
        .send_message(job.to_message())
        .await
        .with_context(|| format!("agent at {url} did not answer"))?;
    Artifacts::from_message(&reply)
        .with_context(|| format!("agent at {url} replied with malformed artifacts"))
}

macro_rules! remote_role {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            client: HttpAgentClient,
        }

        impl $name {
            /// Connect to the agent at `url`; A2A exchanges are recorded on `stats` when given
            pub fn connect(
                url: Url,
                timeout: Duration,
                stats: Option<Arc<Stats>>,
            ) -> A2AResult<Self> {
                Ok(Self {
                    client: connect(url, timeout, stats)?,
                })
            }

            pub fn client(&self) -> &HttpAgentClient {
                &self.client
            }
        }
    };
}

remote_role!(
    /// A [`Critic`] served by a remote agent
    CriticClient
);
remote_role!(
    /// A [`Fixer`] served by a remote agent
    FixerClient
);
remote_role!(
    /// A [`Reviewer`] served by a remote agent
    ReviewerClient
);
remote_role!(
    /// A [`Facilitator`] served by a remote agent
    FacilitatorClient
);

#[async_trait]
impl Critic for CriticClient {
    async fn review(&self, job: Job) -> anyhow::Result<Artifacts> {
        exchange(&self.client, job).await
    }
}

#[async_trait]
impl Fixer for FixerClient {
    async fn fix(&self, job: Job) -> anyhow::Result<Artifacts> {
        exchange(&self.client, job).await
    }
}

#[async_trait]
impl Reviewer for ReviewerClient {
    async fn review(&self) -> anyhow::Result<Artifacts> {
        exchange(&self.client, Job::new(Description::new(REVIEW_REQUEST))).await
    }
}

#[async_trait]
impl Facilitator for FacilitatorClient {
    async fn refactor(&self, job: Job) -> anyhow::Result<Artifacts> {
        exchange(&self.client, job).await
    }
}
