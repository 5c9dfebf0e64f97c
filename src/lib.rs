//! # Refrax
//!
//! Budget-bounded refactoring driven by cooperating A2A agents.
//!
//! A refactoring run starts four agents as independent JSON-RPC-over-HTTP services: a critic that
//! suggests improvements for one class, a fixer that applies them, a reviewer that runs project
//! checks, and a facilitator that drives the other three. The facilitator visits the project's
//! classes one at a time and stops rewriting once the accumulated line diff reaches the
//! configured budget.
//!
//! The A2A plumbing is built from Tower services and layers: a [`client::AgentClient`] is a
//! [`service::A2AProtocolService`] over a [`transport::Transport`], wrapped in validation and
//! statistics layers. The server side is an axum router around a [`server::MessageHandler`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use refrax::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let project = Arc::new(FilesystemProject::new("src/main/java"));
//!     let config = RefactorConfig::default()
//!         .with_max_size(50)
//!         .with_review_command("mvn -q compile")
//!         .with_workdir(".");
//!
//!     let report = refrax::refactor::run(project, Arc::new(MockBrain), &config).await?;
//!     println!("fixed {:?}, {} lines changed", report.fixed, report.changed);
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod brain;
pub mod client;
pub mod codec;
pub mod config;
pub mod diff;
pub mod domain;
pub mod engine;
pub mod layer;
pub mod protocol;
pub mod refactor;
pub mod server;
pub mod service;
pub mod stats;
pub mod tool;
pub mod transport;
pub mod util;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        agents::{Critic, Facilitator, Fixer, Reviewer},
        brain::{Brain, MockBrain},
        client::{A2AClientBuilder, AgentClient},
        config::RefactorConfig,
        domain::{Artifacts, Class, Description, FilesystemProject, Job, Project, Suggestion},
        protocol::error::A2AError,
        protocol::{AgentCard, Message, Part, Role},
        server::{A2AServer, HandlerContext, MessageHandler},
        stats::Stats,
    };
}
