//! Refactoring run configuration

use std::{
    fmt,
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use crate::{domain::DEFAULT_MAX_SIZE, tool::Tool, transport::http::DEFAULT_TIMEOUT};

/// Settings for [`crate::refactor::run`]
#[derive(Clone)]
pub struct RefactorConfig {
    /// Change budget in lines
    pub max_size: usize,

    /// Collect per-agent statistics and log them when the run ends
    pub stats: bool,

    /// Shell commands the reviewer runs in `workdir`
    pub review_commands: Vec<String>,

    /// Directory the review commands run in, usually the project root
    pub workdir: PathBuf,

    /// Timeout for every inter-agent call
    pub rpc_timeout: Duration,

    /// Address the agents listen on
    pub host: IpAddr,

    /// Static-analysis tools whose findings go into every critique
    pub tools: Vec<Arc<dyn Tool>>,
}

impl RefactorConfig {
    pub fn new() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            stats: false,
            review_commands: Vec::new(),
            workdir: PathBuf::from("."),
            rpc_timeout: DEFAULT_TIMEOUT,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            tools: Vec::new(),
        }
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_stats(mut self, enabled: bool) -> Self {
        self.stats = enabled;
        self
    }

    pub fn with_review_command(mut self, command: impl Into<String>) -> Self {
        self.review_commands.push(command.into());
        self
    }

    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }
}

impl fmt::Debug for RefactorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefactorConfig")
            .field("max_size", &self.max_size)
            .field("stats", &self.stats)
            .field("review_commands", &self.review_commands)
            .field("workdir", &self.workdir)
            .field("rpc_timeout", &self.rpc_timeout)
            .field("host", &self.host)
            .field("tools", &self.tools.len())
            .finish()
    }
}

impl Default for RefactorConfig {
    fn default() -> Self {
        Self::new()
    }
}
