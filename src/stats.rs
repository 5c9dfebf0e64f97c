//! Interaction statistics
//!
//! A [`Stats`] instance accumulates observations on two channels: calls to the language-model
//! backend and calls between agents. Each agent owns one instance; they are combined with
//! [`Stats::add`] at the end of a run.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
    time::Duration,
};

use anyhow::Context as _;
use tiktoken_rs::CoreBPE;

/// One observed exchange on a channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Observation {
    pub duration: Duration,
    pub request_tokens: usize,
    pub response_tokens: usize,
    pub request_bytes: usize,
    pub response_bytes: usize,
}

/// Accumulated counters for one channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelStats {
    pub durations: Vec<Duration>,
    pub request_tokens: usize,
    pub response_tokens: usize,
    pub request_bytes: usize,
    pub response_bytes: usize,
}

impl ChannelStats {
    fn record(&mut self, observation: Observation) {
        self.durations.push(observation.duration);
        self.request_tokens += observation.request_tokens;
        self.response_tokens += observation.response_tokens;
        self.request_bytes += observation.request_bytes;
        self.response_bytes += observation.response_bytes;
    }

    fn merge(&self, other: &ChannelStats) -> ChannelStats {
        let mut durations = self.durations.clone();
        durations.extend_from_slice(&other.durations);
        ChannelStats {
            durations,
            request_tokens: self.request_tokens + other.request_tokens,
            response_tokens: self.response_tokens + other.response_tokens,
            request_bytes: self.request_bytes + other.request_bytes,
            response_bytes: self.response_bytes + other.response_bytes,
        }
    }

    pub fn count(&self) -> usize {
        self.durations.len()
    }

    pub fn total_duration(&self) -> Duration {
        self.durations.iter().sum()
    }

    pub fn average_duration(&self) -> Duration {
        match u32::try_from(self.count()) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(n) => self.total_duration() / n,
        }
    }

    pub fn min_duration(&self) -> Duration {
        self.durations.iter().copied().min().unwrap_or_default()
    }

    pub fn max_duration(&self) -> Duration {
        self.durations.iter().copied().max().unwrap_or_default()
    }

    pub fn total_tokens(&self) -> usize {
        self.request_tokens + self.response_tokens
    }

    fn per_request(&self, total: usize) -> usize {
        total.checked_div(self.count()).unwrap_or(0)
    }

    fn entries(&self, channel: &str) -> Vec<Entry> {
        vec![
            Entry::new(format!("Total {channel} messages asked"), self.count()),
            Entry::new(
                format!("Total {channel} request duration"),
                format!("{:?}", self.total_duration()),
            ),
            Entry::new(format!("Total {channel} tokens"), self.total_tokens()),
            Entry::new(format!("Total {channel} request tokens"), self.request_tokens),
            Entry::new(format!("Total {channel} response tokens"), self.response_tokens),
            Entry::new(format!("Total {channel} request bytes"), self.request_bytes),
            Entry::new(format!("Total {channel} response bytes"), self.response_bytes),
            Entry::new(
                format!("Average {channel} request duration"),
                format!("{:?}", self.average_duration()),
            ),
            Entry::new(
                format!("Fastest {channel} request"),
                format!("{:?}", self.min_duration()),
            ),
            Entry::new(
                format!("Slowest {channel} request"),
                format!("{:?}", self.max_duration()),
            ),
            Entry::new(
                format!("Average {channel} request tokens"),
                self.per_request(self.request_tokens),
            ),
            Entry::new(
                format!("Average {channel} response tokens"),
                self.per_request(self.response_tokens),
            ),
            Entry::new(
                format!("Average {channel} request bytes"),
                self.per_request(self.request_bytes),
            ),
        ]
    }
}

/// A labelled, formatted statistic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub label: String,
    pub value: String,
}

impl Entry {
    fn new(label: String, value: impl ToString) -> Self {
        Self {
            label,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

#[derive(Debug, Default)]
struct Channels {
    llm: ChannelStats,
    a2a: ChannelStats,
}

/// Thread-safe statistics for one agent
///
/// Every read and write takes the internal lock for the duration of a counter update or a
/// snapshot copy, never across I/O.
#[derive(Debug, Default)]
pub struct Stats {
    name: String,
    channels: Mutex<Channels>,
}

impl Stats {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channels: Mutex::new(Channels::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record one call to the language-model backend
    pub fn record_llm(&self, observation: Observation) {
        self.lock().llm.record(observation);
    }

    /// Record one call to another agent
    pub fn record_a2a(&self, observation: Observation) {
        self.lock().a2a.record(observation);
    }

    /// Snapshot of the language-model channel
    pub fn llm(&self) -> ChannelStats {
        self.lock().llm.clone()
    }

    /// Snapshot of the inter-agent channel
    pub fn a2a(&self) -> ChannelStats {
        self.lock().a2a.clone()
    }

    /// Combine two instances into a new one named "`self` + `other`"
    ///
    /// Neither operand is modified. Each operand is snapshotted under its own lock in turn, so
    /// adding an instance to itself is fine.
    pub fn add(&self, other: &Stats) -> Stats {
        let (llm, a2a) = {
            let mine = self.lock();
            (mine.llm.clone(), mine.a2a.clone())
        };
        let (other_llm, other_a2a) = {
            let theirs = other.lock();
            (theirs.llm.clone(), theirs.a2a.clone())
        };

        Stats {
            name: format!("{} + {}", self.name, other.name),
            channels: Mutex::new(Channels {
                llm: llm.merge(&other_llm),
                a2a: a2a.merge(&other_a2a),
            }),
        }
    }

    /// All derived statistics, language-model channel first
    pub fn entries(&self) -> Vec<Entry> {
        let (llm, a2a) = {
            let channels = self.lock();
            (channels.llm.clone(), channels.a2a.clone())
        };
        let mut entries = llm.entries("LLM");
        entries.extend(a2a.entries("A2A"));
        entries
    }

    /// Emit every entry through `tracing`
    pub fn log(&self) {
        tracing::info!(stats = %self.name, "statistics");
        for entry in self.entries() {
            tracing::info!(stats = %self.name, "{entry}");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Channels> {
        // Counters stay consistent even if a holder panicked mid-update
        self.channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn encoder() -> anyhow::Result<&'static CoreBPE> {
    static ENCODER: OnceLock<CoreBPE> = OnceLock::new();
    if let Some(bpe) = ENCODER.get() {
        return Ok(bpe);
    }
    let bpe = tiktoken_rs::cl100k_base().context("failed to load cl100k_base encoding")?;
    Ok(ENCODER.get_or_init(|| bpe))
}

/// Count cl100k tokens in `text`
pub fn tokens(text: &str) -> anyhow::Result<usize> {
    Ok(encoder()?.encode_with_special_tokens(text).len())
}

/// Token count for accounting purposes; a tokenizer failure counts as zero
pub(crate) fn approx_tokens(text: &str) -> usize {
    tokens(text).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "token counting failed");
        0
    })
}
