//! Brain decorator that records LLM calls

use std::{sync::Arc, time::Instant};

use async_trait::async_trait;

use crate::stats::{approx_tokens, Observation, Stats};

use super::{Brain, BrainError};

/// Records every successful question on the LLM channel of a [`Stats`]
pub struct MetricBrain<B> {
    origin: B,
    stats: Arc<Stats>,
}

impl<B: Brain> MetricBrain<B> {
    pub fn new(origin: B, stats: Arc<Stats>) -> Self {
        Self { origin, stats }
    }
}

#[async_trait]
impl<B: Brain> Brain for MetricBrain<B> {
    async fn ask(&self, question: &str) -> Result<String, BrainError> {
        let started = Instant::now();
        let answer = self.origin.ask(question).await?;
        self.stats.record_llm(Observation {
            duration: started.elapsed(),
            request_tokens: approx_tokens(question),
            response_tokens: approx_tokens(&answer),
            request_bytes: question.len(),
            response_bytes: answer.len(),
        });
        Ok(answer)
    }
}
