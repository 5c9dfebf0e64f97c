//! Statistics layer recording inter-agent calls

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Instant,
};

use tower_layer::Layer;
use tower_service::Service;

use crate::{
    protocol::{
        error::A2AError,
        message::Message,
        operation::A2AOperation,
        part::{FileContent, Part},
    },
    service::{A2ARequest, A2AResponse},
    stats::{approx_tokens, Observation, Stats},
};

/// Layer that records every `message/send` exchange on the A2A channel of a [`Stats`]
///
/// Without a collector the layer is a pass-through.
#[derive(Clone, Debug, Default)]
pub struct StatsLayer {
    stats: Option<Arc<Stats>>,
}

impl StatsLayer {
    pub fn new(stats: Arc<Stats>) -> Self {
        Self { stats: Some(stats) }
    }

    pub fn disabled() -> Self {
        Self { stats: None }
    }
}

impl<S> Layer<S> for StatsLayer {
    type Service = StatsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        StatsService {
            inner,
            stats: self.stats.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StatsService<S> {
    inner: S,
    stats: Option<Arc<Stats>>,
}

/// Tokens and serialized size of a message
fn measure(message: &Message) -> (usize, usize) {
    let bytes = serde_json::to_vec(message).map(|v| v.len()).unwrap_or(0);

    let mut text = String::new();
    for part in &message.parts {
        match part {
            Part::Text { text: t, .. } => text.push_str(t),
            Part::File {
                file: FileContent::Bytes(file),
                ..
            } => {
                if let Ok(decoded) = file.decode() {
                    text.push_str(&String::from_utf8_lossy(&decoded));
                }
            }
            _ => {}
        }
        text.push('\n');
    }

    (approx_tokens(&text), bytes)
}

impl<S> Service<A2ARequest> for StatsService<S>
where
    S: Service<A2ARequest, Response = A2AResponse, Error = A2AError> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = A2AResponse;
    type Error = A2AError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: A2ARequest) -> Self::Future {
        let mut inner = self.inner.clone();

        let stats = match (&self.stats, &req.operation) {
            (Some(stats), A2AOperation::SendMessage(params)) => {
                Some((stats.clone(), measure(&params.message)))
            }
            _ => None,
        };

        Box::pin(async move {
            let started = Instant::now();
            let response = inner.call(req).await?;

            if let (Some((stats, (request_tokens, request_bytes))), A2AResponse::Message(reply)) =
                (stats, &response)
            {
                let (response_tokens, response_bytes) = measure(reply);
                stats.record_a2a(Observation {
                    duration: started.elapsed(),
                    request_tokens,
                    response_tokens,
                    request_bytes,
                    response_bytes,
                });
            }

            Ok(response)
        })
    }
}
