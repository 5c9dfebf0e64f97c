//! Agent-side HTTP surface
//!
//! An [`A2AServer`] binds a port, serves its [`AgentCard`] on the well-known path and answers
//! JSON-RPC calls on `/` by dispatching to a [`MessageHandler`]. Several servers are brought up
//! and torn down together through a [`Topology`].

mod handler;
mod rpc;
mod supervisor;

pub use handler::{HandlerContext, MessageHandler};
pub use supervisor::Topology;

use std::{
    future::IntoFuture,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tokio::{net::TcpListener, sync::watch};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

use crate::protocol::{
    agent::{AgentCard, AGENT_CARD_PATH},
    error::{A2AError, A2AResult},
    jsonrpc::JsonRpcResponse,
};

/// How long in-flight requests may take to drain once shutdown begins
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Serving,
    ShuttingDown,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Readiness {
    Pending,
    Ready(SocketAddr),
    Failed(String),
}

#[derive(Clone)]
struct AppState {
    card: Arc<AgentCard>,
    handler: Arc<dyn MessageHandler>,
    cancellation: CancellationToken,
    span: Span,
}

/// A single agent endpoint
///
/// The lifecycle is one-shot: `listen_and_serve` may be called once, and `shutdown` is only
/// valid while the server is serving.
pub struct A2AServer {
    card: Arc<AgentCard>,
    addr: SocketAddr,
    handler: Arc<dyn MessageHandler>,
    span: Span,
    cancellation: CancellationToken,
    lifecycle: Mutex<Lifecycle>,
    readiness: watch::Sender<Readiness>,
    done: watch::Sender<bool>,
}

impl A2AServer {
    /// Create a server for `card` on `127.0.0.1:port`
    pub fn new(card: AgentCard, port: u16, handler: Arc<dyn MessageHandler>) -> Self {
        let span = tracing::info_span!("agent", name = %card.name, port);
        let (readiness, _) = watch::channel(Readiness::Pending);
        let (done, _) = watch::channel(false);
        Self {
            card: Arc::new(card),
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port),
            handler,
            span,
            cancellation: CancellationToken::new(),
            lifecycle: Mutex::new(Lifecycle::Idle),
            readiness,
            done,
        }
    }

    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.addr.set_ip(host);
        self
    }

    /// Run the server loop and its handlers inside `span`
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn card(&self) -> &AgentCard {
        &self.card
    }

    /// Address the server was asked to bind
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Bind the port and serve until [`A2AServer::shutdown`] is called
    ///
    /// Readiness is signalled as soon as the listener is bound, so callers waiting on
    /// [`A2AServer::ready`] may issue requests immediately afterwards.
    pub async fn listen_and_serve(&self) -> A2AResult<()> {
        {
            let mut lifecycle = self.lifecycle();
            if *lifecycle != Lifecycle::Idle {
                return Err(A2AError::Server(format!(
                    "agent '{}' has already been started",
                    self.card.name
                )));
            }
            *lifecycle = Lifecycle::Serving;
        }

        let result = self.serve().instrument(self.span.clone()).await;

        *self.lifecycle() = Lifecycle::Stopped;
        self.done.send_replace(true);
        result
    }

    async fn serve(&self) -> A2AResult<()> {
        let listener = match TcpListener::bind(self.addr).await {
            Ok(listener) => listener,
            Err(err) => {
                let reason = format!("failed to bind {}: {err}", self.addr);
                tracing::error!(%reason, "agent failed to start");
                self.readiness.send_replace(Readiness::Failed(reason.clone()));
                return Err(A2AError::Server(reason));
            }
        };
        let local = match listener.local_addr() {
            Ok(local) => local,
            Err(err) => {
                let reason = format!("failed to read bound address: {err}");
                self.readiness.send_replace(Readiness::Failed(reason.clone()));
                return Err(A2AError::Server(reason));
            }
        };

        tracing::info!(%local, "agent listening");
        self.readiness.send_replace(Readiness::Ready(local));

        let token = self.cancellation.clone();
        let graceful = token.clone();
        let serve = axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { graceful.cancelled().await })
            .into_future();
        tokio::pin!(serve);

        tokio::select! {
            result = &mut serve => {
                result.map_err(|err| A2AError::Server(format!("agent server loop failed: {err}")))?;
            }
            _ = async {
                token.cancelled().await;
                tokio::time::sleep(SHUTDOWN_GRACE_PERIOD).await;
            } => {
                tracing::warn!(
                    grace_period = ?SHUTDOWN_GRACE_PERIOD,
                    "in-flight requests did not drain, closing connections"
                );
            }
        }

        tracing::info!("agent stopped");
        Ok(())
    }

    fn router(&self) -> Router {
        let state = AppState {
            card: self.card.clone(),
            handler: self.handler.clone(),
            cancellation: self.cancellation.clone(),
            span: self.span.clone(),
        };
        Router::new()
            .route(AGENT_CARD_PATH, get(agent_card))
            .route("/", post(message_send))
            .with_state(state)
    }

    /// Wait until the listener is bound and return its address
    pub async fn ready(&self) -> A2AResult<SocketAddr> {
        let mut rx = self.readiness.subscribe();
        let readiness = rx
            .wait_for(|readiness| *readiness != Readiness::Pending)
            .await
            .map_err(|_| A2AError::Server("agent dropped before becoming ready".into()))?;
        match &*readiness {
            Readiness::Ready(addr) => Ok(*addr),
            Readiness::Failed(reason) => Err(A2AError::Server(reason.clone())),
            Readiness::Pending => Err(A2AError::Server("agent is not ready".into())),
        }
    }

    /// Stop accepting connections and wait for the serve loop to finish
    ///
    /// In-flight requests get [`SHUTDOWN_GRACE_PERIOD`] to complete. Shutting down a server
    /// that was never started, or shutting it down twice, is an error.
    pub async fn shutdown(&self) -> A2AResult<()> {
        {
            let mut lifecycle = self.lifecycle();
            match *lifecycle {
                Lifecycle::Idle => {
                    return Err(A2AError::Server(format!(
                        "agent '{}' is not started",
                        self.card.name
                    )))
                }
                Lifecycle::ShuttingDown | Lifecycle::Stopped => {
                    return Err(A2AError::Server(format!(
                        "agent '{}' is already shut down",
                        self.card.name
                    )))
                }
                Lifecycle::Serving => *lifecycle = Lifecycle::ShuttingDown,
            }
        }

        tracing::info!(parent: &self.span, "shutting down agent");
        self.cancellation.cancel();

        let mut done = self.done.subscribe();
        done.wait_for(|done| *done)
            .await
            .map_err(|_| A2AError::Server("agent dropped during shutdown".into()))?;
        Ok(())
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for A2AServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("A2AServer")
            .field("name", &self.card.name)
            .field("addr", &self.addr)
            .field("lifecycle", &*self.lifecycle())
            .finish()
    }
}

async fn agent_card(State(state): State<AppState>) -> Json<AgentCard> {
    Json(state.card.as_ref().clone())
}

async fn message_send(State(state): State<AppState>, body: Bytes) -> Json<JsonRpcResponse> {
    let ctx = HandlerContext::new(state.cancellation.child_token());
    let response = rpc::dispatch(state.handler.as_ref(), ctx, &body)
        .instrument(state.span.clone())
        .await;
    Json(response)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use crate::{protocol::message::Message, util::free_port};

    use super::*;

    struct Echo;

    #[async_trait]
    impl MessageHandler for Echo {
        async fn handle(&self, message: Message, _ctx: HandlerContext) -> anyhow::Result<Message> {
            Ok(Message::agent(message.first_text().unwrap_or_default()))
        }
    }

    fn server(port: u16) -> Arc<A2AServer> {
        let card = AgentCard::new("echo", "Echoes text", format!("http://127.0.0.1:{port}"), "0.1.0");
        Arc::new(A2AServer::new(card, port, Arc::new(Echo)))
    }

    #[tokio::test]
    async fn test_ready_reports_bound_address() {
        let port = free_port().unwrap();
        let server = server(port);
        let task = tokio::spawn({
            let server = server.clone();
            async move { server.listen_and_serve().await }
        });

        let addr = server.ready().await.unwrap();
        assert_eq!(addr.port(), port);

        server.shutdown().await.unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_before_start_is_error() {
        let server = server(free_port().unwrap());
        let err = server.shutdown().await.unwrap_err();
        assert!(err.to_string().contains("not started"));
    }

    #[tokio::test]
    async fn test_double_shutdown_is_error() {
        let server = server(free_port().unwrap());
        let task = tokio::spawn({
            let server = server.clone();
            async move { server.listen_and_serve().await }
        });
        server.ready().await.unwrap();

        server.shutdown().await.unwrap();
        let err = server.shutdown().await.unwrap_err();
        assert!(err.to_string().contains("already shut down"));
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_cannot_start_twice() {
        let server = server(free_port().unwrap());
        let task = tokio::spawn({
            let server = server.clone();
            async move { server.listen_and_serve().await }
        });
        server.ready().await.unwrap();

        assert!(server.listen_and_serve().await.is_err());

        server.shutdown().await.unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported_as_not_ready() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();
        let server = server(port);

        let serve = server.listen_and_serve();
        let (served, ready) = tokio::join!(serve, server.ready());

        assert!(served.is_err());
        assert!(ready.unwrap_err().to_string().contains("failed to bind"));
    }
}
