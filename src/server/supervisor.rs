//! Bring-up and teardown of a group of agents

use std::{net::SocketAddr, sync::Arc};

use tokio::task::JoinHandle;

use crate::protocol::error::{A2AError, A2AResult};

use super::A2AServer;

/// A set of agents that were started together and must be stopped together
///
/// Construction succeeds only once every agent reports ready; if any of them fails to start the
/// others are aborted and the error is returned. Dropping a `Topology` without calling
/// [`Topology::shutdown`] aborts the serve tasks.
#[derive(Debug)]
pub struct Topology {
    servers: Vec<Arc<A2AServer>>,
    addrs: Vec<SocketAddr>,
    tasks: Vec<JoinHandle<A2AResult<()>>>,
}

impl Topology {
    /// Spawn every server and wait until all of them are listening
    pub async fn start(servers: Vec<Arc<A2AServer>>) -> A2AResult<Self> {
        let tasks = servers
            .iter()
            .map(|server| {
                let server = server.clone();
                tokio::spawn(async move { server.listen_and_serve().await })
            })
            .collect();
        let mut topology = Self {
            servers,
            addrs: Vec::new(),
            tasks,
        };

        for (server, task) in topology.servers.iter().zip(topology.tasks.iter_mut()) {
            let addr = tokio::select! {
                ready = server.ready() => ready?,
                exited = task => {
                    return Err(match exited {
                        Ok(Err(err)) => err,
                        Ok(Ok(())) => A2AError::Server(format!(
                            "agent '{}' stopped before becoming ready",
                            server.card().name
                        )),
                        Err(err) => A2AError::Server(format!(
                            "agent '{}' task failed: {err}",
                            server.card().name
                        )),
                    });
                }
            };
            tracing::debug!(agent = %server.card().name, %addr, "agent ready");
            topology.addrs.push(addr);
        }

        tracing::info!(agents = topology.servers.len(), "all agents ready");
        Ok(topology)
    }

    /// Bound addresses, in the order the servers were given
    pub fn addrs(&self) -> &[SocketAddr] {
        &self.addrs
    }

    /// Shut every agent down and wait for the serve tasks to exit
    ///
    /// All agents are asked to stop even if some of them fail; the first failure is returned.
    pub async fn shutdown(mut self) -> A2AResult<()> {
        let mut first_error = None;

        let results =
            futures::future::join_all(self.servers.iter().map(|server| server.shutdown())).await;
        for (server, result) in self.servers.iter().zip(results) {
            if let Err(err) = result {
                tracing::warn!(agent = %server.card().name, error = %err, "failed to shut down agent");
                first_error.get_or_insert(err);
            }
        }

        for (server, task) in self.servers.iter().zip(std::mem::take(&mut self.tasks)) {
            let outcome = match task.await {
                Ok(result) => result,
                Err(err) => Err(A2AError::Server(format!("agent task failed: {err}"))),
            };
            if let Err(err) = outcome {
                tracing::warn!(agent = %server.card().name, error = %err, "agent exited with error");
                first_error.get_or_insert(err);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for Topology {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use crate::{
        protocol::{agent::AgentCard, message::Message},
        server::{HandlerContext, MessageHandler},
        util::free_port,
    };

    use super::*;

    struct Silent;

    #[async_trait]
    impl MessageHandler for Silent {
        async fn handle(&self, _message: Message, _ctx: HandlerContext) -> anyhow::Result<Message> {
            Ok(Message::agent("ok"))
        }
    }

    fn server(name: &str, port: u16) -> Arc<A2AServer> {
        let card = AgentCard::new(name, "test agent", format!("http://127.0.0.1:{port}"), "0.1.0");
        Arc::new(A2AServer::new(card, port, Arc::new(Silent)))
    }

    #[tokio::test]
    async fn test_start_and_shutdown_all() {
        let ports = [free_port().unwrap(), free_port().unwrap()];
        let topology = Topology::start(vec![server("a", ports[0]), server("b", ports[1])])
            .await
            .unwrap();

        let bound: Vec<u16> = topology.addrs().iter().map(|addr| addr.port()).collect();
        assert_eq!(bound, ports);

        topology.shutdown().await.unwrap();
        assert!(std::net::TcpListener::bind(("127.0.0.1", ports[0])).is_ok());
    }

    #[tokio::test]
    async fn test_any_bind_failure_aborts_start() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let busy = taken.local_addr().unwrap().port();

        let err = Topology::start(vec![server("a", free_port().unwrap()), server("b", busy)])
            .await
            .unwrap_err();

        assert!(err.to_string().contains("failed to bind"));
    }
}
