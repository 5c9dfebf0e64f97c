//! Live server tests over real sockets

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use refrax::{
    client::A2AClientBuilder,
    domain::{Class, Description, InMemoryClass, Job},
    protocol::{
        jsonrpc::{
            INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR, UNSUPPORTED_OPERATION,
        },
        A2AError, AgentCard, Message, Part, Role,
    },
    server::{A2AServer, HandlerContext, MessageHandler, Topology},
    util::free_port,
};
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};
use tracing_subscriber::EnvFilter;

const JOKE_REPLY: &str = "Why did the developer go broke? Because he used up all his cache.";

struct Joker;

#[async_trait]
impl MessageHandler for Joker {
    async fn handle(&self, message: Message, _ctx: HandlerContext) -> anyhow::Result<Message> {
        match message.first_text() {
            Some("fail") => anyhow::bail!("joke backend unavailable"),
            _ => Ok(Message::agent(JOKE_REPLY)),
        }
    }
}

/// Replies with the message it was sent
struct Echo;

#[async_trait]
impl MessageHandler for Echo {
    async fn handle(&self, message: Message, _ctx: HandlerContext) -> anyhow::Result<Message> {
        Ok(Message::new(Role::Agent, message.parts))
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn card(port: u16) -> AgentCard {
    AgentCard::new(
        "Joke Agent",
        "Tells jokes",
        format!("http://127.0.0.1:{port}"),
        "1.0.0",
    )
    .with_skill("joke", "Joke", "Tell a joke")
}

async fn start() -> (Topology, AgentCard, String) {
    init_tracing();
    let port = free_port().unwrap();
    let card = card(port);
    let server = Arc::new(A2AServer::new(card.clone(), port, Arc::new(Joker)));
    let topology = Topology::start(vec![server]).await.unwrap();
    (topology, card, format!("http://127.0.0.1:{port}"))
}

async fn rpc(base: &str, body: impl Into<reqwest::Body>) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(format!("{base}/"))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

fn send(id: Value, text: &str) -> String {
    json!({
        "jsonrpc": "2.0",
        "method": "message/send",
        "id": id,
        "params": {"message": Message::user(text)}
    })
    .to_string()
}

#[tokio::test]
async fn test_agent_card_is_served_verbatim() {
    let (topology, card, base) = start().await;

    let response = reqwest::get(format!("{base}/.well-known/agent-card.json"))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let served: AgentCard = response.json().await.unwrap();
    assert_eq!(served, card);

    let response = reqwest::Client::new()
        .post(format!("{base}/.well-known/agent-card.json"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 405);

    topology.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_message_send_happy_path() {
    let (topology, _, base) = start().await;

    let (status, body) = rpc(&base, send(json!("req-42"), "tell me a joke")).await;

    assert_eq!(status, 200);
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["id"], "req-42");
    assert!(body.get("error").is_none());
    let reply: Message = serde_json::from_value(body["result"].clone()).unwrap();
    assert_eq!(reply.parts, vec![Part::text(JOKE_REPLY)]);

    topology.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_error_envelopes() {
    let (topology, _, base) = start().await;

    let (status, body) = rpc(&base, "{not json").await;
    assert_eq!(status, 200);
    assert_eq!(body["error"]["code"], PARSE_ERROR);
    assert_eq!(body["id"], Value::Null);

    let (_, body) = rpc(&base, json!({"jsonrpc": "2.0", "id": 3}).to_string()).await;
    assert_eq!(body["error"]["code"], INVALID_REQUEST);
    assert_eq!(body["id"], 3);

    let (_, body) = rpc(
        &base,
        json!({"jsonrpc": "2.0", "method": "agent/dance", "id": 4}).to_string(),
    )
    .await;
    assert_eq!(body["error"]["code"], METHOD_NOT_FOUND);

    for method in ["message/stream", "tasks/get", "tasks/cancel"] {
        let (_, body) = rpc(
            &base,
            json!({"jsonrpc": "2.0", "method": method, "id": 5, "params": {}}).to_string(),
        )
        .await;
        assert_eq!(body["error"]["code"], UNSUPPORTED_OPERATION, "{method}");
    }

    let (_, body) = rpc(
        &base,
        json!({"jsonrpc": "2.0", "method": "message/send", "id": 6, "params": {"message": 1}})
            .to_string(),
    )
    .await;
    assert_eq!(body["error"]["code"], INVALID_PARAMS);

    let (_, body) = rpc(&base, send(json!(7), "fail")).await;
    assert_eq!(body["error"]["code"], -32603);
    assert_eq!(body["error"]["message"], "joke backend unavailable");
    assert_eq!(body["id"], 7);

    topology.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_client_round_trip() {
    let (topology, card, base) = start().await;
    let client = A2AClientBuilder::new_http(base.parse().unwrap())
        .with_timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    let discovered = assert_ok!(client.discover().await);
    assert_eq!(discovered, card);

    let reply = assert_ok!(client.send_message(Message::user("tell me a joke")).await);
    assert_eq!(reply.first_text(), Some(JOKE_REPLY));

    match client.send_message(Message::user("fail")).await {
        Err(A2AError::Rpc { code, message }) => {
            assert_eq!(code, -32603);
            assert_eq!(message, "joke backend unavailable");
        }
        other => panic!("Expected RPC error, got {other:?}"),
    }

    topology.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_client_reports_unreachable_agent() {
    init_tracing();
    let port = free_port().unwrap();
    let client = A2AClientBuilder::new_http(format!("http://127.0.0.1:{port}").parse().unwrap())
        .with_timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let err = assert_err!(client.send_message(Message::user("anyone?")).await);
    assert!(matches!(err, A2AError::Transport { .. }), "{err:?}");
}

#[tokio::test]
async fn test_lifecycle_misuse() {
    init_tracing();
    let port = free_port().unwrap();
    let server = Arc::new(A2AServer::new(card(port), port, Arc::new(Joker)));

    assert_err!(server.shutdown().await);

    let serving = tokio::spawn({
        let server = server.clone();
        async move { server.listen_and_serve().await }
    });
    let addr = assert_ok!(server.ready().await);
    assert_eq!(addr.port(), port);
    assert_err!(server.listen_and_serve().await);

    assert_ok!(server.shutdown().await);
    assert_ok!(serving.await.unwrap());
    assert_err!(server.shutdown().await);
}

#[tokio::test]
async fn test_empty_class_travels_both_ways() {
    init_tracing();
    let port = free_port().unwrap();
    let server = Arc::new(A2AServer::new(card(port), port, Arc::new(Echo)));
    let topology = Topology::start(vec![server]).await.unwrap();
    let client = A2AClientBuilder::new_http(format!("http://127.0.0.1:{port}").parse().unwrap())
        .with_timeout(Duration::from_secs(10))
        .build()
        .unwrap();
    let job = Job::new(Description::new("fix the class"))
        .with_class(&InMemoryClass::new("Empty", "Empty.java", ""))
        .with_example(&InMemoryClass::new("Blank", "Blank.java", ""));

    let reply = assert_ok!(client.send_message(job.to_message()).await);

    let echoed = Job::from_message(&reply).unwrap();
    assert_eq!(echoed.classes[0].content(), "");
    assert_eq!(echoed.examples[0].path(), "Blank.java");

    topology.shutdown().await.unwrap();
}
