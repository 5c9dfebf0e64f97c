//! A2A wire-format compliance tests
//!
//! These tests pin the JSON shapes exchanged between agents.

use refrax::{
    domain::{Class, Description, InMemoryClass, Job, Suggestion},
    protocol::{
        jsonrpc::{
            JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId, INTERNAL_ERROR,
            JSONRPC_VERSION,
        },
        AgentCard, FileContent, Message, MessageSendParams, Part, Role,
    },
};
use serde_json::{json, Map};

#[test]
fn test_role_serialization() {
    let json = serde_json::to_value(Message::user("Hello")).unwrap();
    assert_eq!(json["role"], "user");

    let json = serde_json::to_value(Message::agent("Hi there")).unwrap();
    assert_eq!(json["role"], "agent");
}

#[test]
fn test_message_field_naming() {
    let msg = Message::builder()
        .role(Role::User)
        .part(Part::text("Test"))
        .message_id("msg-123")
        .task_id("task-456")
        .context_id("ctx-789")
        .build()
        .unwrap();

    let json = serde_json::to_value(&msg).unwrap();

    assert_eq!(json["messageId"], "msg-123");
    assert_eq!(json["taskId"], "task-456");
    assert_eq!(json["contextId"], "ctx-789");
    assert_eq!(json["kind"], "message");

    assert!(json.get("message_id").is_none());
    assert!(json.get("task_id").is_none());
}

#[test]
fn test_message_ids_are_unique() {
    let a = Message::user("same");
    let b = Message::user("same");

    assert!(!a.message_id.is_empty());
    assert_ne!(a.message_id, b.message_id);
}

#[test]
fn test_parts_keep_send_order() {
    let msg = Message::new(
        Role::User,
        vec![Part::text("first"), Part::file_bytes("second"), Part::text("third")],
    );

    let json = serde_json::to_string(&msg).unwrap();
    let back: Message = serde_json::from_str(&json).unwrap();

    assert_eq!(back, msg);
    assert_eq!(back.parts[0].as_text(), Some("first"));
    assert_eq!(back.parts[2].as_text(), Some("third"));
}

#[test]
fn test_every_part_kind_round_trips() {
    let mut data = Map::new();
    data.insert("score".into(), json!(0.5));
    let parts = [
        Part::text("hello").with_metadata("type", "suggestion"),
        Part::file_bytes("public class A {}").with_metadata("class-name", "A"),
        Part::file_uri("file:///src/A.java"),
        Part::data(data),
    ];

    for part in parts {
        let json = serde_json::to_value(&part).unwrap();
        assert!(json.get("kind").is_some(), "{json}");

        let back: Part = serde_json::from_value(json).unwrap();
        assert_eq!(back, part);
    }
}

#[test]
fn test_file_part_shapes() {
    let inline: Part = serde_json::from_value(json!({
        "kind": "file",
        "file": {"bytes": "aGVsbG8=", "name": "hello.txt", "mimeType": "text/plain"}
    }))
    .unwrap();
    match inline {
        Part::File {
            file: FileContent::Bytes(file),
            ..
        } => {
            assert_eq!(file.decode().unwrap(), b"hello");
            assert_eq!(file.mime_type.as_deref(), Some("text/plain"));
        }
        other => panic!("Expected inline file, got {other:?}"),
    }

    let referenced: Part = serde_json::from_value(json!({
        "kind": "file",
        "file": {"uri": "https://example.com/A.java"}
    }))
    .unwrap();
    assert!(matches!(
        referenced,
        Part::File {
            file: FileContent::Uri(_),
            ..
        }
    ));
}

#[test]
fn test_unknown_part_kind_is_an_error() {
    let result = serde_json::from_value::<Message>(json!({
        "role": "user",
        "messageId": "m-1",
        "kind": "message",
        "parts": [{"kind": "audio", "samples": []}]
    }));

    let err = result.unwrap_err().to_string();
    assert!(err.contains("unknown part kind 'audio'"), "{err}");
}

#[test]
fn test_request_envelope() {
    let params = MessageSendParams::new(Message::user("tell me a joke"));
    let request = JsonRpcRequest::new(
        "message/send",
        serde_json::to_value(&params).unwrap(),
        "req-1",
    );

    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["jsonrpc"], JSONRPC_VERSION);
    assert_eq!(json["method"], "message/send");
    assert_eq!(json["id"], "req-1");
    assert_eq!(json["params"]["message"]["parts"][0]["text"], "tell me a joke");
}

#[test]
fn test_request_id_shapes() {
    for (raw, expected) in [
        (json!("abc"), RequestId::String("abc".into())),
        (json!(7), RequestId::Number(7)),
        (json!(null), RequestId::Null),
    ] {
        let request: JsonRpcRequest = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "method": "message/send",
            "id": raw,
        }))
        .unwrap();
        assert_eq!(request.id, expected);
    }
}

#[test]
fn test_response_has_exactly_one_outcome() {
    let success = JsonRpcResponse::success(RequestId::from(1), json!({"ok": true}));
    let failure = JsonRpcResponse::failure(
        RequestId::from("x"),
        JsonRpcError::new(INTERNAL_ERROR, "boom"),
    );

    for response in [success, failure] {
        let json = serde_json::to_value(&response).unwrap();
        let populated = ["result", "error"]
            .iter()
            .filter(|key| json.get(**key).is_some())
            .count();
        assert_eq!(populated, 1, "{json}");
    }
}

#[test]
fn test_response_with_both_outcomes_is_rejected() {
    let result = serde_json::from_value::<JsonRpcResponse>(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {},
        "error": {"code": -32603, "message": "boom"}
    }));
    assert!(result.is_err());

    let result = serde_json::from_value::<JsonRpcResponse>(json!({"jsonrpc": "2.0", "id": 1}));
    assert!(result.is_err());
}

#[test]
fn test_agent_card_wire_format() {
    let card = AgentCard::new("Critic Agent", "Reviews code", "http://127.0.0.1:9000", "0.1.0")
        .with_skill("critic-java-code", "Critic Java Code", "Review Java code");

    let json = serde_json::to_value(&card).unwrap();

    assert_eq!(json["name"], "Critic Agent");
    assert_eq!(json["url"], "http://127.0.0.1:9000");
    assert_eq!(json["skills"][0]["id"], "critic-java-code");
    assert!(json.get("defaultInputModes").is_some());

    let back: AgentCard = serde_json::from_value(json).unwrap();
    assert_eq!(back, card);
}

#[test]
fn test_job_round_trip_through_json() {
    let job = Job::new(Description::new("refactor the project").with_meta("max-size", 50))
        .with_class(&InMemoryClass::new("A", "src/A.java", "class A {}\n"))
        .with_class(&InMemoryClass::new("B", "src/B.java", "class B {}\n"))
        .with_example(&InMemoryClass::new("Good", "ex/Good.java", "final class Good {}\n"))
        .with_suggestions([
            Suggestion::new("make A final", "src/A.java"),
            Suggestion::new("rename B", "src/B.java"),
            Suggestion::new("add javadoc", "src/A.java"),
        ]);

    let wire = serde_json::to_string(&job.to_message()).unwrap();
    let message: Message = serde_json::from_str(&wire).unwrap();
    let back = Job::from_message(&message).unwrap();

    assert_eq!(back, job);
    assert_eq!(back.max_size(), 50);
    assert_eq!(back.classes[1].name(), "B");
    assert_eq!(back.suggestions[2].text, "add javadoc");
}
