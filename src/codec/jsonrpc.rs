//! JSON-RPC 2.0 codec for A2A protocol
//!
//! `message/send` calls travel in JSON-RPC 2.0 envelopes; the Agent Card is plain JSON.

use bytes::Bytes;
use uuid::Uuid;

use crate::{
    codec::Codec,
    protocol::{
        agent::AgentCard,
        error::A2AError,
        jsonrpc::{JsonRpcRequest, JsonRpcResponse, RequestId},
        message::Message,
        operation::{A2AOperation, Method},
    },
    service::response::A2AResponse,
};

/// JSON-RPC 2.0 codec that wraps A2A operations
#[derive(Debug, Clone, Default)]
pub struct JsonRpcCodec;

impl JsonRpcCodec {
    pub fn new() -> Self {
        Self
    }

    fn decode_message(body: &[u8]) -> Result<A2AResponse, A2AError> {
        let envelope: JsonRpcResponse = serde_json::from_slice(body)
            .map_err(|e| A2AError::Protocol(format!("Failed to parse JSON-RPC response: {}", e)))?;

        let result = envelope.into_result().map_err(|error| A2AError::Rpc {
            code: error.code,
            message: error.message,
        })?;

        let message: Message = serde_json::from_value(result).map_err(|e| {
            A2AError::Protocol(format!("JSON-RPC result is not a message: {}", e))
        })?;
        Ok(A2AResponse::Message(Box::new(message)))
    }
}

impl Codec for JsonRpcCodec {
    fn encode_request(&self, operation: &A2AOperation) -> Result<Bytes, A2AError> {
        match operation {
            A2AOperation::SendMessage(params) => {
                let request = JsonRpcRequest::new(
                    Method::SendMessage.as_str(),
                    serde_json::to_value(params)?,
                    RequestId::String(Uuid::now_v7().to_string()),
                );
                Ok(Bytes::from(serde_json::to_vec(&request)?))
            }
            A2AOperation::DiscoverAgent => Ok(Bytes::new()),
        }
    }

    fn decode_response(
        &self,
        body: &[u8],
        operation: &A2AOperation,
    ) -> Result<A2AResponse, A2AError> {
        if body.is_empty() {
            return Err(A2AError::Protocol("empty response body".into()));
        }

        match operation {
            A2AOperation::SendMessage(_) => Self::decode_message(body),
            A2AOperation::DiscoverAgent => {
                let card: AgentCard = serde_json::from_slice(body)?;
                Ok(A2AResponse::AgentCard(Box::new(card)))
            }
        }
    }

    fn content_type(&self) -> &str {
        "application/json"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use crate::protocol::jsonrpc::MessageSendParams;

    use super::*;

    fn send_op() -> A2AOperation {
        A2AOperation::SendMessage(MessageSendParams::new(Message::user("Hello")))
    }

    #[test]
    fn test_encode_send_message() {
        let codec = JsonRpcCodec::new();
        let bytes = codec.encode_request(&send_op()).unwrap();

        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["method"], "message/send");
        assert_eq!(json["params"]["message"]["parts"][0]["text"], "Hello");
        assert!(json["id"].is_string());
    }

    #[test]
    fn test_encode_discover_has_no_body() {
        let codec = JsonRpcCodec::new();
        let bytes = codec.encode_request(&A2AOperation::DiscoverAgent).unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_decode_success_response() {
        let codec = JsonRpcCodec::new();
        let reply = Message::agent("pong");
        let body = serde_json::to_vec(&JsonRpcResponse::success(
            RequestId::from("1"),
            serde_json::to_value(&reply).unwrap(),
        ))
        .unwrap();

        let response = codec.decode_response(&body, &send_op()).unwrap();
        assert_eq!(response.into_message(), Some(reply));
    }

    #[test]
    fn test_decode_error_response() {
        let codec = JsonRpcCodec::new();
        let json = r#"{
            "jsonrpc": "2.0",
            "error": {"code": -32603, "message": "handler failed"},
            "id": "req-123"
        }"#;

        match codec.decode_response(json.as_bytes(), &send_op()) {
            Err(A2AError::Rpc { code, message }) => {
                assert_eq!(code, -32603);
                assert_eq!(message, "handler failed");
            }
            other => panic!("Expected Rpc error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_missing_result() {
        let codec = JsonRpcCodec::new();
        let json = r#"{"jsonrpc": "2.0", "id": "req-123"}"#;

        match codec.decode_response(json.as_bytes(), &send_op()) {
            Err(A2AError::Protocol(msg)) => assert!(msg.contains("neither")),
            other => panic!("Expected Protocol error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_agent_card() {
        let codec = JsonRpcCodec::new();
        let card = AgentCard::new("critic", "Reviews", "http://localhost:1", "1.0");
        let body = serde_json::to_vec(&card).unwrap();

        let response = codec
            .decode_response(&body, &A2AOperation::DiscoverAgent)
            .unwrap();
        assert_eq!(response.into_agent_card(), Some(card));
    }

    #[test]
    fn test_decode_empty_body() {
        let codec = JsonRpcCodec::new();
        assert!(codec.decode_response(b"", &send_op()).is_err());
    }
}
