//! JSON-RPC 2.0 envelopes and the `message/send` parameter types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::message::Message;

/// Protocol version carried by every envelope
pub const JSONRPC_VERSION: &str = "2.0";

/// Invalid JSON was received
pub const PARSE_ERROR: i64 = -32700;
/// The JSON sent is not a valid request object
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
/// Application range, reserved method that this agent does not implement
pub const UNSUPPORTED_OPERATION: i64 = -32004;

/// Request identifier: a string, a number, or absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
    #[default]
    Null,
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        RequestId::String(id.to_string())
    }
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        RequestId::Number(id)
    }
}

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
    #[serde(default)]
    pub id: RequestId,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: Value, id: impl Into<RequestId>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id: id.into(),
        }
    }
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{message} (code: {code})")]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn parse_error(detail: impl std::fmt::Display) -> Self {
        Self::new(PARSE_ERROR, "Parse error").with_data(Value::String(detail.to_string()))
    }

    pub fn invalid_request(detail: impl std::fmt::Display) -> Self {
        Self::new(INVALID_REQUEST, "Invalid Request").with_data(Value::String(detail.to_string()))
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Method not found: {method}"))
    }

    pub fn invalid_params(detail: impl std::fmt::Display) -> Self {
        Self::new(INVALID_PARAMS, "Invalid params").with_data(Value::String(detail.to_string()))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }

    pub fn unsupported(method: &str) -> Self {
        Self::new(UNSUPPORTED_OPERATION, format!("{method} is not implemented"))
    }
}

/// Outcome half of a response: exactly one of `result` or `error`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseOutcome {
    Result(Value),
    Error(JsonRpcError),
}

/// JSON-RPC 2.0 response envelope
///
/// The outcome is a sum type, so a response can never carry both `result` and `error`.
/// Decoding rejects envelopes that carry both or neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawResponse")]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    #[serde(flatten)]
    pub outcome: ResponseOutcome,
}

#[derive(Deserialize)]
struct RawResponse {
    jsonrpc: String,
    #[serde(default)]
    id: RequestId,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

impl TryFrom<RawResponse> for JsonRpcResponse {
    type Error = String;

    fn try_from(raw: RawResponse) -> Result<Self, Self::Error> {
        let outcome = match (raw.result, raw.error) {
            (Some(result), None) => ResponseOutcome::Result(result),
            (None, Some(error)) => ResponseOutcome::Error(error),
            (Some(_), Some(_)) => {
                return Err("JSON-RPC response carries both 'result' and 'error'".into())
            }
            (None, None) => {
                return Err("JSON-RPC response carries neither 'result' nor 'error'".into())
            }
        };
        Ok(Self {
            jsonrpc: raw.jsonrpc,
            id: raw.id,
            outcome,
        })
    }
}

impl JsonRpcResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            outcome: ResponseOutcome::Result(result),
        }
    }

    pub fn failure(id: RequestId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            outcome: ResponseOutcome::Error(error),
        }
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.outcome {
            ResponseOutcome::Result(value) => Some(value),
            ResponseOutcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&JsonRpcError> {
        match &self.outcome {
            ResponseOutcome::Error(error) => Some(error),
            ResponseOutcome::Result(_) => None,
        }
    }

    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        match self.outcome {
            ResponseOutcome::Result(value) => Ok(value),
            ResponseOutcome::Error(error) => Err(error),
        }
    }
}

/// Parameters of `message/send`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSendParams {
    pub message: Message,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<MessageSendConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,
}

impl MessageSendParams {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            configuration: None,
            metadata: None,
        }
    }

    pub fn with_configuration(mut self, configuration: MessageSendConfiguration) -> Self {
        self.configuration = Some(configuration);
        self
    }
}

/// Client preferences for a `message/send` call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSendConfiguration {
    #[serde(default)]
    pub accepted_output_modes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_length: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocking: Option<bool>,
}
