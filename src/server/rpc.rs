//! JSON-RPC dispatch for the `/` endpoint

use serde::Deserialize;
use serde_json::Value;
use tracing::Instrument;

use crate::protocol::{
    jsonrpc::{
        JsonRpcError, JsonRpcRequest, JsonRpcResponse, MessageSendParams, RequestId,
        JSONRPC_VERSION,
    },
    operation::Method,
};

use super::handler::{HandlerContext, MessageHandler};

/// Turn a raw request body into a JSON-RPC response
///
/// Never fails: every outcome, including undecodable input, is expressed as an envelope.
pub(crate) async fn dispatch(
    handler: &dyn MessageHandler,
    ctx: HandlerContext,
    body: &[u8],
) -> JsonRpcResponse {
    let raw: Value = match serde_json::from_slice(body) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::debug!(error = %err, "rejecting malformed JSON");
            return JsonRpcResponse::failure(RequestId::Null, JsonRpcError::parse_error(err));
        }
    };

    // Echo whatever id can be salvaged even when the envelope itself is invalid
    let id = raw
        .get("id")
        .and_then(|id| RequestId::deserialize(id).ok())
        .unwrap_or_default();

    let request: JsonRpcRequest = match serde_json::from_value(raw) {
        Ok(request) => request,
        Err(err) => return JsonRpcResponse::failure(id, JsonRpcError::invalid_request(err)),
    };
    if request.jsonrpc != JSONRPC_VERSION {
        return JsonRpcResponse::failure(
            request.id,
            JsonRpcError::invalid_request(format!(
                "unsupported jsonrpc version '{}'",
                request.jsonrpc
            )),
        );
    }

    let method = match Method::from_name(&request.method) {
        Some(method) => method,
        None => {
            return JsonRpcResponse::failure(
                request.id,
                JsonRpcError::method_not_found(&request.method),
            )
        }
    };
    if !method.is_implemented() {
        return JsonRpcResponse::failure(request.id, JsonRpcError::unsupported(method.as_str()));
    }

    let params: MessageSendParams = match serde_json::from_value(request.params) {
        Ok(params) => params,
        Err(err) => return JsonRpcResponse::failure(request.id, JsonRpcError::invalid_params(err)),
    };
    if let Err(err) = params.message.validate() {
        return JsonRpcResponse::failure(request.id, JsonRpcError::invalid_params(err));
    }

    let ctx = ctx.with_metadata(params.metadata.unwrap_or_default());
    let message_id = params.message.message_id.clone();
    let span = tracing::debug_span!("message_send", %message_id);

    match handler.handle(params.message, ctx).instrument(span).await {
        Ok(reply) => match serde_json::to_value(&reply) {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(err) => JsonRpcResponse::failure(
                request.id,
                JsonRpcError::internal(format!("failed to encode reply: {err}")),
            ),
        },
        Err(err) => {
            tracing::warn!(%message_id, error = %format!("{err:#}"), "message handler failed");
            JsonRpcResponse::failure(request.id, JsonRpcError::internal(format!("{err:#}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use crate::protocol::{
        jsonrpc::{
            INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
            UNSUPPORTED_OPERATION,
        },
        message::Message,
    };

    use super::*;

    struct Upper;

    #[async_trait]
    impl MessageHandler for Upper {
        async fn handle(&self, message: Message, _ctx: HandlerContext) -> anyhow::Result<Message> {
            let text = message.first_text().unwrap_or_default().to_uppercase();
            Ok(Message::agent(text))
        }
    }

    struct Failing;

    #[async_trait]
    impl MessageHandler for Failing {
        async fn handle(&self, _message: Message, _ctx: HandlerContext) -> anyhow::Result<Message> {
            Err(anyhow::anyhow!("backend unavailable").context("failed to review class Main"))
        }
    }

    async fn call(handler: &dyn MessageHandler, body: Value) -> JsonRpcResponse {
        let bytes = serde_json::to_vec(&body).unwrap();
        dispatch(handler, HandlerContext::default(), &bytes).await
    }

    fn send_body(id: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "method": "message/send",
            "params": {"message": Message::user("hello")},
            "id": id
        })
    }

    #[tokio::test]
    async fn test_send_message_success() {
        let resp = call(&Upper, send_body(json!("req-1"))).await;

        assert_eq!(resp.id, RequestId::String("req-1".into()));
        let reply: Message = serde_json::from_value(resp.into_result().unwrap()).unwrap();
        assert_eq!(reply.first_text(), Some("HELLO"));
    }

    #[tokio::test]
    async fn test_numeric_id_is_echoed() {
        let resp = call(&Upper, send_body(json!(42))).await;
        assert_eq!(resp.id, RequestId::Number(42));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let resp = dispatch(&Upper, HandlerContext::default(), b"{not json").await;

        assert_eq!(resp.id, RequestId::Null);
        assert_eq!(resp.error().unwrap().code, PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_invalid_request_shape() {
        let resp = call(&Upper, json!({"jsonrpc": "2.0", "id": 3})).await;
        assert_eq!(resp.id, RequestId::Number(3));
        assert_eq!(resp.error().unwrap().code, INVALID_REQUEST);

        let resp = call(&Upper, json!([1, 2, 3])).await;
        assert_eq!(resp.error().unwrap().code, INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_wrong_version() {
        let mut body = send_body(json!(1));
        body["jsonrpc"] = json!("1.0");

        let resp = call(&Upper, body).await;
        assert_eq!(resp.error().unwrap().code, INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let mut body = send_body(json!(1));
        body["method"] = json!("tasks/list");

        let resp = call(&Upper, body).await;
        assert_eq!(resp.error().unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reserved_methods_are_unsupported() {
        for method in ["message/stream", "tasks/get", "tasks/cancel"] {
            let body = json!({"jsonrpc": "2.0", "method": method, "params": {}, "id": 1});
            let resp = call(&Upper, body).await;

            let err = resp.error().unwrap();
            assert_eq!(err.code, UNSUPPORTED_OPERATION);
            assert!(err.message.contains(method));
        }
    }

    #[tokio::test]
    async fn test_invalid_params() {
        let body = json!({
            "jsonrpc": "2.0",
            "method": "message/send",
            "params": {"message": {"role": "user", "parts": [{"kind": "audio"}], "messageId": "m"}},
            "id": 9
        });

        let resp = call(&Upper, body).await;
        assert_eq!(resp.id, RequestId::Number(9));
        assert_eq!(resp.error().unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_handler_error_keeps_id_and_chain() {
        let resp = call(&Failing, send_body(json!("req-7"))).await;

        assert_eq!(resp.id, RequestId::String("req-7".into()));
        let err = resp.error().unwrap();
        assert_eq!(err.code, INTERNAL_ERROR);
        assert_eq!(err.message, "failed to review class Main: backend unavailable");
    }
}
