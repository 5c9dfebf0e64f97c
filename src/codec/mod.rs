//! Serialization codecs for A2A protocol bindings

pub mod jsonrpc;

pub use jsonrpc::JsonRpcCodec;

use crate::{
    protocol::{error::A2AError, operation::A2AOperation},
    service::response::A2AResponse,
};
use bytes::Bytes;

/// Codec trait for encoding and decoding A2A protocol messages
pub trait Codec: Send + Sync {
    /// Serialize an A2A operation to bytes for transport
    ///
    /// Operations without a body (discovery) encode to empty bytes.
    fn encode_request(&self, operation: &A2AOperation) -> Result<Bytes, A2AError>;

    /// Deserialize transport response bytes to an A2A response
    ///
    /// # Arguments
    ///
    /// * `body` - The response body bytes
    /// * `operation` - The original operation (selects the expected shape)
    fn decode_response(
        &self,
        body: &[u8],
        operation: &A2AOperation,
    ) -> Result<A2AResponse, A2AError>;

    /// MIME type of request bodies
    fn content_type(&self) -> &str;
}
