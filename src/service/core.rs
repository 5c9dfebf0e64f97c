//! Core A2A protocol service implementation

use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use tower_service::Service;

use crate::{
    codec::Codec,
    protocol::{error::A2AError, operation::A2AOperation},
    service::{A2ARequest, A2AResponse},
    transport::{Transport, TransportRequest, TransportResponse},
};

/// Core A2A protocol service that wraps a transport
///
/// This service implements the Tower `Service` trait: it encodes the operation with the codec,
/// executes it over the transport and decodes the reply. Failures are never retried here.
pub struct A2AProtocolService<T> {
    transport: T,
    codec: Arc<dyn Codec>,
}

impl<T> A2AProtocolService<T>
where
    T: Transport,
{
    /// Create a new A2A protocol service
    ///
    /// # Arguments
    ///
    /// * `transport` - The underlying transport implementation
    /// * `codec` - The codec for serialization/deserialization
    pub fn new(transport: T, codec: Arc<dyn Codec>) -> Self {
        Self { transport, codec }
    }

    /// Build a transport request from an A2A operation
    fn build_transport_request(
        req: &A2ARequest,
        codec: &dyn Codec,
    ) -> Result<TransportRequest, A2AError> {
        let method = req.operation.method();
        let mut transport_req = TransportRequest::new(req.operation.endpoint(), method)
            .header("Accept", "application/json");

        if let Some(timeout) = req.context.timeout {
            transport_req = transport_req.timeout(timeout);
        }

        for (key, value) in &req.context.metadata {
            transport_req = transport_req.header(key.clone(), value.clone());
        }

        let body = codec.encode_request(&req.operation)?;
        if !body.is_empty() && method != "GET" {
            transport_req = transport_req
                .header("Content-Type", codec.content_type())
                .body(body);
        }

        Ok(transport_req)
    }

    /// Parse a transport response into an A2A response
    fn parse_transport_response(
        transport: &T,
        transport_resp: TransportResponse,
        codec: &dyn Codec,
        operation: &A2AOperation,
    ) -> Result<A2AResponse, A2AError> {
        if !transport_resp.is_ok() {
            return Err(A2AError::Status {
                url: transport.url_for(operation.endpoint()),
                status: transport_resp.status,
            });
        }

        codec.decode_response(&transport_resp.body, operation)
    }
}

impl<T> Service<A2ARequest> for A2AProtocolService<T>
where
    T: Transport + Clone,
{
    type Response = A2AResponse;
    type Error = A2AError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.transport.poll_ready(cx)
    }

    fn call(&mut self, req: A2ARequest) -> Self::Future {
        let transport = self.transport.clone();
        let codec = self.codec.clone();

        Box::pin(async move {
            let transport_req = Self::build_transport_request(&req, codec.as_ref())?;

            let transport_resp = transport.execute(transport_req).await?;

            Self::parse_transport_response(
                &transport,
                transport_resp,
                codec.as_ref(),
                &req.operation,
            )
        })
    }
}

impl<T: fmt::Debug> fmt::Debug for A2AProtocolService<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("A2AProtocolService")
            .field("transport", &self.transport)
            .field("content_type", &self.codec.content_type())
            .finish()
    }
}

impl<T> Clone for A2AProtocolService<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            codec: self.codec.clone(),
        }
    }
}
