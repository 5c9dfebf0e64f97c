//! Validation layer for A2A protocol requests and responses

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower_layer::Layer;
use tower_service::Service;

use crate::{
    protocol::{error::A2AError, operation::A2AOperation},
    service::{A2ARequest, A2AResponse},
};

/// Layer that validates A2A protocol requests and responses
#[derive(Clone, Debug)]
pub struct A2AValidationLayer {
    validate_responses: bool,
}

impl A2AValidationLayer {
    pub fn new() -> Self {
        Self {
            validate_responses: true,
        }
    }

    /// Enable or disable checks on replies; requests are always checked
    pub fn with_response_validation(mut self, enabled: bool) -> Self {
        self.validate_responses = enabled;
        self
    }
}

impl Default for A2AValidationLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for A2AValidationLayer {
    type Service = A2AValidationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        A2AValidationService {
            inner,
            validate_responses: self.validate_responses,
        }
    }
}

/// Validation service that wraps an inner service
#[derive(Clone, Debug)]
pub struct A2AValidationService<S> {
    inner: S,
    validate_responses: bool,
}

impl<S> A2AValidationService<S> {
    /// Validate an A2A request
    fn validate_request(req: &A2ARequest) -> Result<(), A2AError> {
        if let A2AOperation::SendMessage(params) = &req.operation {
            // The codec enforces `bytes` or `uri` on file parts; empty content is valid
            params.message.validate()?;
        }

        if req.context.agent_url.is_empty() {
            return Err(A2AError::Validation("Agent URL cannot be empty".into()));
        }

        Ok(())
    }

    /// Validate an A2A response
    fn validate_response(resp: &A2AResponse) -> Result<(), A2AError> {
        match resp {
            A2AResponse::Message(message) => message.validate(),
            A2AResponse::AgentCard(card) => {
                if card.name.is_empty() {
                    return Err(A2AError::Validation("Agent name cannot be empty".into()));
                }
                if card.url.is_empty() {
                    return Err(A2AError::Validation("Agent URL cannot be empty".into()));
                }
                Ok(())
            }
        }
    }
}

impl<S> Service<A2ARequest> for A2AValidationService<S>
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
        if let Err(e) = Self::validate_request(&req) {
            return Box::pin(async move { Err(e) });
        }

        let validate_responses = self.validate_responses;
        let mut inner = self.inner.clone();
        Box::pin(async move {
            let response = inner.call(req).await?;

            if validate_responses {
                Self::validate_response(&response)?;
            }

            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::{Artifacts, Description, InMemoryClass, Job},
        protocol::{
            agent::AgentCard,
            jsonrpc::MessageSendParams,
            message::Message,
            part::{FileContent, FileWithUri, Part},
        },
        service::RequestContext,
    };

    use super::*;

    fn send(message: Message) -> A2ARequest {
        A2ARequest::new(
            A2AOperation::SendMessage(MessageSendParams::new(message)),
            RequestContext::new("http://localhost:8080"),
        )
    }

    #[test]
    fn test_validate_send_message() {
        let request = send(Message::user("Hello"));
        assert!(A2AValidationService::<()>::validate_request(&request).is_ok());
    }

    #[test]
    fn test_validate_empty_message() {
        let mut message = Message::user("Test");
        message.parts.clear();

        let request = send(message);
        assert!(A2AValidationService::<()>::validate_request(&request).is_err());
    }

    #[test]
    fn test_validate_blank_message_id() {
        let mut message = Message::user("Test");
        message.message_id.clear();

        assert!(A2AValidationService::<()>::validate_request(&send(message)).is_err());
    }

    #[test]
    fn test_validate_empty_class() {
        let job = Job::new(Description::new("review the class"))
            .with_class(&InMemoryClass::new("Empty", "Empty.java", ""));
        let request = send(job.to_message());
        assert!(A2AValidationService::<()>::validate_request(&request).is_ok());

        let reply = Artifacts::new(Description::new("fixed"))
            .with_class(InMemoryClass::new("Empty", "Empty.java", ""));
        let response = A2AResponse::Message(Box::new(reply.to_message()));
        assert!(A2AValidationService::<()>::validate_response(&response).is_ok());
    }

    #[test]
    fn test_validate_empty_file_uri() {
        let part = Part::File {
            file: FileContent::Uri(FileWithUri {
                uri: String::new(),
                name: None,
                mime_type: None,
            }),
            metadata: None,
        };
        let message = Message::user("Test").with_part(part);

        assert!(A2AValidationService::<()>::validate_request(&send(message)).is_ok());
    }

    #[test]
    fn test_validate_missing_agent_url() {
        let request = A2ARequest::new(A2AOperation::DiscoverAgent, RequestContext::default());
        assert!(A2AValidationService::<()>::validate_request(&request).is_err());
    }

    #[test]
    fn test_validate_responses() {
        let ok = A2AResponse::Message(Box::new(Message::agent("fine")));
        assert!(A2AValidationService::<()>::validate_response(&ok).is_ok());

        let card = AgentCard::new("", "nameless", "http://localhost", "1");
        let bad = A2AResponse::AgentCard(Box::new(card));
        assert!(A2AValidationService::<()>::validate_response(&bad).is_err());
    }
}
