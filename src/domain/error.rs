//! Errors raised while mapping messages to domain entities

use thiserror::Error;

use crate::protocol::part::PartKind;

#[derive(Debug, Error)]
pub enum DomainError {
    /// The message has no description part
    #[error("message has no parts")]
    EmptyMessage,

    #[error("expected {expected} part at position {position}, got {actual}")]
    UnexpectedPart {
        position: usize,
        expected: PartKind,
        actual: PartKind,
    },

    #[error("part at position {position} is missing '{key}' metadata")]
    MissingMetadata { position: usize, key: &'static str },

    #[error("file part at position {position} references a URI, inline bytes expected")]
    UnsupportedFile { position: usize },

    /// The `type` metadata names an entity this envelope cannot carry
    #[error("unknown part type '{0}'")]
    UnknownPartType(String),

    #[error("failed to decode file content of class '{class}': {source}")]
    Decode {
        class: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("class '{class}' is not valid UTF-8")]
    Utf8 { class: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DomainError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        DomainError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
