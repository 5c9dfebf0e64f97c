//! Language-model backends consumed by the agents

mod metric;
mod mock;

pub use metric::MetricBrain;
pub use mock::MockBrain;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrainError {
    #[error("question cannot be empty")]
    EmptyQuestion,

    /// The backend failed to produce an answer
    #[error("backend error: {0}")]
    Backend(String),
}

/// Something that answers free-form questions
#[async_trait]
pub trait Brain: Send + Sync {
    async fn ask(&self, question: &str) -> Result<String, BrainError>;
}

#[async_trait]
impl<B: Brain + ?Sized> Brain for Arc<B> {
    async fn ask(&self, question: &str) -> Result<String, BrainError> {
        (**self).ask(question).await
    }
}

/// Contents of every fenced ```` ```java ```` block, in order
pub(crate) fn java_blocks(markdown: &str) -> Vec<&str> {
    const OPEN: &str = "```java";
    const CLOSE: &str = "```";

    let mut blocks = Vec::new();
    let mut rest = markdown;
    while let Some(start) = rest.find(OPEN) {
        let body = &rest[start + OPEN.len()..];
        // The opening fence must be followed by whitespace, not e.g. "```javascript"
        if !body.starts_with(char::is_whitespace) {
            rest = body;
            continue;
        }
        let body = body.trim_start();
        match body.find(CLOSE) {
            Some(end) => {
                blocks.push(&body[..end]);
                rest = &body[end + CLOSE.len()..];
            }
            None => break,
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_java_blocks() {
        let text = "intro\n```java\nclass A {}\n```\nmiddle\n```java\nclass B {}\n```";
        assert_eq!(java_blocks(text), ["class A {}\n", "class B {}\n"]);
    }

    #[test]
    fn test_java_blocks_ignores_other_languages() {
        assert!(java_blocks("```javascript\nlet a;\n```").is_empty());
        assert!(java_blocks("```java\nunterminated").is_empty());
        assert!(java_blocks("no code").is_empty());
    }
}
