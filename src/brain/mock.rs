//! Canned brain for tests and dry runs

use async_trait::async_trait;

use super::{java_blocks, Brain, BrainError};

const KNOWN: &str = "public class Main {\n\tpublic static void main(String[] args) {\n\t\tString m = \"Hello, World\";\n\t\tSystem.out.println(m);\n\t}\n}\n";
const REFACTORED: &str = "public class Main {\n\tpublic static void main(String[] args) {\n\t\tSystem.out.println(\"Hello, World\");\n\t}\n}\n";

/// Deterministic backend for tests and dry runs
///
/// Answers with a canned refactoring when the question embeds the demo `Main` class, echoes the
/// first fenced Java block otherwise, and falls back to a placeholder answer when there is no
/// code at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockBrain;

impl MockBrain {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Brain for MockBrain {
    async fn ask(&self, question: &str) -> Result<String, BrainError> {
        if question.trim().is_empty() {
            return Err(BrainError::EmptyQuestion);
        }
        let answer = match java_blocks(question).first() {
            None => {
                tracing::debug!("no Java code in question, answering with placeholder");
                format!("mock response to: {question}")
            }
            Some(block) if block.trim().contains(KNOWN.trim()) => {
                tracing::debug!("known Java code in question, answering with refactoring");
                REFACTORED.to_string()
            }
            Some(block) => {
                tracing::debug!("unknown Java code in question, echoing it");
                (*block).to_string()
            }
        };
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_question() {
        assert!(matches!(
            MockBrain.ask("  ").await,
            Err(BrainError::EmptyQuestion)
        ));
    }

    #[tokio::test]
    async fn test_placeholder_without_code() {
        let answer = MockBrain.ask("what now?").await.unwrap();
        assert_eq!(answer, "mock response to: what now?");
    }

    #[tokio::test]
    async fn test_known_class_is_refactored() {
        let question = format!("Refactor this:\n```java\n{KNOWN}```\n");
        let answer = MockBrain.ask(&question).await.unwrap();
        assert_eq!(answer, REFACTORED);
    }

    #[tokio::test]
    async fn test_unknown_class_is_echoed() {
        let question = "Fix:\n```java\nclass Other {}\n```\n";
        let answer = MockBrain.ask(question).await.unwrap();
        assert_eq!(answer, "class Other {}\n");
    }
}
