//! Units of source code the agents work on

use std::{
    fmt,
    sync::{PoisonError, RwLock},
};

use super::error::DomainError;

/// A single source class
///
/// A class belongs to the project that produced it. Content changes go through
/// [`Class::set_content`]; where they end up depends on the implementation.
pub trait Class: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Location of the class inside its project
    fn path(&self) -> &str;

    fn content(&self) -> String;

    fn set_content(&self, content: &str) -> Result<(), DomainError>;
}

/// A class held entirely in memory
pub struct InMemoryClass {
    name: String,
    path: String,
    content: RwLock<String>,
}

impl InMemoryClass {
    pub fn new(name: impl Into<String>, path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content: RwLock::new(content.into()),
        }
    }

    /// Detached copy of any class
    pub fn snapshot(class: &dyn Class) -> Self {
        Self::new(class.name(), class.path(), class.content())
    }
}

impl Class for InMemoryClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn content(&self) -> String {
        self.content
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_content(&self, content: &str) -> Result<(), DomainError> {
        *self
            .content
            .write()
            .unwrap_or_else(PoisonError::into_inner) = content.to_string();
        Ok(())
    }
}

impl Clone for InMemoryClass {
    fn clone(&self) -> Self {
        Self::snapshot(self)
    }
}

impl PartialEq for InMemoryClass {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.path == other.path && self.content() == other.content()
    }
}

impl Eq for InMemoryClass {}

impl fmt::Debug for InMemoryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryClass")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("content", &self.content())
            .finish()
    }
}
