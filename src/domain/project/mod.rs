//! Sources of classes to refactor

mod filesystem;
mod memory;
mod mirror;

pub use filesystem::{FilesystemClass, FilesystemProject};
pub use memory::InMemoryProject;
pub use mirror::MirrorProject;

use std::{fmt, sync::Arc};

use super::{class::Class, error::DomainError};

/// A collection of classes
///
/// Enumeration order is whatever the backing storage yields; callers must not rely on it
/// across implementations.
pub trait Project: Send + Sync + fmt::Display {
    fn classes(&self) -> Result<Vec<Arc<dyn Class>>, DomainError>;
}
