//! Refactoring entities and their message encoding

pub mod class;
pub mod error;
pub mod job;
pub mod project;
pub mod suggestion;

pub use class::{Class, InMemoryClass};
pub use error::DomainError;
pub use job::{Artifacts, Description, Job, DEFAULT_MAX_SIZE};
pub use project::{FilesystemProject, InMemoryProject, MirrorProject, Project};
pub use suggestion::Suggestion;
