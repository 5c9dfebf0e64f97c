//! Projects refactored in a copy of the original tree

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use walkdir::WalkDir;

use crate::domain::{class::Class, error::DomainError};

use super::{FilesystemProject, Project};

/// A copy of a filesystem project; changes land in the copy, the original is left untouched
#[derive(Debug, Clone)]
pub struct MirrorProject {
    original: PathBuf,
    mirror: FilesystemProject,
}

impl MirrorProject {
    /// Copy `original` to `destination`, replacing anything already there
    pub fn new(
        original: &FilesystemProject,
        destination: impl Into<PathBuf>,
    ) -> Result<Self, DomainError> {
        let destination = destination.into();
        if destination.exists() {
            fs::remove_dir_all(&destination).map_err(|err| DomainError::io(&destination, err))?;
        }
        copy_tree(original.root(), &destination)?;
        tracing::debug!(
            from = %original.root().display(),
            to = %destination.display(),
            "mirrored project"
        );
        Ok(Self {
            original: original.root().to_path_buf(),
            mirror: FilesystemProject::new(destination),
        })
    }

    pub fn root(&self) -> &Path {
        self.mirror.root()
    }
}

fn copy_tree(from: &Path, to: &Path) -> Result<(), DomainError> {
    fs::create_dir_all(to).map_err(|err| DomainError::io(to, err))?;
    for entry in WalkDir::new(from).min_depth(1) {
        let entry = entry.map_err(|err| DomainError::io(from, err.into()))?;
        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|err| DomainError::io(&target, err))?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target).map_err(|err| DomainError::io(&target, err))?;
        }
    }
    Ok(())
}

impl Project for MirrorProject {
    fn classes(&self) -> Result<Vec<Arc<dyn Class>>, DomainError> {
        self.mirror.classes()
    }
}

impl fmt::Display for MirrorProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} mirrored to {}]",
            self.original.display(),
            self.mirror.root().display()
        )
    }
}
