//! Projects backed by a directory of Java sources

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};

use walkdir::WalkDir;

use crate::domain::{class::Class, error::DomainError};

use super::Project;

const JAVA_EXTENSION: &str = "java";

/// Java sources under a directory, found recursively
#[derive(Debug, Clone)]
pub struct FilesystemProject {
    root: PathBuf,
}

impl FilesystemProject {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Project for FilesystemProject {
    fn classes(&self) -> Result<Vec<Arc<dyn Class>>, DomainError> {
        let mut classes: Vec<Arc<dyn Class>> = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|err| {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.root.clone());
                DomainError::io(path, err.into())
            })?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(JAVA_EXTENSION)
            {
                continue;
            }
            classes.push(Arc::new(FilesystemClass::load(path)?));
        }
        tracing::debug!(root = %self.root.display(), count = classes.len(), "found classes");
        Ok(classes)
    }
}

impl fmt::Display for FilesystemProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.root.display())
    }
}

/// A class backed by a file; content changes are written through immediately
pub struct FilesystemClass {
    name: String,
    path: String,
    file: PathBuf,
    content: RwLock<String>,
}

impl FilesystemClass {
    /// Read `file`; the class name is the file stem
    pub fn load(file: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let file = file.into();
        let content = fs::read_to_string(&file).map_err(|err| DomainError::io(&file, err))?;
        let name = file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            name,
            path: file.display().to_string(),
            file,
            content: RwLock::new(content),
        })
    }
}

impl Class for FilesystemClass {
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
        fs::write(&self.file, content).map_err(|err| DomainError::io(&self.file, err))?;
        *self
            .content
            .write()
            .unwrap_or_else(PoisonError::into_inner) = content.to_string();
        Ok(())
    }
}

impl fmt::Debug for FilesystemClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilesystemClass")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}
