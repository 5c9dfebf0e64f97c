//! Projects held entirely in memory

use std::{collections::HashMap, fmt, sync::Arc};

use crate::domain::{
    class::{Class, InMemoryClass},
    error::DomainError,
};

use super::Project;

const MAIN: &str = "public class Main {\n\tpublic static void main(String[] args) {\n\t\tString m = \"Hello, World\";\n\t\tSystem.out.println(m);\n\t}\n}\n";

/// Classes kept in a map keyed by path
///
/// Enumeration order follows the map and is not stable between runs.
#[derive(Debug, Default)]
pub struct InMemoryProject {
    classes: HashMap<String, Arc<InMemoryClass>>,
}

impl InMemoryProject {
    pub fn new(classes: impl IntoIterator<Item = InMemoryClass>) -> Self {
        Self {
            classes: classes
                .into_iter()
                .map(|class| (class.path().to_string(), Arc::new(class)))
                .collect(),
        }
    }

    /// Single-class demo project
    pub fn mock() -> Self {
        Self::new([InMemoryClass::new("Main", "Main.java", MAIN)])
    }

    pub fn get(&self, path: &str) -> Option<&InMemoryClass> {
        self.classes.get(path).map(Arc::as_ref)
    }
}

impl Project for InMemoryProject {
    fn classes(&self) -> Result<Vec<Arc<dyn Class>>, DomainError> {
        Ok(self
            .classes
            .values()
            .map(|class| class.clone() as Arc<dyn Class>)
            .collect())
    }
}

impl fmt::Display for InMemoryProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.classes.is_empty() {
            return f.write_str("[empty project]");
        }
        let mut paths: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        write!(f, "[{}]", paths.join(", "))
    }
}
