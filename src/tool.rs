//! Static-analysis findings fed to the critic

use std::sync::Arc;

/// A source of code imperfections, reported as free-form text
#[cfg_attr(test, mockall::automock)]
pub trait Tool: Send + Sync {
    fn imperfections(&self) -> String;
}

impl<T: Tool + ?Sized> Tool for Arc<T> {
    fn imperfections(&self) -> String {
        (**self).imperfections()
    }
}

/// Several tools reported as one; blank reports are dropped
#[derive(Default)]
pub struct CombinedTool {
    tools: Vec<Box<dyn Tool>>,
}

impl CombinedTool {
    pub fn new(tools: Vec<Box<dyn Tool>>) -> Self {
        Self { tools }
    }

    pub fn push(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Tool for CombinedTool {
    fn imperfections(&self) -> String {
        self.tools
            .iter()
            .map(|tool| tool.imperfections())
            .filter(|report| !report.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl std::fmt::Debug for CombinedTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedTool")
            .field("tools", &self.tools.len())
            .finish()
    }
}

/// Fixed findings, e.g. a report produced ahead of time
#[derive(Debug, Clone, Default)]
pub struct StaticTool {
    report: String,
}

impl StaticTool {
    pub fn new(report: impl Into<String>) -> Self {
        Self {
            report: report.into(),
        }
    }
}

impl Tool for StaticTool {
    fn imperfections(&self) -> String {
        self.report.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock(report: &'static str) -> Box<dyn Tool> {
        let mut tool = MockTool::new();
        tool.expect_imperfections()
            .times(1)
            .returning(move || report.to_string());
        Box::new(tool)
    }

    #[test]
    fn test_combined_joins_reports() {
        let combined = CombinedTool::new(vec![mock("unused import"), mock("long method")]);
        assert_eq!(combined.imperfections(), "unused import\nlong method");
    }

    #[test]
    fn test_combined_skips_blank_reports() {
        let combined = CombinedTool::new(vec![mock("  \n"), mock("magic number"), mock("")]);
        assert_eq!(combined.imperfections(), "magic number");
    }

    #[test]
    fn test_empty_combination() {
        let combined = CombinedTool::default();
        assert!(combined.is_empty());
        assert_eq!(combined.imperfections(), "");
    }

    #[test]
    fn test_shared_tool() {
        let shared: Arc<dyn Tool> = Arc::new(StaticTool::new("dead code"));
        let combined = CombinedTool::new(vec![Box::new(shared.clone()), Box::new(shared)]);
        assert_eq!(combined.imperfections(), "dead code\ndead code");
    }

    #[test]
    fn test_static_tool() {
        assert_eq!(StaticTool::new("line 3: typo").imperfections(), "line 3: typo");
    }
}
