//! Tool dependency rules.
//!
//! Enabling a tool also enables everything it requires; disabling a tool also
//! disables everything that requires it. The table comes from configuration.

use serde::{Deserialize, Serialize};

use crate::models::ToolKind;

/// One "`tool` requires `requires`" rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDependency {
    /// Dependent tool
    pub tool: ToolKind,
    /// Tool that must be enabled alongside it
    pub requires: ToolKind,
}

/// Explicit dependency table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDependencies {
    rules: Vec<ToolDependency>,
}

/// Only `stage_actions` requires `main_form` out of the box; further rules
/// come from `[[dependencies]]` in the config.
impl Default for ToolDependencies {
    fn default() -> Self {
        Self::new(vec![ToolDependency {
            tool: ToolKind::StageActions,
            requires: ToolKind::MainForm,
        }])
    }
}

impl ToolDependencies {
    /// Builds a table, dropping self-references and repeated rules.
    #[must_use]
    pub fn new(rules: Vec<ToolDependency>) -> Self {
        let mut unique: Vec<ToolDependency> = Vec::with_capacity(rules.len());
        for rule in rules {
            if rule.tool != rule.requires && !unique.contains(&rule) {
                unique.push(rule);
            }
        }
        Self { rules: unique }
    }

    /// A table without rules.
    #[must_use]
    pub const fn none() -> Self {
        Self { rules: Vec::new() }
    }

    /// The rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[ToolDependency] {
        &self.rules
    }

    /// `tool` plus its transitive requirements, `tool` first.
    #[must_use]
    pub fn closure_for_enable(&self, tool: ToolKind) -> Vec<ToolKind> {
        self.walk(tool, |rule, current| {
            (rule.tool == current).then_some(rule.requires)
        })
    }

    /// `tool` plus every tool that transitively depends on it, `tool` first.
    #[must_use]
    pub fn closure_for_disable(&self, tool: ToolKind) -> Vec<ToolKind> {
        self.walk(tool, |rule, current| {
            (rule.requires == current).then_some(rule.tool)
        })
    }

    fn walk(
        &self,
        start: ToolKind,
        step: impl Fn(&ToolDependency, ToolKind) -> Option<ToolKind>,
    ) -> Vec<ToolKind> {
        let mut visited = vec![start];
        let mut cursor = 0;
        while cursor < visited.len() {
            let current = visited[cursor];
            for rule in &self.rules {
                if let Some(next) = step(rule, current) {
                    if !visited.contains(&next) {
                        visited.push(next);
                    }
                }
            }
            cursor += 1;
        }
        visited
    }
}
