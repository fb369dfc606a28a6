//! Workflow stages and their enabled tool set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{ToolConfig, ToolKind};

/// Progress of a stage in the running process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Not started
    #[default]
    Pending,
    /// Being worked on
    InProgress,
    /// Finished
    Done,
}

impl StageStatus {
    /// All statuses in workflow order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Pending, Self::InProgress, Self::Done]
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }

    /// Next status in workflow order, wrapping around.
    #[must_use]
    pub const fn cycle(self) -> Self {
        match self {
            Self::Pending => Self::InProgress,
            Self::InProgress => Self::Done,
            Self::Done => Self::Pending,
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(format!(
                "Unknown status '{other}'. Expected pending, in_progress or done"
            )),
        }
    }
}

/// One step of the procurement workflow template.
///
/// # Invariants
///
/// - `tools` holds no duplicates
/// - every entry of `tools_order` is also in `tools`, and vice versa
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStage {
    /// Unique identifier (kebab-case slug)
    pub id: String,
    /// Display title
    pub title: String,
    /// Position in the workflow (0-based)
    pub order_index: u32,
    /// Responsible department
    #[serde(default)]
    pub department: String,
    /// SLA duration in days
    #[serde(default)]
    pub days: u32,
    /// Current status
    #[serde(default)]
    pub status: StageStatus,
    /// Enabled tools, in the order they were enabled
    #[serde(default)]
    pub tools: Vec<ToolKind>,
    /// Canonical (stacked) order of enabled tools
    #[serde(default)]
    pub tools_order: Vec<ToolKind>,
    /// Per-tool configuration payloads
    #[serde(default)]
    pub tool_config: ToolConfig,
}

/// Partial update of a stage's scalar fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePatch {
    /// New title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New department
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// New SLA in days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    /// New status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StageStatus>,
}

impl StagePatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.department.is_none()
            && self.days.is_none()
            && self.status.is_none()
    }
}

impl ModelStage {
    /// Creates a pending stage with no tools.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, order_index: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            order_index,
            department: String::new(),
            days: 0,
            status: StageStatus::Pending,
            tools: Vec::new(),
            tools_order: Vec::new(),
            tool_config: ToolConfig::default(),
        }
    }

    /// Whether `kind` is enabled.
    #[must_use]
    pub fn has_tool(&self, kind: ToolKind) -> bool {
        self.tools.contains(&kind)
    }

    /// Enables a single tool (no dependency handling).
    ///
    /// Returns `false` if the tool was already enabled.
    pub fn enable_tool(&mut self, kind: ToolKind) -> bool {
        if self.has_tool(kind) {
            return false;
        }
        self.tools.push(kind);
        self.tools_order.push(kind);
        self.tool_config.ensure(kind);
        true
    }

    /// Disables a single tool and purges it from `tools_order`.
    ///
    /// The tool's payload is kept so re-enabling restores it.
    /// Returns `false` if the tool was not enabled.
    pub fn disable_tool(&mut self, kind: ToolKind) -> bool {
        if !self.has_tool(kind) {
            return false;
        }
        self.tools.retain(|t| *t != kind);
        self.tools_order.retain(|t| *t != kind);
        true
    }

    /// Applies a patch of scalar fields. Returns whether anything changed.
    pub fn apply_patch(&mut self, patch: &StagePatch) -> bool {
        let before = (
            self.title.clone(),
            self.department.clone(),
            self.days,
            self.status,
        );
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(department) = &patch.department {
            self.department = department.trim().to_string();
        }
        if let Some(days) = patch.days {
            self.days = days;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        before != (self.title.clone(), self.department.clone(), self.days, self.status)
    }

    /// Restores the tool invariants after loading hand-edited data.
    ///
    /// Drops duplicate tools, removes order entries for disabled tools and
    /// appends enabled tools missing from the order.
    pub fn normalize_tools(&mut self) {
        let mut seen = Vec::with_capacity(self.tools.len());
        for kind in &self.tools {
            if !seen.contains(kind) {
                seen.push(*kind);
            }
        }
        self.tools = seen;

        let mut order = Vec::with_capacity(self.tools.len());
        for kind in &self.tools_order {
            if self.tools.contains(kind) && !order.contains(kind) {
                order.push(*kind);
            }
        }
        for kind in &self.tools {
            if !order.contains(kind) {
                order.push(*kind);
            }
        }
        self.tools_order = order;
    }
}
