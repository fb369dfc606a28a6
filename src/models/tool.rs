//! The seven tool blocks a stage card can display.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed enumeration of tool block kinds.
///
/// Tools are a fixed mapping, not a plugin system: anything outside this set
/// is rejected by [`ToolKind::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Document versions and attachments
    Management,
    /// Main stage form
    MainForm,
    /// Checklist and SLA panel
    StagePanel,
    /// Executable stage actions
    StageActions,
    /// Comment thread
    Comments,
    /// Signers and approvals
    Signatures,
    /// Embedded document viewer
    DocView,
}

/// Static presentation metadata for a tool kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolMeta {
    /// Card title
    pub title: &'static str,
    /// One-line description shown under the title
    pub description: &'static str,
    /// Terminal glyph used in the card header
    pub icon: &'static str,
}

impl ToolKind {
    /// All tool kinds in their canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Management,
            Self::MainForm,
            Self::StagePanel,
            Self::StageActions,
            Self::Comments,
            Self::Signatures,
            Self::DocView,
        ]
    }

    /// Stable identifier (`main_form`, `doc_view`, ...).
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Management => "management",
            Self::MainForm => "main_form",
            Self::StagePanel => "stage_panel",
            Self::StageActions => "stage_actions",
            Self::Comments => "comments",
            Self::Signatures => "signatures",
            Self::DocView => "doc_view",
        }
    }

    /// Looks up a tool kind by identifier. Unrecognized identifiers yield `None`.
    #[must_use]
    pub fn parse(id: &str) -> Option<Self> {
        let needle = id.trim().to_ascii_lowercase().replace('-', "_");
        Self::all().iter().copied().find(|kind| kind.id() == needle)
    }

    /// Static metadata for the tool block header.
    #[must_use]
    pub const fn meta(self) -> ToolMeta {
        match self {
            Self::Management => ToolMeta {
                title: "Management",
                description: "Document versions and attachments",
                icon: "▤",
            },
            Self::MainForm => ToolMeta {
                title: "Main form",
                description: "Stage form fields",
                icon: "✎",
            },
            Self::StagePanel => ToolMeta {
                title: "Stage panel",
                description: "Checklist and SLA tracking",
                icon: "☑",
            },
            Self::StageActions => ToolMeta {
                title: "Stage actions",
                description: "Actions available on this stage",
                icon: "ϟ",
            },
            Self::Comments => ToolMeta {
                title: "Comments",
                description: "Discussion thread",
                icon: "✉",
            },
            Self::Signatures => ToolMeta {
                title: "Signatures",
                description: "Signers and approvals",
                icon: "✍",
            },
            Self::DocView => ToolMeta {
                title: "Document viewer",
                description: "Preview of the stage document",
                icon: "◫",
            },
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
