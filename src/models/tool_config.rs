//! Per-tool configuration payloads stored on a stage.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ToolKind;

/// Whether a record has been confirmed by the backend or is still optimistic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Accepted by the backend
    #[default]
    Confirmed,
    /// Inserted locally, waiting for the backend
    Pending,
}

/// A numbered version of the stage document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentVersion {
    /// Unique identifier
    pub id: String,
    /// Sequential version number (1-based)
    pub number: u32,
    /// Who created the version
    pub author: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Free-text change note
    #[serde(default)]
    pub note: String,
    /// Optimistic state
    #[serde(default)]
    pub state: SyncState,
}

/// A file attached to the stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Unique identifier
    pub id: String,
    /// Display file name
    pub name: String,
    /// Link to the stored document, absent when the upload link expired
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Who uploaded the file
    pub uploaded_by: String,
    /// Upload timestamp
    pub uploaded_at: DateTime<Utc>,
    /// Optimistic state
    #[serde(default)]
    pub state: SyncState,
}

/// Versions and attachments (tool `management`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementConfig {
    /// Document versions, oldest first
    #[serde(default)]
    pub versions: Vec<DocumentVersion>,
    /// Attachments in upload order
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl ManagementConfig {
    /// Number the next version would receive.
    #[must_use]
    pub fn next_version_number(&self) -> u32 {
        self.versions.iter().map(|v| v.number).max().unwrap_or(0) + 1
    }
}

/// Field values of the main form (tool `main_form`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainFormConfig {
    /// Field name to value
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl MainFormConfig {
    /// Number of fields holding a non-blank value.
    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.fields.values().filter(|v| !v.trim().is_empty()).count()
    }
}

/// One checklist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Unique identifier
    pub id: String,
    /// Task text (usually taken from the checklist catalog)
    pub label: String,
    /// Completion flag
    #[serde(default)]
    pub done: bool,
}

/// Checklist and SLA settings (tool `stage_panel`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePanelConfig {
    /// Checklist entries in display order
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    /// Days before the SLA deadline at which the panel turns to a warning
    #[serde(default = "default_sla_warning_days")]
    pub sla_warning_days: u32,
}

fn default_sla_warning_days() -> u32 {
    2
}

impl Default for StagePanelConfig {
    fn default() -> Self {
        Self {
            checklist: Vec::new(),
            sla_warning_days: default_sla_warning_days(),
        }
    }
}

impl StagePanelConfig {
    /// `(done, total)` checklist counts.
    #[must_use]
    pub fn completion(&self) -> (usize, usize) {
        let done = self.checklist.iter().filter(|item| item.done).count();
        (done, self.checklist.len())
    }
}

/// Enabled actions (tool `stage_actions`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageActionsConfig {
    /// Ids of action-catalog balloons offered on this stage
    #[serde(default)]
    pub enabled_actions: Vec<String>,
}

/// A comment in the stage thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier
    pub id: String,
    /// Author display name
    pub author: String,
    /// Author role
    #[serde(default)]
    pub role: String,
    /// Comment body
    pub text: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Optimistic state
    #[serde(default)]
    pub state: SyncState,
}

/// Comment thread (tool `comments`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentsConfig {
    /// Comments, oldest first
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// A signer's decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureDecision {
    /// Not signed yet
    #[default]
    Pending,
    /// Approved and signed
    Approved,
    /// Rejected
    Rejected,
}

impl SignatureDecision {
    /// Stable identifier (`pending`, `approved`, `rejected`).
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SignatureDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A person who must sign the stage document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Role or office
    #[serde(default)]
    pub role: String,
    /// Current decision
    #[serde(default)]
    pub decision: SignatureDecision,
}

/// Signers (tool `signatures`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturesConfig {
    /// Signers in signing order
    #[serde(default)]
    pub signers: Vec<Signer>,
}

impl SignaturesConfig {
    /// `(approved, total)` signer counts.
    #[must_use]
    pub fn signed(&self) -> (usize, usize) {
        let approved = self
            .signers
            .iter()
            .filter(|s| s.decision == SignatureDecision::Approved)
            .count();
        (approved, self.signers.len())
    }
}

/// Document viewer settings (tool `doc_view`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocViewConfig {
    /// Document link; `None` when no document was generated yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Zoom percentage
    #[serde(default = "default_zoom")]
    pub zoom: u16,
    /// Whether the viewer toolbar is shown
    #[serde(default = "default_true")]
    pub show_toolbar: bool,
}

fn default_zoom() -> u16 {
    100
}

fn default_true() -> bool {
    true
}

impl Default for DocViewConfig {
    fn default() -> Self {
        Self {
            url: None,
            zoom: default_zoom(),
            show_toolbar: true,
        }
    }
}

/// Configuration of every tool on a stage; at most one payload per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// `management` payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management: Option<ManagementConfig>,
    /// `main_form` payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_form: Option<MainFormConfig>,
    /// `stage_panel` payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_panel: Option<StagePanelConfig>,
    /// `stage_actions` payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_actions: Option<StageActionsConfig>,
    /// `comments` payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<CommentsConfig>,
    /// `signatures` payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signatures: Option<SignaturesConfig>,
    /// `doc_view` payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_view: Option<DocViewConfig>,
}

impl ToolConfig {
    /// Whether a payload exists for `kind`.
    #[must_use]
    pub const fn has(&self, kind: ToolKind) -> bool {
        match kind {
            ToolKind::Management => self.management.is_some(),
            ToolKind::MainForm => self.main_form.is_some(),
            ToolKind::StagePanel => self.stage_panel.is_some(),
            ToolKind::StageActions => self.stage_actions.is_some(),
            ToolKind::Comments => self.comments.is_some(),
            ToolKind::Signatures => self.signatures.is_some(),
            ToolKind::DocView => self.doc_view.is_some(),
        }
    }

    /// Creates a default payload for `kind` if none exists yet.
    pub fn ensure(&mut self, kind: ToolKind) {
        match kind {
            ToolKind::Management => {
                self.management.get_or_insert_with(ManagementConfig::default);
            }
            ToolKind::MainForm => {
                self.main_form.get_or_insert_with(MainFormConfig::default);
            }
            ToolKind::StagePanel => {
                self.stage_panel.get_or_insert_with(StagePanelConfig::default);
            }
            ToolKind::StageActions => {
                self.stage_actions
                    .get_or_insert_with(StageActionsConfig::default);
            }
            ToolKind::Comments => {
                self.comments.get_or_insert_with(CommentsConfig::default);
            }
            ToolKind::Signatures => {
                self.signatures.get_or_insert_with(SignaturesConfig::default);
            }
            ToolKind::DocView => {
                self.doc_view.get_or_insert_with(DocViewConfig::default);
            }
        }
    }

    /// Drops the payload for `kind`.
    pub fn clear(&mut self, kind: ToolKind) {
        match kind {
            ToolKind::Management => self.management = None,
            ToolKind::MainForm => self.main_form = None,
            ToolKind::StagePanel => self.stage_panel = None,
            ToolKind::StageActions => self.stage_actions = None,
            ToolKind::Comments => self.comments = None,
            ToolKind::Signatures => self.signatures = None,
            ToolKind::DocView => self.doc_view = None,
        }
    }

    /// Comment thread, created on demand.
    pub fn comments_mut(&mut self) -> &mut CommentsConfig {
        self.comments.get_or_insert_with(CommentsConfig::default)
    }

    /// Versions and attachments, created on demand.
    pub fn management_mut(&mut self) -> &mut ManagementConfig {
        self.management.get_or_insert_with(ManagementConfig::default)
    }

    /// Signers, created on demand.
    pub fn signatures_mut(&mut self) -> &mut SignaturesConfig {
        self.signatures.get_or_insert_with(SignaturesConfig::default)
    }

    /// Checklist panel, created on demand.
    pub fn stage_panel_mut(&mut self) -> &mut StagePanelConfig {
        self.stage_panel.get_or_insert_with(StagePanelConfig::default)
    }

    /// Document viewer settings, created on demand.
    pub fn doc_view_mut(&mut self) -> &mut DocViewConfig {
        self.doc_view.get_or_insert_with(DocViewConfig::default)
    }
}
