//! Data models for workflow stages, tools, layouts, and balloon catalogs.
//!
//! Models are independent of UI and persistence concerns.

pub mod balloon;
pub mod stage;
pub mod stage_layout;
pub mod template;
pub mod tool;
pub mod tool_config;

pub use balloon::{
    duplicate_label, validate_label, BalloonArea, BalloonColor, BalloonIcon, BalloonItem,
    LabelError, LABEL_MAX_LEN, LABEL_MIN_LEN,
};
pub use stage::{ModelStage, StagePatch, StageStatus};
pub use stage_layout::{Column, Density, LayoutMode, StageLayout, MAX_SCALE, MIN_SCALE};
pub use template::WorkflowTemplate;
pub use tool::{ToolKind, ToolMeta};
pub use tool_config::{
    Attachment, ChecklistItem, Comment, CommentsConfig, DocViewConfig, DocumentVersion,
    MainFormConfig, ManagementConfig, SignatureDecision, Signer, SignaturesConfig,
    StageActionsConfig, StagePanelConfig, SyncState, ToolConfig,
};
