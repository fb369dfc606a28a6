//! Editing sessions over catalogs and stages.
//!
//! [`BalloonEditor`] and [`StageWorkspace`] work on drafts and commit in one
//! step; [`BalloonManager`] writes through to the store on every operation.

pub mod balloon_editor;
pub mod balloon_manager;
pub mod workspace;

use thiserror::Error;

use crate::models::LabelError;
use crate::services::CatalogError;

pub use balloon_editor::{BalloonEditor, EditorMode};
pub use balloon_manager::{BalloonManager, ManagerMode};
pub use workspace::StageWorkspace;

/// Answer to a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Nothing would be lost
    Close,
    /// Unsaved changes; ask before discarding
    ConfirmDiscard,
}

/// Failures of write-through catalog edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The label was rejected
    #[error(transparent)]
    Label(#[from] LabelError),
    /// The store rejected the write
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
