//! Service layer for business logic.
//!
//! Stores, repositories and the collaborator seams that editors, the CLI and
//! the web API coordinate through.

pub mod catalog;
pub mod collaborators;
pub mod dependencies;
pub mod layout_store;
pub mod optimistic;
pub mod reorder;
pub mod stages;
pub mod templates;

pub use catalog::{BalloonStore, CatalogChangeSet, CatalogError};
pub use collaborators::{
    open_document, ClipboardSink, CurrentUser, IdentityProvider, LinkOpener, Notice, NoticeLevel,
    NoticeLog, Notifier, OpenError, StaticIdentity, SystemClipboard, SystemOpener,
};
pub use dependencies::{ToolDependencies, ToolDependency};
pub use layout_store::{FileKeyValueStore, KeyValueStore, LayoutRepository, MemoryKeyValueStore};
pub use optimistic::{OptimisticQueue, Resolution, SimulatedTransport, SubmitError, Transport, TransportError};
pub use stages::{StageError, StageRepository};
pub use templates::TemplateService;
