//! CLI command handlers for Stagecard.
//!
//! Headless, scriptable access to templates, stages, balloon catalogs and
//! stage layouts, for automation and tests.

pub mod balloon;
pub mod common;
pub mod init;
pub mod layout;
pub mod stage;

// Re-export types used by main.rs and tests
pub use balloon::BalloonArgs;
pub use common::{CliError, CliResult, ExitCode};
pub use init::InitArgs;
pub use layout::LayoutArgs;
pub use stage::StageArgs;
