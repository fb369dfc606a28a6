//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name and on-disk locations.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Stagecard";

/// The binary name of the application (used in command examples).
pub const APP_BINARY_NAME: &str = "stagecard";

/// Directory name under the platform config directory.
pub const APP_DIR_NAME: &str = "Stagecard";

/// Log file written by the TUI, inside the config directory.
pub const LOG_FILE_NAME: &str = "stagecard.log";
