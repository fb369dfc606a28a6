//! Shared CLI plumbing: error kinds, exit codes and template/layout access.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Config;
use crate::editor::EditError;
use crate::models::{BalloonArea, BalloonItem, ModelStage, ToolKind, WorkflowTemplate};
use crate::services::{CatalogError, LayoutRepository, StageError, TemplateService};

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command succeeded
    Success = 0,
    /// Invalid input or rejected edit
    Validation = 1,
    /// File could not be read or written
    Io = 2,
    /// Stage, catalog or balloon does not exist
    NotFound = 3,
}

impl ExitCode {
    /// Numeric code passed to `std::process::exit`.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// A CLI failure with its exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    /// Exit code category
    pub kind: ExitCode,
    /// Message printed to stderr
    pub message: String,
}

impl CliError {
    /// Validation failure (exit code 1).
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::Validation,
            message: message.into(),
        }
    }

    /// I/O failure (exit code 2).
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::Io,
            message: message.into(),
        }
    }

    /// Missing entity (exit code 3).
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::NotFound,
            message: message.into(),
        }
    }

    /// Exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.kind.code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

impl From<StageError> for CliError {
    fn from(err: StageError) -> Self {
        match err {
            StageError::NotFound(_) | StageError::UnknownTool(_) => Self::not_found(err.to_string()),
            StageError::DuplicateId(_) => Self::validation(err.to_string()),
        }
    }
}

impl From<CatalogError> for CliError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::UnknownCatalog { .. } | CatalogError::ItemNotFound(_) => {
                Self::not_found(err.to_string())
            }
            _ => Self::validation(err.to_string()),
        }
    }
}

impl From<EditError> for CliError {
    fn from(err: EditError) -> Self {
        match err {
            EditError::Label(e) => Self::validation(e.to_string()),
            EditError::Catalog(e) => e.into(),
        }
    }
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Loads a template file.
pub fn load_template(path: &Path) -> CliResult<WorkflowTemplate> {
    TemplateService::load(path).map_err(|e| CliError::io(format!("Failed to load template: {e:#}")))
}

/// Writes a template file.
pub fn save_template(template: &WorkflowTemplate, path: &Path) -> CliResult<()> {
    TemplateService::save(template, path)
        .map_err(|e| CliError::io(format!("Failed to save template: {e:#}")))
}

/// Looks up a stage or fails with exit code 3.
pub fn find_stage<'a>(template: &'a WorkflowTemplate, id: &str) -> CliResult<&'a ModelStage> {
    template
        .stage(id)
        .ok_or_else(|| CliError::not_found(format!("Stage '{id}' not found")))
}

/// Parses a tool identifier.
pub fn parse_tool(id: &str) -> CliResult<ToolKind> {
    ToolKind::parse(id).ok_or_else(|| {
        let known: Vec<&str> = ToolKind::all().iter().map(|t| t.id()).collect();
        CliError::validation(format!(
            "Unknown tool '{id}'. Expected one of: {}",
            known.join(", ")
        ))
    })
}

/// Parses a balloon area name.
pub fn parse_area(name: &str) -> CliResult<BalloonArea> {
    name.parse::<BalloonArea>().map_err(CliError::validation)
}

/// Finds a balloon by id, or by label ignoring case.
pub fn resolve_balloon<'a>(items: &'a [BalloonItem], key: &str) -> Option<&'a BalloonItem> {
    let key = key.trim();
    items
        .iter()
        .find(|item| item.id == key)
        .or_else(|| items.iter().find(|item| item.label.eq_ignore_ascii_case(key)))
}

/// User configuration, or defaults when it is missing or unreadable.
pub fn load_config() -> Config {
    Config::load().unwrap_or_default()
}

/// Layout repository in `dir`, or in the configured layouts directory.
pub fn layout_repository(dir: Option<&PathBuf>, config: &Config) -> CliResult<LayoutRepository> {
    let dir = match dir {
        Some(dir) => dir.clone(),
        None => config
            .paths
            .resolved_layouts_dir()
            .map_err(|e| CliError::io(format!("{e:#}")))?,
    };
    Ok(LayoutRepository::in_dir(dir)
        .with_defaults(config.ui.default_density, config.ui.default_scale))
}

/// Prints `value` as a single JSON line.
pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!(
        "{}",
        serde_json::to_string(value)
            .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?
    );
    Ok(())
}
