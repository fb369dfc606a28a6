//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::APP_DIR_NAME;
use crate::models::{Density, ToolKind, MAX_SCALE, MIN_SCALE};
use crate::services::{CurrentUser, ToolDependencies, ToolDependency};

/// Theme display mode preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Automatically detect OS theme (dark/light)
    #[default]
    Auto,
    /// Always use dark theme
    Dark,
    /// Always use light theme
    Light,
}

/// Path configuration for file system locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Template opened when no file is given on the command line
    pub template: Option<PathBuf>,
    /// Directory holding persisted stage layouts
    pub layouts_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Directory for layout files, defaulting to `<config dir>/layouts`.
    pub fn resolved_layouts_dir(&self) -> Result<PathBuf> {
        match &self.layouts_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Config::config_dir()?.join("layouts")),
        }
    }
}

/// UI preferences configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Theme mode preference (Auto, Dark, Light)
    #[serde(default)]
    pub theme_mode: ThemeMode,
    /// Density for stages that have no saved layout
    #[serde(default)]
    pub default_density: Density,
    /// Preview scale for stages that have no saved layout
    #[serde(default = "default_scale")]
    pub default_scale: f32,
}

fn default_scale() -> f32 {
    1.0
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme_mode: ThemeMode::default(),
            default_density: Density::default(),
            default_scale: default_scale(),
        }
    }
}

/// Editor behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Round-trip delay of the simulated backend, in milliseconds
    #[serde(default = "default_latency_ms")]
    pub simulated_latency_ms: u64,
}

fn default_latency_ms() -> u64 {
    600
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            simulated_latency_ms: default_latency_ms(),
        }
    }
}

impl EditorConfig {
    /// Latency as a `Duration`.
    #[must_use]
    pub const fn latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

/// Identity shown as comment author and signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Display name
    pub name: String,
    /// Role in the organisation
    #[serde(default)]
    pub role: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            name: whoami_fallback(),
            role: "Analyst".to_string(),
        }
    }
}

fn whoami_fallback() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "Operator".to_string())
}

impl From<&UserConfig> for CurrentUser {
    fn from(user: &UserConfig) -> Self {
        Self {
            name: user.name.clone(),
            role: user.role.clone(),
        }
    }
}

fn default_dependencies() -> Vec<ToolDependency> {
    ToolDependencies::default().rules().to_vec()
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/Stagecard/config.toml`
/// - macOS: `~/Library/Application Support/Stagecard/config.toml`
/// - Windows: `%APPDATA%\Stagecard\config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// File system paths
    #[serde(default)]
    pub paths: PathConfig,
    /// UI preferences
    #[serde(default)]
    pub ui: UiConfig,
    /// Editor behaviour
    #[serde(default)]
    pub editor: EditorConfig,
    /// Current user
    #[serde(default)]
    pub user: UserConfig,
    /// Tool dependency rules (`[[dependencies]]` tables)
    #[serde(default = "default_dependencies")]
    pub dependencies: Vec<ToolDependency>,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            paths: PathConfig::default(),
            ui: UiConfig::default(),
            editor: EditorConfig::default(),
            user: UserConfig::default(),
            dependencies: default_dependencies(),
        }
    }

    /// Gets the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the default location.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from an explicit path.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(config_dir) = config_path.parent() {
            fs::create_dir_all(config_dir).context(format!(
                "Failed to create config directory: {}",
                config_dir.display()
            ))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let temp_path = config_path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    ///
    /// Checks:
    /// - `default_scale` lies within the preview scale range
    /// - `user.name` is not blank
    /// - no dependency rule makes a tool require itself
    pub fn validate(&self) -> Result<()> {
        let scale = self.ui.default_scale;
        if !scale.is_finite() || !(MIN_SCALE..=MAX_SCALE).contains(&scale) {
            anyhow::bail!(
                "ui.default_scale must be between {MIN_SCALE} and {MAX_SCALE}, got {scale}"
            );
        }

        if self.user.name.trim().is_empty() {
            anyhow::bail!("user.name must not be empty");
        }

        if let Some(rule) = self.dependencies.iter().find(|r| r.tool == r.requires) {
            anyhow::bail!("Tool '{}' cannot require itself", rule.tool);
        }

        Ok(())
    }

    /// Dependency table built from `[[dependencies]]`.
    #[must_use]
    pub fn tool_dependencies(&self) -> ToolDependencies {
        ToolDependencies::new(self.dependencies.clone())
    }

    /// Adds a dependency rule unless already present.
    pub fn add_dependency(&mut self, tool: ToolKind, requires: ToolKind) -> Result<()> {
        if tool == requires {
            anyhow::bail!("Tool '{tool}' cannot require itself");
        }
        let rule = ToolDependency { tool, requires };
        if !self.dependencies.contains(&rule) {
            self.dependencies.push(rule);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.paths.template, None);
        assert_eq!(config.ui.theme_mode, ThemeMode::Auto);
        assert_eq!(config.ui.default_density, Density::Cozy);
        assert!((config.ui.default_scale - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.editor.simulated_latency_ms, 600);
        assert_eq!(config.dependencies.len(), 1);
    }

    #[test]
    fn test_config_validate() {
        let config = Config::new();
        assert!(config.validate().is_ok());

        let mut bad_scale = Config::new();
        bad_scale.ui.default_scale = 2.5;
        assert!(bad_scale.validate().is_err());

        let mut no_name = Config::new();
        no_name.user.name = "  ".to_string();
        assert!(no_name.validate().is_err());
    }

    #[test]
    fn test_add_dependency_rejects_self_reference() {
        let mut config = Config::new();
        assert!(config
            .add_dependency(ToolKind::Comments, ToolKind::Comments)
            .is_err());

        config
            .add_dependency(ToolKind::Comments, ToolKind::MainForm)
            .unwrap();
        config
            .add_dependency(ToolKind::Comments, ToolKind::MainForm)
            .unwrap();
        assert_eq!(config.dependencies.len(), 2);
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::new();
        config.ui.theme_mode = ThemeMode::Light;
        config.ui.default_density = Density::Compact;
        config.user.name = "Maria".to_string();
        config.user.role = "Pregoeira".to_string();
        config.paths.template = Some(PathBuf::from("/tmp/workflow.json"));

        config.save_to(&config_file).unwrap();
        assert!(!config_file.with_extension("toml.tmp").exists());

        let loaded = Config::load_from(&config_file).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Config::load_from(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.dependencies, Config::new().dependencies);
    }

    #[test]
    fn test_dependency_tables_from_toml() {
        let content = r#"
[user]
name = "Ana"

[[dependencies]]
tool = "comments"
requires = "doc_view"
"#;
        let config: Config = toml::from_str(content).unwrap();
        assert_eq!(config.user.role, "");
        assert_eq!(
            config.dependencies,
            vec![ToolDependency {
                tool: ToolKind::Comments,
                requires: ToolKind::DocView,
            }]
        );
        assert_eq!(
            config.tool_dependencies().closure_for_enable(ToolKind::Comments),
            vec![ToolKind::Comments, ToolKind::DocView]
        );
    }

    #[test]
    fn test_empty_dependency_list_disables_rules() {
        let config: Config = toml::from_str("dependencies = []\n").unwrap();
        assert!(config.tool_dependencies().rules().is_empty());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[ui]\ndefault_scale = 9.0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
