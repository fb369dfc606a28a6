//! Persistence of stage card layouts.
//!
//! Layouts live in a string key-value store under `stage-layout.<stage id>`,
//! separate from the template. Reads never fail: a missing or unreadable entry
//! yields the default layout for the stage.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::{Density, ModelStage, StageLayout};

/// Key prefix for persisted layouts.
pub const LAYOUT_KEY_PREFIX: &str = "stage-layout.";

/// Minimal string key-value storage.
pub trait KeyValueStore {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Deletes `key`. Deleting a missing key succeeds.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store, used by tests and the web server's scratch mode.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: BTreeMap<String, String>,
}

impl MemoryKeyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Uses `dir` as the storage directory (created on first write).
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `key`.
    ///
    /// Lowercase ASCII letters, digits, `-` and `.` are kept; every other byte
    /// becomes `_xx` (lowercase hex), so distinct keys never share a file,
    /// even on case-insensitive filesystems.
    fn path_for(&self, key: &str) -> PathBuf {
        let mut file_name = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_lowercase() || byte.is_ascii_digit() || matches!(byte, b'-' | b'.') {
                file_name.push(char::from(byte));
            } else {
                let _ = write!(file_name, "_{byte:02x}");
            }
        }
        self.dir.join(format!("{file_name}.json"))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;

        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value)
            .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
    }
}

/// Loads and stores [`StageLayout`]s.
pub struct LayoutRepository {
    store: Box<dyn KeyValueStore + Send + Sync>,
    density: Density,
    scale: f32,
}

impl std::fmt::Debug for LayoutRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutRepository").finish_non_exhaustive()
    }
}

impl LayoutRepository {
    /// Wraps any key-value store.
    pub fn new(store: impl KeyValueStore + Send + Sync + 'static) -> Self {
        Self {
            store: Box::new(store),
            density: Density::default(),
            scale: 1.0,
        }
    }

    /// Density and scale given to stages without a stored layout.
    #[must_use]
    pub fn with_defaults(mut self, density: Density, scale: f32) -> Self {
        self.density = density;
        self.scale = scale;
        self
    }

    /// Repository backed by memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryKeyValueStore::new())
    }

    /// Repository backed by JSON files in `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(FileKeyValueStore::new(dir))
    }

    /// Storage key for a stage.
    #[must_use]
    pub fn key(stage_id: &str) -> String {
        format!("{LAYOUT_KEY_PREFIX}{stage_id}")
    }

    /// Loads the layout of `stage`, reconciled with its enabled tools.
    ///
    /// Falls back to the default layout when nothing is stored or the stored
    /// entry cannot be read or parsed.
    #[must_use]
    pub fn load(&self, stage: &ModelStage) -> StageLayout {
        let key = Self::key(&stage.id);
        let stored = match self.store.get(&key) {
            Ok(value) => value,
            Err(err) => {
                warn!(stage_id = %stage.id, error = %err, "layout unreadable, using default");
                None
            }
        };

        let mut layout = stored
            .and_then(|json| match serde_json::from_str::<StageLayout>(&json) {
                Ok(layout) => Some(layout),
                Err(err) => {
                    warn!(stage_id = %stage.id, error = %err, "corrupt layout, using default");
                    None
                }
            })
            .unwrap_or_else(|| {
                let mut layout = StageLayout::default_for(&stage.tools_order);
                layout.density = self.density;
                layout.scale = self.scale;
                layout
            });

        layout.set_scale(layout.scale);
        layout.reconcile(&stage.tools_order);
        layout
    }

    /// Whether a layout is stored for the stage.
    pub fn exists(&self, stage_id: &str) -> Result<bool> {
        Ok(self.store.get(&Self::key(stage_id))?.is_some())
    }

    /// Persists a layout.
    pub fn save(&mut self, stage_id: &str, layout: &StageLayout) -> Result<()> {
        let json = serde_json::to_string(layout).context("Failed to serialize layout")?;
        self.store
            .set(&Self::key(stage_id), &json)
            .with_context(|| format!("Failed to save layout for stage '{stage_id}'"))?;
        debug!(stage_id, mode = %layout.mode, "layout saved");
        Ok(())
    }

    /// Deletes the stored layout so the default applies again.
    pub fn reset(&mut self, stage_id: &str) -> Result<()> {
        self.store
            .remove(&Self::key(stage_id))
            .with_context(|| format!("Failed to reset layout for stage '{stage_id}'"))?;
        debug!(stage_id, "layout reset");
        Ok(())
    }
}
