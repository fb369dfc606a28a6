//! Balloon tokens: labeled, colored, optionally iconed catalog entries.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ToolKind;

/// Minimum label length (after trimming), in characters.
pub const LABEL_MIN_LEN: usize = 1;

/// Maximum label length (after trimming), in characters.
pub const LABEL_MAX_LEN: usize = 32;

/// Validation failures for balloon labels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    /// Label is empty or whitespace only
    #[error("Label cannot be empty")]
    Empty,
    /// Label exceeds [`LABEL_MAX_LEN`] characters
    #[error("Label exceeds maximum length of {max} characters (got {len})")]
    TooLong {
        /// Character count of the trimmed label
        len: usize,
        /// Allowed maximum
        max: usize,
    },
    /// Another balloon in the same catalog already uses this label
    #[error("A balloon named '{0}' already exists")]
    Duplicate(String),
}

/// Icon names a balloon can carry.
///
/// Closed set: unknown names are rejected at the boundary instead of
/// degrading to a default glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalloonIcon {
    /// Generic tag
    Tag,
    /// Flag / milestone
    Flag,
    /// Star / highlight
    Star,
    /// Warning
    Alert,
    /// Check mark
    Check,
    /// Clock / deadline
    Clock,
    /// Person
    User,
    /// Document
    File,
    /// Pen / signature
    Pen,
    /// Send / dispatch
    Send,
    /// Lock / restricted
    Lock,
    /// Bolt / urgent action
    Bolt,
}

impl BalloonIcon {
    /// Returns all icons in picker order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Tag,
            Self::Flag,
            Self::Star,
            Self::Alert,
            Self::Check,
            Self::Clock,
            Self::User,
            Self::File,
            Self::Pen,
            Self::Send,
            Self::Lock,
            Self::Bolt,
        ]
    }

    /// Stable identifier used in JSON, CLI arguments and config.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Flag => "flag",
            Self::Star => "star",
            Self::Alert => "alert",
            Self::Check => "check",
            Self::Clock => "clock",
            Self::User => "user",
            Self::File => "file",
            Self::Pen => "pen",
            Self::Send => "send",
            Self::Lock => "lock",
            Self::Bolt => "bolt",
        }
    }

    /// Terminal glyph for this icon.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Tag => "#",
            Self::Flag => "⚑",
            Self::Star => "★",
            Self::Alert => "⚠",
            Self::Check => "✓",
            Self::Clock => "◷",
            Self::User => "☺",
            Self::File => "▤",
            Self::Pen => "✎",
            Self::Send => "➤",
            Self::Lock => "⊠",
            Self::Bolt => "ϟ",
        }
    }

    /// Next icon in picker order, wrapping around. `None` cycles to the first icon.
    #[must_use]
    pub fn cycle(current: Option<Self>) -> Option<Self> {
        let all = Self::all();
        match current {
            None => all.first().copied(),
            Some(icon) => {
                let index = all.iter().position(|i| *i == icon).unwrap_or(0);
                // Past the last icon the balloon goes back to "no icon"
                all.get(index + 1).copied()
            }
        }
    }
}

impl fmt::Display for BalloonIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BalloonIcon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|icon| icon.name() == needle)
            .ok_or_else(|| {
                format!(
                    "Unknown icon '{s}'. Expected one of: {}",
                    Self::all()
                        .iter()
                        .map(|i| i.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// Palette a balloon can be painted with.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BalloonColor {
    /// Neutral tone (default)
    #[default]
    Slate,
    /// Red
    Red,
    /// Orange
    Orange,
    /// Amber
    Amber,
    /// Emerald
    Emerald,
    /// Sky blue
    Sky,
    /// Indigo
    Indigo,
    /// Violet
    Violet,
    /// Pink
    Pink,
}

impl BalloonColor {
    /// Returns the whole palette in picker order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Slate,
            Self::Red,
            Self::Orange,
            Self::Amber,
            Self::Emerald,
            Self::Sky,
            Self::Indigo,
            Self::Violet,
            Self::Pink,
        ]
    }

    /// Stable identifier used in JSON, CLI arguments and config.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Slate => "slate",
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Amber => "amber",
            Self::Emerald => "emerald",
            Self::Sky => "sky",
            Self::Indigo => "indigo",
            Self::Violet => "violet",
            Self::Pink => "pink",
        }
    }

    /// RGB value of the 500 shade of this color.
    #[must_use]
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Slate => (100, 116, 139),
            Self::Red => (239, 68, 68),
            Self::Orange => (249, 115, 22),
            Self::Amber => (245, 158, 11),
            Self::Emerald => (16, 185, 129),
            Self::Sky => (14, 165, 233),
            Self::Indigo => (99, 102, 241),
            Self::Violet => (139, 92, 246),
            Self::Pink => (236, 72, 153),
        }
    }

    /// Hex representation (`#RRGGBB`).
    #[must_use]
    pub fn to_hex(self) -> String {
        let (r, g, b) = self.rgb();
        format!("#{r:02X}{g:02X}{b:02X}")
    }

    /// Next color in palette order, wrapping around.
    #[must_use]
    pub fn cycle(self) -> Self {
        let all = Self::all();
        let index = all.iter().position(|c| *c == self).unwrap_or(0);
        all[(index + 1) % all.len()]
    }
}

impl fmt::Display for BalloonColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BalloonColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|color| color.name() == needle)
            .ok_or_else(|| {
                format!(
                    "Unknown color '{s}'. Expected one of: {}",
                    Self::all()
                        .iter()
                        .map(|c| c.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// Which catalog of a stage a balloon belongs to.
///
/// Together with the stage id this forms the catalog key; areas have no
/// lifecycle of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalloonArea {
    /// Fields the main form requires before the stage can advance
    RequiredFields,
    /// Tasks offered to the stage panel checklist
    ChecklistCatalog,
    /// Actions available in the stage actions block
    ActionCatalog,
}

impl BalloonArea {
    /// All areas, in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::RequiredFields,
            Self::ChecklistCatalog,
            Self::ActionCatalog,
        ]
    }

    /// Stable identifier used in JSON, CLI arguments and URLs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RequiredFields => "required_fields",
            Self::ChecklistCatalog => "checklist_catalog",
            Self::ActionCatalog => "action_catalog",
        }
    }

    /// Tool whose configuration owns this catalog.
    #[must_use]
    pub const fn owner(self) -> ToolKind {
        match self {
            Self::RequiredFields => ToolKind::MainForm,
            Self::ChecklistCatalog => ToolKind::StagePanel,
            Self::ActionCatalog => ToolKind::StageActions,
        }
    }

    /// Qualified path, e.g. `main_form.required_fields`.
    #[must_use]
    pub fn path(self) -> String {
        format!("{}.{}", self.owner().id(), self.name())
    }

    /// Human-readable title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::RequiredFields => "Required fields",
            Self::ChecklistCatalog => "Checklist catalog",
            Self::ActionCatalog => "Action catalog",
        }
    }
}

impl fmt::Display for BalloonArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BalloonArea {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::all()
            .iter()
            .copied()
            .find(|area| area.name() == needle || area.path() == needle)
            .ok_or_else(|| format!("Unknown balloon area '{s}'"))
    }
}

/// A labeled token in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalloonItem {
    /// Opaque unique identifier, immutable once assigned
    #[serde(default)]
    pub id: String,
    /// Display text
    pub label: String,
    /// Optional icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<BalloonIcon>,
    /// Palette color
    #[serde(default)]
    pub color: BalloonColor,
    /// Free-form attributes (e.g. `action_type` for action catalogs)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

impl BalloonItem {
    /// Creates a balloon with a fresh id and the default color.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: Self::generate_id(),
            label: label.into(),
            icon: None,
            color: BalloonColor::default(),
            meta: BTreeMap::new(),
        }
    }

    /// Sets the color (builder style).
    pub fn with_color(mut self, color: BalloonColor) -> Self {
        self.color = color;
        self
    }

    /// Sets the icon (builder style).
    pub fn with_icon(mut self, icon: Option<BalloonIcon>) -> Self {
        self.icon = icon;
        self
    }

    /// Adds a meta attribute (builder style).
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Generates a new opaque id.
    #[must_use]
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Validates a label against length bounds and the labels already present.
///
/// `exclude_id` skips one item (the one being renamed). Returns the trimmed
/// label on success.
pub fn validate_label<'a>(
    label: &str,
    existing: impl IntoIterator<Item = &'a BalloonItem>,
    exclude_id: Option<&str>,
) -> Result<String, LabelError> {
    let trimmed = label.trim();
    let len = trimmed.chars().count();

    if len < LABEL_MIN_LEN {
        return Err(LabelError::Empty);
    }
    if len > LABEL_MAX_LEN {
        return Err(LabelError::TooLong {
            len,
            max: LABEL_MAX_LEN,
        });
    }

    let folded = trimmed.to_lowercase();
    let duplicate = existing
        .into_iter()
        .filter(|item| exclude_id != Some(item.id.as_str()))
        .any(|item| item.label.trim().to_lowercase() == folded);
    if duplicate {
        return Err(LabelError::Duplicate(trimmed.to_string()));
    }

    Ok(trimmed.to_string())
}

/// Builds a label for a copy of `label` that is unique among `existing`.
///
/// Produces `"<label> copy"`, then `"<label> copy 2"`, ... keeping the result
/// within [`LABEL_MAX_LEN`] by shortening the base label.
pub fn duplicate_label<'a>(
    label: &str,
    existing: impl IntoIterator<Item = &'a BalloonItem> + Clone,
) -> String {
    let base = label.trim();
    let mut n = 1usize;
    loop {
        let suffix = if n == 1 {
            " copy".to_string()
        } else {
            format!(" copy {n}")
        };
        let room = LABEL_MAX_LEN.saturating_sub(suffix.chars().count());
        let head: String = base.chars().take(room).collect();
        let candidate = format!("{}{suffix}", head.trim_end());
        if validate_label(&candidate, existing.clone(), None).is_ok() {
            return candidate;
        }
        n += 1;
    }
}
