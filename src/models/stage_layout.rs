//! Column layout of a stage card.
//!
//! A layout is a presentation concern persisted separately from the stage.
//! Only the lists of the active mode hold tools: stacked mode uses
//! `order_stack`, the split modes use `order_left` and `order_right`. After
//! [`StageLayout::reconcile`] every enabled tool sits in exactly one of them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::ToolKind;
use crate::services::reorder::move_item;

/// Smallest allowed preview scale.
pub const MIN_SCALE: f32 = 0.5;

/// Largest allowed preview scale.
pub const MAX_SCALE: f32 = 2.0;

/// Column arrangement of the stage card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Single column
    #[default]
    #[serde(rename = "stacked")]
    Stacked,
    /// Two equal columns
    #[serde(rename = "50-50")]
    Split50,
    /// Wide left column
    #[serde(rename = "60-40")]
    Split60,
    /// Wide right column
    #[serde(rename = "40-60")]
    Split40,
}

impl LayoutMode {
    /// All modes in cycling order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Stacked, Self::Split50, Self::Split60, Self::Split40]
    }

    /// Stable identifier (`stacked`, `50-50`, ...).
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Stacked => "stacked",
            Self::Split50 => "50-50",
            Self::Split60 => "60-40",
            Self::Split40 => "40-60",
        }
    }

    /// Whether the mode has two columns.
    #[must_use]
    pub const fn is_split(self) -> bool {
        !matches!(self, Self::Stacked)
    }

    /// Column widths in percent, `(left, right)`. Stacked is `(100, 0)`.
    #[must_use]
    pub const fn column_percentages(self) -> (u16, u16) {
        match self {
            Self::Stacked => (100, 0),
            Self::Split50 => (50, 50),
            Self::Split60 => (60, 40),
            Self::Split40 => (40, 60),
        }
    }

    /// Next mode in cycling order.
    #[must_use]
    pub const fn cycle(self) -> Self {
        match self {
            Self::Stacked => Self::Split50,
            Self::Split50 => Self::Split60,
            Self::Split60 => Self::Split40,
            Self::Split40 => Self::Stacked,
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('/', "-");
        Self::all()
            .iter()
            .copied()
            .find(|mode| mode.id() == needle)
            .ok_or_else(|| {
                format!("Unknown layout mode '{s}'. Expected stacked, 50-50, 60-40 or 40-60")
            })
    }
}

/// Spacing density of the preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Density {
    /// Roomy spacing
    #[default]
    Cozy,
    /// Tight spacing
    Compact,
}

impl Density {
    /// The other density.
    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Cozy => Self::Compact,
            Self::Compact => Self::Cozy,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Cozy => "cozy",
            Self::Compact => "compact",
        }
    }
}

impl FromStr for Density {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cozy" => Ok(Self::Cozy),
            "compact" => Ok(Self::Compact),
            other => Err(format!("Unknown density '{other}'. Expected cozy or compact")),
        }
    }
}

/// A column of the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    /// The single column of stacked mode
    Stack,
    /// Left column of a split mode
    Left,
    /// Right column of a split mode
    Right,
}

/// Persisted layout of one stage card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageLayout {
    /// Column arrangement
    #[serde(default)]
    pub mode: LayoutMode,
    /// Spacing density
    #[serde(default)]
    pub density: Density,
    /// Whether column guides are drawn
    #[serde(default)]
    pub show_guides: bool,
    /// Visual scale factor (0.5–2.0)
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Left column order (split modes)
    #[serde(default)]
    pub order_left: Vec<ToolKind>,
    /// Right column order (split modes)
    #[serde(default)]
    pub order_right: Vec<ToolKind>,
    /// Single column order (stacked mode)
    #[serde(default)]
    pub order_stack: Vec<ToolKind>,
}

fn default_scale() -> f32 {
    1.0
}

impl Default for StageLayout {
    fn default() -> Self {
        Self {
            mode: LayoutMode::Stacked,
            density: Density::Cozy,
            show_guides: false,
            scale: default_scale(),
            order_left: Vec::new(),
            order_right: Vec::new(),
            order_stack: Vec::new(),
        }
    }
}

impl StageLayout {
    /// Default stacked layout seeded from a stage's tool order.
    #[must_use]
    pub fn default_for(tools_order: &[ToolKind]) -> Self {
        let mut layout = Self::default();
        layout.reconcile(tools_order);
        layout
    }

    /// Columns that hold tools in the current mode.
    #[must_use]
    pub const fn active_columns(&self) -> &'static [Column] {
        if self.mode.is_split() {
            &[Column::Left, Column::Right]
        } else {
            &[Column::Stack]
        }
    }

    /// Column new tools are appended to.
    #[must_use]
    pub const fn primary_column(&self) -> Column {
        if self.mode.is_split() {
            Column::Left
        } else {
            Column::Stack
        }
    }

    /// Tools of a column.
    #[must_use]
    pub fn column(&self, column: Column) -> &[ToolKind] {
        match column {
            Column::Stack => &self.order_stack,
            Column::Left => &self.order_left,
            Column::Right => &self.order_right,
        }
    }

    fn column_mut(&mut self, column: Column) -> &mut Vec<ToolKind> {
        match column {
            Column::Stack => &mut self.order_stack,
            Column::Left => &mut self.order_left,
            Column::Right => &mut self.order_right,
        }
    }

    /// Finds the active column and index holding `tool`.
    #[must_use]
    pub fn position_of(&self, tool: ToolKind) -> Option<(Column, usize)> {
        self.active_columns().iter().find_map(|column| {
            self.column(*column)
                .iter()
                .position(|t| *t == tool)
                .map(|index| (*column, index))
        })
    }

    /// All placed tools in reading order (stack, or left then right).
    #[must_use]
    pub fn flattened(&self) -> Vec<ToolKind> {
        self.active_columns()
            .iter()
            .flat_map(|column| self.column(*column).iter().copied())
            .collect()
    }

    /// Switches the column arrangement.
    ///
    /// Split → stacked concatenates left then right and keeps both columns as
    /// the remembered split. Stacked → split restores that split for the tools
    /// still on the card and appends the rest to the left column; with no
    /// remembered split everything goes left. Split → split keeps the columns.
    /// Returns `false` when the mode is unchanged.
    pub fn set_mode(&mut self, mode: LayoutMode) -> bool {
        if self.mode == mode {
            return false;
        }
        match (self.mode.is_split(), mode.is_split()) {
            (false, true) => {
                let stack = std::mem::take(&mut self.order_stack);
                self.order_left.retain(|tool| stack.contains(tool));
                let left = &self.order_left;
                self.order_right
                    .retain(|tool| stack.contains(tool) && !left.contains(tool));
                for tool in stack {
                    if !self.order_left.contains(&tool) && !self.order_right.contains(&tool) {
                        self.order_left.push(tool);
                    }
                }
            }
            (true, false) => {
                let mut stack = std::mem::take(&mut self.order_stack);
                for tool in self.order_left.iter().chain(self.order_right.iter()) {
                    if !stack.contains(tool) {
                        stack.push(*tool);
                    }
                }
                self.order_stack = stack;
            }
            _ => {}
        }
        self.mode = mode;
        true
    }

    /// Aligns the order lists with the enabled tool set.
    ///
    /// Disabled tools are purged from every list and duplicates are dropped.
    /// In split modes stray stack entries move to the left column; while
    /// stacked the remembered split stays in place and any of its tools
    /// missing from the stack are appended to it. Newly enabled tools go to
    /// the primary column. Returns whether anything changed.
    pub fn reconcile(&mut self, tools: &[ToolKind]) -> bool {
        let before = self.clone();
        let mut seen: Vec<ToolKind> = Vec::new();

        for column in self.active_columns() {
            self.column_mut(*column).retain(|tool| {
                if tools.contains(tool) && !seen.contains(tool) {
                    seen.push(*tool);
                    true
                } else {
                    false
                }
            });
        }

        let primary = self.primary_column();
        if self.mode.is_split() {
            for tool in std::mem::take(&mut self.order_stack) {
                if tools.contains(&tool) && !seen.contains(&tool) {
                    seen.push(tool);
                    self.column_mut(primary).push(tool);
                }
            }
        } else {
            let mut remembered: Vec<ToolKind> = Vec::new();
            for column in [Column::Left, Column::Right] {
                self.column_mut(column).retain(|tool| {
                    if tools.contains(tool) && !remembered.contains(tool) {
                        remembered.push(*tool);
                        true
                    } else {
                        false
                    }
                });
            }
            for tool in remembered {
                if !seen.contains(&tool) {
                    seen.push(tool);
                    self.order_stack.push(tool);
                }
            }
        }

        for tool in tools {
            if !seen.contains(tool) {
                seen.push(*tool);
                self.column_mut(primary).push(*tool);
            }
        }

        *self != before
    }

    /// Removes a tool from every order list.
    pub fn remove_tool(&mut self, tool: ToolKind) -> bool {
        let mut removed = false;
        for column in [Column::Stack, Column::Left, Column::Right] {
            let list = self.column_mut(column);
            let len = list.len();
            list.retain(|t| *t != tool);
            removed |= list.len() != len;
        }
        removed
    }

    /// Places a tool at the end of the primary column unless already placed.
    pub fn insert_tool(&mut self, tool: ToolKind) -> bool {
        if self.position_of(tool).is_some() {
            return false;
        }
        let primary = self.primary_column();
        self.column_mut(primary).push(tool);
        true
    }

    /// Reorders one column by moving the entry at `from` to `to`.
    pub fn move_within(&mut self, column: Column, from: usize, to: usize) -> bool {
        let list = self.column_mut(column);
        if from >= list.len() || to >= list.len() || from == to {
            return false;
        }
        *list = move_item(list, from, to);
        true
    }

    /// Moves `tool` into `column` at `index` (clamped to the column length).
    ///
    /// Works within the same column as well. Returns `false` if the tool is not
    /// placed or the target column is not active.
    pub fn move_to_column(&mut self, tool: ToolKind, column: Column, index: usize) -> bool {
        if !self.active_columns().contains(&column) {
            return false;
        }
        let Some((source, from)) = self.position_of(tool) else {
            return false;
        };
        if source == column {
            let last = self.column(column).len().saturating_sub(1);
            return self.move_within(column, from, index.min(last));
        }
        self.column_mut(source).remove(from);
        let target = self.column_mut(column);
        let index = index.min(target.len());
        target.insert(index, tool);
        true
    }

    /// Sets the scale, clamped to [`MIN_SCALE`]..=[`MAX_SCALE`].
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = if scale.is_finite() {
            scale.clamp(MIN_SCALE, MAX_SCALE)
        } else {
            default_scale()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ToolKind::{Comments, DocView, MainForm, Management, Signatures};

    #[test]
    fn test_default_for_seeds_stack() {
        let layout = StageLayout::default_for(&[MainForm, Comments]);
        assert_eq!(layout.mode, LayoutMode::Stacked);
        assert_eq!(layout.order_stack, vec![MainForm, Comments]);
        assert!(layout.order_left.is_empty());
        assert!(layout.order_right.is_empty());
    }

    #[test]
    fn test_stacked_to_split_moves_everything_left() {
        let mut layout = StageLayout::default_for(&[MainForm, Comments, DocView]);
        assert!(layout.set_mode(LayoutMode::Split50));
        assert_eq!(layout.order_left, vec![MainForm, Comments, DocView]);
        assert!(layout.order_right.is_empty());
        assert!(layout.order_stack.is_empty());
    }

    #[test]
    fn test_split_to_stacked_concatenates() {
        let mut layout = StageLayout::default_for(&[MainForm, Comments, DocView]);
        layout.set_mode(LayoutMode::Split60);
        assert!(layout.move_to_column(DocView, Column::Right, 0));
        layout.set_mode(LayoutMode::Stacked);
        assert_eq!(layout.order_stack, vec![MainForm, Comments, DocView]);
        assert_eq!(layout.flattened(), vec![MainForm, Comments, DocView]);
        // The split is remembered but not active
        assert_eq!(layout.order_left, vec![MainForm, Comments]);
        assert_eq!(layout.order_right, vec![DocView]);
        assert_eq!(layout.position_of(DocView), Some((Column::Stack, 2)));
    }

    #[test]
    fn test_stacked_to_split_restores_remembered_split() {
        let mut layout = StageLayout::default_for(&[MainForm, Comments, DocView]);
        layout.set_mode(LayoutMode::Split50);
        layout.move_to_column(DocView, Column::Right, 0);
        layout.set_mode(LayoutMode::Stacked);

        layout.reconcile(&[MainForm, DocView, Signatures]);
        assert_eq!(layout.order_stack, vec![MainForm, DocView, Signatures]);
        assert_eq!(layout.order_left, vec![MainForm]);

        assert!(layout.set_mode(LayoutMode::Split40));
        assert_eq!(layout.order_left, vec![MainForm, Signatures]);
        assert_eq!(layout.order_right, vec![DocView]);
        assert!(layout.order_stack.is_empty());
    }

    #[test]
    fn test_remembered_split_survives_json() {
        let mut layout = StageLayout::default_for(&[MainForm, Comments, DocView]);
        layout.set_mode(LayoutMode::Split60);
        layout.move_to_column(DocView, Column::Right, 0);
        layout.set_mode(LayoutMode::Stacked);

        let json = serde_json::to_string(&layout).unwrap();
        let mut restored: StageLayout = serde_json::from_str(&json).unwrap();
        assert!(!restored.reconcile(&[MainForm, Comments, DocView]));
        restored.set_mode(LayoutMode::Split60);
        assert_eq!(restored.order_left, vec![MainForm, Comments]);
        assert_eq!(restored.order_right, vec![DocView]);
    }

    #[test]
    fn test_mode_round_trip_preserves_tool_set() {
        let tools = [Management, MainForm, Comments, Signatures, DocView];
        let mut layout = StageLayout::default_for(&tools);
        layout.set_mode(LayoutMode::Split50);
        layout.move_to_column(Comments, Column::Right, 0);
        layout.move_to_column(Management, Column::Right, 5);
        layout.set_mode(LayoutMode::Stacked);

        let mut placed = layout.flattened();
        placed.sort();
        let mut expected = tools.to_vec();
        expected.sort();
        assert_eq!(placed, expected);
    }

    #[test]
    fn test_split_to_split_keeps_columns() {
        let mut layout = StageLayout::default_for(&[MainForm, Comments]);
        layout.set_mode(LayoutMode::Split50);
        layout.move_to_column(Comments, Column::Right, 0);
        layout.set_mode(LayoutMode::Split40);
        assert_eq!(layout.order_left, vec![MainForm]);
        assert_eq!(layout.order_right, vec![Comments]);
    }

    #[test]
    fn test_set_same_mode_is_noop() {
        let mut layout = StageLayout::default_for(&[MainForm]);
        assert!(!layout.set_mode(LayoutMode::Stacked));
    }

    #[test]
    fn test_reconcile_purges_and_appends() {
        let mut layout = StageLayout::default_for(&[MainForm, Comments]);
        assert!(layout.reconcile(&[MainForm, DocView]));
        assert_eq!(layout.order_stack, vec![MainForm, DocView]);
        assert!(!layout.reconcile(&[MainForm, DocView]));
    }

    #[test]
    fn test_reconcile_stacked_fills_stack_from_remembered_split() {
        let mut layout = StageLayout {
            order_left: vec![Comments, Management],
            order_right: vec![DocView, Comments],
            order_stack: vec![MainForm],
            ..StageLayout::default()
        };
        layout.reconcile(&[MainForm, Comments, DocView]);
        assert_eq!(layout.order_stack, vec![MainForm, Comments, DocView]);
        assert_eq!(layout.order_left, vec![Comments]);
        assert_eq!(layout.order_right, vec![DocView]);
    }

    #[test]
    fn test_reconcile_split_absorbs_stray_stack() {
        let mut layout = StageLayout {
            mode: LayoutMode::Split50,
            order_left: vec![MainForm],
            order_right: vec![Comments],
            order_stack: vec![DocView, Comments],
            ..StageLayout::default()
        };
        layout.reconcile(&[MainForm, Comments, DocView]);
        assert_eq!(layout.order_left, vec![MainForm, DocView]);
        assert_eq!(layout.order_right, vec![Comments]);
        assert!(layout.order_stack.is_empty());
    }

    #[test]
    fn test_remove_and_insert_tool_touch_exactly_one_list() {
        let mut layout = StageLayout::default_for(&[MainForm, Comments]);
        layout.set_mode(LayoutMode::Split50);
        layout.move_to_column(Comments, Column::Right, 0);

        assert!(layout.remove_tool(Comments));
        assert!(!layout.flattened().contains(&Comments));

        assert!(layout.insert_tool(Comments));
        assert!(!layout.insert_tool(Comments));
        let holders = [&layout.order_left, &layout.order_right, &layout.order_stack]
            .iter()
            .filter(|list| list.contains(&Comments))
            .count();
        assert_eq!(holders, 1);
    }

    #[test]
    fn test_move_to_inactive_column_rejected() {
        let mut layout = StageLayout::default_for(&[MainForm, Comments]);
        assert!(!layout.move_to_column(Comments, Column::Right, 0));
    }

    #[test]
    fn test_scale_clamped() {
        let mut layout = StageLayout::default();
        layout.set_scale(3.0);
        assert!((layout.scale - MAX_SCALE).abs() < f32::EPSILON);
        layout.set_scale(0.1);
        assert!((layout.scale - MIN_SCALE).abs() < f32::EPSILON);
        layout.set_scale(f32::NAN);
        assert!((layout.scale - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_json_round_trip() {
        for mode in LayoutMode::all() {
            for density in [Density::Cozy, Density::Compact] {
                let mut layout = StageLayout::default_for(&[MainForm, Comments, DocView]);
                layout.set_mode(*mode);
                layout.density = density;
                layout.show_guides = true;
                layout.set_scale(1.25);
                if mode.is_split() {
                    layout.move_to_column(DocView, Column::Right, 0);
                }

                let json = serde_json::to_string(&layout).unwrap();
                let restored: StageLayout = serde_json::from_str(&json).unwrap();
                assert_eq!(restored, layout);
            }
        }
    }

    #[test]
    fn test_json_field_names() {
        let layout = StageLayout::default_for(&[MainForm]);
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["mode"], "stacked");
        assert_eq!(json["orderStack"], serde_json::json!(["main_form"]));
        assert_eq!(json["showGuides"], false);
    }
}
