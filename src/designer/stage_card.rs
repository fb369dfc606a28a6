//! Stage card designer: layout mode switching and drag-and-drop placement.
//!
//! The designer owns a draft [`StageLayout`]. Drag-and-drop follows a
//! start/over/end protocol: `drag_start` records the active tool, `drag_over`
//! only records the hover target for preview, and `drag_end` commits the move.

use tracing::debug;

use crate::models::{Column, Density, LayoutMode, StageLayout, StageStatus, ToolKind};

/// Where a dragged tool can be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Onto another placed tool (takes its position)
    Tool(ToolKind),
    /// Onto a column's placeholder (appends to it)
    EmptyColumn(Column),
}

/// In-progress drag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragState {
    /// Tool being dragged
    pub active: Option<ToolKind>,
    /// Current hover target
    pub over: Option<DropTarget>,
}

/// Direction for moving a tool between columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Towards the left column
    Left,
    /// Towards the right column
    Right,
}

/// Layout draft plus drag state for one stage card.
#[derive(Debug, Clone, PartialEq)]
pub struct StageCardDesigner {
    layout: StageLayout,
    drag: DragState,
}

impl StageCardDesigner {
    /// Wraps a layout.
    #[must_use]
    pub fn new(layout: StageLayout) -> Self {
        Self {
            layout,
            drag: DragState::default(),
        }
    }

    /// Current layout draft.
    #[must_use]
    pub const fn layout(&self) -> &StageLayout {
        &self.layout
    }

    /// Current drag state.
    #[must_use]
    pub const fn drag(&self) -> &DragState {
        &self.drag
    }

    /// Switches the column arrangement and drops any drag in progress.
    ///
    /// Going back to a split mode restores the split stored in the layout.
    pub fn set_mode(&mut self, mode: LayoutMode) -> bool {
        let from = self.layout.mode;
        if !self.layout.set_mode(mode) {
            return false;
        }
        self.drag = DragState::default();
        debug!(from = %from, to = %mode, "layout mode changed");
        true
    }

    /// Advances to the next layout mode.
    pub fn cycle_mode(&mut self) -> LayoutMode {
        let next = self.layout.mode.cycle();
        self.set_mode(next);
        next
    }

    /// Sets the density.
    pub fn set_density(&mut self, density: Density) -> bool {
        let changed = self.layout.density != density;
        self.layout.density = density;
        changed
    }

    /// Toggles column guides.
    pub fn toggle_guides(&mut self) -> bool {
        self.layout.show_guides = !self.layout.show_guides;
        self.layout.show_guides
    }

    /// Sets the preview scale (clamped). Returns whether it changed.
    pub fn set_scale(&mut self, scale: f32) -> bool {
        let before = self.layout.scale;
        self.layout.set_scale(scale);
        (self.layout.scale - before).abs() > f32::EPSILON
    }

    /// Aligns the layout with the enabled tools.
    pub fn reconcile(&mut self, tools: &[ToolKind]) -> bool {
        if let Some(active) = self.drag.active {
            if !tools.contains(&active) {
                self.drag = DragState::default();
            }
        }
        self.layout.reconcile(tools)
    }

    /// Removes a tool from every column.
    pub fn remove_tool(&mut self, tool: ToolKind) -> bool {
        if self.drag.active == Some(tool) {
            self.drag = DragState::default();
        }
        self.layout.remove_tool(tool)
    }

    /// Starts dragging a placed tool.
    pub fn drag_start(&mut self, tool: ToolKind) -> bool {
        if self.layout.position_of(tool).is_none() {
            return false;
        }
        self.drag = DragState {
            active: Some(tool),
            over: None,
        };
        true
    }

    /// Records the hover target. Never changes the layout.
    pub fn drag_over(&mut self, target: Option<DropTarget>) {
        if self.drag.active.is_some() {
            self.drag.over = target;
        }
    }

    /// Abandons the drag.
    pub fn drag_cancel(&mut self) {
        self.drag = DragState::default();
    }

    /// Ends the drag, dropping onto `target`. Returns whether the layout changed.
    ///
    /// Dropping onto a tool of the same column splices only that column;
    /// dropping onto a tool of another column or onto a column placeholder
    /// moves the tool there. Dropping onto itself, with no target, or with no
    /// active drag changes nothing.
    pub fn drag_end(&mut self, target: Option<DropTarget>) -> bool {
        let Some(active) = self.drag.active else {
            return false;
        };
        self.drag = DragState::default();

        let changed = match target {
            None => false,
            Some(DropTarget::Tool(over)) if over == active => false,
            Some(DropTarget::Tool(over)) => match self.layout.position_of(over) {
                Some((column, index)) => self.layout.move_to_column(active, column, index),
                None => false,
            },
            Some(DropTarget::EmptyColumn(column)) => {
                let end = self.layout.column(column).len();
                self.layout.move_to_column(active, column, end)
            }
        };
        if changed {
            debug!(tool = %active, "tool dropped");
        }
        changed
    }

    /// Moves a tool one slot up within its column.
    pub fn move_up(&mut self, tool: ToolKind) -> bool {
        match self.layout.position_of(tool) {
            Some((column, index)) if index > 0 => {
                self.layout.move_within(column, index, index - 1)
            }
            _ => false,
        }
    }

    /// Moves a tool one slot down within its column.
    pub fn move_down(&mut self, tool: ToolKind) -> bool {
        match self.layout.position_of(tool) {
            Some((column, index)) => self.layout.move_within(column, index, index + 1),
            None => false,
        }
    }

    /// Moves a tool to the neighbouring column, keeping its row where possible.
    pub fn move_across(&mut self, tool: ToolKind, side: Side) -> bool {
        let Some((column, index)) = self.layout.position_of(tool) else {
            return false;
        };
        let target = match (column, side) {
            (Column::Right, Side::Left) => Column::Left,
            (Column::Left, Side::Right) => Column::Right,
            _ => return false,
        };
        self.layout.move_to_column(tool, target, index)
    }

    /// Consumes the designer, returning the layout draft.
    #[must_use]
    pub fn into_layout(self) -> StageLayout {
        self.layout
    }
}

/// Accent of a status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAccent {
    /// Done
    Emerald,
    /// In progress
    Indigo,
    /// Pending
    Neutral,
}

/// How a stage status is drawn on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusVisual {
    /// Border accent
    pub accent: StatusAccent,
    /// Indicator glyph
    pub glyph: &'static str,
    /// Whether the indicator pulses
    pub pulsing: bool,
}

/// Visual treatment of a stage status.
#[must_use]
pub const fn status_visual(status: StageStatus) -> StatusVisual {
    match status {
        StageStatus::Done => StatusVisual {
            accent: StatusAccent::Emerald,
            glyph: "✓",
            pulsing: false,
        },
        StageStatus::InProgress => StatusVisual {
            accent: StatusAccent::Indigo,
            glyph: "●",
            pulsing: true,
        },
        StageStatus::Pending => StatusVisual {
            accent: StatusAccent::Neutral,
            glyph: "◷",
            pulsing: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ToolKind::{Comments, DocView, MainForm, Signatures};

    fn designer(tools: &[ToolKind]) -> StageCardDesigner {
        StageCardDesigner::new(StageLayout::default_for(tools))
    }

    #[test]
    fn test_drop_on_same_column_splices() {
        let mut d = designer(&[MainForm, Comments, DocView]);
        assert!(d.drag_start(DocView));
        d.drag_over(Some(DropTarget::Tool(MainForm)));
        // Hovering does not move anything
        assert_eq!(d.layout().order_stack, vec![MainForm, Comments, DocView]);
        assert!(d.drag_end(Some(DropTarget::Tool(MainForm))));
        assert_eq!(d.layout().order_stack, vec![DocView, MainForm, Comments]);
        assert_eq!(d.drag(), &DragState::default());
    }

    #[test]
    fn test_drop_on_other_column_moves() {
        let mut d = designer(&[MainForm, Comments, DocView]);
        d.set_mode(LayoutMode::Split50);
        d.drag_start(DocView);
        assert!(d.drag_end(Some(DropTarget::EmptyColumn(Column::Right))));
        assert_eq!(d.layout().order_right, vec![DocView]);

        d.drag_start(MainForm);
        assert!(d.drag_end(Some(DropTarget::Tool(DocView))));
        assert_eq!(d.layout().order_left, vec![Comments]);
        assert_eq!(d.layout().order_right, vec![MainForm, DocView]);
    }

    #[test]
    fn test_noop_drops() {
        let mut d = designer(&[MainForm, Comments]);
        assert!(!d.drag_end(Some(DropTarget::Tool(Comments))));
        d.drag_start(Comments);
        assert!(!d.drag_end(Some(DropTarget::Tool(Comments))));
        d.drag_start(Comments);
        assert!(!d.drag_end(None));
        assert!(!d.drag_start(Signatures));
        assert_eq!(d.layout().order_stack, vec![MainForm, Comments]);
    }

    #[test]
    fn test_split_columns_remembered_across_stacked() {
        let mut d = designer(&[MainForm, Comments, DocView]);
        d.set_mode(LayoutMode::Split60);
        d.move_across(DocView, Side::Right);
        d.set_mode(LayoutMode::Stacked);
        assert_eq!(d.layout().order_stack, vec![MainForm, Comments, DocView]);

        d.reconcile(&[MainForm, Comments, DocView, Signatures]);
        d.set_mode(LayoutMode::Split50);
        assert_eq!(d.layout().order_left, vec![MainForm, Comments, Signatures]);
        assert_eq!(d.layout().order_right, vec![DocView]);
    }

    #[test]
    fn test_fresh_designer_restores_stored_split() {
        let mut d = designer(&[MainForm, Comments, DocView]);
        d.set_mode(LayoutMode::Split50);
        d.move_across(DocView, Side::Right);
        d.set_mode(LayoutMode::Stacked);

        let mut reopened = StageCardDesigner::new(d.into_layout());
        assert!(reopened.set_mode(LayoutMode::Split60));
        assert_eq!(reopened.layout().order_left, vec![MainForm, Comments]);
        assert_eq!(reopened.layout().order_right, vec![DocView]);
    }

    #[test]
    fn test_keyboard_moves() {
        let mut d = designer(&[MainForm, Comments]);
        assert!(d.move_down(MainForm));
        assert!(!d.move_down(MainForm));
        assert!(d.move_up(MainForm));
        assert!(!d.move_across(MainForm, Side::Right));

        d.set_mode(LayoutMode::Split40);
        assert!(d.move_across(Comments, Side::Right));
        assert!(!d.move_across(Comments, Side::Right));
        assert!(d.move_across(Comments, Side::Left));
        assert_eq!(d.layout().order_left, vec![Comments, MainForm]);
    }

    #[test]
    fn test_cycle_mode_visits_all() {
        let mut d = designer(&[MainForm]);
        let modes: Vec<LayoutMode> = (0..4).map(|_| d.cycle_mode()).collect();
        assert_eq!(
            modes,
            vec![
                LayoutMode::Split50,
                LayoutMode::Split60,
                LayoutMode::Split40,
                LayoutMode::Stacked
            ]
        );
        assert_eq!(d.layout().order_stack, vec![MainForm]);
    }

    #[test]
    fn test_disable_cancels_drag_of_removed_tool() {
        let mut d = designer(&[MainForm, Comments]);
        d.drag_start(Comments);
        d.reconcile(&[MainForm]);
        assert_eq!(d.drag().active, None);
        assert!(!d.remove_tool(Comments));
    }

    #[test]
    fn test_status_visuals() {
        assert_eq!(status_visual(StageStatus::Done).accent, StatusAccent::Emerald);
        assert!(status_visual(StageStatus::InProgress).pulsing);
        assert_eq!(status_visual(StageStatus::Pending).glyph, "◷");
    }
}
