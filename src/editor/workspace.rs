//! Stage edit workspace.
//!
//! Opens a stage as a draft next to its layout draft. Every action mutates the
//! drafts and raises `has_changes`; `save` commits both, `revert` goes back to
//! the snapshot taken at open (or at the last save).

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::designer::{DropTarget, Side, StageCardDesigner};
use crate::editor::CloseDecision;
use crate::models::{
    Column, LayoutMode, ModelStage, StageLayout, StagePatch, ToolConfig, ToolKind,
};
use crate::services::{LayoutRepository, StageRepository, ToolDependencies};

/// Scale change per zoom step.
pub const SCALE_STEP: f32 = 0.1;

/// Draft editing session for one stage.
#[derive(Debug, Clone)]
pub struct StageWorkspace {
    snapshot: ModelStage,
    layout_snapshot: StageLayout,
    draft: ModelStage,
    designer: StageCardDesigner,
    dependencies: ToolDependencies,
    has_changes: bool,
}

impl StageWorkspace {
    /// Opens `stage` with its persisted layout reconciled against its tools.
    #[must_use]
    pub fn open(
        stage: &ModelStage,
        layouts: &LayoutRepository,
        dependencies: ToolDependencies,
    ) -> Self {
        let layout = layouts.load(stage);
        debug!(stage_id = %stage.id, mode = %layout.mode, "workspace opened");
        Self {
            snapshot: stage.clone(),
            layout_snapshot: layout.clone(),
            draft: stage.clone(),
            designer: StageCardDesigner::new(layout),
            dependencies,
            has_changes: false,
        }
    }

    /// Draft stage.
    #[must_use]
    pub const fn stage(&self) -> &ModelStage {
        &self.draft
    }

    /// Draft layout.
    #[must_use]
    pub const fn layout(&self) -> &StageLayout {
        self.designer.layout()
    }

    /// Layout designer (drag state, status visuals).
    #[must_use]
    pub const fn designer(&self) -> &StageCardDesigner {
        &self.designer
    }

    /// Dependency rules in force.
    #[must_use]
    pub const fn dependencies(&self) -> &ToolDependencies {
        &self.dependencies
    }

    /// Whether the drafts differ from the last commit.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.has_changes
    }

    fn touch(&mut self, changed: bool) -> bool {
        self.has_changes |= changed;
        changed
    }

    /// Enables `tool` plus everything it requires.
    ///
    /// Returns every tool that became enabled, `tool` first.
    pub fn enable_tool(&mut self, tool: ToolKind) -> Vec<ToolKind> {
        let affected: Vec<ToolKind> = self
            .dependencies
            .closure_for_enable(tool)
            .into_iter()
            .filter(|kind| self.draft.enable_tool(*kind))
            .collect();
        self.designer.reconcile(&self.draft.tools_order);
        self.touch(!affected.is_empty());
        affected
    }

    /// Disables `tool` plus everything that requires it.
    ///
    /// Returns every tool that became disabled, `tool` first. Payloads are
    /// kept so re-enabling restores them.
    pub fn disable_tool(&mut self, tool: ToolKind) -> Vec<ToolKind> {
        let affected: Vec<ToolKind> = self
            .dependencies
            .closure_for_disable(tool)
            .into_iter()
            .filter(|kind| self.draft.disable_tool(*kind))
            .collect();
        for kind in &affected {
            self.designer.remove_tool(*kind);
        }
        self.designer.reconcile(&self.draft.tools_order);
        self.touch(!affected.is_empty());
        affected
    }

    /// Enables or disables `tool` depending on its current state.
    pub fn toggle_tool(&mut self, tool: ToolKind) -> Vec<ToolKind> {
        if self.draft.has_tool(tool) {
            self.disable_tool(tool)
        } else {
            self.enable_tool(tool)
        }
    }

    /// Applies scalar field edits.
    pub fn apply_patch(&mut self, patch: &StagePatch) -> bool {
        let changed = self.draft.apply_patch(patch);
        self.touch(changed)
    }

    /// Edits tool configuration payloads.
    pub fn update_tool_config<R>(&mut self, edit: impl FnOnce(&mut ToolConfig) -> R) -> R {
        let before = self.draft.tool_config.clone();
        let out = edit(&mut self.draft.tool_config);
        let changed = self.draft.tool_config != before;
        self.touch(changed);
        out
    }

    /// Gives an operation (e.g. an optimistic insert) mutable access to the draft.
    ///
    /// The layout is re-aligned with the tool set afterwards.
    pub fn update_stage<R>(&mut self, edit: impl FnOnce(&mut ModelStage) -> R) -> R {
        let before = self.draft.clone();
        let out = edit(&mut self.draft);
        self.draft.normalize_tools();
        self.designer.reconcile(&self.draft.tools_order);
        let changed = self.draft != before;
        self.touch(changed);
        out
    }

    /// Switches the layout mode.
    pub fn set_mode(&mut self, mode: LayoutMode) -> bool {
        let changed = self.designer.set_mode(mode);
        self.touch(changed)
    }

    /// Advances to the next layout mode.
    pub fn cycle_mode(&mut self) -> LayoutMode {
        let mode = self.designer.cycle_mode();
        self.touch(true);
        mode
    }

    /// Toggles cozy/compact density.
    pub fn toggle_density(&mut self) {
        let next = self.layout().density.toggle();
        let changed = self.designer.set_density(next);
        self.touch(changed);
    }

    /// Toggles column guides.
    pub fn toggle_guides(&mut self) -> bool {
        let shown = self.designer.toggle_guides();
        self.touch(true);
        shown
    }

    /// Sets the preview scale (clamped).
    pub fn set_scale(&mut self, scale: f32) -> bool {
        let changed = self.designer.set_scale(scale);
        self.touch(changed)
    }

    /// Grows the preview by one step.
    pub fn zoom_in(&mut self) -> bool {
        self.set_scale(self.layout().scale + SCALE_STEP)
    }

    /// Shrinks the preview by one step.
    pub fn zoom_out(&mut self) -> bool {
        self.set_scale(self.layout().scale - SCALE_STEP)
    }

    /// Moves a tool one slot up in its column.
    pub fn move_tool_up(&mut self, tool: ToolKind) -> bool {
        let changed = self.designer.move_up(tool);
        self.touch(changed)
    }

    /// Moves a tool one slot down in its column.
    pub fn move_tool_down(&mut self, tool: ToolKind) -> bool {
        let changed = self.designer.move_down(tool);
        self.touch(changed)
    }

    /// Moves a tool to the neighbouring column.
    pub fn move_tool_across(&mut self, tool: ToolKind, side: Side) -> bool {
        let changed = self.designer.move_across(tool, side);
        self.touch(changed)
    }

    /// Starts a drag.
    pub fn drag_start(&mut self, tool: ToolKind) -> bool {
        self.designer.drag_start(tool)
    }

    /// Updates the drag hover target.
    pub fn drag_over(&mut self, target: Option<DropTarget>) {
        self.designer.drag_over(target);
    }

    /// Ends a drag.
    pub fn drag_end(&mut self, target: Option<DropTarget>) -> bool {
        let changed = self.designer.drag_end(target);
        self.touch(changed)
    }

    /// Tools placed in a column of the draft layout.
    #[must_use]
    pub fn column(&self, column: Column) -> &[ToolKind] {
        self.layout().column(column)
    }

    /// Restores the snapshot, discarding every draft change.
    pub fn revert(&mut self) {
        self.draft = self.snapshot.clone();
        self.designer = StageCardDesigner::new(self.layout_snapshot.clone());
        self.has_changes = false;
        debug!(stage_id = %self.draft.id, "workspace reverted");
    }

    /// Commits the drafts and takes a new snapshot.
    pub fn save(
        &mut self,
        stages: &mut dyn StageRepository,
        layouts: &mut LayoutRepository,
    ) -> Result<()> {
        stages
            .commit_stage(&self.draft)
            .with_context(|| format!("Failed to save stage '{}'", self.draft.id))?;
        layouts.save(&self.draft.id, self.designer.layout())?;

        self.snapshot = self.draft.clone();
        self.layout_snapshot = self.designer.layout().clone();
        self.has_changes = false;
        info!(stage_id = %self.draft.id, "stage saved");
        Ok(())
    }

    /// Whether closing now would lose work.
    #[must_use]
    pub const fn request_close(&self) -> CloseDecision {
        if self.has_changes {
            CloseDecision::ConfirmDiscard
        } else {
            CloseDecision::Close
        }
    }
}
