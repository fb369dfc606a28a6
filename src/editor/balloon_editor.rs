//! Transactional balloon editor.
//!
//! The editor clones one catalog into a draft on open. Every operation acts on
//! the draft; [`BalloonEditor::save`] writes the draft back in a single
//! `replace_catalog` call and [`BalloonEditor::discard`] throws it away.

use tracing::debug;

use crate::editor::{CloseDecision, EditError};
use crate::models::{
    duplicate_label, validate_label, BalloonArea, BalloonColor, BalloonIcon, BalloonItem,
    LabelError,
};
use crate::services::reorder::{move_item, ListDrag};
use crate::services::{BalloonStore, CatalogChangeSet, CatalogError};

/// What the editor is doing right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    /// Browsing the draft list
    Browsing,
    /// Typing the label of a new balloon
    Adding {
        /// Label typed so far
        input: String,
    },
    /// Editing a label in place
    Renaming {
        /// Balloon being renamed
        id: String,
        /// Label typed so far
        input: String,
    },
    /// Waiting for confirmation before removing a balloon from the draft
    ConfirmingRemove {
        /// Balloon to remove
        id: String,
    },
    /// Moving a balloon with the keyboard
    Dragging,
}

/// Draft session over one catalog.
#[derive(Debug, Clone)]
pub struct BalloonEditor {
    stage_id: String,
    area: BalloonArea,
    original: Vec<BalloonItem>,
    draft: Vec<BalloonItem>,
    selected: usize,
    mode: EditorMode,
    drag: ListDrag,
    error: Option<LabelError>,
}

impl BalloonEditor {
    /// Opens the catalog `(stage_id, area)` of `store`.
    pub fn open(
        store: &BalloonStore,
        stage_id: &str,
        area: BalloonArea,
    ) -> Result<Self, CatalogError> {
        let items = store.catalog(stage_id, area)?.to_vec();
        Ok(Self {
            stage_id: stage_id.to_string(),
            area,
            original: items.clone(),
            draft: items,
            selected: 0,
            mode: EditorMode::Browsing,
            drag: ListDrag::new(),
            error: None,
        })
    }

    /// Stage whose catalog is edited.
    #[must_use]
    pub fn stage_id(&self) -> &str {
        &self.stage_id
    }

    /// Catalog area.
    #[must_use]
    pub const fn area(&self) -> BalloonArea {
        self.area
    }

    /// Draft balloons in display order.
    #[must_use]
    pub fn items(&self) -> &[BalloonItem] {
        &self.draft
    }

    /// Selected row.
    #[must_use]
    pub const fn selected(&self) -> usize {
        self.selected
    }

    /// The selected balloon.
    #[must_use]
    pub fn selected_item(&self) -> Option<&BalloonItem> {
        self.draft.get(self.selected)
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> &EditorMode {
        &self.mode
    }

    /// Inline validation message from the last failed add or rename.
    #[must_use]
    pub const fn error(&self) -> Option<&LabelError> {
        self.error.as_ref()
    }

    /// Whether the draft differs from the catalog as opened.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.draft != self.original
    }

    /// Index a drag would drop at, when dragging.
    #[must_use]
    pub fn drag_hover(&self) -> Option<usize> {
        self.drag.hover()
    }

    /// Selects the previous row, wrapping around.
    pub fn select_previous(&mut self) {
        let len = self.draft.len();
        if len > 0 {
            self.selected = if self.selected > 0 {
                self.selected - 1
            } else {
                len - 1
            };
        }
    }

    /// Selects the next row, wrapping around.
    pub fn select_next(&mut self) {
        let len = self.draft.len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.draft.iter().position(|item| item.id == id)
    }

    fn clamp_selection(&mut self) {
        if self.selected >= self.draft.len() {
            self.selected = self.draft.len().saturating_sub(1);
        }
    }

    /// Appends a balloon to the draft and selects it.
    ///
    /// A rejected label is kept as the inline error; the editor stays open.
    pub fn add(
        &mut self,
        label: &str,
        icon: Option<BalloonIcon>,
        color: Option<BalloonColor>,
    ) -> Result<String, LabelError> {
        let label = validate_label(label, &self.draft, None).inspect_err(|err| {
            self.error = Some(err.clone());
        })?;
        let item = BalloonItem::new(label)
            .with_icon(icon)
            .with_color(color.unwrap_or_default());
        let id = item.id.clone();
        self.draft.push(item);
        self.selected = self.draft.len() - 1;
        self.error = None;
        Ok(id)
    }

    /// Renames a draft balloon.
    ///
    /// On failure the balloon keeps its label and a rejected label stays
    /// inline. Either way the inline edit ends. An id missing from the draft
    /// is reported as [`CatalogError::ItemNotFound`].
    pub fn rename(&mut self, id: &str, label: &str) -> Result<(), EditError> {
        if matches!(self.mode, EditorMode::Renaming { .. }) {
            self.mode = EditorMode::Browsing;
        }
        let Some(index) = self.position(id) else {
            return Err(CatalogError::ItemNotFound(id.to_string()).into());
        };
        let label = validate_label(label, &self.draft, Some(id)).inspect_err(|err| {
            self.error = Some(err.clone());
        })?;
        self.draft[index].label = label;
        self.error = None;
        Ok(())
    }

    /// Asks for confirmation before removing `id`.
    pub fn request_remove(&mut self, id: &str) -> bool {
        if self.position(id).is_none() {
            return false;
        }
        self.mode = EditorMode::ConfirmingRemove { id: id.to_string() };
        true
    }

    /// Removes the balloon awaiting confirmation.
    pub fn confirm_remove(&mut self) -> Option<BalloonItem> {
        let EditorMode::ConfirmingRemove { id } = &self.mode else {
            return None;
        };
        let id = id.clone();
        self.mode = EditorMode::Browsing;
        let index = self.position(&id)?;
        let removed = self.draft.remove(index);
        self.clamp_selection();
        Some(removed)
    }

    /// Keeps the balloon awaiting confirmation.
    pub fn cancel_remove(&mut self) {
        if matches!(self.mode, EditorMode::ConfirmingRemove { .. }) {
            self.mode = EditorMode::Browsing;
        }
    }

    /// Inserts a copy of `id` right after it, with a unique label.
    pub fn duplicate(&mut self, id: &str) -> Option<String> {
        let index = self.position(id)?;
        let source = &self.draft[index];
        let mut copy = source.clone();
        copy.id = BalloonItem::generate_id();
        copy.label = duplicate_label(&source.label, &self.draft);
        let new_id = copy.id.clone();
        self.draft.insert(index + 1, copy);
        self.selected = index + 1;
        Some(new_id)
    }

    /// Sets or clears the icon of a draft balloon.
    pub fn set_icon(&mut self, id: &str, icon: Option<BalloonIcon>) -> bool {
        match self.position(id) {
            Some(index) => {
                self.draft[index].icon = icon;
                true
            }
            None => false,
        }
    }

    /// Sets the color of a draft balloon.
    pub fn set_color(&mut self, id: &str, color: BalloonColor) -> bool {
        match self.position(id) {
            Some(index) => {
                self.draft[index].color = color;
                true
            }
            None => false,
        }
    }

    /// Cycles the selected balloon's icon.
    pub fn cycle_selected_icon(&mut self) {
        if let Some(item) = self.draft.get_mut(self.selected) {
            item.icon = BalloonIcon::cycle(item.icon);
        }
    }

    /// Cycles the selected balloon's color.
    pub fn cycle_selected_color(&mut self) {
        if let Some(item) = self.draft.get_mut(self.selected) {
            item.color = item.color.cycle();
        }
    }

    /// Starts typing a new label.
    pub fn begin_add(&mut self) {
        self.mode = EditorMode::Adding {
            input: String::new(),
        };
    }

    /// Starts renaming the selected balloon in place.
    pub fn begin_rename(&mut self) {
        if let Some(item) = self.selected_item() {
            self.mode = EditorMode::Renaming {
                id: item.id.clone(),
                input: item.label.clone(),
            };
        }
    }

    /// Text being typed, if any.
    pub fn input_mut(&mut self) -> Option<&mut String> {
        match &mut self.mode {
            EditorMode::Adding { input } | EditorMode::Renaming { input, .. } => Some(input),
            _ => None,
        }
    }

    /// Confirms the add form or the inline rename.
    ///
    /// A rejected add keeps the form open; a rename always returns to browsing.
    pub fn submit_input(&mut self) -> Result<(), EditError> {
        match self.mode.clone() {
            EditorMode::Adding { input } => {
                self.add(&input, None, None)?;
                self.mode = EditorMode::Browsing;
                Ok(())
            }
            EditorMode::Renaming { id, input } => self.rename(&id, &input),
            _ => Ok(()),
        }
    }

    /// Leaves the add form or inline rename without applying it.
    pub fn cancel_input(&mut self) {
        if matches!(self.mode, EditorMode::Adding { .. } | EditorMode::Renaming { .. }) {
            self.mode = EditorMode::Browsing;
            self.error = None;
        }
    }

    /// Picks up the selected balloon.
    pub fn grab(&mut self) -> bool {
        if self.draft.is_empty() {
            return false;
        }
        self.drag.grab(self.selected);
        self.mode = EditorMode::Dragging;
        true
    }

    /// Moves the dragged balloon's target one row up.
    pub fn drag_up(&mut self) {
        self.drag.step_up();
        if let Some(hover) = self.drag.hover() {
            self.selected = hover;
        }
    }

    /// Moves the dragged balloon's target one row down.
    pub fn drag_down(&mut self) {
        self.drag.step_down(self.draft.len());
        if let Some(hover) = self.drag.hover() {
            self.selected = hover;
        }
    }

    /// Drops the dragged balloon at the hover row. Returns whether the order changed.
    pub fn drop_dragged(&mut self) -> bool {
        self.mode = EditorMode::Browsing;
        match self.drag.release() {
            Some((from, to)) => {
                self.draft = move_item(&self.draft, from, to);
                self.selected = to;
                true
            }
            None => false,
        }
    }

    /// Puts the dragged balloon back.
    pub fn cancel_drag(&mut self) {
        if let Some(source) = self.drag.source() {
            self.selected = source;
        }
        self.drag.cancel();
        self.mode = EditorMode::Browsing;
    }

    /// Commits the draft to `store` in one step.
    pub fn save(&mut self, store: &mut BalloonStore) -> Result<CatalogChangeSet, CatalogError> {
        let changes = CatalogChangeSet::diff(&self.original, &self.draft);
        store.replace_catalog(&self.stage_id, self.area, self.draft.clone())?;
        self.original = self.draft.clone();
        debug!(
            stage_id = %self.stage_id,
            area = %self.area,
            added = changes.added.len(),
            removed = changes.removed.len(),
            "balloon editor saved"
        );
        Ok(changes)
    }

    /// Throws the draft away.
    pub fn discard(&mut self) {
        self.draft = self.original.clone();
        self.mode = EditorMode::Browsing;
        self.drag.cancel();
        self.error = None;
        self.clamp_selection();
    }

    /// Whether closing now would lose work.
    #[must_use]
    pub fn request_close(&self) -> CloseDecision {
        if self.is_dirty() {
            CloseDecision::ConfirmDiscard
        } else {
            CloseDecision::Close
        }
    }
}
