//! Inline balloon manager.
//!
//! Unlike [`BalloonEditor`](crate::editor::BalloonEditor) the manager has no
//! draft: every confirmed operation is written straight to the store.

use crate::editor::EditError;
use crate::models::{duplicate_label, validate_label, BalloonArea, BalloonIcon, BalloonItem};
use crate::services::reorder::{move_item, ListDrag};
use crate::services::{BalloonStore, CatalogError};

/// Manager mode - determines what operation is being performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerMode {
    /// Browsing balloons (default mode)
    Browsing,
    /// Entering the label of a new balloon
    Adding {
        /// User input for the label
        input: String,
    },
    /// Renaming a balloon
    Renaming {
        /// Balloon being renamed
        id: String,
        /// User input for the new label
        input: String,
    },
    /// Confirming deletion
    ConfirmingDelete {
        /// Balloon to delete
        id: String,
    },
    /// Moving a balloon
    Dragging,
}

/// Write-through manager for one catalog.
#[derive(Debug, Clone)]
pub struct BalloonManager {
    stage_id: String,
    area: BalloonArea,
    /// Selected row
    pub selected: usize,
    mode: ManagerMode,
    drag: ListDrag,
    error: Option<String>,
}

impl BalloonManager {
    /// Manages the catalog `(stage_id, area)`.
    #[must_use]
    pub fn new(stage_id: impl Into<String>, area: BalloonArea) -> Self {
        Self {
            stage_id: stage_id.into(),
            area,
            selected: 0,
            mode: ManagerMode::Browsing,
            drag: ListDrag::new(),
            error: None,
        }
    }

    /// Stage id
    #[must_use]
    pub fn stage_id(&self) -> &str {
        &self.stage_id
    }

    /// Catalog area
    #[must_use]
    pub const fn area(&self) -> BalloonArea {
        self.area
    }

    /// Current mode
    #[must_use]
    pub const fn mode(&self) -> &ManagerMode {
        &self.mode
    }

    /// Last error message
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Hover row while dragging
    #[must_use]
    pub fn drag_hover(&self) -> Option<usize> {
        self.drag.hover()
    }

    /// Balloons as currently stored.
    ///
    /// Returns an empty slice when the catalog does not exist.
    #[must_use]
    pub fn items<'a>(&self, store: &'a BalloonStore) -> &'a [BalloonItem] {
        store.catalog(&self.stage_id, self.area).unwrap_or(&[])
    }

    fn record<T>(&mut self, result: Result<T, EditError>) -> Result<T, EditError> {
        match &result {
            Ok(_) => self.error = None,
            Err(err) => self.error = Some(err.to_string()),
        }
        result
    }

    /// Move selection up
    pub fn select_previous(&mut self, count: usize) {
        if count > 0 {
            if self.selected > 0 {
                self.selected -= 1;
            } else {
                self.selected = count - 1;
            }
        }
    }

    /// Move selection down
    pub fn select_next(&mut self, count: usize) {
        if count > 0 {
            self.selected = (self.selected + 1) % count;
        }
    }

    /// Validates and appends a balloon, writing it to the store.
    pub fn add(&mut self, store: &mut BalloonStore, label: &str) -> Result<String, EditError> {
        let result = self.try_add(store, label);
        let id = self.record(result)?;
        self.selected = self.items(store).len().saturating_sub(1);
        Ok(id)
    }

    /// Validates and stores a new label.
    pub fn rename(
        &mut self,
        store: &mut BalloonStore,
        id: &str,
        label: &str,
    ) -> Result<(), EditError> {
        let result = self.try_rename(store, id, label);
        self.record(result)
    }

    fn try_add(&self, store: &mut BalloonStore, label: &str) -> Result<String, EditError> {
        let label = validate_label(label, self.items(store), None)?;
        Ok(store.add_balloon(&self.stage_id, self.area, BalloonItem::new(label))?)
    }

    fn try_rename(&self, store: &mut BalloonStore, id: &str, label: &str) -> Result<(), EditError> {
        let label = validate_label(label, self.items(store), Some(id))?;
        Ok(store.rename_balloon(&self.stage_id, self.area, id, &label)?)
    }

    /// Stores a copy of `id` right after it.
    pub fn duplicate(&mut self, store: &mut BalloonStore, id: &str) -> Result<String, EditError> {
        let items = self.items(store).to_vec();
        let Some(index) = items.iter().position(|item| item.id == id) else {
            return self.record(Err(CatalogError::ItemNotFound(id.to_string()).into()));
        };
        let mut copy = items[index].clone();
        copy.id = BalloonItem::generate_id();
        copy.label = duplicate_label(&items[index].label, &items);
        let new_id = copy.id.clone();

        let mut order: Vec<String> = items.iter().map(|item| item.id.clone()).collect();
        order.insert(index + 1, new_id.clone());
        let result = store
            .add_balloon(&self.stage_id, self.area, copy)
            .and_then(|_| store.reorder_balloons(&self.stage_id, self.area, &order))
            .map(|()| new_id)
            .map_err(EditError::from);
        let new_id = self.record(result)?;
        self.selected = index + 1;
        Ok(new_id)
    }

    /// Asks for confirmation before deleting `id`.
    pub fn request_delete(&mut self, id: &str) {
        self.mode = ManagerMode::ConfirmingDelete { id: id.to_string() };
    }

    /// Deletes the balloon awaiting confirmation.
    pub fn confirm_delete(
        &mut self,
        store: &mut BalloonStore,
    ) -> Result<Option<BalloonItem>, EditError> {
        let ManagerMode::ConfirmingDelete { id } = &self.mode else {
            return Ok(None);
        };
        let id = id.clone();
        self.mode = ManagerMode::Browsing;
        let result = store
            .remove_balloon(&self.stage_id, self.area, &id)
            .map_err(EditError::from);
        let removed = self.record(result)?;
        let len = self.items(store).len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
        Ok(removed)
    }

    /// Cycles the icon of `id`.
    pub fn cycle_icon(&mut self, store: &mut BalloonStore, id: &str) -> Result<(), EditError> {
        let current = self
            .items(store)
            .iter()
            .find(|item| item.id == id)
            .and_then(|item| item.icon);
        let result = store
            .set_balloon_icon(&self.stage_id, self.area, id, BalloonIcon::cycle(current))
            .map_err(EditError::from);
        self.record(result)
    }

    /// Cycles the color of `id`.
    pub fn cycle_color(&mut self, store: &mut BalloonStore, id: &str) -> Result<(), EditError> {
        let next = self
            .items(store)
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.color.cycle())
            .unwrap_or_default();
        let result = store
            .set_balloon_color(&self.stage_id, self.area, id, next)
            .map_err(EditError::from);
        self.record(result)
    }

    /// Starts typing a new label
    pub fn begin_add(&mut self) {
        self.mode = ManagerMode::Adding {
            input: String::new(),
        };
    }

    /// Starts renaming the selected balloon
    pub fn begin_rename(&mut self, store: &BalloonStore) {
        if let Some(item) = self.items(store).get(self.selected) {
            self.mode = ManagerMode::Renaming {
                id: item.id.clone(),
                input: item.label.clone(),
            };
        }
    }

    /// Text being typed, if any
    pub fn input_mut(&mut self) -> Option<&mut String> {
        match &mut self.mode {
            ManagerMode::Adding { input } | ManagerMode::Renaming { input, .. } => Some(input),
            _ => None,
        }
    }

    /// Confirms the current input. Stays in the input mode on failure.
    pub fn submit_input(&mut self, store: &mut BalloonStore) -> Result<(), EditError> {
        match self.mode.clone() {
            ManagerMode::Adding { input } => {
                self.add(store, &input)?;
            }
            ManagerMode::Renaming { id, input } => {
                self.rename(store, &id, &input)?;
            }
            _ => return Ok(()),
        }
        self.mode = ManagerMode::Browsing;
        Ok(())
    }

    /// Cancel current operation and return to browsing
    pub fn cancel(&mut self) {
        self.mode = ManagerMode::Browsing;
        self.drag.cancel();
        self.error = None;
    }

    /// Picks up the selected balloon
    pub fn grab(&mut self, store: &BalloonStore) -> bool {
        if self.items(store).is_empty() {
            return false;
        }
        self.drag.grab(self.selected);
        self.mode = ManagerMode::Dragging;
        true
    }

    /// Moves the drag target up
    pub fn drag_up(&mut self) {
        self.drag.step_up();
    }

    /// Moves the drag target down
    pub fn drag_down(&mut self, store: &BalloonStore) {
        self.drag.step_down(self.items(store).len());
    }

    /// Drops the dragged balloon, writing the whole spliced order back.
    pub fn drop_dragged(&mut self, store: &mut BalloonStore) -> Result<bool, EditError> {
        self.mode = ManagerMode::Browsing;
        let Some((from, to)) = self.drag.release() else {
            return Ok(false);
        };
        let ids: Vec<String> = self.items(store).iter().map(|item| item.id.clone()).collect();
        let order = move_item(&ids, from, to);
        let result = store
            .reorder_balloons(&self.stage_id, self.area, &order)
            .map_err(EditError::from);
        self.record(result)?;
        self.selected = to.min(order.len().saturating_sub(1));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BalloonColor, LabelError};

    const STAGE: &str = "etp-elaboration";
    const AREA: BalloonArea = BalloonArea::ChecklistCatalog;

    fn setup() -> (BalloonStore, BalloonManager) {
        let mut store = BalloonStore::new();
        store.register_stage(STAGE);
        (store, BalloonManager::new(STAGE, AREA))
    }

    fn labels(manager: &BalloonManager, store: &BalloonStore) -> Vec<String> {
        manager
            .items(store)
            .iter()
            .map(|item| item.label.clone())
            .collect()
    }

    #[test]
    fn test_add_writes_through() {
        let (mut store, mut manager) = setup();
        manager.add(&mut store, "Pesquisa de preços").unwrap();
        assert_eq!(store.catalog(STAGE, AREA).unwrap().len(), 1);

        let err = manager.add(&mut store, "PESQUISA DE PREÇOS").unwrap_err();
        assert!(matches!(err, EditError::Label(LabelError::Duplicate(_))));
        assert!(manager.error().is_some());
        assert_eq!(store.catalog(STAGE, AREA).unwrap().len(), 1);
    }

    #[test]
    fn test_submit_keeps_input_mode_on_error() {
        let (mut store, mut manager) = setup();
        manager.begin_add();
        assert!(manager.submit_input(&mut store).is_err());
        assert!(matches!(manager.mode(), ManagerMode::Adding { .. }));
        manager.input_mut().unwrap().push_str("Orçamento");
        manager.submit_input(&mut store).unwrap();
        assert_eq!(manager.mode(), &ManagerMode::Browsing);
        assert!(manager.error().is_none());
    }

    #[test]
    fn test_rename_and_delete() {
        let (mut store, mut manager) = setup();
        let a = manager.add(&mut store, "A").unwrap();
        manager.add(&mut store, "B").unwrap();

        assert!(manager.rename(&mut store, &a, "b").is_err());
        manager.rename(&mut store, &a, "Alpha").unwrap();
        assert_eq!(labels(&manager, &store), vec!["Alpha", "B"]);

        manager.request_delete(&a);
        assert_eq!(
            manager.confirm_delete(&mut store).unwrap().map(|i| i.label),
            Some("Alpha".to_string())
        );
        assert_eq!(manager.confirm_delete(&mut store).unwrap(), None);
        assert_eq!(labels(&manager, &store), vec!["B"]);
    }

    #[test]
    fn test_duplicate_lands_after_source() {
        let (mut store, mut manager) = setup();
        let a = manager.add(&mut store, "A").unwrap();
        manager.add(&mut store, "B").unwrap();
        manager.duplicate(&mut store, &a).unwrap();
        assert_eq!(labels(&manager, &store), vec!["A", "A copy", "B"]);
        assert_eq!(manager.selected, 1);
    }

    #[test]
    fn test_coarse_drag_writes_full_order() {
        let (mut store, mut manager) = setup();
        for label in ["A", "B", "C"] {
            manager.add(&mut store, label).unwrap();
        }
        manager.selected = 2;
        assert!(manager.grab(&store));
        manager.drag_up();
        manager.drag_up();
        assert!(manager.drop_dragged(&mut store).unwrap());
        assert_eq!(labels(&manager, &store), vec!["C", "A", "B"]);
        assert_eq!(manager.selected, 0);

        manager.grab(&store);
        assert!(!manager.drop_dragged(&mut store).unwrap());
    }

    #[test]
    fn test_cycle_style() {
        let (mut store, mut manager) = setup();
        let id = manager.add(&mut store, "A").unwrap();
        manager.cycle_color(&mut store, &id).unwrap();
        manager.cycle_icon(&mut store, &id).unwrap();
        let item = &manager.items(&store)[0];
        assert_eq!(item.color, BalloonColor::Slate.cycle());
        assert!(item.icon.is_some());
        assert!(manager.cycle_color(&mut store, "missing").is_err());
    }

    #[test]
    fn test_items_of_unknown_catalog_is_empty() {
        let store = BalloonStore::new();
        let manager = BalloonManager::new("nope", AREA);
        assert!(manager.items(&store).is_empty());
    }
}
