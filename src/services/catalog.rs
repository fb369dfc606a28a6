//! Balloon catalog store.
//!
//! Holds every balloon collection keyed by `(stage id, area)`. Catalogs exist
//! once their stage is registered; every mutator reports unknown catalogs and
//! unknown items explicitly instead of silently dropping the write.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{BalloonArea, BalloonColor, BalloonIcon, BalloonItem};
use crate::services::reorder::apply_order;

/// Failures of catalog operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No catalog is registered for this stage and area
    #[error("No {area} catalog for stage '{stage_id}'")]
    UnknownCatalog {
        /// Stage id
        stage_id: String,
        /// Catalog area
        area: BalloonArea,
    },
    /// The catalog holds no balloon with this id
    #[error("Balloon '{0}' not found")]
    ItemNotFound(String),
    /// A reorder request was not a permutation of the current ids
    #[error("Reorder must list every balloon exactly once ({expected} expected, got {got})")]
    OrderMismatch {
        /// Current number of balloons
        expected: usize,
        /// Number of ids supplied
        got: usize,
    },
}

/// All balloon catalogs of a workflow template.
///
/// Serialized as `{ "<stage id>": { "<area>": [balloons...] } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalloonStore {
    catalogs: BTreeMap<String, BTreeMap<BalloonArea, Vec<BalloonItem>>>,
}

impl BalloonStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates empty catalogs for every area of `stage_id`.
    ///
    /// Existing catalogs are left untouched.
    pub fn register_stage(&mut self, stage_id: &str) {
        let areas = self.catalogs.entry(stage_id.to_string()).or_default();
        for area in BalloonArea::all() {
            areas.entry(*area).or_default();
        }
    }

    /// Gives a fresh id to every balloon whose id is blank or already taken.
    ///
    /// Ids are unique across the whole store afterwards. Returns how many
    /// balloons were given a new id.
    pub fn repair_ids(&mut self) -> usize {
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut repaired = 0;
        for (stage_id, areas) in &mut self.catalogs {
            for (area, items) in areas.iter_mut() {
                for item in items.iter_mut() {
                    if item.id.trim().is_empty() || seen.contains(&item.id) {
                        let old = std::mem::replace(&mut item.id, BalloonItem::generate_id());
                        debug!(stage_id = %stage_id, %area, old = %old, new = %item.id, "balloon id repaired");
                        repaired += 1;
                    }
                    seen.insert(item.id.clone());
                }
            }
        }
        repaired
    }

    /// Removes every catalog of `stage_id`. Returns whether the stage was known.
    pub fn drop_stage(&mut self, stage_id: &str) -> bool {
        self.catalogs.remove(stage_id).is_some()
    }

    /// Whether catalogs exist for `stage_id`.
    #[must_use]
    pub fn has_stage(&self, stage_id: &str) -> bool {
        self.catalogs.contains_key(stage_id)
    }

    /// Read access to one catalog.
    pub fn catalog(&self, stage_id: &str, area: BalloonArea) -> Result<&[BalloonItem], CatalogError> {
        self.catalogs
            .get(stage_id)
            .and_then(|areas| areas.get(&area))
            .map(Vec::as_slice)
            .ok_or_else(|| unknown(stage_id, area))
    }

    fn catalog_mut(
        &mut self,
        stage_id: &str,
        area: BalloonArea,
    ) -> Result<&mut Vec<BalloonItem>, CatalogError> {
        self.catalogs
            .get_mut(stage_id)
            .and_then(|areas| areas.get_mut(&area))
            .ok_or_else(|| unknown(stage_id, area))
    }

    fn item_mut(
        &mut self,
        stage_id: &str,
        area: BalloonArea,
        id: &str,
    ) -> Result<&mut BalloonItem, CatalogError> {
        self.catalog_mut(stage_id, area)?
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| CatalogError::ItemNotFound(id.to_string()))
    }

    /// Appends a balloon, generating an id when it has none.
    ///
    /// Labels are not checked here; callers validate with
    /// [`validate_label`](crate::models::validate_label). Returns the id.
    pub fn add_balloon(
        &mut self,
        stage_id: &str,
        area: BalloonArea,
        mut item: BalloonItem,
    ) -> Result<String, CatalogError> {
        if item.id.trim().is_empty() {
            item.id = BalloonItem::generate_id();
        }
        let id = item.id.clone();
        self.catalog_mut(stage_id, area)?.push(item);
        debug!(stage_id, %area, id = %id, "balloon added");
        Ok(id)
    }

    /// Replaces a balloon's label.
    pub fn rename_balloon(
        &mut self,
        stage_id: &str,
        area: BalloonArea,
        id: &str,
        label: &str,
    ) -> Result<(), CatalogError> {
        let item = self.item_mut(stage_id, area, id)?;
        item.label = label.to_string();
        debug!(stage_id, %area, id, label, "balloon renamed");
        Ok(())
    }

    /// Removes a balloon.
    ///
    /// Idempotent: removing an id that is already gone returns `Ok(None)`.
    pub fn remove_balloon(
        &mut self,
        stage_id: &str,
        area: BalloonArea,
        id: &str,
    ) -> Result<Option<BalloonItem>, CatalogError> {
        let catalog = self.catalog_mut(stage_id, area)?;
        let removed = catalog
            .iter()
            .position(|item| item.id == id)
            .map(|index| catalog.remove(index));
        if removed.is_some() {
            debug!(stage_id, %area, id, "balloon removed");
        }
        Ok(removed)
    }

    /// Reorders a catalog to follow `ordered_ids`.
    ///
    /// The ids must be a permutation of the current ids; anything else is
    /// rejected with [`CatalogError::OrderMismatch`] and nothing changes.
    pub fn reorder_balloons(
        &mut self,
        stage_id: &str,
        area: BalloonArea,
        ordered_ids: &[String],
    ) -> Result<(), CatalogError> {
        let catalog = self.catalog_mut(stage_id, area)?;
        let reordered = apply_order(catalog, ordered_ids, |item| &item.id).ok_or(
            CatalogError::OrderMismatch {
                expected: catalog.len(),
                got: ordered_ids.len(),
            },
        )?;
        if *catalog != reordered {
            *catalog = reordered;
            debug!(stage_id, %area, "balloons reordered");
        }
        Ok(())
    }

    /// Sets or clears a balloon's icon.
    pub fn set_balloon_icon(
        &mut self,
        stage_id: &str,
        area: BalloonArea,
        id: &str,
        icon: Option<BalloonIcon>,
    ) -> Result<(), CatalogError> {
        self.item_mut(stage_id, area, id)?.icon = icon;
        debug!(stage_id, %area, id, ?icon, "balloon icon set");
        Ok(())
    }

    /// Sets a balloon's color.
    pub fn set_balloon_color(
        &mut self,
        stage_id: &str,
        area: BalloonArea,
        id: &str,
        color: BalloonColor,
    ) -> Result<(), CatalogError> {
        self.item_mut(stage_id, area, id)?.color = color;
        debug!(stage_id, %area, id, %color, "balloon color set");
        Ok(())
    }

    /// Replaces a whole catalog in one step (used when an editor commits).
    pub fn replace_catalog(
        &mut self,
        stage_id: &str,
        area: BalloonArea,
        items: Vec<BalloonItem>,
    ) -> Result<(), CatalogError> {
        let catalog = self.catalog_mut(stage_id, area)?;
        *catalog = items;
        debug!(stage_id, %area, count = catalog.len(), "catalog replaced");
        Ok(())
    }

    /// Stage ids with registered catalogs.
    pub fn stage_ids(&self) -> impl Iterator<Item = &str> {
        self.catalogs.keys().map(String::as_str)
    }
}

fn unknown(stage_id: &str, area: BalloonArea) -> CatalogError {
    CatalogError::UnknownCatalog {
        stage_id: stage_id.to_string(),
        area,
    }
}

/// Differences between two versions of a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogChangeSet {
    /// Ids present only in the new version
    pub added: Vec<String>,
    /// Ids present only in the old version
    pub removed: Vec<String>,
    /// Ids whose label changed
    pub renamed: Vec<String>,
    /// Ids whose icon, color or meta changed
    pub restyled: Vec<String>,
    /// Whether the relative order of surviving balloons changed
    pub reordered: bool,
}

impl CatalogChangeSet {
    /// Computes the changes turning `before` into `after`.
    #[must_use]
    pub fn diff(before: &[BalloonItem], after: &[BalloonItem]) -> Self {
        let mut changes = Self::default();

        for item in after {
            match before.iter().find(|old| old.id == item.id) {
                None => changes.added.push(item.id.clone()),
                Some(old) => {
                    if old.label != item.label {
                        changes.renamed.push(item.id.clone());
                    }
                    if old.icon != item.icon || old.color != item.color || old.meta != item.meta {
                        changes.restyled.push(item.id.clone());
                    }
                }
            }
        }
        for old in before {
            if !after.iter().any(|item| item.id == old.id) {
                changes.removed.push(old.id.clone());
            }
        }

        let surviving_before: Vec<&str> = before
            .iter()
            .filter(|old| after.iter().any(|item| item.id == old.id))
            .map(|old| old.id.as_str())
            .collect();
        let surviving_after: Vec<&str> = after
            .iter()
            .filter(|item| before.iter().any(|old| old.id == item.id))
            .map(|item| item.id.as_str())
            .collect();
        changes.reordered = surviving_before != surviving_after;

        changes
    }

    /// Whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.renamed.is_empty()
            && self.restyled.is_empty()
            && !self.reordered
    }
}
