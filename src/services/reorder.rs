//! Ordered-list reordering shared by every drag-and-drop surface.

/// Returns a copy of `items` with the element at `from` moved to `to`.
///
/// Indices past the end are clamped to the last element; an empty slice
/// yields an empty vector.
///
/// # Examples
///
/// ```
/// use stagecard::services::reorder::move_item;
///
/// assert_eq!(move_item(&['a', 'b', 'c'], 0, 2), vec!['b', 'c', 'a']);
/// assert_eq!(move_item(&['a', 'b', 'c'], 2, 0), vec!['c', 'a', 'b']);
/// ```
#[must_use]
pub fn move_item<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut out = items.to_vec();
    if out.is_empty() {
        return out;
    }
    let last = out.len() - 1;
    let from = from.min(last);
    let to = to.min(last);
    if from != to {
        let item = out.remove(from);
        out.insert(to, item);
    }
    out
}

/// Reorders `items` so their keys follow `order`.
///
/// Returns `None` unless `order` is a permutation of the current keys.
pub fn apply_order<T: Clone, K: PartialEq>(
    items: &[T],
    order: &[K],
    key: impl Fn(&T) -> &K,
) -> Option<Vec<T>> {
    if order.len() != items.len() {
        return None;
    }
    let mut out = Vec::with_capacity(items.len());
    for (position, wanted) in order.iter().enumerate() {
        // Reject repeated keys in the requested order
        if order[..position].contains(wanted) {
            return None;
        }
        let item = items.iter().find(|item| key(item) == wanted)?;
        out.push(item.clone());
    }
    Some(out)
}

/// Keyboard-driven drag over a list with live index tracking.
///
/// `grab` records the source index, `step_up`/`step_down` move the hover
/// index, and `release` yields the `(from, to)` pair to feed [`move_item`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListDrag {
    active: Option<(usize, usize)>,
}

impl ListDrag {
    /// Creates an idle drag.
    #[must_use]
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Source index of the active drag.
    #[must_use]
    pub fn source(&self) -> Option<usize> {
        self.active.map(|(from, _)| from)
    }

    /// Current hover index of the active drag.
    #[must_use]
    pub fn hover(&self) -> Option<usize> {
        self.active.map(|(_, over)| over)
    }

    /// Starts dragging the element at `index`.
    pub fn grab(&mut self, index: usize) {
        self.active = Some((index, index));
    }

    /// Moves the hover position one step up.
    pub fn step_up(&mut self) {
        if let Some((_, over)) = &mut self.active {
            *over = over.saturating_sub(1);
        }
    }

    /// Moves the hover position one step down within a list of `len` items.
    pub fn step_down(&mut self, len: usize) {
        if let Some((_, over)) = &mut self.active {
            if *over + 1 < len {
                *over += 1;
            }
        }
    }

    /// Ends the drag, returning `(from, to)` when the position changed.
    pub fn release(&mut self) -> Option<(usize, usize)> {
        match self.active.take() {
            Some((from, to)) if from != to => Some((from, to)),
            _ => None,
        }
    }

    /// Abandons the drag without moving anything.
    pub fn cancel(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_item_forward_and_backward() {
        let items = vec![1, 2, 3, 4];
        assert_eq!(move_item(&items, 0, 3), vec![2, 3, 4, 1]);
        assert_eq!(move_item(&items, 3, 1), vec![1, 4, 2, 3]);
        assert_eq!(move_item(&items, 2, 2), items);
    }

    #[test]
    fn test_move_item_clamps() {
        assert_eq!(move_item(&[1, 2, 3], 7, 0), vec![3, 1, 2]);
        assert_eq!(move_item::<i32>(&[], 0, 1), Vec::<i32>::new());
    }

    #[test]
    fn test_apply_order_permutation() {
        let items = vec![("a", 1), ("b", 2), ("c", 3)];
        let ordered = apply_order(&items, &["c", "a", "b"], |item| &item.0).unwrap();
        assert_eq!(ordered, vec![("c", 3), ("a", 1), ("b", 2)]);
    }

    #[test]
    fn test_apply_order_rejects_partial_or_repeated() {
        let items = vec![("a", 1), ("b", 2)];
        assert!(apply_order(&items, &["a"], |item| &item.0).is_none());
        assert!(apply_order(&items, &["a", "a"], |item| &item.0).is_none());
        assert!(apply_order(&items, &["a", "z"], |item| &item.0).is_none());
    }

    #[test]
    fn test_list_drag() {
        let mut drag = ListDrag::new();
        drag.step_down(3);
        assert!(!drag.is_active());

        drag.grab(0);
        drag.step_down(3);
        drag.step_down(3);
        drag.step_down(3);
        assert_eq!(drag.hover(), Some(2));
        assert_eq!(drag.release(), Some((0, 2)));
        assert!(!drag.is_active());

        drag.grab(1);
        assert_eq!(drag.release(), None);

        drag.grab(1);
        drag.step_up();
        drag.cancel();
        assert_eq!(drag.release(), None);
    }
}
