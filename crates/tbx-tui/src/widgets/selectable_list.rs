//! List selection widget that keeps items, selection index, and ListState
//! in sync.

use ratatui::widgets::ListState;

/// A list of items with a synced selection index and ratatui ListState.
#[derive(Debug, Clone)]
pub struct SelectableList<T> {
    items: Vec<T>,
    selected: usize,
    list_state: ListState,
}

impl<T> Default for SelectableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SelectableList<T> {
    /// Create an empty selectable list.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            selected: 0,
            list_state: ListState::default(),
        }
    }

    /// Replace all items. Clamps the selection to the new length.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        if self.items.is_empty() {
            self.selected = 0;
            self.list_state.select(None);
        } else {
            self.selected = self.selected.min(self.items.len() - 1);
            self.list_state.select(Some(self.selected));
        }
    }

    /// Move selection to the next item (wraps around).
    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.items.len();
        self.list_state.select(Some(self.selected));
    }

    /// Move selection to the previous item (wraps around).
    pub fn select_prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        if self.selected == 0 {
            self.selected = self.items.len() - 1;
        } else {
            self.selected -= 1;
        }
        self.list_state.select(Some(self.selected));
    }

    /// Move selection to a specific index. Clamps to valid range.
    pub fn select(&mut self, index: usize) {
        if self.items.is_empty() {
            return;
        }
        self.selected = index.min(self.items.len() - 1);
        self.list_state.select(Some(self.selected));
    }

    pub fn select_last(&mut self) {
        self.select(self.items.len().saturating_sub(1));
    }

    /// Get the currently selected item, if any.
    pub fn selected_item(&self) -> Option<&T> {
        self.items.get(self.selected)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Get a mutable reference to the ListState (needed by render_stateful_widget).
    pub fn list_state_mut(&mut self) -> &mut ListState {
        &mut self.list_state
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> SelectableList<String> {
        let mut l = SelectableList::new();
        l.set_items(items.iter().map(|s| s.to_string()).collect());
        l
    }

    #[test]
    fn test_empty_list_has_no_selection() {
        let mut l: SelectableList<String> = SelectableList::new();
        l.select_next();
        l.select_prev();
        assert!(l.selected_item().is_none());
        assert_eq!(l.list_state_mut().selected(), None);
    }

    #[test]
    fn test_set_items_selects_first() {
        let mut l = list(&["a", "b"]);
        assert_eq!(l.selected_item().map(String::as_str), Some("a"));
        assert_eq!(l.list_state_mut().selected(), Some(0));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut l = list(&["a", "b", "c"]);
        l.select_prev();
        assert_eq!(l.selected_index(), 2);
        l.select_next();
        assert_eq!(l.selected_index(), 0);
        l.select_last();
        assert_eq!(l.selected_item().map(String::as_str), Some("c"));
    }

    #[test]
    fn test_shrinking_clamps_selection() {
        let mut l = list(&["a", "b", "c"]);
        l.select(2);
        l.set_items(vec!["x".to_string()]);
        assert_eq!(l.selected_index(), 0);
        l.set_items(Vec::new());
        assert!(l.is_empty());
        assert_eq!(l.list_state_mut().selected(), None);
    }
}
