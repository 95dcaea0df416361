//! Todo data access
//!
//! Components never own the todo list; they read it from a [`TodoStore`]
//! inside an effect and write through it from event handlers, then hand the
//! fresh data to a state setter.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::model::TodoItem;

/// Errors reported by a todo store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("no todo item at index {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Data-access contract for the todo list
pub trait TodoStore {
    /// All items in display order
    fn list(&self) -> Vec<TodoItem>;

    /// Append a new incomplete item, returning it with its assigned id
    fn add(&self, text: &str) -> TodoItem;

    /// Replace the item at `index`
    fn update(&self, index: usize, item: TodoItem) -> Result<TodoItem, StoreError>;
}

/// Shared, in-memory todo store
///
/// Cloning yields another handle to the same list.
#[derive(Clone, Default)]
pub struct MemoryTodoStore {
    items: Rc<RefCell<Vec<TodoItem>>>,
    next_id: Rc<Cell<u64>>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `items`; items without an id get one
    pub fn with_items(items: impl IntoIterator<Item = TodoItem>) -> Self {
        let store = Self::new();
        for item in items {
            store.insert(item);
        }
        store
    }

    fn insert(&self, mut item: TodoItem) -> TodoItem {
        match item.id {
            Some(id) => self.next_id.set(self.next_id.get().max(id.saturating_add(1))),
            None => {
                item.id = Some(self.next_id.get());
                self.next_id.set(self.next_id.get().saturating_add(1));
            }
        }
        self.items.borrow_mut().push(item.clone());
        item
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl TodoStore for MemoryTodoStore {
    fn list(&self) -> Vec<TodoItem> {
        self.items.borrow().clone()
    }

    fn add(&self, text: &str) -> TodoItem {
        let item = self.insert(TodoItem::new(text));
        debug!(id = ?item.id, "todo item added");
        item
    }

    fn update(&self, index: usize, item: TodoItem) -> Result<TodoItem, StoreError> {
        let mut items = self.items.borrow_mut();
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        *slot = item.clone();
        debug!(index, complete = item.complete, "todo item updated");
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_sequential_ids() {
        let store = MemoryTodoStore::new();
        assert_eq!(store.add("a").id, Some(0));
        assert_eq!(store.add("b").id, Some(1));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_seeded_ids_are_not_reused() {
        let store = MemoryTodoStore::with_items([
            TodoItem::new("seeded").with_id(7),
            TodoItem::new("fresh"),
        ]);

        let ids: Vec<_> = store.list().into_iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![Some(7), Some(8)]);
        assert_eq!(store.add("next").id, Some(9));
    }

    #[test]
    fn test_seeded_max_id_does_not_overflow() {
        let store = MemoryTodoStore::with_items([TodoItem::new("last").with_id(u64::MAX)]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].id, Some(u64::MAX));
    }

    #[test]
    fn test_update_replaces_item() {
        let store = MemoryTodoStore::with_items([TodoItem::new("a")]);
        let toggled = store.list()[0].toggled();

        store.update(0, toggled).unwrap();
        assert!(store.list()[0].complete);
    }

    #[test]
    fn test_update_out_of_range() {
        let store = MemoryTodoStore::new();
        assert_eq!(
            store.update(3, TodoItem::new("x")),
            Err(StoreError::IndexOutOfRange { index: 3, len: 0 })
        );
    }

    #[test]
    fn test_clones_share_items() {
        let store = MemoryTodoStore::new();
        let other = store.clone();
        store.add("shared");
        assert!(!other.is_empty());
    }
}
