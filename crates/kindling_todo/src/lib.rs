//! Kindling Todo
//!
//! A todo list built on the Kindling runtime: the item model and its server
//! wire format, a data-access contract with an in-memory implementation, and
//! the component functions that render the list.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use kindling_core::prelude::*;
//! use kindling_todo::{mount_todo_app, MemoryTodoStore, TodoItem, TodoStore};
//!
//! let store = MemoryTodoStore::with_items([TodoItem::new("Buy milk")]);
//! let runtime = RenderRuntime::default();
//! let mut document = MemoryDocument::new();
//! let root = document.insert("root");
//!
//! mount_todo_app(&runtime, &document, "root", Rc::new(store.clone())).unwrap();
//! root.dispatch("TodoListItem", 0, &Event::click());
//!
//! assert!(store.list()[0].complete);
//! ```

pub mod app;
pub mod model;
pub mod store;

pub use app::{
    item_creator, mount_todo_app, todo_app, todo_list, todo_list_item, SharedStore,
    CHECKED_ICON, MAX_TEXT_LEN, UNCHECKED_ICON,
};
pub use model::{ServerTodoItem, TodoItem, TodoStatus};
pub use store::{MemoryTodoStore, StoreError, TodoStore};
