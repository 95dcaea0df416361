//! Todo item model and its server representation

use serde::{Deserialize, Serialize};

/// A single todo entry
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoItem {
    /// Server-assigned id; `None` until the item has been stored
    pub id: Option<u64>,
    pub text: String,
    pub complete: bool,
}

impl TodoItem {
    /// Create an incomplete item with the given text
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn completed(mut self, complete: bool) -> Self {
        self.complete = complete;
        self
    }

    /// Flip the completion flag
    pub fn toggle_complete(&mut self) {
        self.complete = !self.complete;
    }

    /// Copy of this item with the completion flag flipped
    pub fn toggled(&self) -> Self {
        let mut item = self.clone();
        item.toggle_complete();
        item
    }

    pub fn from_server_object(server: &ServerTodoItem) -> Self {
        Self {
            id: server.id,
            text: server.text.clone(),
            complete: server.status == TodoStatus::Complete,
        }
    }

    pub fn to_server_object(&self) -> ServerTodoItem {
        ServerTodoItem {
            id: self.id,
            text: self.text.clone(),
            status: if self.complete {
                TodoStatus::Complete
            } else {
                TodoStatus::Incomplete
            },
        }
    }
}

/// Completion status as exchanged with the backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoStatus {
    Complete,
    Incomplete,
}

/// Todo item as exchanged with the backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerTodoItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub text: String,
    pub status: TodoStatus,
}

impl From<ServerTodoItem> for TodoItem {
    fn from(server: ServerTodoItem) -> Self {
        TodoItem::from_server_object(&server)
    }
}

impl From<&TodoItem> for ServerTodoItem {
    fn from(item: &TodoItem) -> Self {
        item.to_server_object()
    }
}
