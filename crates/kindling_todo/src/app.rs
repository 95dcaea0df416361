//! Todo components
//!
//! Every component is a plain function returning a [`Node`]. Only the root,
//! [`todo_app`], uses hooks: it keeps the rendered list in state, loads it
//! from the store after the first mount and refreshes it after every write.

use std::rc::Rc;

use kindling_core::prelude::*;
use tracing::{error, warn};

use crate::model::TodoItem;
use crate::store::TodoStore;

/// Store handle shared by the root component and its handlers
pub type SharedStore = Rc<dyn TodoStore>;

pub const CHECKED_ICON: &str = "checked.png";
pub const UNCHECKED_ICON: &str = "unchecked.png";
const ICON_SIZE: u32 = 20;

/// Longest todo text accepted by the creator input
pub const MAX_TEXT_LEN: usize = 50;
const PLACEHOLDER: &str = "What do you need to do?";
const ENTER_KEY: &str = "Enter";

/// Mount the todo app at `target_id`
pub fn mount_todo_app(
    runtime: &RenderRuntime,
    resolver: &dyn TargetResolver,
    target_id: &str,
    store: SharedStore,
) -> kindling_core::Result<()> {
    runtime.mount(resolver, target_id, move |cx| todo_app(cx, &store))
}

/// Root component
pub fn todo_app(cx: &RenderScope, store: &SharedStore) -> Node {
    let (items, set_items) = cx.use_state(Vec::<TodoItem>::new());

    {
        let store = store.clone();
        let set_items = set_items.clone();
        cx.use_fallible_effect(
            move || {
                set_items.set(store.list())?;
                Ok(())
            },
            Some(()),
        );
    }

    let add_item: Rc<dyn Fn(&str)> = {
        let store = store.clone();
        let set_items = set_items.clone();
        Rc::new(move |text: &str| {
            store.add(text);
            if let Err(err) = set_items.set(store.list()) {
                error!(%err, "refresh after adding a todo failed");
            }
        })
    };

    let update_item: Rc<dyn Fn(usize, TodoItem)> = {
        let store = store.clone();
        Rc::new(move |index: usize, item: TodoItem| match store.update(index, item) {
            Ok(_) => {
                if let Err(err) = set_items.set(store.list()) {
                    error!(%err, "refresh after updating a todo failed");
                }
            }
            Err(err) => warn!(%err, "todo update rejected"),
        })
    };

    Node::new("div")
        .class("TodoApp")
        .child(item_creator(add_item))
        .child(todo_list(&items, update_item))
}

/// Text input that adds a todo when Enter is released
pub fn item_creator(add_item: Rc<dyn Fn(&str)>) -> Node {
    build_node(
        "input",
        [
            ("type", Prop::attr("text")),
            ("maxlength", Prop::attr(MAX_TEXT_LEN.to_string())),
            ("size", Prop::attr(MAX_TEXT_LEN.to_string())),
            ("placeholder", Prop::attr(PLACEHOLDER)),
            (
                "onkeyup",
                Prop::handler(move |event| {
                    if event.key.as_deref() != Some(ENTER_KEY) {
                        return;
                    }
                    let value = event.value.as_deref().unwrap_or_default();
                    let text: String = value.chars().take(MAX_TEXT_LEN).collect();
                    add_item(&text);
                }),
            ),
            ("className", Prop::attr("TodoListItemCreator")),
        ],
    )
}

/// The list of items; clicking an item toggles it through `update_item`
pub fn todo_list(items: &[TodoItem], update_item: Rc<dyn Fn(usize, TodoItem)>) -> Node {
    let mut list = Node::new("div").class("TodoList");
    for (index, item) in items.iter().enumerate() {
        let update_item = update_item.clone();
        let toggled = item.toggled();
        list.add(todo_list_item(item, move || {
            update_item(index, toggled.clone())
        }));
    }
    list
}

/// One row: completion marker plus text
pub fn todo_list_item(item: &TodoItem, on_toggle: impl Fn() + 'static) -> Node {
    let icon = if item.complete {
        CHECKED_ICON
    } else {
        UNCHECKED_ICON
    };

    Node::new("div")
        .class("TodoListItem")
        .on("click", move |_| on_toggle())
        .child(
            Node::new("img")
                .attr("src", icon)
                .attr("width", ICON_SIZE)
                .attr("height", ICON_SIZE),
        )
        .child(format!(" {}", item.text))
}
