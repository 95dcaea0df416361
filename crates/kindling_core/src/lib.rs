//! Kindling Core Runtime
//!
//! A minimal rendering runtime: a root render function builds a tree of
//! [`Node`]s on every refresh, the whole tree replaces whatever was mounted
//! before, and positional hooks carry state and effects across refreshes.
//!
//! - **Node Builder**: declarative construction of render nodes
//! - **Hook Store**: call-order indexed state cells and effect records
//! - **Effect Scheduler**: effects run after the new tree is mounted
//! - **Refresh Controller**: Idle / Pending / Refreshing state machine that
//!   defers refreshes requested mid-pass
//!
//! There is no diffing and no concurrent rendering; every refresh rebuilds
//! and swaps the entire subtree on the caller's thread.
//!
//! # Example
//!
//! ```rust
//! use kindling_core::prelude::*;
//!
//! let runtime = RenderRuntime::default();
//! let tree = MemoryTree::new();
//!
//! runtime
//!     .mount_into(tree.clone(), |cx| {
//!         let (items, set_items) = cx.use_state(Vec::<String>::new());
//!         let empty = items.is_empty();
//!         cx.use_effect_every_pass(move || {
//!             if empty {
//!                 let _ = set_items.set(vec!["write docs".to_string()]);
//!             }
//!         });
//!
//!         let mut list = build_node("ul", [("className", Prop::attr("TodoList"))]);
//!         for item in items {
//!             list.add(Node::new("li").child(item));
//!         }
//!         list
//!     })
//!     .unwrap();
//!
//! // the effect's update was replayed as a second pass
//! assert_eq!(tree.markup(), "<ul class=\"TodoList\"><li>write docs</li></ul>");
//! ```

pub mod config;
pub mod controller;
mod effects;
pub mod error;
pub mod hooks;
pub mod node;
pub mod runtime;
pub mod sink;

pub use config::RuntimeConfig;
pub use controller::{RefreshController, RefreshEvent, RefreshPhase};
pub use error::{BoxError, HookKind, Result, RuntimeError};
pub use hooks::{RenderScope, StateSetter};
pub use node::{build_node, Child, Event, EventHandler, Node, Prop};
pub use runtime::{RenderRuntime, RootFn, RuntimeStats};
pub use sink::{MemoryDocument, MemoryTree, TargetResolver, TreeSink};

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::config::RuntimeConfig;
    pub use crate::error::{BoxError, Result, RuntimeError};
    pub use crate::hooks::{RenderScope, StateSetter};
    pub use crate::node::{build_node, Child, Event, Node, Prop};
    pub use crate::runtime::RenderRuntime;
    pub use crate::sink::{MemoryDocument, MemoryTree, TargetResolver, TreeSink};
}
