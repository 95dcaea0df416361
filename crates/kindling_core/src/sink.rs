//! Tree sinks - where rendered trees land
//!
//! The controller never touches a concrete UI surface. It only asks a
//! [`TreeSink`] to replace everything below the mount point with the tree a
//! pass produced. [`MemoryTree`] and [`MemoryDocument`] are in-memory
//! implementations used by headless hosts and tests.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::node::{Event, EventHandler, Node};

/// Capability to swap the rendered children of a mount point
pub trait TreeSink {
    /// Replace the entire subtree below the mount point with `root`
    fn replace_children(&mut self, root: Node);
}

/// Resolves mount target ids into sinks
pub trait TargetResolver {
    fn resolve(&self, target_id: &str) -> Option<Box<dyn TreeSink>>;
}

#[derive(Default)]
struct MemoryTreeInner {
    root: Option<Node>,
    replacements: usize,
}

/// In-memory mount point
///
/// Cloning yields another handle to the same tree, so a host can keep a
/// handle while the runtime owns the sink.
#[derive(Clone, Default)]
pub struct MemoryTree {
    inner: Rc<RefCell<MemoryTreeInner>>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the currently mounted tree
    pub fn root(&self) -> Option<Node> {
        self.inner.borrow().root.clone()
    }

    /// Run `f` against the mounted tree without cloning it
    ///
    /// `f` must not trigger a refresh of the runtime this tree is mounted in.
    pub fn with_root<R>(&self, f: impl FnOnce(Option<&Node>) -> R) -> R {
        f(self.inner.borrow().root.as_ref())
    }

    /// Number of times the subtree has been replaced
    pub fn replacements(&self) -> usize {
        self.inner.borrow().replacements
    }

    /// Markup of the mounted tree, empty if nothing is mounted
    pub fn markup(&self) -> String {
        self.with_root(|root| root.map(Node::to_string).unwrap_or_default())
    }

    /// Handler for `event` on the `index`-th node carrying `class_name`
    pub fn handler(&self, class_name: &str, index: usize, event: &str) -> Option<EventHandler> {
        self.with_root(|root| {
            root.and_then(|root| root.find_all_by_class(class_name).get(index).copied())
                .and_then(|node| node.handler(event))
        })
    }

    /// Deliver `event` to the `index`-th node carrying `class_name`
    ///
    /// The handler is cloned out before it runs, so it may trigger refreshes
    /// that replace this tree. Returns whether a handler ran.
    pub fn dispatch(&self, class_name: &str, index: usize, event: &Event) -> bool {
        match self.handler(class_name, index, &event.kind) {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }
}

impl TreeSink for MemoryTree {
    fn replace_children(&mut self, root: Node) {
        let mut inner = self.inner.borrow_mut();
        inner.root = Some(root);
        inner.replacements += 1;
    }
}

/// A set of named in-memory mount points
#[derive(Clone, Default)]
pub struct MemoryDocument {
    targets: FxHashMap<String, MemoryTree>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mount point, returning a handle to it
    pub fn insert(&mut self, target_id: impl Into<String>) -> MemoryTree {
        self.targets.entry(target_id.into()).or_default().clone()
    }

    pub fn target(&self, target_id: &str) -> Option<MemoryTree> {
        self.targets.get(target_id).cloned()
    }
}

impl TargetResolver for MemoryDocument {
    fn resolve(&self, target_id: &str) -> Option<Box<dyn TreeSink>> {
        self.target(target_id)
            .map(|tree| Box::new(tree) as Box<dyn TreeSink>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_replace_children_swaps_whole_tree() {
        let tree = MemoryTree::new();
        let mut sink = tree.clone();

        sink.replace_children(Node::new("div").child("first"));
        sink.replace_children(Node::new("p").child("second"));

        assert_eq!(tree.replacements(), 2);
        assert_eq!(tree.markup(), "<p>second</p>");
    }

    #[test]
    fn test_dispatch_by_class_and_index() {
        let hits = Rc::new(Cell::new(usize::MAX));
        let mut tree = MemoryTree::new();

        let mut root = Node::new("div");
        for i in 0..3 {
            let hits = hits.clone();
            root.add(Node::new("div").class("Row").on("click", move |_| hits.set(i)));
        }
        tree.replace_children(root);

        assert!(tree.dispatch("Row", 2, &Event::click()));
        assert_eq!(hits.get(), 2);
        assert!(!tree.dispatch("Row", 3, &Event::click()));
        assert!(!tree.dispatch("Row", 0, &Event::new("keyup")));
    }

    #[test]
    fn test_document_resolves_known_targets_only() {
        let mut document = MemoryDocument::new();
        let root = document.insert("root");

        let mut sink = document.resolve("root").expect("known target");
        sink.replace_children(Node::new("div"));
        assert_eq!(root.replacements(), 1);

        assert!(document.resolve("missing").is_none());
    }
}
