//! Render nodes and the node builder
//!
//! A [`Node`] is a plain, owned description of one UI element: a tag, an
//! optional styling class, ordered attributes, ordered event handlers and
//! ordered children. Nodes carry no identity between passes; every refresh
//! builds a fresh tree and hands it to the [`TreeSink`](crate::sink::TreeSink)
//! wholesale.
//!
//! # Example
//!
//! ```rust
//! use kindling_core::node::{build_node, Node, Prop};
//!
//! let mut root = build_node(
//!     "div",
//!     [
//!         ("className", Prop::attr("TodoApp")),
//!         ("onclick", Prop::handler(|_| println!("clicked"))),
//!     ],
//! );
//! root.add("hello");
//! root.add(Node::new("span"));
//!
//! assert_eq!(root.children().len(), 2);
//! assert!(root.handler("click").is_some());
//! ```

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

/// Config keys starting with this prefix bind an event handler
pub const EVENT_PREFIX: &str = "on";

/// Config key that sets the styling class
pub const CLASS_KEY: &str = "className";

/// Callback bound to a node event
///
/// Uses Rc since the runtime is single-threaded.
pub type EventHandler = Rc<dyn Fn(&Event)>;

/// Event delivered to a node handler
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Event {
    /// Event name without the `on` prefix (`click`, `keyup`, ...)
    pub kind: String,
    /// Key code for keyboard events
    pub key: Option<String>,
    /// Current value of the target element, for inputs
    pub value: Option<String>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn click() -> Self {
        Self::new("click")
    }

    /// Keyup event carrying the pressed key and the input's value
    pub fn key_up(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: "keyup".to_string(),
            key: Some(key.into()),
            value: Some(value.into()),
        }
    }
}

// ============================================================================
// Builder configuration
// ============================================================================

/// A single configuration value for [`build_node`]
#[derive(Clone)]
pub enum Prop {
    /// Attribute value (or the styling class under [`CLASS_KEY`])
    Attr(String),
    /// Event handler
    Handler(EventHandler),
}

impl Prop {
    pub fn attr(value: impl Into<String>) -> Self {
        Prop::Attr(value.into())
    }

    pub fn handler(f: impl Fn(&Event) + 'static) -> Self {
        Prop::Handler(Rc::new(f))
    }
}

impl From<&str> for Prop {
    fn from(value: &str) -> Self {
        Prop::Attr(value.to_string())
    }
}

impl From<String> for Prop {
    fn from(value: String) -> Self {
        Prop::Attr(value)
    }
}

impl fmt::Debug for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prop::Attr(value) => f.debug_tuple("Attr").field(value).finish(),
            Prop::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

// ============================================================================
// Node
// ============================================================================

/// A child of a node: either a nested element or a text leaf
#[derive(Clone, Debug)]
pub enum Child {
    Element(Node),
    Text(String),
}

impl Child {
    pub fn as_element(&self) -> Option<&Node> {
        match self {
            Child::Element(node) => Some(node),
            Child::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Child::Element(_) => None,
            Child::Text(text) => Some(text),
        }
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Element(node)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

/// An element produced by a render pass
#[derive(Clone, Default)]
pub struct Node {
    tag: String,
    class_name: Option<String>,
    attributes: IndexMap<String, String>,
    handlers: IndexMap<String, EventHandler>,
    children: Vec<Child>,
}

/// Build a node from a tag and a declarative configuration
///
/// Keys are interpreted as follows:
/// - [`CLASS_KEY`] with an attribute value sets the styling class
/// - a handler under a key starting with [`EVENT_PREFIX`] binds the event
///   named by the rest of the key (`onclick` binds `click`)
/// - a handler under any other key binds the event named by the key
/// - anything else becomes a generic attribute
pub fn build_node<K, I>(tag: &str, config: I) -> Node
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Prop)>,
{
    let mut node = Node::new(tag);
    for (key, prop) in config {
        let key = key.into();
        match prop {
            Prop::Handler(handler) => {
                let event = key
                    .strip_prefix(EVENT_PREFIX)
                    .filter(|event| !event.is_empty())
                    .unwrap_or(key.as_str())
                    .to_string();
                node.handlers.insert(event, handler);
            }
            Prop::Attr(value) if key == CLASS_KEY => node.class_name = Some(value),
            Prop::Attr(value) => {
                node.attributes.insert(key, value);
            }
        }
    }
    node
}

impl Node {
    /// Create an empty node with the given tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Append a child element or text leaf, preserving insertion order
    pub fn add(&mut self, child: impl Into<Child>) {
        self.children.push(child.into());
    }

    // =========================================================================
    // Fluent builders
    // =========================================================================

    /// Set the styling class
    pub fn class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Set a generic attribute
    pub fn attr(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.insert(name.into(), value.to_string());
        self
    }

    /// Bind a handler to the named event (without the `on` prefix)
    pub fn on(mut self, event: impl Into<String>, f: impl Fn(&Event) + 'static) -> Self {
        self.handlers.insert(event.into(), Rc::new(f));
        self
    }

    /// Append a child
    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.add(child);
        self
    }

    /// Append several children in order
    pub fn children_from<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Child>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Attributes in insertion order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Handler bound to the named event
    pub fn handler(&self, event: &str) -> Option<EventHandler> {
        self.handlers.get(event).cloned()
    }

    /// Names of bound events in binding order
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Element children, skipping text leaves
    pub fn child_elements(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(Child::as_element)
    }

    /// Concatenated text of this node and all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Child::Text(text) => out.push_str(text),
                Child::Element(node) => node.collect_text(out),
            }
        }
    }

    /// All nodes (including `self`) with the given class, in document order
    pub fn find_all_by_class(&self, class_name: &str) -> Vec<&Node> {
        let mut found = Vec::new();
        self.collect_by_class(class_name, &mut found);
        found
    }

    fn collect_by_class<'a>(&'a self, class_name: &str, found: &mut Vec<&'a Node>) {
        if self.class_name() == Some(class_name) {
            found.push(self);
        }
        for node in self.child_elements() {
            node.collect_by_class(class_name, found);
        }
    }

    /// Invoke the handler bound to `event.kind`, returning whether one ran
    pub fn dispatch(&self, event: &Event) -> bool {
        match self.handler(&event.kind) {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("tag", &self.tag)
            .field("class_name", &self.class_name)
            .field("attributes", &self.attributes)
            .field("events", &self.handlers.keys().collect::<Vec<_>>())
            .field("children", &self.children)
            .finish()
    }
}

/// HTML-like markup; handlers are not rendered
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        if let Some(class_name) = &self.class_name {
            write!(f, " class=\"{}\"", escape(class_name))?;
        }
        for (name, value) in &self.attributes {
            write!(f, " {}=\"{}\"", name, escape(value))?;
        }
        f.write_str(">")?;
        for child in &self.children {
            match child {
                Child::Element(node) => write!(f, "{node}")?,
                Child::Text(text) => f.write_str(&escape(text))?,
            }
        }
        write!(f, "</{}>", self.tag)
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_build_node_class_handler_and_children() {
        let clicks = Rc::new(Cell::new(0));
        let clicks_clone = clicks.clone();

        let mut div = build_node(
            "div",
            [
                ("className", Prop::attr("X")),
                (
                    "onclick",
                    Prop::handler(move |_| clicks_clone.set(clicks_clone.get() + 1)),
                ),
            ],
        );
        div.add("hello");
        div.add(Node::new("span"));

        assert_eq!(div.tag(), "div");
        assert_eq!(div.class_name(), Some("X"));
        assert_eq!(div.attributes().count(), 0);

        let children = div.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].as_text(), Some("hello"));
        assert_eq!(children[1].as_element().map(Node::tag), Some("span"));

        assert!(div.dispatch(&Event::click()));
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn test_unrecognized_keys_become_attributes() {
        let input = build_node(
            "input",
            [
                ("type", Prop::from("text")),
                ("maxlength", Prop::from("50")),
                ("placeholder", Prop::from("What do you need to do?")),
            ],
        );

        let attrs: Vec<_> = input.attributes().collect();
        assert_eq!(
            attrs,
            vec![
                ("type", "text"),
                ("maxlength", "50"),
                ("placeholder", "What do you need to do?"),
            ]
        );
        assert_eq!(input.class_name(), None);
    }

    #[test]
    fn test_handler_key_without_prefix_binds_key_as_event() {
        let node = build_node("div", [("keyup", Prop::handler(|_| {}))]);
        assert!(node.handler("keyup").is_some());

        // a bare "on" key has no event name to strip to
        let node = build_node("div", [("on", Prop::handler(|_| {}))]);
        assert!(node.handler("on").is_some());
    }

    #[test]
    fn test_attr_under_event_prefix_stays_attribute() {
        let node = build_node("div", [("one", Prop::from("1"))]);
        assert_eq!(node.attribute("one"), Some("1"));
        assert_eq!(node.events().count(), 0);
    }

    #[test]
    fn test_dispatch_without_handler() {
        let node = Node::new("div");
        assert!(!node.dispatch(&Event::click()));
    }

    #[test]
    fn test_find_all_by_class_in_document_order() {
        let tree = Node::new("div")
            .class("List")
            .child(Node::new("div").class("Item").child("a"))
            .child(
                Node::new("div")
                    .class("Group")
                    .child(Node::new("div").class("Item").child("b")),
            )
            .child(Node::new("div").class("Item").child("c"));

        let texts: Vec<_> = tree
            .find_all_by_class("Item")
            .into_iter()
            .map(Node::text_content)
            .collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_display_markup() {
        let node = Node::new("div")
            .class("TodoListItem")
            .attr("data-index", 0)
            .on("click", |_| {})
            .child(Node::new("img").attr("src", "checked.png"))
            .child(" Eat <dinner> & rest");

        assert_eq!(
            node.to_string(),
            "<div class=\"TodoListItem\" data-index=\"0\"><img src=\"checked.png\"></img> Eat &lt;dinner&gt; &amp; rest</div>"
        );
    }
}
