#![forbid(unsafe_code)]

//! The virtual node tree and its facts.
//!
//! A view function builds a fresh [`Node`] tree from the current model on
//! every render pass. Trees are immutable: constructors take ownership of
//! their facts and children and never mutate them afterwards.
//!
//! ```
//! use nui_core::decode;
//! use nui_core::node::{Node, node, on, property, style, text, void_node};
//! use serde_json::json;
//!
//! #[derive(Clone)]
//! enum Msg {
//!     Pressed,
//! }
//!
//! let view: Node<Msg> = node(
//!     "View",
//!     vec![style([("flex", json!(1))])],
//!     vec![
//!         text("Hello"),
//!         void_node(
//!             "Button",
//!             vec![property("title", "Press"), on("onPress", decode::succeed(Msg::Pressed))],
//!         ),
//!     ],
//! );
//! assert_eq!(view.tag(), Some("View"));
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::decode::{DecodeError, Decoder};
use crate::message::{AnyMessage, Tagger, erase};

/// Inline style declarations, keyed by style property.
pub type StyleMap = Map<String, Value>;

/// Erased decoder stored on an event fact.
pub type EventDecoder = Rc<dyn Fn(&Value) -> Result<AnyMessage, DecodeError>>;

/// Untyped node variants.
#[derive(Clone)]
pub enum NodeKind {
    /// Plain text content.
    Text(String),
    /// A named host component with facts and children.
    Component(Component),
    /// A subtree whose messages are remapped by `tagger`.
    Tagger(TaggerNode),
}

/// A host component declaration.
#[derive(Clone)]
pub struct Component {
    tag: String,
    facts: Vec<FactKind>,
    children: Vec<NodeKind>,
}

impl Component {
    /// Host component name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Facts in declaration order.
    pub fn facts(&self) -> &[FactKind] {
        &self.facts
    }

    /// Children in declaration order.
    pub fn children(&self) -> &[NodeKind] {
        &self.children
    }
}

/// A message-remapping wrapper around one child.
#[derive(Clone)]
pub struct TaggerNode {
    tagger: Tagger,
    child: Box<NodeKind>,
}

impl TaggerNode {
    /// Function applied to the child's messages.
    pub fn tagger(&self) -> &Tagger {
        &self.tagger
    }

    /// The wrapped subtree.
    pub fn child(&self) -> &NodeKind {
        &self.child
    }
}

/// Untyped fact variants.
#[derive(Clone)]
pub enum FactKind {
    /// Sets a named prop.
    Property {
        /// Prop name.
        name: String,
        /// Prop value.
        value: Value,
    },
    /// Sets the reserved `style` prop.
    Style(StyleMap),
    /// Sets a named prop to an event handler.
    Event {
        /// Event prop name (for example `onPress`).
        name: String,
        /// Payload decoder producing the subtree's message.
        decoder: EventDecoder,
    },
}

impl FactKind {
    /// Prop key this fact writes.
    pub fn key(&self) -> &str {
        match self {
            Self::Property { name, .. } | Self::Event { name, .. } => name,
            Self::Style(_) => crate::props::STYLE_KEY,
        }
    }
}

impl fmt::Debug for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property { name, value } => f
                .debug_struct("Property")
                .field("name", name)
                .field("value", value)
                .finish(),
            Self::Style(map) => f.debug_tuple("Style").field(map).finish(),
            Self::Event { name, .. } => f.debug_struct("Event").field("name", name).finish(),
        }
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Component(c) => f
                .debug_struct("Component")
                .field("tag", &c.tag)
                .field("facts", &c.facts)
                .field("children", &c.children)
                .finish(),
            Self::Tagger(t) => f
                .debug_struct("Tagger")
                .field("tagger", &t.tagger)
                .field("child", &t.child)
                .finish(),
        }
    }
}

/// A node producing messages of type `Msg`.
pub struct Node<Msg> {
    kind: NodeKind,
    _msg: PhantomData<fn() -> Msg>,
}

impl<Msg> Node<Msg> {
    fn from_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            _msg: PhantomData,
        }
    }

    /// The untyped node.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Consume into the untyped node.
    pub fn into_kind(self) -> NodeKind {
        self.kind
    }

    /// Component name, if this is a component node.
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Component(c) => Some(c.tag()),
            NodeKind::Text(_) | NodeKind::Tagger(_) => None,
        }
    }

    /// Remap every message this subtree produces with `f`.
    pub fn map<B, F>(self, f: F) -> Node<B>
    where
        Msg: 'static,
        B: 'static,
        F: Fn(Msg) -> B + 'static,
    {
        Node::from_kind(NodeKind::Tagger(TaggerNode {
            tagger: Tagger::new(f),
            child: Box::new(self.kind),
        }))
    }
}

impl<Msg> Clone for Node<Msg> {
    fn clone(&self) -> Self {
        Self::from_kind(self.kind.clone())
    }
}

impl<Msg> fmt::Debug for Node<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl<Msg> From<&str> for Node<Msg> {
    fn from(value: &str) -> Self {
        text(value)
    }
}

impl<Msg> From<String> for Node<Msg> {
    fn from(value: String) -> Self {
        text(value)
    }
}

/// A fact attached to a component producing messages of type `Msg`.
pub struct Fact<Msg> {
    kind: FactKind,
    _msg: PhantomData<fn() -> Msg>,
}

impl<Msg> Fact<Msg> {
    fn from_kind(kind: FactKind) -> Self {
        Self {
            kind,
            _msg: PhantomData,
        }
    }

    /// The untyped fact.
    pub fn kind(&self) -> &FactKind {
        &self.kind
    }
}

impl<Msg> Clone for Fact<Msg> {
    fn clone(&self) -> Self {
        Self::from_kind(self.kind.clone())
    }
}

impl<Msg> fmt::Debug for Fact<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

// --- Nodes -----------------------------------------------------------------

/// A plain text node.
pub fn text<Msg>(content: impl Into<String>) -> Node<Msg> {
    Node::from_kind(NodeKind::Text(content.into()))
}

/// A host component with facts and children.
pub fn node<Msg>(
    tag: impl Into<String>,
    facts: Vec<Fact<Msg>>,
    children: Vec<Node<Msg>>,
) -> Node<Msg> {
    Node::from_kind(NodeKind::Component(Component {
        tag: tag.into(),
        facts: facts.into_iter().map(|f| f.kind).collect(),
        children: children.into_iter().map(|c| c.kind).collect(),
    }))
}

/// A host component that never has children.
pub fn void_node<Msg>(tag: impl Into<String>, facts: Vec<Fact<Msg>>) -> Node<Msg> {
    node(tag, facts, Vec::new())
}

/// Remap every message `child` produces with `f`. Same as [`Node::map`].
pub fn map<A, B, F>(f: F, child: Node<A>) -> Node<B>
where
    A: 'static,
    B: 'static,
    F: Fn(A) -> B + 'static,
{
    child.map(f)
}

// --- Facts -----------------------------------------------------------------

/// Run `decoder` on the payload of event `name`; a successful decode
/// becomes the message.
pub fn on<Msg, D>(name: impl Into<String>, decoder: D) -> Fact<Msg>
where
    Msg: 'static,
    D: Decoder<Output = Msg> + 'static,
{
    let decoder: EventDecoder = Rc::new(move |payload: &Value| decoder.decode(payload).map(erase));
    Fact::from_kind(FactKind::Event {
        name: name.into(),
        decoder,
    })
}

/// Inline style declarations.
pub fn style<Msg, I, K, V>(entries: I) -> Fact<Msg>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    style_map(
        entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
    )
}

/// Inline style from an already built map.
pub fn style_map<Msg>(map: StyleMap) -> Fact<Msg> {
    Fact::from_kind(FactKind::Style(map))
}

/// Any other named prop.
pub fn property<Msg>(name: impl Into<String>, value: impl Into<Value>) -> Fact<Msg> {
    Fact::from_kind(FactKind::Property {
        name: name.into(),
        value: value.into(),
    })
}
