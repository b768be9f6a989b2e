#![forbid(unsafe_code)]

//! Props handed to host components, and the rendered output shape.

use std::fmt;

use serde_json::Value;

use crate::handler::EventHandler;
use crate::node::StyleMap;

/// Reserved prop key written by style facts.
pub const STYLE_KEY: &str = "style";

/// Reserved prop key carrying rendered children.
pub const CHILDREN_KEY: &str = "children";

/// Value of one named prop.
#[derive(Clone)]
pub enum PropValue {
    /// Plain data.
    Value(Value),
    /// Inline style declarations.
    Style(StyleMap),
    /// Event callback.
    Handler(EventHandler),
}

impl PropValue {
    /// The data value, if this is plain data.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Style(_) | Self::Handler(_) => None,
        }
    }

    /// The style map, if this is a style.
    pub fn as_style(&self) -> Option<&StyleMap> {
        match self {
            Self::Style(s) => Some(s),
            Self::Value(_) | Self::Handler(_) => None,
        }
    }

    /// The handler, if this is an event callback.
    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            Self::Handler(h) => Some(h),
            Self::Value(_) | Self::Style(_) => None,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Style(s) => f.debug_tuple("Style").field(s).finish(),
            Self::Handler(h) => f.debug_tuple("Handler").field(h).finish(),
        }
    }
}

/// Output of rendering one node.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered<E> {
    /// Raw text content.
    Text(String),
    /// A host element instance.
    Element(E),
}

impl<E> Rendered<E> {
    /// The text, if this is text content.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::Element(_) => None,
        }
    }

    /// The element, if this is a host element.
    pub fn as_element(&self) -> Option<&E> {
        match self {
            Self::Element(e) => Some(e),
            Self::Text(_) => None,
        }
    }
}

/// Rendered children attached to a component.
#[derive(Debug, Clone, PartialEq)]
pub enum Children<E> {
    /// Exactly one child, assigned directly.
    Single(Box<Rendered<E>>),
    /// Two or more children in source order.
    List(Vec<Rendered<E>>),
}

impl<E> Children<E> {
    /// Apply the arity rule: none for zero, direct for one, list otherwise.
    pub fn from_rendered(mut rendered: Vec<Rendered<E>>) -> Option<Self> {
        match rendered.len() {
            0 => None,
            1 => rendered.pop().map(|only| Self::Single(Box::new(only))),
            _ => Some(Self::List(rendered)),
        }
    }

    /// Children in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rendered<E>> {
        match self {
            Self::Single(only) => std::slice::from_ref(&**only).iter(),
            Self::List(all) => all.iter(),
        }
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::List(all) => all.len(),
        }
    }

    /// Always false: empty children are represented by `None`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Props assembled from a component's facts.
///
/// Keys keep first-insertion order; setting an existing key replaces its
/// value in place, so later facts win.
pub struct Props<E> {
    fields: Vec<(String, PropValue)>,
    children: Option<Children<E>>,
}

impl<E> Default for Props<E> {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            children: None,
        }
    }
}

impl<E> Props<E> {
    /// Empty props.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing any earlier value.
    pub fn set(&mut self, key: impl Into<String>, value: PropValue) {
        let key = key.into();
        match self.fields.iter().position(|(k, _)| *k == key) {
            Some(idx) => self.fields[idx].1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Remove and return the value under `key`.
    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        let idx = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(idx).1)
    }

    /// Whether `key` is set.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The style prop, if any.
    pub fn style(&self) -> Option<&StyleMap> {
        self.get(STYLE_KEY).and_then(PropValue::as_style)
    }

    /// The handler stored under `key`, if any.
    pub fn handler(&self, key: &str) -> Option<&EventHandler> {
        self.get(key).and_then(PropValue::as_handler)
    }

    /// Keys in insertion order (children not included).
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of named fields (children not included).
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether there are no named fields and no children.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.children.is_none()
    }

    /// Attach rendered children using the arity rule. A plain `children`
    /// field is overridden when at least one child exists.
    pub fn set_children(&mut self, rendered: Vec<Rendered<E>>) {
        self.children = Children::from_rendered(rendered);
        if self.children.is_some() {
            self.remove(CHILDREN_KEY);
        }
    }

    /// Rendered children, `None` when there were none.
    pub fn children(&self) -> Option<&Children<E>> {
        self.children.as_ref()
    }

    /// Take the children out, leaving none.
    pub fn take_children(&mut self) -> Option<Children<E>> {
        self.children.take()
    }
}

impl<E: fmt::Debug> fmt::Debug for Props<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in &self.fields {
            map.entry(k, v);
        }
        if let Some(children) = &self.children {
            map.entry(&CHILDREN_KEY, children);
        }
        map.finish()
    }
}
