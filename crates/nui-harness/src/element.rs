#![forbid(unsafe_code)]

//! Elements produced by the [`RecordingHost`](crate::host::RecordingHost).

use std::fmt;

use nui_core::{Children, Dispatched, EventHandler, PropValue, Props, Rendered, StyleMap};
use serde_json::{Map, Value};

use crate::HarnessError;

/// Placeholder written into snapshots for event handler props.
pub const HANDLER_PLACEHOLDER: &str = "<handler>";

/// One instantiated host component: its tag and the props it received.
pub struct Element {
    tag: String,
    props: Props<Element>,
}

impl Element {
    /// Element for `tag` with `props`.
    pub fn new(tag: impl Into<String>, props: Props<Element>) -> Self {
        Self {
            tag: tag.into(),
            props,
        }
    }

    /// Component name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Props as assembled by the renderer.
    pub fn props(&self) -> &Props<Element> {
        &self.props
    }

    /// Plain value prop `key`.
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key).and_then(PropValue::as_value)
    }

    /// The style prop.
    pub fn style(&self) -> Option<&StyleMap> {
        self.props.style()
    }

    /// Handler for `event`.
    pub fn handler(&self, event: &str) -> Option<&EventHandler> {
        self.props.handler(event)
    }

    /// Rendered children in order; empty when the children field is absent.
    pub fn children(&self) -> impl Iterator<Item = &Rendered<Element>> {
        self.props.children().into_iter().flat_map(Children::iter)
    }

    /// Child elements, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children().filter_map(Rendered::as_element)
    }

    /// First element, depth first and including `self`, matching `pred`.
    pub fn find_by<F>(&self, pred: F) -> Option<&Element>
    where
        F: Fn(&Element) -> bool + Copy,
    {
        if pred(self) {
            return Some(self);
        }
        self.child_elements().find_map(|child| child.find_by(pred))
    }

    /// First element tagged `tag`, depth first and including `self`.
    pub fn find(&self, tag: &str) -> Option<&Element> {
        self.find_by(|el| el.tag == tag)
    }

    /// Every element tagged `tag`, in document order.
    pub fn find_all(&self, tag: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect(tag, &mut out);
        out
    }

    fn collect<'a>(&'a self, tag: &str, out: &mut Vec<&'a Element>) {
        if self.tag == tag {
            out.push(self);
        }
        for child in self.child_elements() {
            child.collect(tag, out);
        }
    }

    /// Fire `event` on this element with `payload`.
    pub fn fire(&self, event: &str, payload: &Value) -> Result<Dispatched, HarnessError> {
        let handler = self.handler(event).ok_or_else(|| HarnessError::NoHandler {
            tag: self.tag.clone(),
            event: event.to_owned(),
        })?;
        Ok(handler.dispatch(payload))
    }

    /// Concatenated text of every text node below this element.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        for child in self.children() {
            match child {
                Rendered::Text(text) => out.push_str(text),
                Rendered::Element(el) => el.push_text(out),
            }
        }
    }

    /// JSON snapshot of this element and its subtree.
    ///
    /// Handlers appear as [`HANDLER_PLACEHOLDER`]. The `children` key is
    /// absent for childless elements, holds the child itself for one child
    /// and an array otherwise.
    pub fn to_json(&self) -> Value {
        let mut props = Map::new();
        for (key, value) in self.props.iter() {
            let json = match value {
                PropValue::Value(v) => v.clone(),
                PropValue::Style(style) => Value::Object(style.clone()),
                PropValue::Handler(_) => Value::String(HANDLER_PLACEHOLDER.to_owned()),
            };
            props.insert(key.to_owned(), json);
        }

        let mut out = Map::new();
        out.insert("tag".to_owned(), Value::String(self.tag.clone()));
        out.insert("props".to_owned(), Value::Object(props));
        match self.props.children() {
            None => {}
            Some(Children::Single(only)) => {
                out.insert("children".to_owned(), rendered_to_json(only));
            }
            Some(Children::List(list)) => {
                let list = list.iter().map(rendered_to_json).collect();
                out.insert("children".to_owned(), Value::Array(list));
            }
        }
        Value::Object(out)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag)
            .field("props", &self.props)
            .finish()
    }
}

/// JSON snapshot of a rendered node: text becomes a string, elements use
/// [`Element::to_json`].
pub fn rendered_to_json(rendered: &Rendered<Element>) -> Value {
    match rendered {
        Rendered::Text(text) => Value::String(text.clone()),
        Rendered::Element(el) => el.to_json(),
    }
}

/// First element tagged `tag` in a rendered tree.
pub fn find<'a>(rendered: &'a Rendered<Element>, tag: &str) -> Option<&'a Element> {
    rendered.as_element()?.find(tag)
}

/// Text of a rendered tree.
pub fn text_content(rendered: &Rendered<Element>) -> String {
    match rendered {
        Rendered::Text(text) => text.clone(),
        Rendered::Element(el) => el.text_content(),
    }
}
