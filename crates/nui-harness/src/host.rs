#![forbid(unsafe_code)]

//! A [`Host`] that builds inspectable [`Element`]s and records every
//! component it was asked to create.

use std::cell::RefCell;
use std::collections::BTreeSet;

use nui_core::{Host, PropValue, Props};
use serde_json::Value;
use tracing::warn;

use crate::element::Element;

/// Tag given to elements created for names outside a strict host's set.
pub const UNKNOWN_TAG: &str = "Unknown";

/// Test host producing [`Element`] values.
///
/// By default every component name is accepted. A strict host built with
/// [`with_components`](Self::with_components) turns unknown names into an
/// [`UNKNOWN_TAG`] element whose `name` prop holds the requested name.
#[derive(Debug, Default)]
pub struct RecordingHost {
    known: Option<BTreeSet<String>>,
    created: RefCell<Vec<String>>,
}

impl RecordingHost {
    /// Host accepting every component name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Host accepting only `names`.
    pub fn with_components<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: Some(names.into_iter().map(Into::into).collect()),
            created: RefCell::default(),
        }
    }

    /// Names requested so far, in creation order (children before parents).
    pub fn created(&self) -> Vec<String> {
        self.created.borrow().clone()
    }

    /// How many `tag` components were requested.
    pub fn count(&self, tag: &str) -> usize {
        self.created.borrow().iter().filter(|t| *t == tag).count()
    }

    /// Forget the recorded requests.
    pub fn clear(&self) {
        self.created.borrow_mut().clear();
    }

    fn accepts(&self, tag: &str) -> bool {
        self.known.as_ref().is_none_or(|known| known.contains(tag))
    }
}

impl Host for RecordingHost {
    type Element = Element;

    fn create_element(&self, tag: &str, mut props: Props<Element>) -> Element {
        self.created.borrow_mut().push(tag.to_owned());
        if self.accepts(tag) {
            return Element::new(tag, props);
        }
        warn!(component = tag, "unknown component");
        props.set("name", PropValue::Value(Value::String(tag.to_owned())));
        Element::new(UNKNOWN_TAG, props)
    }
}
