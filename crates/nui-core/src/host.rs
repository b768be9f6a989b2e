#![forbid(unsafe_code)]

//! The seam to the host UI component library.
//!
//! The renderer never knows which components exist. It asks a [`Host`] to
//! instantiate a component by name with the assembled props; what happens for
//! names the host does not know is the host's decision.

use std::collections::HashMap;
use std::fmt;

use crate::props::Props;

/// Instantiates named host components.
pub trait Host {
    /// Element type the host library produces.
    type Element;

    /// Create the component called `tag` with `props`.
    fn create_element(&self, tag: &str, props: Props<Self::Element>) -> Self::Element;
}

impl<H: Host + ?Sized> Host for &H {
    type Element = H::Element;

    fn create_element(&self, tag: &str, props: Props<Self::Element>) -> Self::Element {
        (**self).create_element(tag, props)
    }
}

/// Factory for one named component.
pub type Factory<E> = Box<dyn Fn(Props<E>) -> E>;

/// Factory used for names without a registered factory.
pub type FallbackFactory<E> = Box<dyn Fn(&str, Props<E>) -> E>;

/// A [`Host`] assembled from per-name factories.
///
/// ```
/// use nui_core::host::{ComponentRegistry, Host};
/// use nui_core::props::Props;
///
/// let registry = ComponentRegistry::new(|tag: &str, _props: Props<String>| format!("<unknown {tag}>"))
///     .with("View", |props: Props<String>| format!("<View {}>", props.len()));
///
/// assert_eq!(registry.create_element("View", Props::new()), "<View 0>");
/// assert_eq!(registry.create_element("Nope", Props::new()), "<unknown Nope>");
/// ```
pub struct ComponentRegistry<E> {
    factories: HashMap<String, Factory<E>>,
    fallback: FallbackFactory<E>,
}

impl<E> ComponentRegistry<E> {
    /// Empty registry using `fallback` for every unregistered name.
    pub fn new<F>(fallback: F) -> Self
    where
        F: Fn(&str, Props<E>) -> E + 'static,
    {
        Self {
            factories: HashMap::new(),
            fallback: Box::new(fallback),
        }
    }

    /// Register (or replace) the factory for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(Props<E>) -> E + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(Props<E>) -> E + 'static,
    {
        self.register(name, factory);
        self
    }

    /// Whether `name` has a registered factory.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<E> Host for ComponentRegistry<E> {
    type Element = E;

    fn create_element(&self, tag: &str, props: Props<E>) -> E {
        match self.factories.get(tag) {
            Some(factory) => factory(props),
            None => (self.fallback)(tag, props),
        }
    }
}

impl<E> fmt::Debug for ComponentRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ComponentRegistry<String> {
        ComponentRegistry::new(|tag: &str, _| format!("?{tag}"))
            .with("Text", |_| "text".to_owned())
            .with("View", |props: Props<String>| format!("view/{}", props.len()))
    }

    #[test]
    fn registered_names_use_their_factory() {
        let reg = registry();
        assert_eq!(reg.create_element("Text", Props::new()), "text");
        assert_eq!(reg.create_element("View", Props::new()), "view/0");
        assert_eq!(reg.names(), ["Text", "View"]);
        assert!(reg.contains("View"));
    }

    #[test]
    fn unknown_names_fall_back() {
        let reg = registry();
        assert_eq!(reg.create_element("Slider", Props::new()), "?Slider");
        assert!(!reg.contains("Slider"));
    }

    #[test]
    fn register_replaces_factory() {
        let mut reg = registry();
        reg.register("Text", |_| "replaced".to_owned());
        assert_eq!((&reg).create_element("Text", Props::new()), "replaced");
    }
}
