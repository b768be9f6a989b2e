#![forbid(unsafe_code)]

//! App entry stand-in: named component factories and a driver that mounts
//! one, renders it into a [`RecordingHost`] and fires events at it.

use std::collections::BTreeMap;
use std::fmt;

use nui_core::{Dispatched, Rendered};
use nui_runtime::{ComponentFactory, Mountable, Program, Runtime, Startable};
use serde_json::Value;
use tracing::{debug, info};

use crate::HarnessError;
use crate::element::{Element, rendered_to_json};
use crate::host::RecordingHost;

/// Upper bound on pump rounds in [`AppDriver::settle`].
pub const MAX_SETTLE_ROUNDS: usize = 64;

/// Registry of startable components by name.
pub struct AppRegistry {
    factories: BTreeMap<String, ComponentFactory<RecordingHost>>,
}

impl AppRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register (or replace) the factory for `name`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: ComponentFactory<RecordingHost>,
    ) -> &mut Self {
        let name = name.into();
        debug!(app = %name, "app registered");
        self.factories.insert(name, factory);
        self
    }

    /// Register `startable` under its configured name.
    pub fn register_startable<P, R>(&mut self, startable: Startable<P, R>) -> &mut Self
    where
        P: Program,
        R: Runtime<P> + 'static,
    {
        let name = startable.name().to_owned();
        self.register(name, startable.into_factory())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Create and mount a fresh instance of `name`.
    pub fn run(&self, name: &str) -> Result<Box<dyn Mountable<RecordingHost>>, HarnessError> {
        let factory = self.factories.get(name).ok_or_else(|| HarnessError::UnknownApp {
            name: name.to_owned(),
        })?;
        let mut component = factory();
        component.mount()?;
        info!(app = name, "app started");
        Ok(component)
    }

    /// Run `name` under an [`AppDriver`].
    pub fn launch(&self, name: &str) -> Result<AppDriver, HarnessError> {
        let component = self.run(name)?;
        let mut driver = AppDriver::new(component, RecordingHost::new());
        driver.render();
        Ok(driver)
    }
}

impl Default for AppRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AppRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppRegistry")
            .field("apps", &self.names())
            .finish()
    }
}

/// Drives one mounted component against a [`RecordingHost`].
pub struct AppDriver {
    component: Box<dyn Mountable<RecordingHost>>,
    host: RecordingHost,
    tree: Option<Rendered<Element>>,
    renders: usize,
}

impl AppDriver {
    /// Drive an already mounted `component`.
    pub fn new(component: Box<dyn Mountable<RecordingHost>>, host: RecordingHost) -> Self {
        Self {
            component,
            host,
            tree: None,
            renders: 0,
        }
    }

    /// Render the component and keep the tree. Returns whether a tree was
    /// produced.
    pub fn render(&mut self) -> bool {
        self.tree = self.component.render(&self.host);
        if self.tree.is_some() {
            self.renders += 1;
        }
        self.tree.is_some()
    }

    /// Pump the runtime until it is idle, then re-render if a new model was
    /// published. Returns the number of productive pump rounds.
    pub fn settle(&mut self) -> usize {
        let mut rounds = 0;
        while rounds < MAX_SETTLE_ROUNDS && self.component.pump() {
            rounds += 1;
        }
        if self.component.needs_render() {
            self.render();
        }
        rounds
    }

    /// Fire `event` on the first `tag` element of the current tree, then
    /// settle.
    pub fn fire(
        &mut self,
        tag: &str,
        event: &str,
        payload: &Value,
    ) -> Result<Dispatched, HarnessError> {
        let element = self
            .element(tag)
            .ok_or_else(|| HarnessError::ElementNotFound { tag: tag.to_owned() })?;
        let outcome = element.fire(event, payload)?;
        self.settle();
        Ok(outcome)
    }

    /// Fire a payload-less press (`onPress` with `null`).
    pub fn press(&mut self, tag: &str) -> Result<Dispatched, HarnessError> {
        self.fire(tag, "onPress", &Value::Null)
    }

    /// First `tag` element of the current tree.
    pub fn element(&self, tag: &str) -> Option<&Element> {
        self.tree.as_ref()?.as_element()?.find(tag)
    }

    /// Current tree, if one has been rendered.
    pub fn tree(&self) -> Option<&Rendered<Element>> {
        self.tree.as_ref()
    }

    /// Text of the current tree.
    pub fn text(&self) -> String {
        self.tree
            .as_ref()
            .map(crate::element::text_content)
            .unwrap_or_default()
    }

    /// JSON snapshot of the current tree.
    pub fn snapshot(&self) -> Option<Value> {
        self.tree.as_ref().map(rendered_to_json)
    }

    /// Number of renders that produced a tree.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// The host elements are created with.
    pub fn host(&self) -> &RecordingHost {
        &self.host
    }

    /// The driven component.
    pub fn component(&self) -> &dyn Mountable<RecordingHost> {
        &*self.component
    }

    /// Unmount the component and drop the current tree.
    pub fn stop(&mut self) -> Result<(), HarnessError> {
        self.tree = None;
        self.component.unmount()?;
        info!(app = self.component.name(), "app stopped");
        Ok(())
    }
}

impl fmt::Debug for AppDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppDriver")
            .field("app", &self.component.name())
            .field("phase", &self.component.phase())
            .field("renders", &self.renders)
            .finish()
    }
}
