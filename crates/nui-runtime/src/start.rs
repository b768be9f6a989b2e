#![forbid(unsafe_code)]

//! Startable components: zero-argument factories for app-entry registration.

use std::fmt;
use std::rc::Rc;

use nui_core::Host;

use crate::adapter::{Mountable, NativeComponent, ProgramConfig};
use crate::program::Program;
use crate::runtime::Runtime;
use crate::step::{StepConfig, StepRuntime};

/// Factory producing a fresh, unmounted component on every call.
pub type ComponentFactory<H> = Box<dyn Fn() -> Box<dyn Mountable<H>>>;

/// A program paired with a way to build its runtime.
///
/// [`start`](Self::start) can be called any number of times; each call
/// yields an independent [`NativeComponent`] with its own model and scopes.
pub struct Startable<P, R> {
    program: Rc<P>,
    make_runtime: Rc<dyn Fn() -> R>,
    config: ProgramConfig,
}

impl<P, R> Startable<P, R>
where
    P: Program,
    R: Runtime<P> + 'static,
{
    /// Pair `program` with a runtime factory.
    pub fn new<F>(program: P, make_runtime: F) -> Self
    where
        F: Fn() -> R + 'static,
    {
        Self {
            program: Rc::new(program),
            make_runtime: Rc::new(make_runtime),
            config: ProgramConfig::default(),
        }
    }

    /// Replace the component configuration.
    #[must_use]
    pub fn with_config(mut self, config: ProgramConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the component name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.config = self.config.with_name(name);
        self
    }

    /// A new unmounted component.
    pub fn start(&self) -> NativeComponent<P, R> {
        NativeComponent::new(
            Rc::clone(&self.program),
            (self.make_runtime)(),
            self.config.clone(),
        )
    }

    /// Component name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Erase into a factory for registration with an app entry.
    pub fn into_factory<H>(self) -> ComponentFactory<H>
    where
        H: Host + 'static,
    {
        Box::new(move || Box::new(self.start()) as Box<dyn Mountable<H>>)
    }
}

impl<P, R> Clone for Startable<P, R> {
    fn clone(&self) -> Self {
        Self {
            program: Rc::clone(&self.program),
            make_runtime: Rc::clone(&self.make_runtime),
            config: self.config.clone(),
        }
    }
}

impl<P, R> fmt::Debug for Startable<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Startable")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Wrap `app` as a startable component driven by a [`StepRuntime`].
pub fn program<P: Program>(app: P) -> Startable<P, StepRuntime<P>> {
    Startable::new(app, StepRuntime::new)
}

/// Like [`program`], with an explicit [`StepConfig`].
pub fn program_with<P: Program>(app: P, config: StepConfig) -> Startable<P, StepRuntime<P>> {
    Startable::new(app, move || StepRuntime::with_config(config.clone()))
}
