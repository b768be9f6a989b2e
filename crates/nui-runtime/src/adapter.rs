#![forbid(unsafe_code)]

//! Program adapter: a [`Program`] presented as a host UI component.
//!
//! A [`NativeComponent`] moves through three phases:
//!
//! ```text
//! Unmounted --mount()--> AwaitingModel --first render callback--> Ready
//!     ^                                                             |
//!     +------------------------------unmount()----------------------+
//! ```
//!
//! Mounting creates a fresh root [`EventScope`] and hands the program to the
//! runtime. Until the runtime publishes its first model, [`render`] yields
//! nothing. Afterwards every call renders `view(model)` from the root scope.
//!
//! [`render`]: NativeComponent::render

use std::fmt;
use std::rc::Rc;

use nui_core::{DispatchSlot, EventScope, Host, Rendered};
use tracing::{debug, trace_span};

use crate::program::Program;
use crate::runtime::{RenderCallback, Runtime, Shared};

/// Adapter errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    /// `mount` called on a mounted component.
    #[error("component `{name}` is already mounted")]
    AlreadyMounted {
        /// Component name from [`ProgramConfig`].
        name: String,
    },
    /// Operation needs a mounted component.
    #[error("component `{name}` is not mounted")]
    NotMounted {
        /// Component name from [`ProgramConfig`].
        name: String,
    },
}

/// Default component name.
pub const DEFAULT_COMPONENT_NAME: &str = "app";

/// Configuration for a [`NativeComponent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramConfig {
    /// Name used in logs and errors, and as the registration key.
    pub name: String,
    /// Log event payloads that fail to decode at `debug!` instead of `trace!`.
    pub log_decode_failures: bool,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_COMPONENT_NAME.to_owned(),
            log_decode_failures: false,
        }
    }
}

impl ProgramConfig {
    /// Set the component name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Raise decode-failure logging to `debug!`.
    #[must_use]
    pub fn with_decode_failure_logging(mut self, enabled: bool) -> Self {
        self.log_decode_failures = enabled;
        self
    }
}

/// Lifecycle phase of a [`NativeComponent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not mounted.
    Unmounted,
    /// Mounted; the runtime has not published a model yet.
    AwaitingModel,
    /// Mounted with a model.
    Ready,
}

struct Mount<Model> {
    shared: Rc<Shared<Model>>,
    root: Rc<EventScope>,
}

/// A [`Program`] driven by runtime `R`, rendered into host elements.
pub struct NativeComponent<P: Program, R> {
    program: Rc<P>,
    runtime: R,
    config: ProgramConfig,
    mount: Option<Mount<P::Model>>,
}

impl<P, R> NativeComponent<P, R>
where
    P: Program,
    R: Runtime<P>,
{
    /// An unmounted component.
    pub fn new(program: Rc<P>, runtime: R, config: ProgramConfig) -> Self {
        Self {
            program,
            runtime,
            config,
            mount: None,
        }
    }

    /// Create the root scope and start the runtime.
    pub fn mount(&mut self) -> Result<(), AdapterError> {
        if self.mount.is_some() {
            return Err(AdapterError::AlreadyMounted {
                name: self.config.name.clone(),
            });
        }

        let slot = DispatchSlot::new().with_decode_failure_logging(self.config.log_decode_failures);
        let root = EventScope::root(slot.clone());
        let shared = Shared::new(slot);
        self.mount = Some(Mount {
            shared: Rc::clone(&shared),
            root,
        });
        debug!(component = %self.config.name, "mounting");
        self.runtime
            .initialize(Rc::clone(&self.program), RenderCallback::new(shared));
        Ok(())
    }

    /// Stop the runtime and disconnect the last rendered tree.
    ///
    /// Handlers from earlier renders stay callable but deliver nothing.
    pub fn unmount(&mut self) -> Result<(), AdapterError> {
        let Some(mount) = self.mount.take() else {
            return Err(AdapterError::NotMounted {
                name: self.config.name.clone(),
            });
        };
        mount.shared.slot.clear();
        self.runtime.shutdown();
        debug!(component = %self.config.name, "unmounted");
        Ok(())
    }

    /// Render the current model, or `None` before the first model.
    ///
    /// Clears the [`needs_render`](Self::needs_render) flag.
    pub fn render<H>(&self, host: &H) -> Option<Rendered<H::Element>>
    where
        H: Host + ?Sized,
    {
        let mount = self.mount.as_ref()?;
        let model = mount.shared.model()?;
        let _span = trace_span!("nui.component.render", component = %self.config.name).entered();
        mount.shared.dirty.set(false);
        let view = self.program.view(&model);
        Some(nui_core::render(&view, &mount.root, host))
    }

    /// Like [`render`](Self::render), but fails when not mounted.
    pub fn try_render<H>(&self, host: &H) -> Result<Option<Rendered<H::Element>>, AdapterError>
    where
        H: Host + ?Sized,
    {
        if self.mount.is_none() {
            return Err(AdapterError::NotMounted {
                name: self.config.name.clone(),
            });
        }
        Ok(self.render(host))
    }

    /// Let a host-stepped runtime process pending work.
    pub fn pump(&mut self) -> bool {
        self.mount.is_some() && self.runtime.pump()
    }

    /// Whether a model was published since the last render.
    pub fn needs_render(&self) -> bool {
        self.mount.as_ref().is_some_and(|m| m.shared.dirty.get())
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        match &self.mount {
            None => Phase::Unmounted,
            Some(m) if m.shared.model.borrow().is_some() => Phase::Ready,
            Some(_) => Phase::AwaitingModel,
        }
    }

    /// Whether the component is mounted.
    pub fn is_mounted(&self) -> bool {
        self.mount.is_some()
    }

    /// Root scope of the current mount.
    pub fn root_scope(&self) -> Option<&Rc<EventScope>> {
        self.mount.as_ref().map(|m| &m.root)
    }

    /// Latest published model.
    pub fn model(&self) -> Option<Rc<P::Model>> {
        self.mount.as_ref().and_then(|m| m.shared.model())
    }

    /// The program.
    pub fn program(&self) -> &P {
        &self.program
    }

    /// The runtime.
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Mutably access the runtime.
    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    /// Configuration in use.
    pub fn config(&self) -> &ProgramConfig {
        &self.config
    }
}

impl<P: Program, R> Drop for NativeComponent<P, R> {
    fn drop(&mut self) {
        if let Some(mount) = self.mount.take() {
            mount.shared.slot.clear();
        }
    }
}

impl<P: Program, R> fmt::Debug for NativeComponent<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeComponent")
            .field("name", &self.config.name)
            .field("mounted", &self.mount.is_some())
            .finish_non_exhaustive()
    }
}

/// A mountable component with its program and runtime types erased.
///
/// Lets hosts keep components of different programs side by side.
pub trait Mountable<H: Host> {
    /// Component name.
    fn name(&self) -> &str;

    /// See [`NativeComponent::mount`].
    fn mount(&mut self) -> Result<(), AdapterError>;

    /// See [`NativeComponent::unmount`].
    fn unmount(&mut self) -> Result<(), AdapterError>;

    /// See [`NativeComponent::render`].
    fn render(&self, host: &H) -> Option<Rendered<H::Element>>;

    /// See [`NativeComponent::pump`].
    fn pump(&mut self) -> bool;

    /// See [`NativeComponent::needs_render`].
    fn needs_render(&self) -> bool;

    /// See [`NativeComponent::phase`].
    fn phase(&self) -> Phase;
}

impl<P, R, H> Mountable<H> for NativeComponent<P, R>
where
    P: Program,
    R: Runtime<P>,
    H: Host,
{
    fn name(&self) -> &str {
        &self.config.name
    }

    fn mount(&mut self) -> Result<(), AdapterError> {
        NativeComponent::mount(self)
    }

    fn unmount(&mut self) -> Result<(), AdapterError> {
        NativeComponent::unmount(self)
    }

    fn render(&self, host: &H) -> Option<Rendered<H::Element>> {
        NativeComponent::render(self, host)
    }

    fn pump(&mut self) -> bool {
        NativeComponent::pump(self)
    }

    fn needs_render(&self) -> bool {
        NativeComponent::needs_render(self)
    }

    fn phase(&self) -> Phase {
        NativeComponent::phase(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{Cmd, Dispatch};
    use nui_core::{Node, Props, text};
    use std::cell::RefCell;

    struct Greeter;

    impl Program for Greeter {
        type Model = String;
        type Message = String;

        fn init(&self) -> (String, Cmd<String>) {
            ("hello".to_owned(), Cmd::none())
        }

        fn update(&self, msg: String, _model: &String) -> (String, Cmd<String>) {
            (msg, Cmd::none())
        }

        fn view(&self, model: &String) -> Node<String> {
            text(model.clone())
        }
    }

    /// Runtime that keeps the callback and publishes only when told to.
    #[derive(Default)]
    struct Manual {
        callback: Option<RenderCallback<Greeter>>,
        shutdowns: usize,
        sent: Rc<RefCell<Vec<String>>>,
    }

    impl Manual {
        fn publish(&self, model: &str) {
            let sent = Rc::clone(&self.sent);
            let dispatch = Dispatch::new(move |m: String| sent.borrow_mut().push(m));
            if let Some(cb) = &self.callback {
                cb.render(&dispatch, Rc::new(model.to_owned()));
            }
        }
    }

    impl Runtime<Greeter> for Manual {
        fn initialize(&mut self, _program: Rc<Greeter>, callback: RenderCallback<Greeter>) {
            self.callback = Some(callback);
        }

        fn shutdown(&mut self) {
            self.shutdowns += 1;
            self.callback = None;
        }
    }

    struct TextHost;

    impl Host for TextHost {
        type Element = String;

        fn create_element(&self, tag: &str, _props: Props<String>) -> String {
            tag.to_owned()
        }
    }

    fn component() -> NativeComponent<Greeter, Manual> {
        NativeComponent::new(
            Rc::new(Greeter),
            Manual::default(),
            ProgramConfig::default().with_name("greeter"),
        )
    }

    #[test]
    fn phases_follow_mount_and_first_model() {
        let mut c = component();
        assert_eq!(c.phase(), Phase::Unmounted);
        c.mount().expect("mount");
        assert_eq!(c.phase(), Phase::AwaitingModel);
        assert!(c.render(&TextHost).is_none());
        assert!(!c.needs_render());

        c.runtime().publish("hi");
        assert_eq!(c.phase(), Phase::Ready);
        assert!(c.needs_render());
        assert_eq!(c.render(&TextHost).and_then(|r| r.as_text().map(str::to_owned)), Some("hi".to_owned()));
        assert!(!c.needs_render());
    }

    #[test]
    fn later_publishes_replace_model_only() {
        let mut c = component();
        c.mount().expect("mount");
        c.runtime().publish("one");
        let slot = c.root_scope().expect("mounted").slot().clone();
        assert!(slot.is_installed());
        c.runtime().publish("two");
        assert_eq!(c.model().as_deref().map(String::as_str), Some("two"));

        assert!(slot.deliver(nui_core::message::erase("typed".to_owned())));
        assert_eq!(*c.runtime().sent.borrow(), ["typed"]);
    }

    #[test]
    fn double_mount_is_an_error() {
        let mut c = component();
        c.mount().expect("mount");
        assert_eq!(
            c.mount(),
            Err(AdapterError::AlreadyMounted {
                name: "greeter".to_owned()
            })
        );
    }

    #[test]
    fn unmount_clears_slot_and_shuts_down() {
        let mut c = component();
        assert!(matches!(c.unmount(), Err(AdapterError::NotMounted { .. })));
        assert!(c.try_render(&TextHost).is_err());

        c.mount().expect("mount");
        c.runtime().publish("x");
        let slot = c.root_scope().expect("mounted").slot().clone();
        c.unmount().expect("unmount");
        assert!(!slot.is_installed());
        assert_eq!(c.runtime().shutdowns, 1);
        assert_eq!(c.phase(), Phase::Unmounted);
        assert!(!c.needs_render());

        // Remounting starts from a fresh root scope.
        c.mount().expect("remount");
        assert_eq!(c.phase(), Phase::AwaitingModel);
    }

    #[test]
    fn errors_name_the_component() {
        let err = AdapterError::NotMounted {
            name: "greeter".to_owned(),
        };
        assert_eq!(err.to_string(), "component `greeter` is not mounted");
    }
}
