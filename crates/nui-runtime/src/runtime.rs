#![forbid(unsafe_code)]

//! The contract between the program adapter and an application runtime.
//!
//! The adapter hands a runtime its [`Program`] and a [`RenderCallback`].
//! The runtime owns the update loop; every time it has a new model it calls
//! the callback with its dispatch handle and that model. The first call also
//! connects the adapter's root scope to the dispatch handle, so events fired
//! by the rendered tree reach the runtime.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use nui_core::DispatchSlot;
use nui_core::message::downcast;
use tracing::{debug, error};

use crate::program::{Dispatch, Program};

/// Drives a [`Program`] on behalf of a mounted component.
pub trait Runtime<P: Program> {
    /// Start `program`, reporting every new model through `callback`.
    fn initialize(&mut self, program: Rc<P>, callback: RenderCallback<P>);

    /// Stop the program. Called when the component unmounts.
    fn shutdown(&mut self) {}

    /// Process pending work for host-stepped runtimes.
    ///
    /// Returns whether anything happened. Runtimes with their own event loop
    /// keep the default.
    fn pump(&mut self) -> bool {
        false
    }
}

/// State shared between a mounted component and its render callback.
pub(crate) struct Shared<Model> {
    pub(crate) slot: DispatchSlot,
    pub(crate) model: RefCell<Option<Rc<Model>>>,
    pub(crate) dirty: Cell<bool>,
}

impl<Model> Shared<Model> {
    pub(crate) fn new(slot: DispatchSlot) -> Rc<Self> {
        Rc::new(Self {
            slot,
            model: RefCell::new(None),
            dirty: Cell::new(false),
        })
    }

    pub(crate) fn model(&self) -> Option<Rc<Model>> {
        self.model.borrow().clone()
    }
}

/// Callback a runtime uses to publish new models.
pub struct RenderCallback<P: Program> {
    shared: Rc<Shared<P::Model>>,
}

impl<P: Program> RenderCallback<P> {
    pub(crate) fn new(shared: Rc<Shared<P::Model>>) -> Self {
        Self { shared }
    }

    /// Publish `model`.
    ///
    /// The first call installs `dispatch` as the sink of the component's root
    /// scope; later calls only replace the stored model.
    pub fn render(&self, dispatch: &Dispatch<P::Message>, model: Rc<P::Model>) {
        let first = self.shared.model.borrow().is_none();
        if first {
            let dispatch = dispatch.clone();
            self.shared.slot.install(Rc::new(move |msg| match downcast::<P::Message>(msg) {
                Ok(msg) => dispatch.send(msg),
                Err(mismatch) => error!(error = %mismatch, "dispatched message has the wrong type"),
            }));
            debug!("dispatch sink installed");
        }
        *self.shared.model.borrow_mut() = Some(model);
        self.shared.dirty.set(true);
    }

    /// Whether a model has been published yet.
    pub fn has_model(&self) -> bool {
        self.shared.model.borrow().is_some()
    }
}

impl<P: Program> Clone for RenderCallback<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<P: Program> fmt::Debug for RenderCallback<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderCallback")
            .field("has_model", &self.has_model())
            .field("sink_installed", &self.shared.slot.is_installed())
            .finish()
    }
}
