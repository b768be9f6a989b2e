#![forbid(unsafe_code)]

//! Event handler synthesis.
//!
//! For every event fact the renderer builds an [`EventHandler`] bound to the
//! fact's decoder and the [`EventScope`] the component was rendered in. When
//! the host fires the event:
//!
//! 1. the payload is decoded; a failure drops the event silently,
//! 2. the decoded message is translated through every scope up to the root,
//! 3. the root's dispatch slot hands the result to the application runtime.
//!
//! Handlers are rebuilt on every render pass, so each tree carries its own.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, error, trace};

use crate::decode::DecodeError;
use crate::message::MessageMismatch;
use crate::node::EventDecoder;
use crate::scope::EventScope;

/// What happened to one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    /// The translated message reached the dispatch sink.
    Delivered,
    /// The payload did not decode; nothing was dispatched.
    DecodeFailed(DecodeError),
    /// The message was translated but no sink is installed yet.
    NoSink,
    /// A tagger received a message type it was not built for.
    Mismatch(MessageMismatch),
}

impl Dispatched {
    /// Whether the message reached the sink.
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

struct Inner {
    event: String,
    decoder: EventDecoder,
    scope: Rc<EventScope>,
}

/// Callback placed into a component's props for one event.
///
/// Clones share the same callback; [`ptr_eq`](Self::ptr_eq) tells clones of
/// one handler apart from handlers built in another render pass.
#[derive(Clone)]
pub struct EventHandler {
    inner: Rc<Inner>,
}

impl EventHandler {
    /// Bind `decoder` for event `event` to `scope`.
    pub fn new(scope: Rc<EventScope>, event: impl Into<String>, decoder: EventDecoder) -> Self {
        Self {
            inner: Rc::new(Inner {
                event: event.into(),
                decoder,
                scope,
            }),
        }
    }

    /// Handle a raw event payload. Decode failures are dropped silently.
    pub fn call(&self, payload: &Value) {
        let _ = self.dispatch(payload);
    }

    /// Handle a raw event payload and report what happened.
    pub fn dispatch(&self, payload: &Value) -> Dispatched {
        let inner = &*self.inner;
        let msg = match (inner.decoder)(payload) {
            Ok(msg) => msg,
            Err(err) => {
                if inner.scope.slot().logs_decode_failures() {
                    debug!(event = %inner.event, error = %err, "event payload did not decode; dropped");
                } else {
                    trace!(event = %inner.event, error = %err, "event payload did not decode; dropped");
                }
                return Dispatched::DecodeFailed(err);
            }
        };

        match inner.scope.translate_and_deliver(msg) {
            Ok(true) => Dispatched::Delivered,
            Ok(false) => Dispatched::NoSink,
            Err(mismatch) => {
                error!(event = %inner.event, error = %mismatch, "message type mismatch in tagger chain");
                Dispatched::Mismatch(mismatch)
            }
        }
    }

    /// Event prop name this handler was built for.
    pub fn event_name(&self) -> &str {
        &self.inner.event
    }

    /// Scope the handler dispatches from.
    pub fn scope(&self) -> &Rc<EventScope> {
        &self.inner.scope
    }

    /// Whether both handles refer to the same callback.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("event", &self.inner.event)
            .field("scope_depth", &self.inner.scope.depth())
            .finish()
    }
}
