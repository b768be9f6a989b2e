#![forbid(unsafe_code)]

//! Program definition: model, messages and commands.
//!
//! A [`Program`] is the Elm-style description of an application: `init`
//! builds the first model, `update` computes the next model for a message,
//! `subscriptions` declares ongoing message sources and `view` turns a model
//! into a [`Node`] tree. Side effects are requested through [`Cmd`] values
//! and carried out by whichever [`Runtime`](crate::runtime::Runtime) drives
//! the program.
//!
//! # Example
//!
//! ```
//! use nui_core::{Node, decode, node, on, text};
//! use nui_runtime::program::{Cmd, Program};
//!
//! struct Counter;
//!
//! #[derive(Debug, Clone)]
//! enum Msg {
//!     Increment,
//! }
//!
//! impl Program for Counter {
//!     type Model = i64;
//!     type Message = Msg;
//!
//!     fn init(&self) -> (i64, Cmd<Msg>) {
//!         (0, Cmd::none())
//!     }
//!
//!     fn update(&self, msg: Msg, model: &i64) -> (i64, Cmd<Msg>) {
//!         match msg {
//!             Msg::Increment => (model + 1, Cmd::none()),
//!         }
//!     }
//!
//!     fn view(&self, model: &i64) -> Node<Msg> {
//!         node(
//!             "Button",
//!             vec![on("onPress", decode::succeed(Msg::Increment))],
//!             vec![text(model.to_string())],
//!         )
//!     }
//! }
//! ```

use std::fmt;
use std::rc::Rc;

use nui_core::Node;

use crate::subscription::Subscription;

/// An application in the model / update / view shape.
pub trait Program: 'static {
    /// Application state.
    type Model: 'static;

    /// Messages produced by the view and by subscriptions.
    type Message: 'static;

    /// First model and startup commands.
    fn init(&self) -> (Self::Model, Cmd<Self::Message>);

    /// Next model for `msg`, plus commands to run.
    fn update(&self, msg: Self::Message, model: &Self::Model) -> (Self::Model, Cmd<Self::Message>);

    /// Message sources active for `model`.
    ///
    /// Called after every batch of updates. The runtime compares the
    /// returned set (by [`SubId`](crate::subscription::SubId)) with the running
    /// one, keeps matching subscriptions, starts new ones and drops the rest.
    fn subscriptions(&self, _model: &Self::Model) -> Vec<Box<dyn Subscription<Self::Message>>> {
        Vec::new()
    }

    /// The UI tree for `model`.
    fn view(&self, model: &Self::Model) -> Node<Self::Message>;
}

/// Side effects requested by `init` and `update`.
pub enum Cmd<M> {
    /// No operation.
    None,
    /// Execute commands as a batch, in no guaranteed order.
    ///
    /// [`StepRuntime`](crate::StepRuntime) runs everything synchronously, so
    /// there a batch behaves exactly like a [`Sequence`](Self::Sequence).
    /// A runtime with concurrent tasks may interleave batch members.
    Batch(Vec<Cmd<M>>),
    /// Execute commands one after the other, in order.
    Sequence(Vec<Cmd<M>>),
    /// Feed a message back into `update`.
    Msg(M),
    /// Run a closure and feed its result into `update`.
    ///
    /// There are no worker threads: runtimes in this crate run tasks
    /// synchronously on the UI thread.
    Task(Box<dyn FnOnce() -> M>),
    /// Emit a log line through `tracing`.
    Log(String),
}

impl<M> Default for Cmd<M> {
    fn default() -> Self {
        Self::None
    }
}

impl<M: fmt::Debug> fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Sequence(cmds) => f.debug_tuple("Sequence").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Task(_) => write!(f, "Task(..)"),
            Self::Log(s) => f.debug_tuple("Log").field(s).finish(),
        }
    }
}

impl<M> Cmd<M> {
    /// Create a no-op command.
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    /// Create a message command.
    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Create a log command.
    #[inline]
    pub fn log(msg: impl Into<String>) -> Self {
        Self::Log(msg.into())
    }

    /// Create a batch of commands.
    pub fn batch(cmds: Vec<Self>) -> Self {
        Self::collapse(cmds, Self::Batch)
    }

    /// Create a sequence of commands.
    pub fn sequence(cmds: Vec<Self>) -> Self {
        Self::collapse(cmds, Self::Sequence)
    }

    fn collapse(mut cmds: Vec<Self>, wrap: fn(Vec<Self>) -> Self) -> Self {
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => wrap(cmds),
        }
    }

    /// Create a task command.
    pub fn task<F>(f: F) -> Self
    where
        F: FnOnce() -> M + 'static,
    {
        Self::Task(Box::new(f))
    }

    /// Return a stable name for tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Batch(_) => "Batch",
            Self::Sequence(_) => "Sequence",
            Self::Msg(_) => "Msg",
            Self::Task(_) => "Task",
            Self::Log(_) => "Log",
        }
    }

    /// Count the number of atomic commands in this command.
    ///
    /// Returns 0 for None, 1 for atomic commands, and recursively counts for Batch/Sequence.
    pub fn count(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Batch(cmds) | Self::Sequence(cmds) => cmds.iter().map(Self::count).sum(),
            _ => 1,
        }
    }
}

impl<M: 'static> Cmd<M> {
    /// Translate every message this command produces with `f`.
    ///
    /// Used by parent programs embedding a child program's commands, in the
    /// same way [`Node::map`] embeds its view.
    pub fn map<N, F>(self, f: F) -> Cmd<N>
    where
        N: 'static,
        F: Fn(M) -> N + 'static,
    {
        self.map_rc(&(Rc::new(f) as Rc<dyn Fn(M) -> N>))
    }

    fn map_rc<N: 'static>(self, f: &Rc<dyn Fn(M) -> N>) -> Cmd<N> {
        match self {
            Self::None => Cmd::None,
            Self::Batch(cmds) => Cmd::Batch(cmds.into_iter().map(|c| c.map_rc(f)).collect()),
            Self::Sequence(cmds) => Cmd::Sequence(cmds.into_iter().map(|c| c.map_rc(f)).collect()),
            Self::Msg(m) => Cmd::Msg(f(m)),
            Self::Task(task) => {
                let f = Rc::clone(f);
                Cmd::Task(Box::new(move || f(task())))
            }
            Self::Log(s) => Cmd::Log(s),
        }
    }
}

/// Handle through which a runtime receives messages.
pub struct Dispatch<M> {
    send: Rc<dyn Fn(M)>,
}

impl<M> Dispatch<M> {
    /// Wrap a message sink.
    pub fn new<F>(send: F) -> Self
    where
        F: Fn(M) + 'static,
    {
        Self {
            send: Rc::new(send),
        }
    }

    /// Hand `msg` to the runtime.
    pub fn send(&self, msg: M) {
        (self.send)(msg);
    }
}

impl<M> Clone for Dispatch<M> {
    fn clone(&self) -> Self {
        Self {
            send: Rc::clone(&self.send),
        }
    }
}

impl<M> fmt::Debug for Dispatch<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch").finish_non_exhaustive()
    }
}
