#![forbid(unsafe_code)]

//! nui public facade crate.
//!
//! Re-exports the node tree, decoders and program runtime from the internal
//! crates, and offers a prelude for view and program code.

// --- Core re-exports -------------------------------------------------------

pub use nui_core::decode;
pub use nui_core::message::downcast;
pub use nui_core::{
    AnyMessage, Children, ComponentRegistry, DecodeError, Decoder, DecoderExt, DispatchSlot,
    Dispatched, EventHandler, EventScope, Fact, Host, MessageMismatch, Node, PropValue, Props,
    Rendered, StyleMap, Tagger, map, node, on, property, render, style, style_map, text, void_node,
};

// --- Runtime re-exports ----------------------------------------------------

pub use nui_runtime::{
    AdapterError, Cmd, ComponentFactory, Dispatch, Every, Mountable, NativeComponent, Phase,
    Program, ProgramConfig, RenderCallback, Runtime, Startable, StepConfig, StepResult,
    StepRuntime, SubId, Subscription, program, program_with,
};

#[cfg(feature = "logging")]
pub mod logging;

// --- Errors ---------------------------------------------------------------

/// Top-level error type for nui apps.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Mounting or unmounting a component failed.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    /// An event payload did not decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// A message reached code expecting another type.
    #[error(transparent)]
    Mismatch(#[from] MessageMismatch),
    /// The log filter directives did not parse.
    #[cfg(feature = "logging")]
    #[error("invalid log filter")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),
    /// A global tracing subscriber is already installed.
    #[cfg(feature = "logging")]
    #[error("could not install the tracing subscriber")]
    LogInit(#[from] tracing_subscriber::util::TryInitError),
}

/// Standard result type for nui APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Cmd, Decoder, DecoderExt, Dispatch, Error, Every, Host, Mountable, Node, Program, Rendered,
        Result, Startable, Subscription, decode, map, node, on, program, property, style, text,
        void_node,
    };
}
