#![forbid(unsafe_code)]

//! nui runtime: programs presented as host UI components.
//!
//! # Key Components
//!
//! - [`Program`] - Elm-style model / update / view description of an app
//! - [`Cmd`] - Commands for side effects
//! - [`Subscription`] - Trait for ongoing message sources
//! - [`Every`] - Built-in interval subscription
//! - [`Runtime`] - Contract for whatever drives the update loop
//! - [`StepRuntime`] - Host-stepped runtime without threads or blocking
//! - [`NativeComponent`] - Adapter mounting a program and rendering its view
//! - [`Startable`] - Zero-argument component factory for app entries
//!
//! # How it fits together
//! The adapter owns the root [`EventScope`](nui_core::EventScope) of each
//! mounted component. The runtime publishes models through a
//! [`RenderCallback`]; the first publication connects the root scope to the
//! runtime's [`Dispatch`] handle. From then on events fired by the rendered
//! tree travel up the scope chain into the runtime's queue.

pub mod adapter;
pub mod program;
pub mod runtime;
pub mod start;
pub mod step;
pub mod subscription;

pub use adapter::{AdapterError, Mountable, NativeComponent, Phase, ProgramConfig};
pub use program::{Cmd, Dispatch, Program};
pub use runtime::{RenderCallback, Runtime};
pub use start::{ComponentFactory, Startable, program, program_with};
pub use step::{StepConfig, StepResult, StepRuntime};
pub use subscription::{Every, SubId, Subscription};
