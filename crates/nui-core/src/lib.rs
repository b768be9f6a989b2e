#![forbid(unsafe_code)]

//! nui core: virtual node trees rendered into host UI components.
//!
//! View code builds an immutable [`Node`] tree for the current model. The
//! [`render`](render::render) function walks it, asks a [`Host`] to
//! instantiate every component, and attaches an [`EventHandler`] to every
//! event fact. When the host fires an event, the handler decodes the payload,
//! translates the message through the [`EventScope`] chain created for the
//! `map` boundaries above it, and hands it to the application's dispatch sink.
//!
//! # Modules
//!
//! - [`node`]: node and fact constructors (`text`, `node`, `map`, `on`, ...)
//! - [`decode`]: payload decoders
//! - [`message`]: erased messages and taggers
//! - [`scope`]: event scopes and the dispatch slot
//! - [`handler`]: event handler synthesis
//! - [`props`]: props and rendered output
//! - [`host`]: the host component seam
//! - [`render`]: the tree renderer

pub mod decode;
pub mod handler;
pub mod host;
pub mod message;
pub mod node;
pub mod props;
pub mod render;
pub mod scope;

pub use decode::{DecodeError, Decoder, DecoderExt};
pub use handler::{Dispatched, EventHandler};
pub use host::{ComponentRegistry, Host};
pub use message::{AnyMessage, MessageMismatch, Tagger};
pub use node::{
    Fact, FactKind, Node, NodeKind, StyleMap, map, node, on, property, style, style_map, text,
    void_node,
};
pub use props::{Children, PropValue, Props, Rendered};
pub use render::render;
pub use scope::{DispatchSlot, EventScope, TaggerChain};
