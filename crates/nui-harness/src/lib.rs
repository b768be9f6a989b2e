#![forbid(unsafe_code)]

//! Test host and snapshot testing for nui programs.
//!
//! - **Recording host**: [`RecordingHost`] turns every component into an
//!   inspectable [`Element`] and records what was created.
//! - **Queries and events**: find elements by tag, read props and text, fire
//!   event handlers with JSON payloads.
//! - **Snapshots**: serialize rendered trees to JSON and compare them with
//!   stored `.json` files ([`assert_tree_snapshot!`]).
//! - **App entry**: [`AppRegistry`] registers startable components by name;
//!   [`AppDriver`] mounts one and drives its runtime.
//!
//! # Quick Start
//!
//! ```ignore
//! use nui_harness::AppRegistry;
//!
//! let mut apps = AppRegistry::new();
//! apps.register_startable(nui_runtime::program(Counter).named("counter"));
//!
//! let mut app = apps.launch("counter")?;
//! app.press("Button")?;
//! assert_eq!(app.text(), "1");
//! ```

pub mod app;
pub mod element;
pub mod host;
pub mod snapshot;

pub use app::{AppDriver, AppRegistry};
pub use element::{Element, find, rendered_to_json, text_content};
pub use host::RecordingHost;
pub use snapshot::SnapshotError;

use nui_runtime::AdapterError;

/// Errors raised by harness helpers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HarnessError {
    /// The element has no handler for the event.
    #[error("`{tag}` has no `{event}` handler")]
    NoHandler {
        /// Element tag.
        tag: String,
        /// Requested event.
        event: String,
    },
    /// No element with the tag exists in the current tree.
    #[error("no `{tag}` element in the rendered tree")]
    ElementNotFound {
        /// Requested tag.
        tag: String,
    },
    /// No app registered under the name.
    #[error("no app registered as `{name}`")]
    UnknownApp {
        /// Requested name.
        name: String,
    },
    /// Mounting or unmounting failed.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}
