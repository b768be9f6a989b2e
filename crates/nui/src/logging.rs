#![forbid(unsafe_code)]

//! Tracing subscriber setup.
//!
//! Every nui crate logs through `tracing`; nothing is printed until an
//! application installs a subscriber. [`init`] installs a `fmt` subscriber
//! configured from the environment:
//!
//! | Variable         | Meaning                                   | Default |
//! |------------------|-------------------------------------------|---------|
//! | `NUI_LOG`        | `EnvFilter` directives (`nui_runtime=debug`) | `warn`  |
//! | `NUI_LOG_FORMAT` | `json` for one JSON object per line       | text    |
//!
//! ```ignore
//! nui::logging::init()?;
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

use crate::Error;

/// Filter directives environment variable.
pub const FILTER_ENV: &str = "NUI_LOG";
/// Output format environment variable.
pub const FORMAT_ENV: &str = "NUI_LOG_FORMAT";
/// Filter used when [`FILTER_ENV`] is unset or empty.
pub const DEFAULT_FILTER: &str = "warn";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Newline-delimited JSON.
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directives.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
    /// Include the event target (module path) in each line.
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_owned(),
            format: LogFormat::Text,
            with_target: true,
        }
    }
}

impl LogConfig {
    /// Read [`FILTER_ENV`] and [`FORMAT_ENV`] from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(filter) = lookup(FILTER_ENV).filter(|f| !f.trim().is_empty()) {
            config.filter = filter;
        }
        if let Some(format) = lookup(FORMAT_ENV) {
            config.format = LogFormat::parse(&format);
        }
        config
    }

    /// Replace the filter directives.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Set the output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Show or hide event targets.
    #[must_use]
    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }

    /// Parse the filter directives.
    pub fn env_filter(&self) -> Result<EnvFilter, Error> {
        Ok(EnvFilter::try_new(&self.filter)?)
    }
}

/// Install the global subscriber configured from the environment.
pub fn init() -> Result<(), Error> {
    try_init(&LogConfig::from_env())
}

/// Install the global subscriber described by `config`.
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn try_init(config: &LogConfig) -> Result<(), Error> {
    let filter = config.env_filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target);
    match config.format {
        LogFormat::Text => builder.finish().try_init()?,
        LogFormat::Json => builder.json().finish().try_init()?,
    }
    tracing::debug!(filter = %config.filter, format = ?config.format, "logging initialised");
    Ok(())
}
