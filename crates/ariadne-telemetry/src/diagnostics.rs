//! Diagnostics channel for the library's own messages.
//!
//! Ariadne components report internal conditions (a bind outside any chain,
//! a sink that failed to accept a record) through `tracing`. This module
//! installs a `tracing-subscriber` pipeline that sends those events to
//! stderr, kept apart from the structured records a
//! [`StructuredLogger`](crate::StructuredLogger) writes.
//!
//! # Example
//!
//! ```rust,ignore
//! use ariadne_telemetry::{init_diagnostics, DiagnosticsConfig};
//!
//! init_diagnostics(&DiagnosticsConfig::development())?;
//! tracing::debug!(request_id = "r1", "bound inbound context");
//! ```

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Diagnostics subscriber configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticsConfig {
    /// Whether to install a subscriber at all.
    pub enabled: bool,

    /// Filter directive, e.g. `"warn"` or `"ariadne_core=debug,warn"`.
    pub level: String,

    /// JSON output instead of compact human-readable lines.
    pub json_format: bool,

    /// Include the module path of each event.
    pub include_target: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "warn".to_string(),
            json_format: true,
            include_target: true,
        }
    }
}

impl DiagnosticsConfig {
    /// Verbose, human-readable settings for local work.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            include_target: true,
        }
    }

    /// Settings that install nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Installs the global diagnostics subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError::DiagnosticsInit`] if the filter directive is
/// invalid or a global subscriber is already installed.
pub fn init_diagnostics(config: &DiagnosticsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    if config.json_format {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(layer)
            .try_init()
            .map_err(|e| TelemetryError::DiagnosticsInit(e.to_string()))?;
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(layer)
            .try_init()
            .map_err(|e| TelemetryError::DiagnosticsInit(e.to_string()))?;
    }

    Ok(())
}

/// Parses a filter directive.
///
/// # Errors
///
/// Returns [`TelemetryError::DiagnosticsInit`] if the directive is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::DiagnosticsInit(format!("invalid filter {filter:?}: {e}")))
}

/// Field names used on diagnostics events.
pub mod fields {
    /// Request id of the chain the event came from.
    pub const REQUEST_ID: &str = "request_id";

    /// Correlation id of the chain the event came from.
    pub const CORRELATION_ID: &str = "correlation_id";

    /// Structured log level involved.
    pub const LEVEL: &str = "level";

    /// Error message.
    pub const ERROR: &str = "error";
}
