//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while configuring telemetry.
///
/// Emitting a log record never returns an error; these only surface from
/// setup code.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize the diagnostics subscriber.
    #[error("Failed to initialize diagnostics: {0}")]
    DiagnosticsInit(String),

    /// Unknown log level name.
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),
}
