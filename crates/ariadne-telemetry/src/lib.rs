//! Context-enriched structured logging for Ariadne services.
//!
//! Every record a [`StructuredLogger`] writes carries the service identity,
//! the request context bound to the calling chain and the caller's details,
//! as one JSON object per line:
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌──────────┐
//! │ AppIdentity  │──▶│                  │   │          │
//! ├──────────────┤   │ StructuredLogger │──▶│   sink   │
//! │ ContextStore │──▶│  (level filter)  │   │ (stdout) │
//! ├──────────────┤   │                  │   │          │
//! │  LogEntry    │──▶│                  │   └──────────┘
//! └──────────────┘   └────────┬─────────┘
//!                             │ failures
//!                             ▼
//!                    tracing diagnostics + metrics
//! ```
//!
//! # Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `ariadne_log_records_total` | Counter | `level` | Records written |
//! | `ariadne_log_write_failures_total` | Counter | - | Records lost |
//!
//! # Example
//!
//! ```
//! use ariadne_core::{AppIdentity, ContextStore};
//! use ariadne_telemetry::{LogEntry, LogLevel, StructuredLogger};
//!
//! let logger = StructuredLogger::builder(AppIdentity::new("orders", "2.3.0"))
//!     .minimum_level(LogLevel::Debug)
//!     .sink(Box::new(std::io::stdout()))
//!     .context_source(ContextStore::new())
//!     .build();
//!
//! logger.debug(LogEntry::new("starting").detail("workers", 4));
//! ```

#![doc(html_root_url = "https://docs.rs/ariadne-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod diagnostics;
mod error;
mod level;
mod logger;
pub mod metrics;

pub use diagnostics::{create_env_filter, init_diagnostics, DiagnosticsConfig};
pub use error::TelemetryError;
pub use level::LogLevel;
pub use logger::{Clock, LogEntry, LogSink, StructuredLogger, StructuredLoggerBuilder};

/// Result type for telemetry setup.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
