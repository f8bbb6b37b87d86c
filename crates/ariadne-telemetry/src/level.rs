//! Log severity levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TelemetryError;

/// Severity of a log record, ordered from least to most severe.
///
/// Serializes to the uppercase name used in the `level` field of a record.
///
/// # Example
///
/// ```
/// use ariadne_telemetry::LogLevel;
///
/// assert!(LogLevel::Debug < LogLevel::Info);
/// assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warn);
/// assert_eq!(LogLevel::Error.as_str(), "ERROR");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Verbose information for debugging.
    Debug,
    /// Normal operational messages.
    #[default]
    Info,
    /// Something unexpected that the service recovered from.
    Warn,
    /// A failure that needs attention.
    Error,
}

impl LogLevel {
    /// All levels, least severe first.
    pub const ALL: [Self; 4] = [Self::Debug, Self::Info, Self::Warn, Self::Error];

    /// Returns the uppercase level name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(TelemetryError::InvalidLevel(s.to_string())),
        }
    }
}
