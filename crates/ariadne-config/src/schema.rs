//! Configuration section types.
//!
//! Every section rejects unknown fields and fills omitted fields with their
//! defaults, so a file only needs to name what it changes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identity of the running service.
///
/// Stamped on every log record and sent on every outbound call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Service name.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Service version.
    #[serde(default = "default_service_version")]
    pub version: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            version: default_service_version(),
        }
    }
}

fn default_service_name() -> String {
    "ariadne-service".to_string()
}

fn default_service_version() -> String {
    "0.0.0".to_string()
}

/// Destination of structured log records.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Standard output.
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
    /// Records are discarded.
    #[serde(rename = "none")]
    Discard,
}

impl FromStr for SinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            "none" => Ok(Self::Discard),
            other => Err(format!(
                "expected 'stdout', 'stderr' or 'none', got '{other}'"
            )),
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
            Self::Discard => "none",
        })
    }
}

/// Structured logger settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum level written: `debug`, `info`, `warn` or `error`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Where records go.
    #[serde(default)]
    pub sink: SinkKind,

    /// Leave the caller's access token out of the `context` field.
    #[serde(default)]
    pub redact_access_token: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            sink: SinkKind::default(),
            redact_access_token: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Settings of the library's own diagnostics channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DiagnosticsSettings {
    /// Install a `tracing` subscriber.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive.
    #[serde(default = "default_diagnostics_level")]
    pub level: String,

    /// JSON lines instead of compact text.
    #[serde(default = "default_true")]
    pub json_format: bool,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_diagnostics_level(),
            json_format: true,
        }
    }
}

fn default_diagnostics_level() -> String {
    "warn".to_string()
}

/// Inbound request handling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct IngressConfig {
    /// Reject requests without a bearer token.
    #[serde(default = "default_true")]
    pub require_access_token: bool,

    /// Adopt inbound request and correlation ids.
    #[serde(default = "default_true")]
    pub trust_incoming_ids: bool,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            require_access_token: true,
            trust_incoming_ids: true,
        }
    }
}

/// Outbound call settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// `User-Agent` override; defaults to `<name>/<version>`.
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Request timeout in milliseconds; no timeout when unset.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_defaults() {
        assert_eq!(ServiceConfig::default().name, "ariadne-service");
        assert_eq!(LoggingConfig::default().level, "info");
        assert_eq!(LoggingConfig::default().sink, SinkKind::Stdout);
        assert!(!LoggingConfig::default().redact_access_token);
        assert!(DiagnosticsSettings::default().enabled);
        assert!(IngressConfig::default().require_access_token);
        assert!(IngressConfig::default().trust_incoming_ids);
        assert_eq!(ClientConfig::default().user_agent, None);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let logging: LoggingConfig = toml::from_str("sink = \"none\"").unwrap();
        assert_eq!(logging.sink, SinkKind::Discard);
        assert_eq!(logging.level, "info");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<IngressConfig, _> = toml::from_str("require_token = false");
        assert!(result.is_err());
    }

    #[test]
    fn test_sink_kind_parse() {
        assert_eq!("STDERR".parse::<SinkKind>().unwrap(), SinkKind::Stderr);
        assert_eq!("none".parse::<SinkKind>().unwrap(), SinkKind::Discard);
        assert!("file".parse::<SinkKind>().is_err());
        assert_eq!(SinkKind::Discard.to_string(), "none");
    }
}
