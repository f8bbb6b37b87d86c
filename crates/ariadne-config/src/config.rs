//! Top-level configuration type.
//!
//! [`AriadneConfig`] groups every section and knows how to validate itself
//! and convert its sections into the option types of the other crates.

use std::time::Duration;

use ariadne_core::AppIdentity;
use ariadne_telemetry::{create_env_filter, DiagnosticsConfig, LogLevel};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{ClientConfig, DiagnosticsSettings, IngressConfig, LoggingConfig, ServiceConfig};

/// Complete configuration of one service.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use ariadne_config::AriadneConfig;
///
/// let config = AriadneConfig::default();
/// assert!(config.ingress.require_access_token);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct AriadneConfig {
    /// Service identity.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Structured logger.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Diagnostics channel.
    #[serde(default)]
    pub diagnostics: DiagnosticsSettings,

    /// Inbound requests.
    #[serde(default)]
    pub ingress: IngressConfig,

    /// Outbound calls.
    #[serde(default)]
    pub client: ClientConfig,
}

impl AriadneConfig {
    /// Settings for local development.
    ///
    /// Debug logging, human-readable diagnostics, and requests accepted
    /// without a token.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                ..LoggingConfig::default()
            },
            diagnostics: DiagnosticsSettings {
                enabled: true,
                level: "debug".to_string(),
                json_format: false,
            },
            ingress: IngressConfig {
                require_access_token: false,
                trust_incoming_ids: true,
            },
            ..Self::default()
        }
    }

    /// Settings for production: the defaults, with tokens kept out of logs.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LoggingConfig {
                redact_access_token: true,
                ..LoggingConfig::default()
            },
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if:
    /// - the service name or version is empty
    /// - the logging level is not a known level
    /// - the diagnostics filter does not parse
    /// - the user agent override is empty
    /// - the client timeout is zero
    pub fn validate(&self) -> ConfigResult<()> {
        if self.service.name.trim().is_empty() {
            return Err(ConfigError::invalid_value("service.name", "must not be empty"));
        }
        if self.service.version.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "service.version",
                "must not be empty",
            ));
        }

        self.log_level()?;

        if self.diagnostics.enabled {
            create_env_filter(&self.diagnostics.level)
                .map_err(|e| ConfigError::invalid_value("diagnostics.level", e.to_string()))?;
        }

        if matches!(&self.client.user_agent, Some(ua) if ua.trim().is_empty()) {
            return Err(ConfigError::invalid_value(
                "client.user_agent",
                "must not be empty when set",
            ));
        }
        if self.client.timeout_ms == Some(0) {
            return Err(ConfigError::invalid_value(
                "client.timeout_ms",
                "must be greater than zero when set",
            ));
        }

        Ok(())
    }

    /// Returns the service identity.
    #[must_use]
    pub fn identity(&self) -> AppIdentity {
        AppIdentity::new(self.service.name.clone(), self.service.version.clone())
    }

    /// Returns the parsed minimum log level.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown level name.
    pub fn log_level(&self) -> ConfigResult<LogLevel> {
        self.logging
            .level
            .parse()
            .map_err(|e: ariadne_telemetry::TelemetryError| {
                ConfigError::invalid_value("logging.level", e.to_string())
            })
    }

    /// Returns the diagnostics subscriber settings.
    #[must_use]
    pub fn diagnostics_config(&self) -> DiagnosticsConfig {
        DiagnosticsConfig {
            enabled: self.diagnostics.enabled,
            level: self.diagnostics.level.clone(),
            json_format: self.diagnostics.json_format,
            include_target: true,
        }
    }

    /// Returns the outbound request timeout, if any.
    #[must_use]
    pub fn client_timeout(&self) -> Option<Duration> {
        self.client.timeout_ms.map(Duration::from_millis)
    }
}
