//! Configuration loader with layered approach.

use std::env;
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::{AriadneConfig, SinkKind};

/// Default environment prefix.
pub const DEFAULT_ENV_PREFIX: &str = "ARIADNE";

/// Configuration loader with layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables `PREFIX__SECTION__KEY`
///
/// The result is validated before it is returned.
///
/// # Example
///
/// ```no_run
/// use ariadne_config::ConfigLoader;
///
/// # fn main() -> Result<(), ariadne_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("ariadne.toml")?
///     .with_dotenv()
///     .with_env_prefix("ARIADNE")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: AriadneConfig,
    env_prefix: Option<String>,
    env_overrides: Vec<(String, String, String)>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader starting from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: AriadneConfig::default(),
            env_prefix: None,
            env_overrides: Vec::new(),
        }
    }

    /// Start from the development preset.
    ///
    /// ```
    /// use ariadne_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = AriadneConfig::development();
        self
    }

    /// Start from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = AriadneConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format follows the extension: `.toml` or `.json`. Fields the file
    /// omits take their default values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, malformed,
    /// has an unsupported extension or contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> ConfigResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        self.config = Self::parse(&content, format)
            .map_err(|e| match e {
                ConfigError::UnsupportedFormat(_) => {
                    ConfigError::UnsupportedFormat(path.display().to_string())
                }
                other => other,
            })?;

        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Same as [`with_file`](Self::with_file), except for a missing file.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in `"toml"` or `"json"` format.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unknown.
    ///
    /// # Example
    ///
    /// ```
    /// use ariadne_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [service]
    ///     name = "orders"
    ///     version = "2.3.0"
    ///
    ///     [ingress]
    ///     trust_incoming_ids = false
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.service.name, "orders");
    /// assert!(!config.ingress.trust_incoming_ids);
    /// assert!(config.ingress.require_access_token);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> ConfigResult<Self> {
        self.config = Self::parse(content, format)?;
        Ok(self)
    }

    fn parse(content: &str, format: &str) -> ConfigResult<AriadneConfig> {
        match format.to_ascii_lowercase().as_str() {
            "toml" => Ok(toml::from_str(content)?),
            "json" => Ok(serde_json::from_str(content)?),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Read overrides from process environment variables with `prefix`.
    ///
    /// Variables use the format `PREFIX__SECTION__KEY`, for example
    /// `ARIADNE__LOGGING__LEVEL=debug`. They are read when
    /// [`load`](Self::load) runs.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Apply overrides from explicit `(name, value)` pairs.
    ///
    /// Names use the same `PREFIX__SECTION__KEY` format; pairs without the
    /// prefix are ignored. Applied after the process environment.
    #[must_use]
    pub fn with_env_vars<I, K, V>(mut self, prefix: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let marker = format!("{}__", prefix.to_uppercase());
        for (key, value) in vars {
            let key = key.into();
            if key.starts_with(&marker) {
                self.env_overrides.push((marker.clone(), key, value.into()));
            }
        }
        self
    }

    /// Load a `.env` file from the working directory into the process
    /// environment, if there is one.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        let _ = dotenvy::dotenv();
        self
    }

    /// Load a specific `.env` file into the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or malformed.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        dotenvy::from_path(path).map_err(|e| match e {
            dotenvy::Error::Io(source) => ConfigError::read_error(path, source),
            other => ConfigError::invalid_value(path.display().to_string(), other.to_string()),
        })?;
        Ok(self)
    }

    /// Apply environment overrides, validate and return the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override is malformed or names an unknown
    /// key, or if validation fails.
    pub fn load(self) -> ConfigResult<AriadneConfig> {
        let config = self.load_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides without validating.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override is malformed or names an unknown
    /// key.
    pub fn load_unvalidated(mut self) -> ConfigResult<AriadneConfig> {
        if let Some(prefix) = self.env_prefix.take() {
            let marker = format!("{prefix}__");
            let process: Vec<(String, String)> = env::vars()
                .filter(|(k, _)| k.starts_with(&marker))
                .collect();
            for (key, value) in process {
                self.apply_env_var(&key, &value, &marker)?;
            }
        }

        for (marker, key, value) in std::mem::take(&mut self.env_overrides) {
            self.apply_env_var(&key, &value, &marker)?;
        }

        Ok(self.config)
    }

    fn apply_env_var(&mut self, key: &str, value: &str, marker: &str) -> ConfigResult<()> {
        let path = key
            .strip_prefix(marker)
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;
        let parts: Vec<&str> = path.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["SERVICE", "NAME"] => config.service.name = value.to_string(),
            ["SERVICE", "VERSION"] => config.service.version = value.to_string(),

            ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
            ["LOGGING", "SINK"] => {
                config.logging.sink = value
                    .parse::<SinkKind>()
                    .map_err(|reason| ConfigError::env_parse_error(key, reason))?;
            }
            ["LOGGING", "REDACT_ACCESS_TOKEN"] => {
                config.logging.redact_access_token = parse_bool(key, value)?;
            }

            ["DIAGNOSTICS", "ENABLED"] => config.diagnostics.enabled = parse_bool(key, value)?,
            ["DIAGNOSTICS", "LEVEL"] => config.diagnostics.level = value.to_string(),
            ["DIAGNOSTICS", "JSON_FORMAT"] => {
                config.diagnostics.json_format = parse_bool(key, value)?;
            }

            ["INGRESS", "REQUIRE_ACCESS_TOKEN"] => {
                config.ingress.require_access_token = parse_bool(key, value)?;
            }
            ["INGRESS", "TRUST_INCOMING_IDS"] => {
                config.ingress.trust_incoming_ids = parse_bool(key, value)?;
            }

            ["CLIENT", "USER_AGENT"] => {
                config.client.user_agent = (!value.is_empty()).then(|| value.to_string());
            }
            ["CLIENT", "TIMEOUT_MS"] => {
                config.client.timeout_ms = if value.is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(|_| {
                        ConfigError::env_parse_error(key, "expected integer")
                    })?)
                };
            }

            [section, field] => {
                return Err(ConfigError::unknown_field(
                    field.to_ascii_lowercase(),
                    section.to_ascii_lowercase(),
                ))
            }
            _ => return Err(ConfigError::env_parse_error(key, "expected SECTION__KEY")),
        }

        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::env_parse_error(key, "expected boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, AriadneConfig::default());
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert!(config.logging.redact_access_token);
    }

    #[test]
    fn test_with_string_json() {
        let json = r#"{"logging": {"level": "warn", "sink": "stderr"}}"#;
        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.sink, SinkKind::Stderr);
        assert_eq!(config.service.name, "ariadne-service");
    }

    #[test]
    fn test_with_string_unknown_format() {
        let err = ConfigLoader::new().with_string("", "yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ref f) if f == "yaml"));
    }

    #[test]
    fn test_unknown_section_rejected() {
        let err = ConfigLoader::new()
            .with_string("[server]\nport = 80", "toml")
            .unwrap_err();
        assert!(matches!(err, ConfigError::TomlError(_)));
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigLoader::new()
            .with_env_vars(
                "ARIADNE",
                vars(&[
                    ("ARIADNE__SERVICE__NAME", "orders"),
                    ("ARIADNE__LOGGING__LEVEL", "error"),
                    ("ARIADNE__LOGGING__SINK", "none"),
                    ("ARIADNE__LOGGING__REDACT_ACCESS_TOKEN", "yes"),
                    ("ARIADNE__DIAGNOSTICS__JSON_FORMAT", "off"),
                    ("ARIADNE__INGRESS__REQUIRE_ACCESS_TOKEN", "false"),
                    ("ARIADNE__INGRESS__TRUST_INCOMING_IDS", "0"),
                    ("ARIADNE__CLIENT__USER_AGENT", "orders-worker"),
                    ("ARIADNE__CLIENT__TIMEOUT_MS", "2500"),
                    ("OTHER__LOGGING__LEVEL", "debug"),
                ]),
            )
            .load()
            .unwrap();

        assert_eq!(config.service.name, "orders");
        assert_eq!(config.logging.level, "error");
        assert_eq!(config.logging.sink, SinkKind::Discard);
        assert!(config.logging.redact_access_token);
        assert!(!config.diagnostics.json_format);
        assert!(!config.ingress.require_access_token);
        assert!(!config.ingress.trust_incoming_ids);
        assert_eq!(config.client.user_agent.as_deref(), Some("orders-worker"));
        assert_eq!(config.client.timeout_ms, Some(2500));
    }

    #[test]
    fn test_env_override_bad_bool() {
        let err = ConfigLoader::new()
            .with_env_vars("ARIADNE", vars(&[("ARIADNE__INGRESS__TRUST_INCOMING_IDS", "maybe")]))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { .. }));
    }

    #[test]
    fn test_env_override_unknown_key() {
        let err = ConfigLoader::new()
            .with_env_vars("ARIADNE", vars(&[("ARIADNE__LOGGING__COLOUR", "red")]))
            .load()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownField { ref field, ref section } if field == "colour" && section == "logging"
        ));
    }

    #[test]
    fn test_env_override_is_validated() {
        let err = ConfigLoader::new()
            .with_env_vars("ARIADNE", vars(&[("ARIADNE__LOGGING__LEVEL", "verbose")]))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::new()
            .with_file("/nonexistent/ariadne.toml")
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_missing_optional_file() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/ariadne.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, AriadneConfig::default());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("K", "TRUE").unwrap());
        assert!(!parse_bool("K", "off").unwrap());
        assert!(parse_bool("K", "2").is_err());
    }
}
