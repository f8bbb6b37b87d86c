//! Typed configuration for Ariadne services.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Example
//!
//! ```no_run
//! use ariadne_config::ConfigLoader;
//!
//! # fn main() -> Result<(), ariadne_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_file("ariadne.toml")?
//!     .with_env_prefix("ARIADNE")
//!     .load()?;
//!
//! println!("logging at {} for {}", config.logging.level, config.service.name);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [service]
//! name = "orders"
//! version = "2.3.0"
//!
//! [logging]
//! level = "info"
//! sink = "stdout"              # stdout | stderr | none
//! redact_access_token = false
//!
//! [diagnostics]
//! enabled = true
//! level = "warn"
//! json_format = true
//!
//! [ingress]
//! require_access_token = true
//! trust_incoming_ids = true
//!
//! [client]
//! user_agent = "orders/2.3.0"
//! timeout_ms = 5000
//! ```
//!
//! # Environment Variable Overrides
//!
//! Every key can be overridden with `PREFIX__SECTION__KEY`:
//!
//! - `ARIADNE__LOGGING__LEVEL=debug`
//! - `ARIADNE__INGRESS__REQUIRE_ACCESS_TOKEN=false`

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::AriadneConfig;
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{
    ClientConfig, DiagnosticsSettings, IngressConfig, LoggingConfig, ServiceConfig, SinkKind,
};
