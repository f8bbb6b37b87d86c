//! Assembly errors.

use ariadne_client::ClientError;
use ariadne_config::ConfigError;
use ariadne_telemetry::TelemetryError;
use thiserror::Error;

/// Errors raised while assembling Ariadne components.
#[derive(Debug, Error)]
pub enum AriadneError {
    /// Configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Diagnostics could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// An outbound client could not be created.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Result type for assembly operations.
pub type AriadneResult<T> = Result<T, AriadneError>;
