//! Client error types.

use ariadne_core::ContextError;
use thiserror::Error;

/// Errors raised while preparing an outbound call.
///
/// Failures of the call itself are reported by `reqwest` and returned to the
/// caller untouched.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No context is bound on the calling chain.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// The base URL could not be combined with the request path.
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Build(#[source] reqwest::Error),
}

impl ClientError {
    /// Returns `true` when the call failed for lack of a bound context.
    #[must_use]
    pub fn is_missing_context(&self) -> bool {
        matches!(self, Self::Context(err) if err.is_missing_context())
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
