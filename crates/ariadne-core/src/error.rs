//! Error types for context handling.
//!
//! [`ContextError`] has two variants, both of which indicate that a request
//! cannot be served with a trustworthy context:
//!
//! | Variant | Raised by | HTTP mapping |
//! |---|---|---|
//! | `MissingContext` | `ContextStore::current`, egress propagation | 500 |
//! | `InvalidCredential` | ingress extraction | 401 |
//!
//! Neither is retried. `MissingContext` is a structural misuse in the calling
//! layer; `InvalidCredential` is translated into a protocol-level rejection by
//! the transport.

use http::StatusCode;
use thiserror::Error;

/// Result type alias using [`ContextError`].
pub type ContextResult<T> = Result<T, ContextError>;

/// Errors raised while binding or reading the request context.
///
/// # Example
///
/// ```
/// use ariadne_core::ContextError;
/// use http::StatusCode;
///
/// let err = ContextError::invalid_credential("missing bearer token");
/// assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
/// assert!(err.is_invalid_credential());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// No record is bound on the calling chain.
    #[error("no request context is bound on the current execution chain")]
    MissingContext,

    /// Inbound credentials are absent or malformed.
    #[error("missing or invalid credential: {reason}")]
    InvalidCredential {
        /// Why the credential was rejected.
        reason: String,
    },
}

impl ContextError {
    /// Creates an invalid credential error.
    #[must_use]
    pub fn invalid_credential(reason: impl Into<String>) -> Self {
        Self::InvalidCredential {
            reason: reason.into(),
        }
    }

    /// Returns `true` for [`ContextError::MissingContext`].
    #[must_use]
    pub const fn is_missing_context(&self) -> bool {
        matches!(self, Self::MissingContext)
    }

    /// Returns `true` for [`ContextError::InvalidCredential`].
    #[must_use]
    pub const fn is_invalid_credential(&self) -> bool {
        matches!(self, Self::InvalidCredential { .. })
    }

    /// Returns the HTTP status code a transport should reject with.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingContext => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidCredential { .. } => StatusCode::UNAUTHORIZED,
        }
    }

    /// Returns a stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingContext => "MISSING_CONTEXT",
            Self::InvalidCredential { .. } => "INVALID_CREDENTIAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_context_display() {
        let err = ContextError::MissingContext;
        assert_eq!(
            err.to_string(),
            "no request context is bound on the current execution chain"
        );
        assert!(err.is_missing_context());
        assert!(!err.is_invalid_credential());
    }

    #[test]
    fn test_invalid_credential_display() {
        let err = ContextError::invalid_credential("authorization header is not a bearer token");
        assert_eq!(
            err.to_string(),
            "missing or invalid credential: authorization header is not a bearer token"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ContextError::MissingContext.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ContextError::invalid_credential("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_codes() {
        assert_eq!(ContextError::MissingContext.code(), "MISSING_CONTEXT");
        assert_eq!(
            ContextError::invalid_credential("x").code(),
            "INVALID_CREDENTIAL"
        );
    }
}
