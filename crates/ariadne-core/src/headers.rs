//! Wire names of the propagated context fields.
//!
//! All names are lowercase so they can be used directly with
//! [`http::HeaderName::from_static`] as well as for message property
//! lookups.

/// Bearer credential of the caller.
pub const AUTHORIZATION: &str = "authorization";

/// Id of one hop. Minted fresh for every outbound call.
pub const REQUEST_ID: &str = "x-request-id";

/// Id shared by every hop of one end-to-end chain.
pub const CORRELATION_ID: &str = "x-correlation-id";

/// Name of the calling service.
pub const APP_NAME: &str = "x-app-name";

/// Version of the calling service.
pub const APP_VERSION: &str = "x-app-version";

/// Domain item the request concerns.
pub const ITEM_ID: &str = "x-item-id";

/// Manager the request acts on behalf of.
pub const MANAGER_ID: &str = "x-manager-id";

/// Identity string of the calling service.
pub const USER_AGENT: &str = "user-agent";

/// Scheme prefix of the `Authorization` value.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Extracts the token from an `Authorization` value.
///
/// Returns `None` unless the value uses the `Bearer` scheme (matched
/// case-insensitively) with a non-empty token.
///
/// ```
/// use ariadne_core::headers::parse_bearer;
///
/// assert_eq!(parse_bearer("Bearer abc.def"), Some("abc.def"));
/// assert_eq!(parse_bearer("bearer abc"), Some("abc"));
/// assert_eq!(parse_bearer("Basic dXNlcg=="), None);
/// assert_eq!(parse_bearer("Bearer "), None);
/// ```
#[must_use]
pub fn parse_bearer(value: &str) -> Option<&str> {
    let value = value.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
