//! Outbound header propagation.
//!
//! Every outbound call made on behalf of a chain carries:
//!
//! | Header | Value |
//! |--------|-------|
//! | `Authorization` | `Bearer <access_token>`, omitted when the record has none |
//! | `X-Correlation-Id` | inherited from the bound record |
//! | `X-Request-Id` | freshly minted for this hop |
//! | `X-App-Name` / `X-App-Version` | this service's identity |
//! | `User-Agent` | `<name>/<version>` unless overridden |
//! | `X-Item-Id` / `X-Manager-Id` | forwarded when the record has them |

use std::sync::Arc;

use ariadne_core::headers::{self, BEARER_PREFIX};
use ariadne_core::{mint_id, AppIdentity, ContextResult, ContextSource};
use http::{HeaderMap, HeaderName, HeaderValue};

/// Header values for one outbound call.
#[derive(Clone, PartialEq, Eq)]
pub struct OutboundHeaders {
    access_token: Option<String>,
    request_id: String,
    correlation_id: String,
    app_name: String,
    app_version: String,
    user_agent: String,
    item_id: Option<String>,
    manager_id: Option<String>,
}

impl OutboundHeaders {
    /// Returns the propagated token, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Returns the request id minted for this hop.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the inherited correlation id.
    #[must_use]
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Returns the calling service's name.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Returns the calling service's version.
    #[must_use]
    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    /// Returns the user agent.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Writes the headers into `map`, replacing existing values.
    ///
    /// Values that are not valid header text are skipped with a warning.
    pub fn apply(&self, map: &mut HeaderMap) {
        if let Some(token) = &self.access_token {
            put(map, headers::AUTHORIZATION, &format!("{BEARER_PREFIX}{token}"));
        }
        put(map, headers::REQUEST_ID, &self.request_id);
        put(map, headers::CORRELATION_ID, &self.correlation_id);
        put(map, headers::APP_NAME, &self.app_name);
        put(map, headers::APP_VERSION, &self.app_version);
        put(map, headers::USER_AGENT, &self.user_agent);
        if let Some(item_id) = &self.item_id {
            put(map, headers::ITEM_ID, item_id);
        }
        if let Some(manager_id) = &self.manager_id {
            put(map, headers::MANAGER_ID, manager_id);
        }
    }

    /// Returns the headers as a new map.
    #[must_use]
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(8);
        self.apply(&mut map);
        map
    }
}

fn put(map: &mut HeaderMap, name: &'static str, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(mut value) => {
            if name == headers::AUTHORIZATION {
                value.set_sensitive(true);
            }
            map.insert(HeaderName::from_static(name), value);
        }
        Err(_) => tracing::warn!(header = name, "skipping outbound header with invalid value"),
    }
}

impl std::fmt::Debug for OutboundHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundHeaders")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("request_id", &self.request_id)
            .field("correlation_id", &self.correlation_id)
            .field("app_name", &self.app_name)
            .field("app_version", &self.app_version)
            .field("user_agent", &self.user_agent)
            .field("item_id", &self.item_id)
            .field("manager_id", &self.manager_id)
            .finish()
    }
}

/// Derives outbound headers from the context bound to the calling chain.
///
/// # Example
///
/// ```
/// use ariadne_client::EgressPropagator;
/// use ariadne_core::{AppIdentity, ContextRecord, ContextStore};
///
/// # tokio_test::block_on(async {
/// let store = ContextStore::new();
/// let propagator = EgressPropagator::new(store, AppIdentity::new("orders", "2.3.0"));
///
/// let record = ContextRecord::new("r1", "c1").with_access_token("t1");
/// let headers = store.scope(record, async { propagator.header_map() }).await.unwrap();
///
/// assert_eq!(headers["authorization"], "Bearer t1");
/// assert_eq!(headers["x-correlation-id"], "c1");
/// assert_ne!(headers["x-request-id"], "r1");
/// assert_eq!(headers["user-agent"], "orders/2.3.0");
/// # });
/// ```
#[derive(Clone)]
pub struct EgressPropagator {
    source: Arc<dyn ContextSource>,
    identity: AppIdentity,
    user_agent: String,
}

impl EgressPropagator {
    /// Creates a propagator for the service `identity`.
    #[must_use]
    pub fn new(source: impl ContextSource + 'static, identity: AppIdentity) -> Self {
        let user_agent = identity.user_agent();
        Self {
            source: Arc::new(source),
            identity,
            user_agent,
        }
    }

    /// Overrides the `User-Agent` value.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the service identity sent on every call.
    #[must_use]
    pub fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    /// Builds the headers for one outbound call.
    ///
    /// Every call mints a new request id.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::MissingContext`](ariadne_core::ContextError::MissingContext)
    /// when no record is bound.
    pub fn outbound(&self) -> ContextResult<OutboundHeaders> {
        let record = self.source.current()?;

        let outbound = OutboundHeaders {
            access_token: record.access_token().map(str::to_owned),
            request_id: mint_id(),
            correlation_id: record.correlation_id().to_owned(),
            app_name: self.identity.name.clone(),
            app_version: self.identity.version.clone(),
            user_agent: self.user_agent.clone(),
            item_id: record.item_id().map(str::to_owned),
            manager_id: record.manager_id().map(str::to_owned),
        };

        tracing::debug!(
            parent_request_id = %record.request_id(),
            request_id = %outbound.request_id,
            correlation_id = %outbound.correlation_id,
            "prepared outbound context"
        );
        Ok(outbound)
    }

    /// Builds the headers for one outbound call as a [`HeaderMap`].
    ///
    /// # Errors
    ///
    /// See [`outbound`](Self::outbound).
    pub fn header_map(&self) -> ContextResult<HeaderMap> {
        self.outbound().map(|outbound| outbound.to_header_map())
    }
}

impl std::fmt::Debug for EgressPropagator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EgressPropagator")
            .field("identity", &self.identity)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}
