//! Context-propagating HTTP client factory.

use std::time::Duration;

use http::Method;
use reqwest::{Client, RequestBuilder, Url};

use crate::error::{ClientError, ClientResult};
use crate::propagator::EgressPropagator;

/// Factory for outbound requests to one downstream service.
///
/// Each request builder it returns already carries the propagation headers
/// of the calling chain. Sending, retries and response handling stay with
/// the caller; `reqwest` errors come back unmodified.
///
/// # Example
///
/// ```
/// use ariadne_client::{ContextClient, EgressPropagator};
/// use ariadne_core::{AppIdentity, ContextRecord, ContextStore};
///
/// # tokio_test::block_on(async {
/// let store = ContextStore::new();
/// let propagator = EgressPropagator::new(store, AppIdentity::new("orders", "2.3.0"));
/// let client = ContextClient::new(propagator, "http://inventory.internal/api/").unwrap();
///
/// let request = store
///     .scope(ContextRecord::new("r1", "c1").with_access_token("t1"), async {
///         client.get("stock/42").unwrap().build().unwrap()
///     })
///     .await;
///
/// assert_eq!(request.url().as_str(), "http://inventory.internal/api/stock/42");
/// assert_eq!(request.headers()["x-correlation-id"], "c1");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct ContextClient {
    client: Client,
    base_url: Url,
    propagator: EgressPropagator,
}

impl ContextClient {
    /// Creates a client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if `base_url` does not parse, or
    /// [`ClientError::Build`] if the HTTP client cannot be initialized.
    pub fn new(propagator: EgressPropagator, base_url: &str) -> ClientResult<Self> {
        let client = Client::builder().build().map_err(ClientError::Build)?;
        Self::with_client(client, propagator, base_url)
    }

    /// Creates a client that sends through an existing `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if `base_url` does not parse.
    pub fn with_client(
        client: Client,
        propagator: EgressPropagator,
        base_url: &str,
    ) -> ClientResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            propagator,
        })
    }

    /// Creates a client whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn with_timeout(
        propagator: EgressPropagator,
        base_url: &str,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Build)?;
        Self::with_client(client, propagator, base_url)
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Starts a request to `path`, resolved against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Context`] when no context is bound, or
    /// [`ClientError::InvalidUrl`] when `path` cannot be resolved.
    pub fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let headers = self.propagator.header_map()?;
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl {
                url: path.to_string(),
                reason: e.to_string(),
            })?;

        Ok(self.client.request(method, url).headers(headers))
    }

    /// Starts a `GET` request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub fn get(&self, path: &str) -> ClientResult<RequestBuilder> {
        self.request(Method::GET, path)
    }

    /// Starts a `POST` request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub fn post(&self, path: &str) -> ClientResult<RequestBuilder> {
        self.request(Method::POST, path)
    }

    /// Starts a `PUT` request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub fn put(&self, path: &str) -> ClientResult<RequestBuilder> {
        self.request(Method::PUT, path)
    }

    /// Starts a `PATCH` request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub fn patch(&self, path: &str) -> ClientResult<RequestBuilder> {
        self.request(Method::PATCH, path)
    }

    /// Starts a `DELETE` request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub fn delete(&self, path: &str) -> ClientResult<RequestBuilder> {
        self.request(Method::DELETE, path)
    }
}
