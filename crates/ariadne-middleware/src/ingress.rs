//! Ingress binding of inbound request metadata.
//!
//! [`IngressBinder`] turns the metadata of one inbound message into a
//! [`ContextRecord`] and binds it before application logic runs.
//!
//! ## Field mapping
//!
//! | Envelope field | Record field | When absent |
//! |----------------|--------------|-------------|
//! | `Authorization: Bearer <t>` | `access_token` | `InvalidCredential` if required |
//! | `X-Request-Id` | `request_id` | minted (UUID v7) |
//! | `X-Correlation-Id` | `correlation_id` | equals `request_id` |
//! | `X-App-Name` / `X-App-Version` | `app_name` / `app_version` | `"unknown"` |
//! | `X-Item-Id` / `X-Manager-Id` | `item_id` / `manager_id` | unset |
//!
//! Blank values and values that are not valid header text count as absent.
//!
//! Used as a pipeline stage, a failed extraction answers 401 without
//! invoking the handler, and the bound ids are echoed on the response.

use std::future::Future;

use ariadne_core::headers::{self, parse_bearer};
use ariadne_core::{mint_id, ContextError, ContextRecord, ContextResult, ContextStore};
use http::{HeaderName, HeaderValue};

use crate::context::MiddlewareContext;
use crate::envelope::Envelope;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};

/// Placeholder for caller app name or version the envelope does not carry.
pub const UNKNOWN_APP: &str = "unknown";

/// Ingress configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngressOptions {
    /// Reject messages without a usable bearer token.
    pub require_access_token: bool,
    /// Adopt inbound request and correlation ids instead of minting new ones.
    pub trust_incoming_ids: bool,
}

impl Default for IngressOptions {
    fn default() -> Self {
        Self {
            require_access_token: true,
            trust_incoming_ids: true,
        }
    }
}

/// Extracts and binds the context of inbound messages.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
///
/// use ariadne_core::ContextStore;
/// use ariadne_middleware::IngressBinder;
///
/// # tokio_test::block_on(async {
/// let store = ContextStore::new();
/// let binder = IngressBinder::new(store);
///
/// let mut properties = HashMap::new();
/// properties.insert("authorization".to_string(), "Bearer t1".to_string());
/// properties.insert("x-request-id".to_string(), "r1".to_string());
///
/// let correlation = binder
///     .run(&properties, async move {
///         store.current().unwrap().correlation_id().to_string()
///     })
///     .await
///     .unwrap();
///
/// // Without an inbound correlation id, the request id starts a new chain.
/// assert_eq!(correlation, "r1");
/// # });
/// ```
#[derive(Debug, Clone, Copy)]
pub struct IngressBinder {
    store: ContextStore,
    options: IngressOptions,
}

impl IngressBinder {
    /// Creates a binder with default options.
    #[must_use]
    pub fn new(store: ContextStore) -> Self {
        Self::with_options(store, IngressOptions::default())
    }

    /// Creates a binder with explicit options.
    #[must_use]
    pub const fn with_options(store: ContextStore, options: IngressOptions) -> Self {
        Self { store, options }
    }

    /// Returns the options in effect.
    #[must_use]
    pub const fn options(&self) -> IngressOptions {
        self.options
    }

    /// Builds the record for one inbound message.
    ///
    /// Blank fields, and fields that are not valid header text, count as
    /// absent: ids are minted in their place.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::InvalidCredential`] when a token is required
    /// and the `Authorization` field is absent, unreadable, not a `Bearer`
    /// credential, or empty.
    pub fn extract<E>(&self, envelope: &E) -> ContextResult<ContextRecord>
    where
        E: Envelope + ?Sized,
    {
        let access_token = self.access_token(envelope)?;

        let inbound = |name: &'static str| {
            envelope
                .get(name)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .filter(|value| {
                    // Every bound field must survive the trip onto an outbound call.
                    let sendable = HeaderValue::from_str(value).is_ok();
                    if !sendable {
                        tracing::warn!(
                            field = name,
                            "ignoring inbound field that is not valid header text"
                        );
                    }
                    sendable
                })
        };
        let trusted =
            |name: &'static str| inbound(name).filter(|_| self.options.trust_incoming_ids);

        let request_id = trusted(headers::REQUEST_ID).map_or_else(mint_id, str::to_owned);
        let correlation_id =
            trusted(headers::CORRELATION_ID).map_or_else(|| request_id.clone(), str::to_owned);

        let mut record = ContextRecord::new(request_id, correlation_id).with_app(
            inbound(headers::APP_NAME).unwrap_or(UNKNOWN_APP),
            inbound(headers::APP_VERSION).unwrap_or(UNKNOWN_APP),
        );
        if let Some(token) = access_token {
            record = record.with_access_token(token);
        }
        if let Some(item_id) = inbound(headers::ITEM_ID) {
            record = record.with_item_id(item_id);
        }
        if let Some(manager_id) = inbound(headers::MANAGER_ID) {
            record = record.with_manager_id(manager_id);
        }

        Ok(record)
    }

    fn access_token<'e, E>(&self, envelope: &'e E) -> ContextResult<Option<&'e str>>
    where
        E: Envelope + ?Sized,
    {
        let Some(value) = envelope.get(headers::AUTHORIZATION) else {
            return if self.options.require_access_token {
                Err(ContextError::invalid_credential(
                    "missing or unreadable Authorization header",
                ))
            } else {
                Ok(None)
            };
        };

        match parse_bearer(value) {
            Some(token) => Ok(Some(token)),
            None if self.options.require_access_token => Err(ContextError::invalid_credential(
                "Authorization header is not a non-empty Bearer credential",
            )),
            None => {
                tracing::debug!("ignoring non-bearer Authorization header");
                Ok(None)
            }
        }
    }

    /// Extracts the record and binds it to the calling chain.
    ///
    /// Use inside a chain opened with [`ContextStore::chain`] when the
    /// envelope only becomes available after the chain started.
    ///
    /// # Errors
    ///
    /// See [`extract`](Self::extract). Returns
    /// [`ContextError::MissingContext`] when called outside of a chain.
    pub fn bind<E>(&self, envelope: &E) -> ContextResult<()>
    where
        E: Envelope + ?Sized,
    {
        let record = self.extract(envelope)?;
        self.store.try_bind(record)
    }

    /// Runs `future` as a new chain bound to the envelope's record.
    ///
    /// The future is not polled when extraction fails.
    ///
    /// # Errors
    ///
    /// See [`extract`](Self::extract).
    pub async fn run<E, F>(&self, envelope: &E, future: F) -> ContextResult<F::Output>
    where
        E: Envelope + ?Sized,
        F: Future,
    {
        let record = self.extract(envelope)?;
        Ok(self.store.scope(record, future).await)
    }
}

fn echo(response: &mut Response, name: &'static str, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(name), value);
    }
}

impl Middleware for IngressBinder {
    fn name(&self) -> &'static str {
        "ingress"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let record = match self.extract(&request) {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(
                        method = %request.method(),
                        path = %request.uri().path(),
                        error = %err,
                        "rejected inbound request"
                    );
                    return Response::json_error(err.status_code(), err.code(), &err.to_string());
                }
            };

            let request_id = record.request_id().to_owned();
            let correlation_id = record.correlation_id().to_owned();
            ctx.set_record(record.clone());

            let mut response = self.store.scope(record, next.run(ctx, request)).await;

            echo(&mut response, headers::REQUEST_ID, &request_id);
            echo(&mut response, headers::CORRELATION_ID, &correlation_id);
            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn binder() -> IngressBinder {
        IngressBinder::new(ContextStore::new())
    }

    fn open_binder() -> IngressBinder {
        IngressBinder::with_options(
            ContextStore::new(),
            IngressOptions {
                require_access_token: false,
                trust_incoming_ids: true,
            },
        )
    }

    #[test]
    fn test_extract_full_envelope() {
        let envelope = props(&[
            ("authorization", "Bearer t1"),
            ("x-request-id", "r1"),
            ("x-correlation-id", "c1"),
            ("x-app-name", "svc-a"),
            ("x-app-version", "1.0"),
            ("x-item-id", "i1"),
            ("x-manager-id", "m1"),
        ]);

        let record = binder().extract(&envelope).unwrap();

        assert_eq!(
            record,
            ContextRecord::new("r1", "c1")
                .with_access_token("t1")
                .with_app("svc-a", "1.0")
                .with_item_id("i1")
                .with_manager_id("m1")
        );
    }

    #[test]
    fn test_missing_ids_are_minted() {
        let record = binder()
            .extract(&props(&[("authorization", "Bearer t1")]))
            .unwrap();

        assert!(!record.request_id().is_empty());
        assert_eq!(record.correlation_id(), record.request_id());
        assert_eq!(record.app_name(), UNKNOWN_APP);
        assert_eq!(record.app_version(), UNKNOWN_APP);
    }

    #[test]
    fn test_inbound_correlation_is_kept_when_request_id_minted() {
        let record = binder()
            .extract(&props(&[
                ("authorization", "Bearer t1"),
                ("x-correlation-id", "c1"),
            ]))
            .unwrap();

        assert_ne!(record.request_id(), "c1");
        assert_eq!(record.correlation_id(), "c1");
    }

    #[test]
    fn test_untrusted_ids_are_replaced() {
        let binder = IngressBinder::with_options(
            ContextStore::new(),
            IngressOptions {
                require_access_token: true,
                trust_incoming_ids: false,
            },
        );

        let record = binder
            .extract(&props(&[
                ("authorization", "Bearer t1"),
                ("x-request-id", "r1"),
                ("x-correlation-id", "c1"),
            ]))
            .unwrap();

        assert_ne!(record.request_id(), "r1");
        assert_eq!(record.correlation_id(), record.request_id());
    }

    #[test]
    fn test_required_token_rejections() {
        for envelope in [
            props(&[]),
            props(&[("authorization", "Basic dXNlcg==")]),
            props(&[("authorization", "Bearer ")]),
            props(&[("authorization", "")]),
        ] {
            let err = binder().extract(&envelope).unwrap_err();
            assert!(err.is_invalid_credential(), "{envelope:?}");
        }
    }

    #[test]
    fn test_optional_token() {
        let record = open_binder().extract(&props(&[])).unwrap();
        assert_eq!(record.access_token(), None);

        let record = open_binder()
            .extract(&props(&[("authorization", "Basic dXNlcg==")]))
            .unwrap();
        assert_eq!(record.access_token(), None);

        let record = open_binder()
            .extract(&props(&[("authorization", "Bearer t2")]))
            .unwrap();
        assert_eq!(record.access_token(), Some("t2"));
    }

    #[test]
    fn test_blank_fields_count_as_absent() {
        let record = open_binder()
            .extract(&props(&[("x-request-id", "  "), ("x-item-id", "")]))
            .unwrap();

        assert!(!record.request_id().trim().is_empty());
        assert_eq!(record.item_id(), None);
    }

    #[test]
    fn test_unsendable_ids_are_replaced() {
        let record = open_binder()
            .extract(&props(&[
                ("x-request-id", "r1\nforged: yes"),
                ("x-correlation-id", "c\u{fc}1"),
                ("x-app-name", "caf\u{e9}"),
            ]))
            .unwrap();

        assert_ne!(record.request_id(), "r1\nforged: yes");
        assert_eq!(record.correlation_id(), record.request_id());
        assert!(HeaderValue::from_str(record.correlation_id()).is_ok());
        assert_eq!(record.app_name(), UNKNOWN_APP);
    }

    #[tokio::test]
    async fn test_run_binds_for_the_future_only() {
        let store = ContextStore::new();
        let binder = IngressBinder::new(store);
        let envelope = props(&[("authorization", "Bearer t1"), ("x-request-id", "r1")]);

        let seen = binder
            .run(&envelope, async move {
                tokio::task::yield_now().await;
                store.current().map(|r| r.access_token().map(str::to_owned))
            })
            .await
            .unwrap();

        assert_eq!(seen.unwrap(), Some("t1".to_string()));
        assert!(store.current().is_err());
    }

    #[tokio::test]
    async fn test_run_does_not_poll_on_failure() {
        let polled = std::sync::atomic::AtomicBool::new(false);
        let result = binder()
            .run(&props(&[]), async {
                polled.store(true, std::sync::atomic::Ordering::SeqCst);
            })
            .await;

        assert!(result.unwrap_err().is_invalid_credential());
        assert!(!polled.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_bind_within_chain() {
        let store = ContextStore::new();
        let binder = IngressBinder::new(store);
        let envelope = props(&[("authorization", "Bearer t1"), ("x-request-id", "r1")]);

        let request_id = store
            .chain(async move {
                binder.bind(&envelope).unwrap();
                store.current().unwrap().request_id().to_string()
            })
            .await;

        assert_eq!(request_id, "r1");
    }

    #[test]
    fn test_bind_outside_chain_is_an_error() {
        let store = ContextStore::new();
        let binder = IngressBinder::new(store);
        let envelope = props(&[("authorization", "Bearer t1"), ("x-request-id", "r1")]);

        assert_eq!(
            binder.bind(&envelope).unwrap_err(),
            ContextError::MissingContext
        );
        assert!(store.current().is_err());
    }
}
