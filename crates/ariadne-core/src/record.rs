//! Context record types.
//!
//! The [`ContextRecord`] carries the identity and tracing metadata of one
//! request-response interaction. [`AppIdentity`] is the static identity of the
//! service itself and is never part of a record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mints a new globally unique identifier.
///
/// Used for request ids, correlation ids and per-hop outbound request ids.
/// UUID v7 embeds a timestamp and 74 random bits, which keeps collisions
/// negligible at fleet scale without any coordination.
///
/// # Example
///
/// ```
/// let a = ariadne_core::mint_id();
/// let b = ariadne_core::mint_id();
/// assert_ne!(a, b);
/// assert_eq!(a.len(), 36);
/// ```
#[must_use]
pub fn mint_id() -> String {
    Uuid::now_v7().to_string()
}

/// Identity and tracing metadata for one request-response interaction.
///
/// Records are built once at ingress and are read-only afterwards: the store
/// hands out shared handles and a partial update means building a new record
/// and binding it again.
///
/// # Example
///
/// ```
/// use ariadne_core::ContextRecord;
///
/// let record = ContextRecord::new("req-1", "corr-1")
///     .with_access_token("t1")
///     .with_app("svc-a", "1.0")
///     .with_item_id("item-9");
///
/// assert_eq!(record.request_id(), "req-1");
/// assert_eq!(record.access_token(), Some("t1"));
/// assert_eq!(record.manager_id(), None);
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextRecord {
    /// Bearer token authenticating the interaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,

    /// Identifier of this hop.
    request_id: String,

    /// Identifier shared by every hop of the causal chain of calls.
    correlation_id: String,

    /// Name of the calling application.
    app_name: String,

    /// Version of the calling application.
    app_version: String,

    /// Item the interaction was initiated for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    item_id: Option<String>,

    /// Manager the interaction was initiated by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    manager_id: Option<String>,
}

impl ContextRecord {
    /// Creates a record with the given request and correlation ids.
    ///
    /// Caller app name and version start empty; set them with
    /// [`with_app`](Self::with_app).
    #[must_use]
    pub fn new(request_id: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self {
            access_token: None,
            request_id: request_id.into(),
            correlation_id: correlation_id.into(),
            app_name: String::new(),
            app_version: String::new(),
            item_id: None,
            manager_id: None,
        }
    }

    /// Returns a copy with the access token set.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Returns a copy with the caller application name and version set.
    #[must_use]
    pub fn with_app(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.app_name = name.into();
        self.app_version = version.into();
        self
    }

    /// Returns a copy with the item id set.
    #[must_use]
    pub fn with_item_id(mut self, item_id: impl Into<String>) -> Self {
        self.item_id = Some(item_id.into());
        self
    }

    /// Returns a copy with the manager id set.
    #[must_use]
    pub fn with_manager_id(mut self, manager_id: impl Into<String>) -> Self {
        self.manager_id = Some(manager_id.into());
        self
    }

    /// Returns the access token, if the interaction carried one.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Returns the request id.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the correlation id.
    #[must_use]
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Returns the calling application's name.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Returns the calling application's version.
    #[must_use]
    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    /// Returns the item id, if present.
    #[must_use]
    pub fn item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }

    /// Returns the manager id, if present.
    #[must_use]
    pub fn manager_id(&self) -> Option<&str> {
        self.manager_id.as_deref()
    }

    /// Serializes the record into a JSON object.
    ///
    /// Keys are camelCase (`requestId`, `accessToken`, ...), the shape log
    /// indexers expect under `context`. Absent optional fields are omitted.
    #[must_use]
    pub fn to_json_object(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}

// Tokens must not end up in panic messages or debug logs.
impl std::fmt::Debug for ContextRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextRecord")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("request_id", &self.request_id)
            .field("correlation_id", &self.correlation_id)
            .field("app_name", &self.app_name)
            .field("app_version", &self.app_version)
            .field("item_id", &self.item_id)
            .field("manager_id", &self.manager_id)
            .finish()
    }
}

/// Name and version of the running service.
///
/// Distinct from the caller's `app_name`/`app_version` in a
/// [`ContextRecord`]: this is who *we* are when we log or call downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppIdentity {
    /// Service name.
    pub name: String,
    /// Service version.
    pub version: String,
}

impl AppIdentity {
    /// Creates a new identity.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Returns the `User-Agent` string for outbound calls (`name/version`).
    #[must_use]
    pub fn user_agent(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}
