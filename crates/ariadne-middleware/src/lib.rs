//! # Ariadne Middleware
//!
//! Binds the context of inbound requests and hosts the middleware pipeline
//! the transport layer mounts it in.
//!
//! ```text
//! Request → Ingress ─┬─ AccessLog → Handler
//!                    │      (context chain bound)
//! Response ← ids echoed ┴──────────────────────┘
//! ```
//!
//! - [`IngressBinder`] reads an [`Envelope`] (HTTP headers or message
//!   properties), builds a [`ContextRecord`](ariadne_core::ContextRecord)
//!   and runs the rest of the request inside a context chain.
//! - [`AccessLogMiddleware`] logs start and completion from inside that
//!   chain, so its records carry the request context.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use ariadne_core::{AppIdentity, ContextStore};
//! use ariadne_middleware::{AccessLogMiddleware, IngressBinder, MiddlewareContext, Pipeline};
//! use ariadne_telemetry::StructuredLogger;
//! use bytes::Bytes;
//! use http_body_util::Full;
//!
//! # tokio_test::block_on(async {
//! let store = ContextStore::new();
//! let logger = Arc::new(StructuredLogger::disabled(AppIdentity::new("orders", "2.3.0")));
//! let pipeline = Pipeline::builder()
//!     .stage(IngressBinder::new(store))
//!     .stage(AccessLogMiddleware::new(logger))
//!     .build();
//!
//! let request = http::Request::builder()
//!     .header("authorization", "Bearer t1")
//!     .header("x-request-id", "r1")
//!     .body(Full::new(Bytes::new()))
//!     .unwrap();
//!
//! let response = pipeline
//!     .process(MiddlewareContext::new(), request, move |_ctx, _req| {
//!         Box::pin(async move {
//!             let record = store.current().unwrap();
//!             http::Response::new(Full::new(Bytes::from(record.request_id().to_owned())))
//!         })
//!     })
//!     .await;
//!
//! assert_eq!(response.headers()["x-request-id"], "r1");
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/ariadne-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod envelope;
pub mod ingress;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

pub use context::MiddlewareContext;
pub use envelope::Envelope;
pub use ingress::{IngressBinder, IngressOptions, UNKNOWN_APP};
pub use middleware::{BoxFuture, Handler, Middleware, Next};
pub use pipeline::{BoxedMiddleware, Pipeline, PipelineBuilder};
pub use stages::AccessLogMiddleware;
pub use types::{Request, Response, ResponseExt};
