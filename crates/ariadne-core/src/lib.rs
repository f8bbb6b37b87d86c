//! # Ariadne Core
//!
//! Core types for request-context propagation in Ariadne services.
//!
//! This crate provides the foundational types used throughout Ariadne:
//!
//! - [`ContextRecord`] - Identity and tracing metadata of one request-response interaction
//! - [`AppIdentity`] - Static name/version of the running service
//! - [`ContextStore`] - Execution-local store binding a record to a chain of async work
//! - [`ContextSource`] - Read side of the store, implemented by test doubles as well
//! - [`ContextError`] - Missing context and invalid credential errors
//!
//! ## Chains
//!
//! A *chain* is the handler future of one inbound request plus every
//! continuation descending from it. The store keeps the bound record inside
//! the chain's own future, so it follows causal execution rather than the
//! worker thread, and it disappears as soon as the chain is dropped.
//!
//! ```
//! use ariadne_core::{ContextRecord, ContextStore};
//!
//! # tokio_test::block_on(async {
//! let store = ContextStore::new();
//! let record = ContextRecord::new("req-1", "corr-1").with_app("billing", "1.4.2");
//!
//! let seen = store
//!     .scope(record, async move {
//!         tokio::task::yield_now().await;
//!         store.current().map(|r| r.request_id().to_string())
//!     })
//!     .await;
//!
//! assert_eq!(seen.unwrap(), "req-1");
//! assert!(store.current().is_err());
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/ariadne-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod headers;
mod record;
mod store;

pub use error::{ContextError, ContextResult};
pub use record::{mint_id, AppIdentity, ContextRecord};
pub use store::{ContextSource, ContextStore};
