//! # Ariadne
//!
//! **Request-context propagation and context-enriched structured logging**
//!
//! Ariadne carries the identity and tracing metadata of each inbound request
//! through every asynchronous continuation that serves it, without threading
//! it through function parameters:
//!
//! - **Ingress** binds a [`ContextRecord`] built from the request headers
//! - **Logging** enriches every record with the bound context
//! - **Egress** forwards the credential and correlation id, minting a new
//!   request id per hop
//!
//! ```text
//! inbound ──▶ IngressBinder ──▶ handler ──▶ ContextClient ──▶ downstream
//!              │ bind               │ log        │ propagate
//!              ▼                    ▼            ▼
//!           ContextStore ◀──── StructuredLogger / EgressPropagator
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ariadne::Ariadne;
//!
//! let ariadne = Ariadne::from_env()?;
//! ariadne.init_diagnostics()?;
//!
//! let pipeline = ariadne.pipeline_builder().build();
//! let inventory = ariadne.client("http://inventory.internal/")?;
//! ```

#![doc(html_root_url = "https://docs.rs/ariadne/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod assembly;
mod error;

pub use assembly::{Ariadne, CONFIG_FILE};
pub use error::{AriadneError, AriadneResult};

// Re-export the component crates
pub use ariadne_client as client;
pub use ariadne_config as config;
pub use ariadne_core as core;
pub use ariadne_middleware as middleware;
pub use ariadne_telemetry as telemetry;

pub use ariadne_config::AriadneConfig;
pub use ariadne_core::{AppIdentity, ContextError, ContextRecord, ContextResult, ContextStore};

/// Prelude module for convenient imports.
///
/// ```
/// use ariadne::prelude::*;
///
/// let record = ContextRecord::new("r1", "c1");
/// assert_eq!(record.request_id(), "r1");
/// ```
pub mod prelude {
    pub use ariadne_client::{ContextClient, EgressPropagator, OutboundHeaders};
    pub use ariadne_core::{
        mint_id, AppIdentity, ContextError, ContextRecord, ContextResult, ContextSource,
        ContextStore,
    };
    pub use ariadne_middleware::{
        AccessLogMiddleware, Envelope, IngressBinder, IngressOptions, Middleware,
        MiddlewareContext, Pipeline,
    };
    pub use ariadne_telemetry::{LogEntry, LogLevel, StructuredLogger};

    pub use crate::{Ariadne, AriadneConfig, AriadneError, AriadneResult};
}
