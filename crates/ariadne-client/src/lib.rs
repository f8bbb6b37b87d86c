//! # Ariadne Client
//!
//! Outbound side of context propagation. An [`EgressPropagator`] reads the
//! record bound to the calling chain and produces the headers a downstream
//! service needs to continue the chain: the caller's credential, the shared
//! correlation id and a request id minted for the new hop.
//!
//! [`ContextClient`] wraps a `reqwest::Client` so every request it starts
//! already carries those headers.

#![doc(html_root_url = "https://docs.rs/ariadne-client/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod propagator;

pub use client::ContextClient;
pub use error::{ClientError, ClientResult};
pub use propagator::{EgressPropagator, OutboundHeaders};
