//! Pipeline stages shipped with Ariadne.
//!
//! The ingress stage lives in [`crate::ingress`]; stages here assume it ran
//! before them.

pub mod access_log;

pub use access_log::AccessLogMiddleware;
