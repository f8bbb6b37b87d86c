//! Per-request pipeline state.

use std::time::{Duration, Instant};

use ariadne_core::ContextRecord;

/// State that flows through the pipeline alongside the request.
///
/// The ingress stage stores the record it bound so later stages can read it
/// without going through the context store.
///
/// # Example
///
/// ```
/// use ariadne_core::ContextRecord;
/// use ariadne_middleware::MiddlewareContext;
///
/// let mut ctx = MiddlewareContext::new();
/// assert!(ctx.request_id().is_none());
///
/// ctx.set_record(ContextRecord::new("r1", "c1"));
/// assert_eq!(ctx.request_id(), Some("r1"));
/// ```
#[derive(Debug)]
pub struct MiddlewareContext {
    record: Option<ContextRecord>,
    started_at: Instant,
}

impl MiddlewareContext {
    /// Creates an empty context; the request clock starts now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            record: None,
            started_at: Instant::now(),
        }
    }

    /// Returns the record bound by the ingress stage.
    #[must_use]
    pub fn record(&self) -> Option<&ContextRecord> {
        self.record.as_ref()
    }

    /// Stores the bound record.
    ///
    /// Called by the ingress stage.
    pub fn set_record(&mut self, record: ContextRecord) {
        self.record = Some(record);
    }

    /// Returns the request id of the bound record.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.record.as_ref().map(ContextRecord::request_id)
    }

    /// Returns when processing started.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the time spent since processing started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}
