//! Access log stage.
//!
//! Writes one structured record when a request arrives and one when its
//! response leaves. Mounted after the ingress stage, both records carry the
//! bound request context.
//!
//! | Record | Level | Indexed fields |
//! |--------|-------|----------------|
//! | `request started` | `DEBUG` | `method`, `path` |
//! | `request completed` | by status | `method`, `path`, `status`, `duration_ms` |
//!
//! Completion is logged at `ERROR` for 5xx responses, `WARN` for 4xx and
//! `INFO` otherwise.

use std::sync::Arc;

use ariadne_telemetry::{LogEntry, LogLevel, StructuredLogger};
use http::StatusCode;

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};

/// Logs request start and completion through a [`StructuredLogger`].
#[derive(Debug, Clone)]
pub struct AccessLogMiddleware {
    logger: Arc<StructuredLogger>,
}

impl AccessLogMiddleware {
    /// Creates the stage.
    #[must_use]
    pub fn new(logger: Arc<StructuredLogger>) -> Self {
        Self { logger }
    }

    fn completion_level(status: StatusCode) -> LogLevel {
        if status.is_server_error() {
            LogLevel::Error
        } else if status.is_client_error() {
            LogLevel::Warn
        } else {
            LogLevel::Info
        }
    }
}

impl Middleware for AccessLogMiddleware {
    fn name(&self) -> &'static str {
        "access_log"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let method = request.method().to_string();
            let path = request.uri().path().to_owned();

            self.logger.debug(
                LogEntry::new("request started")
                    .indexed_s("method", method.as_str())
                    .indexed_s("path", path.as_str()),
            );

            let response = next.run(ctx, request).await;

            let status = response.status();
            let duration_ms = u64::try_from(ctx.elapsed().as_millis()).unwrap_or(u64::MAX);
            self.logger.log(
                Self::completion_level(status),
                LogEntry::new("request completed")
                    .indexed_s("method", method)
                    .indexed_s("path", path)
                    .indexed_n("status", status.as_u16())
                    .indexed_n("duration_ms", duration_ms),
            );

            response
        })
    }
}
