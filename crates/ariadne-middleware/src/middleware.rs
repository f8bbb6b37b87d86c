//! Core middleware trait and continuation.
//!
//! A [`Middleware`] receives the mutable [`MiddlewareContext`], the request,
//! and a [`Next`] continuation. Calling [`Next::run`] hands the request to
//! the rest of the pipeline; not calling it short-circuits with the
//! middleware's own response.
//!
//! Whatever a stage awaits through `next.run()` is polled inside that
//! stage's future. A stage that wraps the continuation in a context chain
//! therefore makes the record visible to every later stage and to the
//! handler.

use std::future::Future;
use std::pin::Pin;

use crate::context::MiddlewareContext;
use crate::types::{Request, Response};

/// A boxed future that returns a response.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Terminal request handler.
pub type Handler<'a> =
    Box<dyn FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a>;

/// A pipeline stage.
///
/// # Example
///
/// ```
/// use ariadne_middleware::{BoxFuture, Middleware, MiddlewareContext, Next, Request, Response};
///
/// struct ServerHeader;
///
/// impl Middleware for ServerHeader {
///     fn name(&self) -> &'static str {
///         "server_header"
///     }
///
///     fn process<'a>(
///         &'a self,
///         ctx: &'a mut MiddlewareContext,
///         request: Request,
///         next: Next<'a>,
///     ) -> BoxFuture<'a, Response> {
///         Box::pin(async move {
///             let mut response = next.run(ctx, request).await;
///             response
///                 .headers_mut()
///                 .insert("server", http::HeaderValue::from_static("ariadne"));
///             response
///         })
///     }
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this stage, used in diagnostics.
    fn name(&self) -> &'static str;

    /// Processes the request, normally by awaiting `next.run(ctx, request)`.
    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response>;
}

/// Continuation to the rest of the pipeline.
///
/// Consumed by [`run`](Self::run), so it can be invoked at most once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Handler(Handler<'a>),
}

impl<'a> Next<'a> {
    /// Creates a continuation that runs `middleware`, then `next`.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal continuation that invokes the handler.
    pub(crate) fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Runs the next stage, or the handler at the end of the pipeline.
    pub async fn run(self, ctx: &mut MiddlewareContext, request: Request) -> Response {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(ctx, request, *next).await,
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}
