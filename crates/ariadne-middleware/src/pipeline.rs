//! Ordered middleware pipeline.
//!
//! The transport collaborator builds one [`Pipeline`] at startup and calls
//! [`Pipeline::process`] for every request. Stages run in the order they
//! were added, so the ingress stage goes first and everything after it runs
//! inside the bound context chain.

use std::sync::Arc;

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};

/// A type-erased stage.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// Immutable, ordered list of stages.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use ariadne_core::{AppIdentity, ContextStore};
/// use ariadne_middleware::{AccessLogMiddleware, IngressBinder, Pipeline};
/// use ariadne_telemetry::StructuredLogger;
///
/// let logger = Arc::new(StructuredLogger::disabled(AppIdentity::new("orders", "2.3.0")));
/// let pipeline = Pipeline::builder()
///     .stage(IngressBinder::new(ContextStore::new()))
///     .stage(AccessLogMiddleware::new(logger))
///     .build();
///
/// assert_eq!(pipeline.stage_names(), vec!["ingress", "access_log"]);
/// ```
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates a pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs `request` through every stage and then `handler`.
    pub async fn process<H>(
        &self,
        mut ctx: MiddlewareContext,
        request: Request,
        handler: H,
    ) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'static,
    {
        let next = self.build_chain(handler);
        next.run(&mut ctx, request).await
    }

    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        self.stages
            .iter()
            .rev()
            .fold(Next::handler(handler), |next, stage| {
                Next::new(stage.as_ref(), next)
            })
    }

    /// Returns the stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage.
    #[must_use]
    pub fn stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Appends a shared stage.
    #[must_use]
    pub fn shared_stage(mut self, middleware: BoxedMiddleware) -> Self {
        self.stages.push(middleware);
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct OrderTracking {
        name: &'static str,
        counter: Arc<AtomicUsize>,
        order: Arc<parking_lot::Mutex<Vec<&'static str>>>,
    }

    impl Middleware for OrderTracking {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut MiddlewareContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                self.counter.fetch_add(1, Ordering::SeqCst);
                self.order.lock().push(self.name);
                next.run(ctx, request).await
            })
        }
    }

    struct ShortCircuit;

    impl Middleware for ShortCircuit {
        fn name(&self) -> &'static str {
            "short_circuit"
        }

        fn process<'a>(
            &'a self,
            _ctx: &'a mut MiddlewareContext,
            _request: Request,
            _next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async {
                let mut response = http::Response::new(Full::new(Bytes::new()));
                *response.status_mut() = StatusCode::SERVICE_UNAVAILABLE;
                response
            })
        }
    }

    fn request() -> Request {
        http::Request::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn ok(_ctx: &mut MiddlewareContext, _req: Request) -> BoxFuture<'static, Response> {
        Box::pin(async { http::Response::new(Full::new(Bytes::from("OK"))) })
    }

    #[tokio::test]
    async fn test_pipeline_executes_in_order() {
        let counter = Arc::new(AtomicUsize::new(0));
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let stage = |name| OrderTracking {
            name,
            counter: counter.clone(),
            order: order.clone(),
        };

        let pipeline = Pipeline::builder()
            .stage(stage("first"))
            .stage(stage("second"))
            .stage(stage("third"))
            .build();

        let response = pipeline
            .process(MiddlewareContext::new(), request(), ok)
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
        assert_eq!(pipeline.stage_names(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_short_circuit_skips_handler() {
        let invoked = Arc::new(AtomicUsize::new(0));
        let seen = invoked.clone();
        let pipeline = Pipeline::builder().stage(ShortCircuit).build();

        let response = pipeline
            .process(MiddlewareContext::new(), request(), move |_ctx, _req| {
                seen.fetch_add(1, Ordering::SeqCst);
                Box::pin(async { http::Response::new(Full::new(Bytes::new())) })
            })
            .await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(invoked.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_pipeline() {
        let pipeline = Pipeline::builder().build();
        assert_eq!(pipeline.stage_count(), 0);

        let response = pipeline
            .process(MiddlewareContext::new(), request(), ok)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
