//! Execution-local context store.
//!
//! The [`ContextStore`] binds a [`ContextRecord`] to the *chain* currently
//! executing: the future a transport runs for one request, plus every
//! continuation descending from it.
//!
//! ## How bindings are kept
//!
//! The active record lives in a `tokio::task_local!` slot that is owned by the
//! chain's future. Tokio swaps the slot in on every poll and out again when
//! the poll returns, so:
//!
//! - two chains interleaved on one thread never see each other's slot,
//! - a chain that migrates between worker threads takes its slot along,
//! - the slot is dropped together with the future (completion, cancellation
//!   or client disconnect), so no table of chains can grow.
//!
//! New tasks do not inherit task-locals on their own. Use
//! [`ContextStore::fork`] or [`ContextStore::spawn`] to carry the record
//! into a sub-chain. A sub-chain owns a fresh slot seeded with the parent's
//! record, so a [`ContextStore::bind`] inside it never reaches the parent or
//! its siblings.
//!
//! ## Failure policy
//!
//! There is no default record. [`ContextStore::current`] on an unbound chain
//! fails with [`ContextError::MissingContext`].

use std::cell::RefCell;
use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::error::{ContextError, ContextResult};
use crate::record::ContextRecord;

type Slot = RefCell<Option<Arc<ContextRecord>>>;

tokio::task_local! {
    static ACTIVE: Slot;
}

/// Read access to the record bound on the calling chain.
///
/// Implemented by [`ContextStore`]. Consumers such as the structured logger
/// and the egress propagator take a `ContextSource` so tests can substitute
/// a fixed or failing source.
pub trait ContextSource: Send + Sync {
    /// Returns the record bound to the calling chain.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::MissingContext`] when nothing is bound.
    fn current(&self) -> ContextResult<Arc<ContextRecord>>;
}

impl<T: ContextSource + ?Sized> ContextSource for Arc<T> {
    fn current(&self) -> ContextResult<Arc<ContextRecord>> {
        (**self).current()
    }
}

/// Handle to the execution-local context store.
///
/// The handle is a zero-sized value; copies all address the same
/// execution-local slot, so it can be passed freely to every component that
/// needs it.
///
/// # Example
///
/// ```
/// use ariadne_core::{ContextRecord, ContextStore};
///
/// # tokio_test::block_on(async {
/// let store = ContextStore::new();
///
/// store
///     .scope(ContextRecord::new("r1", "c1"), async move {
///         let child = store.fork(async move {
///             // Rebinding in the sub-chain stays in the sub-chain.
///             store.bind(ContextRecord::new("r1-retry", "c1"));
///             store.current().unwrap().request_id().to_string()
///         });
///         assert_eq!(child.await, "r1-retry");
///         assert_eq!(store.current().unwrap().request_id(), "r1");
///     })
///     .await;
/// # });
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextStore {
    _private: (),
}

impl ContextStore {
    /// Creates a store handle.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Runs `future` as a new chain with `record` bound.
    ///
    /// This is the ingress entry point: the transport wraps the whole
    /// handling of one request in it. The binding is dropped with the
    /// returned future.
    pub fn scope<F>(&self, record: ContextRecord, future: F) -> impl Future<Output = F::Output>
    where
        F: Future,
    {
        ACTIVE.scope(RefCell::new(Some(Arc::new(record))), future)
    }

    /// Runs `future` as a new chain with nothing bound yet.
    ///
    /// Use this when the record is only known after some processing inside
    /// the chain; a later [`bind`](Self::bind) then applies to the whole
    /// remainder of the chain.
    pub fn chain<F>(&self, future: F) -> impl Future<Output = F::Output>
    where
        F: Future,
    {
        ACTIVE.scope(RefCell::new(None), future)
    }

    /// Runs the synchronous closure `f` as a chain with `record` bound.
    ///
    /// For work pinned to one thread outside of any async task.
    pub fn sync_scope<F, R>(&self, record: ContextRecord, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        ACTIVE.sync_scope(RefCell::new(Some(Arc::new(record))), f)
    }

    /// Replaces the record bound to the calling chain.
    ///
    /// The new record is seen by the rest of the chain and by every sub-chain
    /// forked after this call. It is never merged with the previous record.
    ///
    /// Outside of any chain there is nothing to bind to: the call is reported
    /// on the diagnostics channel and the record is discarded. Use
    /// [`try_bind`](Self::try_bind) when the caller must know.
    pub fn bind(&self, record: ContextRecord) {
        let request_id = record.request_id().to_owned();
        if self.try_bind(record).is_err() {
            tracing::warn!(
                request_id = %request_id,
                "bind called outside of a context chain; record discarded"
            );
        }
    }

    /// Replaces the record bound to the calling chain, failing when there is
    /// no chain.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::MissingContext`] when the calling code does
    /// not run inside a chain. The record is dropped.
    pub fn try_bind(&self, record: ContextRecord) -> ContextResult<()> {
        let record = Arc::new(record);
        let request_id = record.request_id().to_owned();

        ACTIVE
            .try_with(move |slot| {
                slot.replace(Some(record));
            })
            .map_err(|_| ContextError::MissingContext)?;

        tracing::trace!(request_id = %request_id, "context bound");
        Ok(())
    }

    /// Returns the record bound to the calling chain.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::MissingContext`] when the calling code does
    /// not run inside a chain, or the chain has nothing bound.
    pub fn current(&self) -> ContextResult<Arc<ContextRecord>> {
        self.snapshot().ok_or(ContextError::MissingContext)
    }

    /// Returns `true` when a record is bound to the calling chain.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.snapshot().is_some()
    }

    /// Wraps `future` as a sub-chain inheriting the current record.
    ///
    /// The record is captured when `fork` is called. Binds inside the
    /// sub-chain only affect the sub-chain.
    pub fn fork<F>(&self, future: F) -> impl Future<Output = F::Output>
    where
        F: Future,
    {
        ACTIVE.scope(RefCell::new(self.snapshot()), future)
    }

    /// Spawns `future` on the Tokio runtime as a sub-chain of the caller.
    ///
    /// Equivalent to `tokio::spawn(store.fork(future))`.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        tokio::spawn(self.fork(future))
    }

    fn snapshot(&self) -> Option<Arc<ContextRecord>> {
        ACTIVE.try_with(|slot| slot.borrow().clone()).ok().flatten()
    }
}

impl ContextSource for ContextStore {
    fn current(&self) -> ContextResult<Arc<ContextRecord>> {
        Self::current(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn record(id: &str) -> ContextRecord {
        ContextRecord::new(format!("req-{id}"), format!("corr-{id}"))
            .with_access_token(format!("token-{id}"))
            .with_app(format!("svc-{id}"), "1.0")
    }

    #[test]
    fn test_current_outside_chain_is_missing() {
        let store = ContextStore::new();
        assert_eq!(store.current().unwrap_err(), ContextError::MissingContext);
        assert!(!store.is_bound());
    }

    #[test]
    fn test_bind_outside_chain_is_discarded() {
        let store = ContextStore::new();
        store.bind(record("a"));
        assert!(store.current().is_err());
    }

    #[test]
    fn test_try_bind_outside_chain_fails() {
        let store = ContextStore::new();
        assert_eq!(
            store.try_bind(record("a")).unwrap_err(),
            ContextError::MissingContext
        );
        assert!(!store.is_bound());
    }

    #[tokio::test]
    async fn test_try_bind_inside_chain() {
        let store = ContextStore::new();
        let seen = store
            .chain(async move {
                store.try_bind(record("a")).unwrap();
                store.current()
            })
            .await
            .unwrap();
        assert_eq!(*seen, record("a"));
    }

    #[tokio::test]
    async fn test_scope_binds_record() {
        let store = ContextStore::new();
        let seen = store
            .scope(record("a"), async move { store.current() })
            .await
            .unwrap();
        assert_eq!(*seen, record("a"));
    }

    #[tokio::test]
    async fn test_binding_survives_suspension() {
        let store = ContextStore::new();
        store
            .scope(record("a"), async move {
                tokio::task::yield_now().await;
                tokio::time::sleep(Duration::from_millis(5)).await;
                assert_eq!(store.current().unwrap().request_id(), "req-a");
            })
            .await;
    }

    #[tokio::test]
    async fn test_binding_ends_with_scope() {
        let store = ContextStore::new();
        store.scope(record("a"), async {}).await;
        assert!(store.current().is_err());
    }

    #[tokio::test]
    async fn test_record_is_reclaimed_after_chain() {
        let store = ContextStore::new();
        let weak = store
            .scope(record("a"), async move {
                Arc::downgrade(&store.current().unwrap())
            })
            .await;
        assert!(weak.upgrade().is_none());
    }

    #[tokio::test]
    async fn test_interleaved_chains_are_isolated() {
        let store = ContextStore::new();

        let chain = |id: &'static str| {
            store.scope(record(id), async move {
                let mut seen = Vec::new();
                for _ in 0..10 {
                    tokio::task::yield_now().await;
                    seen.push(store.current().unwrap().request_id().to_string());
                }
                seen
            })
        };

        let (a, b) = tokio::join!(chain("a"), chain("b"));
        assert!(a.iter().all(|id| id == "req-a"));
        assert!(b.iter().all(|id| id == "req-b"));
    }

    #[tokio::test]
    async fn test_bind_within_chain_is_visible_later() {
        let store = ContextStore::new();
        store
            .scope(record("a"), async move {
                tokio::task::yield_now().await;
                store.bind(record("b"));
                tokio::task::yield_now().await;
                assert_eq!(store.current().unwrap().request_id(), "req-b");
            })
            .await;
    }

    #[tokio::test]
    async fn test_bind_is_a_full_replacement() {
        let store = ContextStore::new();
        store
            .scope(record("a"), async move {
                let replacement = ContextRecord::new("r2", "c2");
                store.bind(replacement.clone());
                let current = store.current().unwrap();
                assert_eq!(*current, replacement);
                assert!(current.access_token().is_none());
            })
            .await;
    }

    #[tokio::test]
    async fn test_bind_twice_is_idempotent() {
        let store = ContextStore::new();
        store
            .chain(async move {
                store.bind(record("a"));
                store.bind(record("a"));
                assert_eq!(*store.current().unwrap(), record("a"));
            })
            .await;
    }

    #[tokio::test]
    async fn test_chain_starts_unbound() {
        let store = ContextStore::new();
        store
            .chain(async move {
                assert!(store.current().is_err());
                store.bind(record("a"));
                assert!(store.is_bound());
            })
            .await;
    }

    #[tokio::test]
    async fn test_fork_inherits_record() {
        let store = ContextStore::new();
        store
            .scope(record("a"), async move {
                let child = store.fork(async move {
                    tokio::task::yield_now().await;
                    store.current().unwrap().request_id().to_string()
                });
                assert_eq!(child.await, "req-a");
            })
            .await;
    }

    #[tokio::test]
    async fn test_bind_in_fork_does_not_reach_parent_or_sibling() {
        let store = ContextStore::new();
        store
            .scope(record("a"), async move {
                let rebinding = store.fork(async move {
                    store.bind(record("child"));
                    tokio::task::yield_now().await;
                    store.current().unwrap().request_id().to_string()
                });
                let sibling = store.fork(async move {
                    tokio::task::yield_now().await;
                    tokio::task::yield_now().await;
                    store.current().unwrap().request_id().to_string()
                });

                let (rebound, sibling) = tokio::join!(rebinding, sibling);
                assert_eq!(rebound, "req-child");
                assert_eq!(sibling, "req-a");
                assert_eq!(store.current().unwrap().request_id(), "req-a");
            })
            .await;
    }

    #[tokio::test]
    async fn test_spawn_inherits_record() {
        let store = ContextStore::new();
        let seen = store
            .scope(record("a"), async move {
                store
                    .spawn(async move {
                        tokio::time::sleep(Duration::from_millis(1)).await;
                        store.current().map(|r| r.request_id().to_string())
                    })
                    .await
                    .unwrap()
            })
            .await;
        assert_eq!(seen.unwrap(), "req-a");
    }

    #[tokio::test]
    async fn test_plain_tokio_spawn_is_detached() {
        let store = ContextStore::new();
        let seen = store
            .scope(record("a"), async move {
                tokio::spawn(async move { store.current() }).await.unwrap()
            })
            .await;
        assert_eq!(seen.unwrap_err(), ContextError::MissingContext);
    }

    #[tokio::test]
    async fn test_fork_outside_chain_stays_unbound() {
        let store = ContextStore::new();
        let seen = store.fork(async move { store.current() }).await;
        assert!(seen.is_err());
    }

    #[test]
    fn test_sync_scope() {
        let store = ContextStore::new();
        let id = store.sync_scope(record("a"), || {
            store.current().unwrap().request_id().to_string()
        });
        assert_eq!(id, "req-a");
        assert!(store.current().is_err());
    }

    #[tokio::test]
    async fn test_context_source_through_arc() {
        let source: Arc<dyn ContextSource> = Arc::new(ContextStore::new());
        let store = ContextStore::new();
        let seen = store
            .scope(record("a"), async move { source.current() })
            .await;
        assert_eq!(seen.unwrap().request_id(), "req-a");
    }
}
