//! Status-gated decoration of big segment stores.
//!
//! Until the gate permits it, [`StatusGatedStore`] answers metadata queries
//! with a synthetic "up to date right now" record instead of querying the
//! backing store. The host supplies the gate once it knows whether any
//! segment data has ever been observed; while none has, a real query would
//! only load the store and report a confusing "never synchronized" state.
//!
//! [`StatusGatedFactory`] wraps a backend factory so that every store it
//! creates comes back pre-wrapped. Both wrappers implement the same traits
//! as the things they wrap, so callers cannot tell a wrapper is present.

use std::sync::Arc;

use async_trait::async_trait;

use bigseg_core::{
    BigSegmentStore, BigSegmentStoreFactory, ClientContext, Membership, StoreMetadata,
};

/// Caller-supplied predicate deciding whether real metadata queries are
/// allowed. Re-evaluated on every metadata call; must be safe to invoke
/// concurrently.
pub type StatusQueryGate = Arc<dyn Fn() -> bool + Send + Sync>;

/// [`BigSegmentStore`] decorator that intercepts metadata queries.
///
/// Holds no state beyond the wrapped store and the gate, so it is safe to
/// share across concurrent callers to exactly the extent the wrapped store
/// is. Lives and dies with the store it wraps.
pub struct StatusGatedStore {
    inner: Arc<dyn BigSegmentStore>,
    gate: Option<StatusQueryGate>,
}

impl StatusGatedStore {
    /// Wraps a store. An absent gate means metadata queries are never
    /// allowed, which is the safe default for a host that has not yet
    /// decided.
    #[must_use]
    pub fn new(inner: Arc<dyn BigSegmentStore>, gate: Option<StatusQueryGate>) -> Self {
        Self { inner, gate }
    }

    fn queries_allowed(&self) -> bool {
        self.gate.as_ref().is_some_and(|gate| gate())
    }
}

#[async_trait]
impl BigSegmentStore for StatusGatedStore {
    /// Gate open: pure delegation, value and error unchanged. Gate closed
    /// or absent: a metadata record stamped with the current wall clock,
    /// without touching the wrapped store. The gated path never fails.
    async fn get_metadata(&self) -> anyhow::Result<StoreMetadata> {
        if self.queries_allowed() {
            return self.inner.get_metadata().await;
        }
        Ok(StoreMetadata::up_to_date_now())
    }

    async fn get_membership(&self, subject_hash: &str) -> anyhow::Result<Membership> {
        self.inner.get_membership(subject_hash).await
    }

    async fn close(&self) -> anyhow::Result<()> {
        self.inner.close().await
    }
}

/// [`BigSegmentStoreFactory`] decorator that wraps every created store in a
/// [`StatusGatedStore`] carrying the same gate.
///
/// Stateless beyond its two held values; safe to reuse for arbitrarily many
/// store creations, each independently wrapped.
pub struct StatusGatedFactory {
    inner: Arc<dyn BigSegmentStoreFactory>,
    gate: Option<StatusQueryGate>,
}

impl StatusGatedFactory {
    /// Wraps a backend factory with the given gate.
    #[must_use]
    pub fn new(
        inner: Arc<dyn BigSegmentStoreFactory>,
        gate: Option<StatusQueryGate>,
    ) -> Self {
        Self { inner, gate }
    }
}

#[async_trait]
impl BigSegmentStoreFactory for StatusGatedFactory {
    async fn create_store(
        &self,
        context: &ClientContext,
    ) -> anyhow::Result<Arc<dyn BigSegmentStore>> {
        let store = self.inner.create_store(context).await?;
        Ok(Arc::new(StatusGatedStore::new(store, self.gate.clone())))
    }
}
