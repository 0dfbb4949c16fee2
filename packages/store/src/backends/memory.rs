//! In-process [`BigSegmentStore`] backend.
//!
//! [`MemoryStore`] keeps memberships and the synchronization timestamp in
//! process memory. It backs tests and ephemeral embedding; it is not part
//! of the configured backend selection, which only chooses between the
//! external backends.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use bigseg_core::{
    BigSegmentStore, BigSegmentStoreFactory, ClientContext, Membership, StoreMetadata,
};

/// In-memory big segment store.
///
/// All operations succeed; an unknown subject hash yields an empty
/// membership, and an unseeded store reports "never synchronized".
#[derive(Default)]
pub struct MemoryStore {
    memberships: RwLock<HashMap<String, Membership>>,
    synchronized_on: RwLock<Option<u64>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the membership for a subject, replacing any existing one.
    pub fn set_membership(&self, subject_hash: impl Into<String>, membership: Membership) {
        self.memberships
            .write()
            .insert(subject_hash.into(), membership);
    }

    /// Sets the last-synchronized timestamp reported by `get_metadata`.
    pub fn set_synchronized_on(&self, unix_millis: u64) {
        *self.synchronized_on.write() = Some(unix_millis);
    }
}

#[async_trait]
impl BigSegmentStore for MemoryStore {
    async fn get_metadata(&self) -> anyhow::Result<StoreMetadata> {
        Ok(StoreMetadata {
            last_up_to_date: *self.synchronized_on.read(),
        })
    }

    async fn get_membership(&self, subject_hash: &str) -> anyhow::Result<Membership> {
        Ok(self
            .memberships
            .read()
            .get(subject_hash)
            .cloned()
            .unwrap_or_default())
    }

    async fn close(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Factory handing out one shared [`MemoryStore`].
///
/// Every `create_store` call returns a handle to the same store, so a test
/// can seed data through [`MemoryStoreFactory::store`] before or after
/// creation.
#[derive(Default)]
pub struct MemoryStoreFactory {
    store: Arc<MemoryStore>,
}

impl MemoryStoreFactory {
    /// Creates a factory around a fresh empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the shared store for seeding and inspection.
    #[must_use]
    pub fn store(&self) -> Arc<MemoryStore> {
        self.store.clone()
    }
}

#[async_trait]
impl BigSegmentStoreFactory for MemoryStoreFactory {
    async fn create_store(
        &self,
        _context: &ClientContext,
    ) -> anyhow::Result<Arc<dyn BigSegmentStore>> {
        Ok(self.store.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unseeded_store_reports_never_synchronized() {
        let store = MemoryStore::new();
        let metadata = store.get_metadata().await.unwrap();
        assert_eq!(metadata.last_up_to_date, None);
    }

    #[tokio::test]
    async fn unknown_subject_yields_empty_membership() {
        let store = MemoryStore::new();
        let membership = store.get_membership("nobody").await.unwrap();
        assert!(membership.is_empty());
    }

    #[tokio::test]
    async fn seeded_membership_is_returned() {
        let store = MemoryStore::new();
        let membership =
            Membership::from_segment_refs(vec!["segment.a".to_string()], Vec::new());
        store.set_membership("subject-1", membership.clone());

        assert_eq!(store.get_membership("subject-1").await.unwrap(), membership);
    }

    #[tokio::test]
    async fn synchronized_on_is_reported_once_set() {
        let store = MemoryStore::new();
        store.set_synchronized_on(42_000);
        let metadata = store.get_metadata().await.unwrap();
        assert_eq!(metadata.last_up_to_date, Some(42_000));
    }

    #[tokio::test]
    async fn factory_hands_out_the_shared_store() {
        let factory = MemoryStoreFactory::new();
        factory.store().set_synchronized_on(7);

        let created = factory
            .create_store(&ClientContext::new("env"))
            .await
            .unwrap();
        let metadata = created.get_metadata().await.unwrap();
        assert_eq!(metadata.last_up_to_date, Some(7));
    }

    #[tokio::test]
    async fn close_succeeds() {
        let store = MemoryStore::new();
        assert!(store.close().await.is_ok());
    }
}
