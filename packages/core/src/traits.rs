//! Store capability traits implemented by every big segment backend.

use std::sync::Arc;

use async_trait::async_trait;

use crate::membership::Membership;
use crate::metadata::StoreMetadata;

/// Environment identity passed to factories when a store is created.
///
/// Carries nothing a backend needs to connect — connection parameters are
/// captured by the backend's builder at configuration time.
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    /// Identifier of the environment this store instance serves.
    pub env_id: String,
}

impl ClientContext {
    /// Creates a context for the given environment.
    #[must_use]
    pub fn new(env_id: impl Into<String>) -> Self {
        Self {
            env_id: env_id.into(),
        }
    }
}

/// Queryable big segment store.
///
/// Implementations: Redis, `PostgreSQL`, memory (tests and ephemeral data).
/// All methods may block on network I/O. Implementations must be safe for
/// concurrent calls; this trait adds no synchronization of its own.
///
/// Used as `Arc<dyn BigSegmentStore>`. The component that created a store
/// owns it and must close it exactly once.
#[async_trait]
pub trait BigSegmentStore: Send + Sync {
    /// When the store's segment data was last known to be current.
    async fn get_metadata(&self) -> anyhow::Result<StoreMetadata>;

    /// Explicit segment statuses for the subject with the given hash.
    ///
    /// The hash is opaque here; its shape is owned by the backend.
    async fn get_membership(&self, subject_hash: &str) -> anyhow::Result<Membership>;

    /// Release resources and close connections.
    async fn close(&self) -> anyhow::Result<()>;
}

impl std::fmt::Debug for dyn BigSegmentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn BigSegmentStore")
    }
}

/// Creates [`BigSegmentStore`] instances for a configured backend.
///
/// A factory is reusable: each call creates an independent store owned by
/// the caller. Creation failures (e.g., the backend is unreachable) are
/// returned as-is.
#[async_trait]
pub trait BigSegmentStoreFactory: Send + Sync {
    /// Creates a store for the given environment.
    async fn create_store(
        &self,
        context: &ClientContext,
    ) -> anyhow::Result<Arc<dyn BigSegmentStore>>;
}
