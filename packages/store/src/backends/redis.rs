//! Redis [`BigSegmentStore`] backend.
//!
//! Key layout, under the configured prefix:
//!
//! - `{prefix}:big_segments_synchronized_on` — decimal unix millis of the
//!   last completed synchronization,
//! - `{prefix}:big_segment_include:{subject_hash}` — set of segment refs
//!   the subject is included in,
//! - `{prefix}:big_segment_exclude:{subject_hash}` — set of segment refs
//!   the subject is excluded from.
//!
//! The writer side (the segment synchronizer) owns these keys; this store
//! only reads them.

use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use bigseg_core::{
    BigSegmentStore, BigSegmentStoreFactory, ClientContext, Membership, StoreMetadata,
};

/// Prefix applied when the environment configures none.
pub const DEFAULT_PREFIX: &str = "bigseg";

const SYNCHRONIZED_ON_KEY: &str = "big_segments_synchronized_on";
const INCLUDE_KEY: &str = "big_segment_include";
const EXCLUDE_KEY: &str = "big_segment_exclude";

/// Key construction for one environment's namespace.
#[derive(Debug, Clone)]
struct KeySpace {
    prefix: String,
}

impl KeySpace {
    fn new(prefix: &str) -> Self {
        let prefix = if prefix.is_empty() {
            DEFAULT_PREFIX.to_string()
        } else {
            prefix.to_string()
        };
        Self { prefix }
    }

    fn synchronized_on(&self) -> String {
        format!("{}:{SYNCHRONIZED_ON_KEY}", self.prefix)
    }

    fn include(&self, subject_hash: &str) -> String {
        format!("{}:{INCLUDE_KEY}:{subject_hash}", self.prefix)
    }

    fn exclude(&self, subject_hash: &str) -> String {
        format!("{}:{EXCLUDE_KEY}:{subject_hash}", self.prefix)
    }
}

/// Builder for Redis-backed stores.
///
/// Construction is infallible: the URL is captured as-is and only opened
/// when a store is created, so connection problems surface from
/// `create_store` rather than from configuration.
pub struct RedisStoreBuilder {
    url: String,
    keys: KeySpace,
}

impl RedisStoreBuilder {
    /// Captures the connection URL and environment prefix.
    #[must_use]
    pub fn new(url: impl Into<String>, prefix: &str) -> Self {
        Self {
            url: url.into(),
            keys: KeySpace::new(prefix),
        }
    }
}

#[async_trait]
impl BigSegmentStoreFactory for RedisStoreBuilder {
    async fn create_store(
        &self,
        _context: &ClientContext,
    ) -> anyhow::Result<Arc<dyn BigSegmentStore>> {
        let client = redis::Client::open(self.url.as_str())
            .with_context(|| format!("invalid redis url {:?}", self.url))?;
        let connection = client
            .get_connection_manager()
            .await
            .context("connecting to redis big segment store")?;
        Ok(Arc::new(RedisStore {
            connection,
            keys: self.keys.clone(),
        }))
    }
}

/// Redis-backed big segment store.
struct RedisStore {
    // Cloned per call: the manager multiplexes over one connection and
    // commands need `&mut self`.
    connection: ConnectionManager,
    keys: KeySpace,
}

#[async_trait]
impl BigSegmentStore for RedisStore {
    async fn get_metadata(&self) -> anyhow::Result<StoreMetadata> {
        let mut connection = self.connection.clone();
        let raw: Option<String> = connection.get(self.keys.synchronized_on()).await?;
        let last_up_to_date = match raw {
            None => None,
            Some(value) => Some(value.parse::<u64>().with_context(|| {
                format!("malformed synchronized_on value {value:?}")
            })?),
        };
        Ok(StoreMetadata { last_up_to_date })
    }

    async fn get_membership(&self, subject_hash: &str) -> anyhow::Result<Membership> {
        let mut connection = self.connection.clone();
        let included: Vec<String> = connection.smembers(self.keys.include(subject_hash)).await?;
        let excluded: Vec<String> = connection.smembers(self.keys.exclude(subject_hash)).await?;
        Ok(Membership::from_segment_refs(included, excluded))
    }

    async fn close(&self) -> anyhow::Result<()> {
        // The connection manager shuts down when the last clone drops.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_under_the_prefix() {
        let keys = KeySpace::new("env-a");
        assert_eq!(keys.synchronized_on(), "env-a:big_segments_synchronized_on");
        assert_eq!(keys.include("h1"), "env-a:big_segment_include:h1");
        assert_eq!(keys.exclude("h1"), "env-a:big_segment_exclude:h1");
    }

    #[test]
    fn empty_prefix_falls_back_to_default() {
        let keys = KeySpace::new("");
        assert_eq!(
            keys.synchronized_on(),
            format!("{DEFAULT_PREFIX}:big_segments_synchronized_on")
        );
    }

    #[test]
    fn builder_construction_never_validates_the_url() {
        // Even a nonsense URL is accepted here; it fails at create time.
        let _builder = RedisStoreBuilder::new("not a url", "env-a");
    }

    #[tokio::test]
    async fn create_store_rejects_malformed_url() {
        let builder = RedisStoreBuilder::new("not a url", "env-a");
        let err = builder
            .create_store(&ClientContext::new("env-a"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid redis url"));
    }
}
