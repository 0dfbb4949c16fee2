//! `PostgreSQL` [`BigSegmentStore`] backend.
//!
//! Single-table layout, owned by the writer side (the segment
//! synchronizer):
//!
//! ```sql
//! CREATE TABLE big_segments (
//!     prefix          text    NOT NULL,
//!     subject_hash    text    NOT NULL,
//!     segment_ref     text    NOT NULL DEFAULT '',
//!     included        boolean NOT NULL DEFAULT false,
//!     synchronized_on bigint,
//!     PRIMARY KEY (prefix, subject_hash, segment_ref)
//! );
//! ```
//!
//! Membership rows carry a subject hash and segment ref; the one metadata
//! row per prefix has an empty subject hash and holds `synchronized_on`.
//! Subject hashes are never empty, so the two kinds of row cannot collide.

use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;

use bigseg_core::{
    BigSegmentStore, BigSegmentStoreFactory, ClientContext, Membership, StoreMetadata,
};

use crate::config::PostgresConfig;

/// Connections kept per created store.
const POOL_SIZE: u32 = 4;

/// Errors from validating the `PostgreSQL` backend configuration.
///
/// Raised at builder construction, before any connection is attempted.
#[derive(Debug, Error)]
pub enum PostgresConfigError {
    #[error("malformed big segment table name {0:?}")]
    InvalidTableName(String),
    #[error("postgres big segment store requires a connection url")]
    MissingUrl,
}

/// Builder for `PostgreSQL`-backed stores.
///
/// Construction validates the configuration; connecting happens when a
/// store is created.
#[derive(Debug)]
pub struct PostgresStoreBuilder {
    url: String,
    table: String,
    prefix: String,
}

impl PostgresStoreBuilder {
    /// Validates the configured table name and connection URL.
    ///
    /// The table name is interpolated into SQL as an identifier (it cannot
    /// be bound as a parameter), so anything but a plain unquoted
    /// identifier is rejected here.
    ///
    /// # Errors
    ///
    /// Returns [`PostgresConfigError::InvalidTableName`] for a malformed
    /// table name and [`PostgresConfigError::MissingUrl`] when no
    /// connection URL is configured.
    pub fn new(config: &PostgresConfig, prefix: &str) -> Result<Self, PostgresConfigError> {
        if !is_valid_table_name(&config.table) {
            return Err(PostgresConfigError::InvalidTableName(config.table.clone()));
        }
        if config.url.is_empty() {
            return Err(PostgresConfigError::MissingUrl);
        }
        Ok(Self {
            url: config.url.clone(),
            table: config.table.clone(),
            prefix: prefix.to_string(),
        })
    }

    /// The validated table name this builder will query.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }
}

#[async_trait]
impl BigSegmentStoreFactory for PostgresStoreBuilder {
    async fn create_store(
        &self,
        _context: &ClientContext,
    ) -> anyhow::Result<Arc<dyn BigSegmentStore>> {
        let pool = PgPoolOptions::new()
            .max_connections(POOL_SIZE)
            .connect(&self.url)
            .await
            .context("connecting to postgres big segment store")?;
        Ok(Arc::new(PostgresStore {
            pool,
            metadata_sql: metadata_sql(&self.table),
            membership_sql: membership_sql(&self.table),
            prefix: self.prefix.clone(),
        }))
    }
}

/// `PostgreSQL`-backed big segment store.
struct PostgresStore {
    pool: PgPool,
    metadata_sql: String,
    membership_sql: String,
    prefix: String,
}

#[async_trait]
impl BigSegmentStore for PostgresStore {
    async fn get_metadata(&self) -> anyhow::Result<StoreMetadata> {
        let row: Option<Option<i64>> = sqlx::query_scalar(&self.metadata_sql)
            .bind(&self.prefix)
            .fetch_optional(&self.pool)
            .await?;
        let last_up_to_date = match row.flatten() {
            None => None,
            Some(millis) => Some(u64::try_from(millis).with_context(|| {
                format!("negative synchronized_on value {millis}")
            })?),
        };
        Ok(StoreMetadata { last_up_to_date })
    }

    async fn get_membership(&self, subject_hash: &str) -> anyhow::Result<Membership> {
        let rows: Vec<(String, bool)> = sqlx::query_as(&self.membership_sql)
            .bind(&self.prefix)
            .bind(subject_hash)
            .fetch_all(&self.pool)
            .await?;
        let (included, excluded): (Vec<_>, Vec<_>) =
            rows.into_iter().partition(|(_, included)| *included);
        Ok(Membership::from_segment_refs(
            included.into_iter().map(|(segment_ref, _)| segment_ref),
            excluded.into_iter().map(|(segment_ref, _)| segment_ref),
        ))
    }

    async fn close(&self) -> anyhow::Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

fn metadata_sql(table: &str) -> String {
    format!("SELECT synchronized_on FROM {table} WHERE prefix = $1 AND subject_hash = ''")
}

fn membership_sql(table: &str) -> String {
    format!(
        "SELECT segment_ref, included FROM {table} \
         WHERE prefix = $1 AND subject_hash = $2"
    )
}

/// Accepts only plain unquoted `PostgreSQL` identifiers, which is what can
/// be spliced into the query text safely.
fn is_valid_table_name(name: &str) -> bool {
    // Postgres truncates identifiers at 63 bytes; longer names are almost
    // certainly a configuration mistake.
    if name.is_empty() || name.len() > 63 {
        return false;
    }
    let mut chars = name.chars();
    let first = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    first && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str, table: &str) -> PostgresConfig {
        PostgresConfig {
            enabled: true,
            url: url.to_string(),
            table: table.to_string(),
        }
    }

    #[test]
    fn valid_table_names() {
        for name in ["big_segments", "_private", "t1", "EnvSegments"] {
            assert!(is_valid_table_name(name), "{name:?} should be valid");
        }
    }

    #[test]
    fn invalid_table_names() {
        let long = "a".repeat(64);
        for name in ["", "1table", "seg-ments", "t;drop table x", "a b", long.as_str()] {
            assert!(!is_valid_table_name(name), "{name:?} should be invalid");
        }
    }

    #[test]
    fn builder_accepts_valid_configuration() {
        let builder =
            PostgresStoreBuilder::new(&config("postgres://localhost/db", "big_segments"), "env")
                .unwrap();
        assert_eq!(builder.table(), "big_segments");
    }

    #[test]
    fn builder_rejects_malformed_table() {
        let err = PostgresStoreBuilder::new(
            &config("postgres://localhost/db", "bad;table"),
            "env",
        )
        .unwrap_err();
        assert!(matches!(err, PostgresConfigError::InvalidTableName(_)));
    }

    #[test]
    fn builder_rejects_missing_url() {
        let err = PostgresStoreBuilder::new(&config("", "big_segments"), "env").unwrap_err();
        assert!(matches!(err, PostgresConfigError::MissingUrl));
    }

    #[test]
    fn sql_text_targets_the_configured_table() {
        assert_eq!(
            metadata_sql("env_segments"),
            "SELECT synchronized_on FROM env_segments \
             WHERE prefix = $1 AND subject_hash = ''"
        );
        assert!(membership_sql("env_segments").starts_with(
            "SELECT segment_ref, included FROM env_segments"
        ));
    }
}
