//! Concrete [`BigSegmentStore`](bigseg_core::BigSegmentStore) backends.
//!
//! The memory backend is always compiled and serves tests and ephemeral
//! use. Redis and `PostgreSQL` are feature-gated, both on by default.

pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "redis")]
pub mod redis;

pub use memory::{MemoryStore, MemoryStoreFactory};

#[cfg(feature = "postgres")]
pub use postgres::{PostgresConfigError, PostgresStoreBuilder};
#[cfg(feature = "redis")]
pub use redis::RedisStoreBuilder;
