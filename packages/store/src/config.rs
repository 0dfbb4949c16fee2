//! Backend configuration surface for big segments.
//!
//! At most one backend is active per process: Redis takes precedence over
//! `PostgreSQL` when both are configured (the decision tree lives in
//! [`configure`](crate::configure)). No backend configured is the valid
//! "big segments disabled" state, not an error.

use std::env;

use thiserror::Error;

/// Environment variable naming the Redis connection URL.
pub const ENV_REDIS_URL: &str = "BIG_SEGMENTS_REDIS_URL";
/// Environment variable enabling the `PostgreSQL` backend ("true"/"false").
pub const ENV_POSTGRES_ENABLED: &str = "BIG_SEGMENTS_POSTGRES_ENABLED";
/// Environment variable naming the `PostgreSQL` connection URL.
pub const ENV_POSTGRES_URL: &str = "BIG_SEGMENTS_POSTGRES_URL";
/// Environment variable naming the `PostgreSQL` table.
pub const ENV_POSTGRES_TABLE: &str = "BIG_SEGMENTS_POSTGRES_TABLE";

/// Default table name when `BIG_SEGMENTS_POSTGRES_TABLE` is unset.
pub const DEFAULT_POSTGRES_TABLE: &str = "big_segments";

/// Errors from loading configuration out of the process environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} (expected true/false)")]
    InvalidBool { var: &'static str, value: String },
}

/// System-level big segments configuration: one section per backend.
#[derive(Debug, Clone, Default)]
pub struct BigSegmentsConfig {
    /// Redis backend section. Configured when a URL is present.
    pub redis: RedisConfig,
    /// `PostgreSQL` backend section. Configured via an explicit enable flag.
    pub postgres: PostgresConfig,
}

impl BigSegmentsConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds a value that does
    /// not parse (e.g., a non-boolean enable flag).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Loads configuration through an injected variable lookup.
    ///
    /// `from_env` delegates here; tests supply a closure over a map so they
    /// never mutate process-global state.
    ///
    /// # Errors
    ///
    /// Same conditions as [`BigSegmentsConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let redis = RedisConfig {
            url: lookup(ENV_REDIS_URL),
        };
        let postgres = PostgresConfig {
            enabled: parse_bool(ENV_POSTGRES_ENABLED, lookup(ENV_POSTGRES_ENABLED))?,
            url: lookup(ENV_POSTGRES_URL).unwrap_or_default(),
            table: lookup(ENV_POSTGRES_TABLE)
                .unwrap_or_else(|| DEFAULT_POSTGRES_TABLE.to_string()),
        };
        Ok(Self { redis, postgres })
    }
}

/// Redis backend section.
#[derive(Debug, Clone, Default)]
pub struct RedisConfig {
    /// Connection URL, e.g. `redis://host:6379`. `None` = not configured.
    pub url: Option<String>,
}

impl RedisConfig {
    /// Whether this backend has been configured at all.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

/// `PostgreSQL` backend section.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Whether the backend is enabled. Off by default.
    pub enabled: bool,
    /// Connection URL, e.g. `postgres://host/db`.
    pub url: String,
    /// Table holding membership and synchronization rows.
    pub table: String,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            table: DEFAULT_POSTGRES_TABLE.to_string(),
        }
    }
}

/// Per-environment settings applied to whichever backend is selected.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    /// Identifier of the environment (used for log lines and contexts).
    pub env_id: String,
    /// Namespace prefix separating this environment's keys or rows.
    pub prefix: String,
}

fn parse_bool(var: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    match value.as_deref() {
        None | Some("") => Ok(false),
        Some("true" | "1") => Ok(true),
        Some("false" | "0") => Ok(false),
        Some(other) => Err(ConfigError::InvalidBool {
            var,
            value: other.to_string(),
        }),
    }
}
