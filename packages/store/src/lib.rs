//! Big Segment Store — backend selection, status-gated metadata queries,
//! and the concrete store backends.
//!
//! The entry point is [`configure_big_segments`]: given system and
//! per-environment configuration it picks a backend (or reports that big
//! segments are disabled) and returns a store factory whose every created
//! store is wrapped by [`StatusGatedStore`](gate::StatusGatedStore).

pub mod backends;
pub mod config;
pub mod configure;
pub mod gate;

pub use config::{BigSegmentsConfig, EnvConfig, PostgresConfig, RedisConfig};
pub use configure::{
    configure_big_segments, BackendKind, BigSegmentsConfiguration, ConfigureError,
};
pub use gate::{StatusGatedFactory, StatusGatedStore, StatusQueryGate};

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
