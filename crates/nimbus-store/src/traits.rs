//! The store trait both cache backends implement.

use async_trait::async_trait;
use nimbus_core::Observation;
use std::fmt;
use std::time::Duration;

use crate::error::StoreError;

/// The cache store contract.
///
/// A store holds at most one observation per city plus a set of named
/// monotone counters, and must be safe under concurrent writers: the
/// refresh scheduler and on-demand readers may write the same key at the
/// same time, and last-write-wins is acceptable because observations are
/// full snapshots. Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait WeatherStore: Send + Sync {
    /// Reads the cached observation for a city.
    ///
    /// Returns `None` when no entry exists or the entry's TTL has elapsed;
    /// a stale observation is never returned.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing
    /// entries.
    async fn get(&self, city: &str) -> Result<Option<Observation>, StoreError>;

    /// Stores an observation under the tracked city name with the given TTL.
    ///
    /// The key is the caller's tracked name, which is not necessarily the
    /// name the provider reports inside the observation. Overwrites any
    /// existing entry wholesale; writes are idempotent.
    async fn put(
        &self,
        city: &str,
        observation: &Observation,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Atomically increments a named counter and returns the new value.
    async fn incr_counter(&self, name: &str) -> Result<u64, StoreError>;

    /// Reads a named counter; missing counters read as 0.
    async fn counter(&self, name: &str) -> Result<u64, StoreError>;

    /// Which backend variant this store is (for diagnostics).
    fn mode(&self) -> StoreMode;
}

/// The two store variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// Durable shared backend.
    Redis,
    /// In-process fallback.
    Memory,
}

impl fmt::Display for StoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreMode::Redis => write!(f, "redis"),
            StoreMode::Memory => write!(f, "memory"),
        }
    }
}
