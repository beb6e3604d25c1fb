//! # nimbus-store
//!
//! Cache store abstraction for the nimbus weather service.
//!
//! This crate defines the [`WeatherStore`] trait implemented by the two
//! interchangeable backends:
//!
//! - [`RedisStore`]: durable, shared across processes, entries expire via
//!   Redis' native TTL mechanism
//! - [`MemoryStore`]: in-process fallback, entries expire by timestamp
//!   comparison on read
//!
//! The backend is selected once at startup by [`connect_store`]: if Redis is
//! enabled and reachable it wins, otherwise the service runs against the
//! in-process store for its whole lifetime. There is no failback mid-run.
//!
//! ## Example
//!
//! ```ignore
//! use nimbus_store::{DynStore, connect_store, counters};
//!
//! async fn hit_rate(store: &DynStore) -> (u64, u64) {
//!     let hits = store.counter(counters::HITS).await.unwrap_or(0);
//!     let misses = store.counter(counters::MISSES).await.unwrap_or(0);
//!     (hits, misses)
//! }
//! ```

mod error;
mod memory;
mod redis_store;
mod traits;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use redis_store::{RedisSettings, RedisStore};
pub use traits::{StoreMode, WeatherStore};

use std::sync::Arc;
use std::time::Duration;

/// Type alias for a store result.
pub type StoreResult<T> = Result<T, StoreError>;

/// Type alias for a boxed store trait object.
pub type DynStore = Arc<dyn WeatherStore>;

/// Well-known counter names.
pub mod counters {
    /// Cache reads answered from the store.
    pub const HITS: &str = "cache_hit_count";
    /// Cache reads that required a provider fetch.
    pub const MISSES: &str = "cache_miss_count";
}

/// Select and connect the cache store based on configuration.
///
/// ## Selection Policy
///
/// - Redis disabled: returns the in-process store.
/// - Redis enabled: builds the connection pool, probes it with a real
///   connection and resets both counters; on any failure, logs a warning
///   and returns the in-process store instead.
///
/// The choice is permanent for the process lifetime: a Redis instance
/// coming up later is not picked up, and one going down later surfaces as
/// per-operation store errors, not a backend switch.
pub async fn connect_store(settings: &RedisSettings) -> DynStore {
    if !settings.enabled {
        tracing::info!("Redis disabled, using in-process store");
        return Arc::new(MemoryStore::new());
    }

    tracing::info!(url = %settings.url, "Connecting to Redis");

    let mut redis_config = deadpool_redis::Config::from_url(&settings.url);
    let timeout = Duration::from_millis(settings.timeout_ms);
    let mut pool_config = redis_config.get_pool_config();
    pool_config.max_size = settings.pool_size;
    pool_config.timeouts.wait = Some(timeout);
    pool_config.timeouts.create = Some(timeout);
    pool_config.timeouts.recycle = Some(timeout);
    redis_config.pool = Some(pool_config);

    let pool = match redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1)) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create Redis pool, falling back to in-process store");
            return Arc::new(MemoryStore::new());
        }
    };

    match probe(&pool).await {
        Ok(()) => {
            tracing::info!("Connected to Redis");
            Arc::new(RedisStore::new(pool))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Redis unavailable, falling back to in-process store");
            Arc::new(MemoryStore::new())
        }
    }
}

/// Acquire one connection and reset the hit/miss counters.
///
/// A backend that accepts connections but rejects writes is as unusable as
/// an unreachable one, so counter initialization is part of the probe.
async fn probe(pool: &deadpool_redis::Pool) -> StoreResult<()> {
    use redis::AsyncCommands;

    let mut conn = pool.get().await?;
    for name in [counters::HITS, counters::MISSES] {
        conn.set::<_, _, ()>(name, 0u64).await?;
    }
    Ok(())
}
