//! Redis-backed store, the durable variant.

use async_trait::async_trait;
use deadpool_redis::Pool;
use nimbus_core::Observation;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::StoreError;
use crate::traits::{StoreMode, WeatherStore};

/// Redis connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisSettings {
    /// Probe Redis at startup (the service degrades to the in-process
    /// store when the probe fails, and skips it entirely when disabled).
    #[serde(default = "default_redis_enabled")]
    pub enabled: bool,

    /// Redis connection URL (e.g., "redis://localhost:6379").
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Connection pool size.
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: usize,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_redis_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_redis_enabled() -> bool {
    true
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_pool_size() -> usize {
    10
}

fn default_redis_timeout_ms() -> u64 {
    5000
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            enabled: default_redis_enabled(),
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
            timeout_ms: default_redis_timeout_ms(),
        }
    }
}

/// Durable store on a Redis connection pool.
///
/// Observations are stored as JSON strings under the city name; expiry is
/// delegated to Redis via `SET ... EX`, so an expired key simply reads as
/// absent. Counters use `INCR`, which is atomic server-side.
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// Wraps an already-probed connection pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WeatherStore for RedisStore {
    async fn get(&self, city: &str) -> Result<Option<Observation>, StoreError> {
        let mut conn = self.pool.get().await?;
        let raw: Option<String> = conn.get(city).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        city: &str,
        observation: &Observation,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(observation)?;
        let mut conn = self.pool.get().await?;
        conn.set_ex::<_, _, ()>(city, json, ttl.as_secs()).await?;
        Ok(())
    }

    async fn incr_counter(&self, name: &str) -> Result<u64, StoreError> {
        let mut conn = self.pool.get().await?;
        let value: u64 = conn.incr(name, 1u64).await?;
        Ok(value)
    }

    async fn counter(&self, name: &str) -> Result<u64, StoreError> {
        let mut conn = self.pool.get().await?;
        let value: Option<u64> = conn.get(name).await?;
        Ok(value.unwrap_or(0))
    }

    fn mode(&self) -> StoreMode {
        StoreMode::Redis
    }
}
