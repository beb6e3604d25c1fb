//! In-process store used when Redis is unavailable.

use async_trait::async_trait;
use dashmap::DashMap;
use nimbus_core::Observation;
use std::time::{Duration, Instant};

use crate::error::StoreError;
use crate::traits::{StoreMode, WeatherStore};

/// A cached observation with its expiry bookkeeping.
#[derive(Debug, Clone)]
struct StoredEntry {
    observation: Observation,
    stored_at: Instant,
    ttl: Duration,
}

impl StoredEntry {
    fn new(observation: Observation, ttl: Duration) -> Self {
        Self {
            observation,
            stored_at: Instant::now(),
            ttl,
        }
    }

    /// An entry written at `t` with TTL `d` is expired for any read at
    /// `t + d` or later.
    fn is_expired(&self) -> bool {
        self.stored_at.elapsed() >= self.ttl
    }
}

/// In-process cache store backed by concurrent maps.
///
/// Expiry is enforced on read: expired entries are treated as absent and
/// removed. Counters live in their own map; `DashMap`'s per-entry locking
/// makes increment-and-return atomic without a store-wide lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, StoredEntry>,
    counters: DashMap<String, u64>,
}

impl MemoryStore {
    /// Creates an empty in-process store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WeatherStore for MemoryStore {
    async fn get(&self, city: &str) -> Result<Option<Observation>, StoreError> {
        if let Some(entry) = self.entries.get(city) {
            if !entry.is_expired() {
                return Ok(Some(entry.observation.clone()));
            }
            drop(entry);
            self.entries.remove(city);
        }
        Ok(None)
    }

    async fn put(
        &self,
        city: &str,
        observation: &Observation,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.entries
            .insert(city.to_string(), StoredEntry::new(observation.clone(), ttl));
        Ok(())
    }

    async fn incr_counter(&self, name: &str) -> Result<u64, StoreError> {
        let mut value = self.counters.entry(name.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    async fn counter(&self, name: &str) -> Result<u64, StoreError> {
        Ok(self.counters.get(name).map(|v| *v).unwrap_or(0))
    }

    fn mode(&self) -> StoreMode {
        StoreMode::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn observation(city: &str) -> Observation {
        Observation::from_provider(city, 295.15, "clear sky")
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let store = MemoryStore::new();
        let obs = observation("Durban");

        store
            .put("Durban", &obs, Duration::from_secs(60))
            .await
            .unwrap();

        let cached = store.get("Durban").await.unwrap();
        assert_eq!(cached, Some(obs));
    }

    #[tokio::test]
    async fn test_get_unknown_city_is_absent() {
        let store = MemoryStore::new();
        assert_eq!(store.get("Atlantis").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_overwrites_previous_entry() {
        let store = MemoryStore::new();
        store
            .put("Durban", &observation("Durban"), Duration::from_secs(60))
            .await
            .unwrap();

        let newer = Observation::from_provider("Durban", 300.15, "light rain");
        store
            .put("Durban", &newer, Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.get("Durban").await.unwrap(), Some(newer));
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let store = MemoryStore::new();
        store
            .put("Durban", &observation("Durban"), Duration::from_millis(50))
            .await
            .unwrap();

        assert!(store.get("Durban").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(store.get("Durban").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expiry_boundary_is_inclusive() {
        let store = MemoryStore::new();
        // A zero TTL means the write time itself is already the expiry
        // time, so the very next read must miss.
        store
            .put("Durban", &observation("Durban"), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(store.get("Durban").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_counters_increment_and_read() {
        let store = MemoryStore::new();

        assert_eq!(store.counter("cache_hit_count").await.unwrap(), 0);
        assert_eq!(store.incr_counter("cache_hit_count").await.unwrap(), 1);
        assert_eq!(store.incr_counter("cache_hit_count").await.unwrap(), 2);
        assert_eq!(store.counter("cache_hit_count").await.unwrap(), 2);
        assert_eq!(store.counter("cache_miss_count").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_counter_increments() {
        let store = Arc::new(MemoryStore::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    store.incr_counter("cache_hit_count").await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.counter("cache_hit_count").await.unwrap(), 800);
    }
}
