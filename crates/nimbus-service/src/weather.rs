//! The cache manager: read-through lookups and hit/miss accounting.

use nimbus_core::Observation;
use nimbus_store::{DynStore, counters};
use std::time::Duration;

use crate::provider::{FetchError, ProviderClient};

/// Line returned when a city has no cached entry and the fetch fails too.
pub const UNAVAILABLE: &str = "Weather data unavailable.";

/// Serves weather lines from the cache, fetching on miss.
///
/// Owns the store handle, the provider client and the TTL policy; the
/// scheduler and the reporting loop both work through this object, so all
/// cache traffic funnels through one place.
pub struct WeatherService {
    store: DynStore,
    provider: ProviderClient,
    ttl: Duration,
}

impl WeatherService {
    pub fn new(store: DynStore, provider: ProviderClient, ttl: Duration) -> Self {
        Self {
            store,
            provider,
            ttl,
        }
    }

    /// Looks up a city, fetching and caching on miss.
    ///
    /// Every call increments exactly one of the hit/miss counters, decided
    /// by the cache lookup alone; a fetch that fails afterwards was still
    /// a miss. Store failures on the read path are treated as a miss
    /// rather than an error; the provider is the fallback of last resort.
    pub async fn get(&self, city: &str) -> String {
        let cached = match self.store.get(city).await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(city, error = %e, "Store read failed, treating as miss");
                None
            }
        };

        match cached {
            Some(observation) => {
                tracing::debug!(city, "Cache hit");
                self.bump(counters::HITS).await;
                observation.to_string()
            }
            None => {
                tracing::debug!(city, "Cache miss, fetching from provider");
                self.bump(counters::MISSES).await;
                match self.fetch_and_store(city).await {
                    Ok(observation) => observation.to_string(),
                    Err(e) => {
                        tracing::warn!(city, error = %e, "Fetch on miss failed");
                        UNAVAILABLE.to_string()
                    }
                }
            }
        }
    }

    /// Fetches a city and repopulates its cache entry.
    ///
    /// This is the scheduler path: it never touches the hit/miss counters,
    /// those are reader metrics. A store write failure is logged but not
    /// surfaced, since the fresh observation was still obtained and the next
    /// tick will try the write again.
    pub async fn refresh(&self, city: &str) -> Result<(), FetchError> {
        let observation = self.fetch_and_store(city).await?;
        tracing::debug!(
            city,
            temperature_c = observation.temperature_c,
            "Entry refreshed"
        );
        Ok(())
    }

    /// Snapshot of the (hits, misses) counters.
    ///
    /// Counter reads degrade to 0 on store errors so the reporting loop
    /// never dies over metrics.
    pub async fn counters(&self) -> (u64, u64) {
        let hits = self.read_counter(counters::HITS).await;
        let misses = self.read_counter(counters::MISSES).await;
        (hits, misses)
    }

    async fn fetch_and_store(&self, city: &str) -> Result<Observation, FetchError> {
        let observation = self.provider.fetch(city).await?;
        if let Err(e) = self.store.put(city, &observation, self.ttl).await {
            tracing::warn!(city, error = %e, "Failed to write cache entry");
        }
        Ok(observation)
    }

    async fn bump(&self, name: &str) {
        if let Err(e) = self.store.incr_counter(name).await {
            tracing::warn!(counter = name, error = %e, "Failed to increment counter");
        }
    }

    async fn read_counter(&self, name: &str) -> u64 {
        match self.store.counter(name).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(counter = name, error = %e, "Failed to read counter");
                0
            }
        }
    }
}
