//! Background refresh scheduler.
//!
//! Runs one task per tracked city that re-fetches the observation on a
//! fixed period, independent of reader traffic. Readers may race these
//! tasks on the same key; the store's last-write-wins semantics make that
//! harmless because observations are full snapshots.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::weather::WeatherService;

/// Periodic per-city refresh of the cache.
pub struct RefreshScheduler {
    service: Arc<WeatherService>,
    cities: Vec<String>,
    period: Duration,
}

impl RefreshScheduler {
    /// Create a new refresh scheduler.
    pub fn new(service: Arc<WeatherService>, cities: Vec<String>, period: Duration) -> Self {
        Self {
            service,
            cities,
            period,
        }
    }

    /// Populate the cache once for every tracked city.
    ///
    /// Runs to completion before the service starts serving reads, so the
    /// first reporting pass sees warm entries. A failed city is logged and
    /// skipped; its first scheduled tick (or a reader miss) will retry.
    pub async fn warm_up(&self) {
        for city in &self.cities {
            if let Err(e) = self.service.refresh(city).await {
                warn!(city = %city, error = %e, "Warm-up fetch failed");
            }
        }
        info!(cities = self.cities.len(), "Cache warm-up complete");
    }

    /// Start one refresh task per city in the background.
    ///
    /// Returns a shutdown sender and the task handles. Sending `true`
    /// stops every task at its next await point; awaiting the handles
    /// afterwards guarantees no timer fires once shutdown has begun.
    pub fn start(self) -> (watch::Sender<bool>, Vec<JoinHandle<()>>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handles = self
            .cities
            .into_iter()
            .map(|city| {
                let service = Arc::clone(&self.service);
                let mut shutdown_rx = shutdown_rx.clone();
                let period = self.period;

                tokio::spawn(async move {
                    let mut ticker = interval(period);
                    // The first tick fires immediately; warm-up already
                    // covered it.
                    ticker.tick().await;

                    loop {
                        tokio::select! {
                            _ = ticker.tick() => {
                                if let Err(e) = service.refresh(&city).await {
                                    warn!(city = %city, error = %e, "Scheduled refresh failed");
                                }
                            }
                            _ = shutdown_rx.changed() => {
                                if *shutdown_rx.borrow() {
                                    debug!(city = %city, "Refresh task stopped");
                                    break;
                                }
                            }
                        }
                    }
                })
            })
            .collect();

        info!(period_secs = self.period.as_secs(), "Refresh scheduler started");
        (shutdown_tx, handles)
    }
}
