//! Service wiring and lifecycle.

use std::sync::Arc;

use nimbus_store::connect_store;

use crate::config::AppConfig;
use crate::provider::ProviderClient;
use crate::refresh::RefreshScheduler;
use crate::weather::WeatherService;

pub struct ServiceBuilder {
    config: AppConfig,
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.config = cfg;
        self
    }

    /// Probe the store backend and wire up the cache manager.
    pub async fn build(self) -> anyhow::Result<NimbusService> {
        let store = connect_store(&self.config.redis).await;
        tracing::info!(mode = %store.mode(), "Cache store selected");

        let provider = ProviderClient::new(&self.config.provider);
        let service = Arc::new(WeatherService::new(
            store,
            provider,
            self.config.cache.ttl(),
        ));

        Ok(NimbusService {
            config: self.config,
            service,
        })
    }
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct NimbusService {
    config: AppConfig,
    service: Arc<WeatherService>,
}

impl NimbusService {
    /// Run until interrupted.
    ///
    /// Startup order matters: the warm-up pass completes before the
    /// refresh tasks and the reporting loop start, so the first report
    /// already reads warm entries. Shutdown order matters too: the
    /// refresh tasks are stopped and awaited before this returns, so no
    /// background fetch outlives the service.
    pub async fn run(self) -> anyhow::Result<()> {
        let scheduler = RefreshScheduler::new(
            Arc::clone(&self.service),
            self.config.cities.clone(),
            self.config.cache.refresh_period(),
        );
        scheduler.warm_up().await;
        let (scheduler_shutdown, scheduler_handles) = scheduler.start();

        let mut report_ticker = tokio::time::interval(self.config.cache.report_period());

        loop {
            tokio::select! {
                _ = report_ticker.tick() => {
                    self.report_pass().await;
                }
                _ = shutdown_signal() => {
                    break;
                }
            }
        }

        // Stop the refresh tasks before exiting.
        let _ = scheduler_shutdown.send(true);
        for handle in scheduler_handles {
            let _ = handle.await;
        }
        tracing::info!("Shutdown complete");

        Ok(())
    }

    /// One reporting pass: a weather line per city, then the counters.
    async fn report_pass(&self) {
        for city in &self.config.cities {
            println!("{}", self.service.get(city).await);
        }
        let (hits, misses) = self.service.counters().await;
        println!("Cache Performance: Hits = {hits}, Misses = {misses}");
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
