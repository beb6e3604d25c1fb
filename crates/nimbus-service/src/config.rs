use nimbus_store::RedisSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Cities the service tracks; fixed for the process lifetime.
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub cache: CacheSettings,
    /// Redis configuration
    #[serde(default)]
    pub redis: RedisSettings,
    /// Weather provider configuration
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Tracked city validations
        if self.cities.is_empty() {
            return Err("cities must not be empty".into());
        }
        if self.cities.iter().any(|c| c.trim().is_empty()) {
            return Err("cities must not contain blank names".into());
        }
        // Cache validations
        if self.cache.ttl_secs == 0 {
            return Err("cache.ttl_secs must be > 0".into());
        }
        if self.cache.refresh_interval_mins == 0 {
            return Err("cache.refresh_interval_mins must be > 0".into());
        }
        if self.cache.report_interval_secs == 0 {
            return Err("cache.report_interval_secs must be > 0".into());
        }
        // Redis validation
        if self.redis.enabled && self.redis.pool_size == 0 {
            return Err("redis.pool_size must be > 0".into());
        }
        // Provider validation
        if self.provider.base_url.is_empty() {
            return Err("provider.base_url must not be empty".into());
        }
        if self.provider.timeout_secs == 0 {
            return Err("provider.timeout_secs must be > 0".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }
}

/// Cache timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Entry time-to-live in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Background refresh period in minutes
    #[serde(default = "default_refresh_interval_mins")]
    pub refresh_interval_mins: u64,

    /// Reporting loop cadence in seconds
    #[serde(default = "default_report_interval_secs")]
    pub report_interval_secs: u64,
}

fn default_ttl_secs() -> u64 {
    600
}

fn default_refresh_interval_mins() -> u64 {
    10
}

fn default_report_interval_secs() -> u64 {
    60
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            refresh_interval_mins: default_refresh_interval_mins(),
            report_interval_secs: default_report_interval_secs(),
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_mins * 60)
    }

    pub fn report_period(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }
}

/// Weather provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Query endpoint, e.g. "https://api.openweathermap.org/data/2.5/weather"
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,

    /// API key sent as the `appid` query parameter.
    /// Prefer the NIMBUS__PROVIDER__API_KEY env var over the config file.
    #[serde(default)]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider_base_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

fn default_provider_timeout_secs() -> u64 {
    10
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            api_key: String::new(),
            timeout_secs: default_provider_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_level")]
    pub level: String,
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_logging_level(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
            None => {
                // Try default root-level file
                let default_path = PathBuf::from("nimbus.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., NIMBUS__CACHE__TTL_SECS=300
        builder = builder.add_source(
            Environment::with_prefix("NIMBUS")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        // Validate
        merged.validate()?;
        Ok(merged)
    }
}
