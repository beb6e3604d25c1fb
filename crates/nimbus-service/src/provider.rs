//! Weather provider client.
//!
//! Wraps the external HTTP weather API (OpenWeatherMap query format) and
//! normalizes its responses into [`Observation`] values. The client carries
//! no retry policy; a failed fetch is reported to the caller, who decides
//! whether to surface it (on-demand read) or wait for the next scheduled
//! refresh.

use nimbus_core::Observation;
use serde::Deserialize;
use std::time::Duration;

use crate::config::ProviderSettings;

/// Errors that can occur while fetching from the provider.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not be sent or the response not received.
    #[error("Network error fetching {city}: {message}")]
    Network {
        /// City the fetch was for.
        city: String,
        /// Description of the transport failure.
        message: String,
    },

    /// The provider answered with a non-success status.
    #[error("Provider returned status {status} for {city}")]
    Status {
        /// City the fetch was for.
        city: String,
        /// HTTP status code.
        status: u16,
    },

    /// The response body was missing expected fields.
    #[error("Malformed provider response for {city}: {message}")]
    Malformed {
        /// City the fetch was for.
        city: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Raw provider response; only the fields the service needs.
///
/// Serde fails the whole decode when any of these is absent, which is the
/// defensive-parsing behavior the cache wants: a partial record is useless.
#[derive(Debug, Deserialize)]
struct ProviderResponse {
    name: String,
    main: MainSection,
    weather: Vec<WeatherSection>,
}

#[derive(Debug, Deserialize)]
struct MainSection {
    /// Temperature in Kelvin.
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherSection {
    description: String,
}

/// HTTP client for the weather provider.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ProviderClient {
    /// Creates a provider client from settings.
    ///
    /// The underlying HTTP client enforces the configured request timeout,
    /// so a hung provider cannot stall a scheduler task past that bound.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should not happen in
    /// practice).
    #[must_use]
    pub fn new(settings: &ProviderSettings) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
        }
    }

    /// Fetches and normalizes the current observation for a city.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request fails at the transport level
    /// - The provider answers with a non-2xx status
    /// - The body cannot be decoded or the weather list is empty
    pub async fn fetch(&self, city: &str) -> Result<Observation, FetchError> {
        tracing::debug!(city, "Fetching weather data");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[("q", city), ("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(city, error = %e, "Provider request failed");
                FetchError::Network {
                    city: city.to_string(),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                city: city.to_string(),
                status: status.as_u16(),
            });
        }

        let body: ProviderResponse = response.json().await.map_err(|e| {
            tracing::warn!(city, error = %e, "Failed to decode provider response");
            FetchError::Malformed {
                city: city.to_string(),
                message: e.to_string(),
            }
        })?;

        let weather = body.weather.first().ok_or_else(|| FetchError::Malformed {
            city: city.to_string(),
            message: "empty weather list".to_string(),
        })?;

        Ok(Observation::from_provider(
            body.name,
            body.main.temp,
            &weather.description,
        ))
    }
}
