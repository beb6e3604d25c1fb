use serde::{Deserialize, Serialize};
use std::fmt;

/// Offset between Kelvin and Celsius.
const KELVIN_OFFSET: f64 = 273.15;

/// A normalized weather observation for a single city.
///
/// This is the provider-independent payload the cache stores and serves.
/// An observation is immutable once constructed; a later fetch for the
/// same city produces a new value that replaces the old one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// City name as reported by the provider.
    pub city: String,
    /// Temperature in degrees Celsius, rounded to one decimal.
    pub temperature_c: f64,
    /// Weather description with the first letter capitalized.
    pub description: String,
}

impl Observation {
    /// Build an observation from raw provider data.
    ///
    /// The provider reports temperature in Kelvin and descriptions in
    /// lowercase; both are canonicalized here so every observation in the
    /// system carries the same units and casing.
    pub fn from_provider(city: impl Into<String>, temp_kelvin: f64, description: &str) -> Self {
        Self {
            city: city.into(),
            temperature_c: kelvin_to_celsius(temp_kelvin),
            description: capitalize_description(description),
        }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Weather in {}: {:.1} degrees C, {}",
            self.city, self.temperature_c, self.description
        )
    }
}

/// Convert Kelvin to Celsius, rounded to one decimal place.
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    ((kelvin - KELVIN_OFFSET) * 10.0).round() / 10.0
}

/// Uppercase the first character of a description, leaving the rest as-is.
pub fn capitalize_description(description: &str) -> String {
    let mut chars = description.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_provider_normalizes_units_and_casing() {
        let obs = Observation::from_provider("Durban", 295.15, "clear sky");
        assert_eq!(obs.city, "Durban");
        assert_eq!(obs.temperature_c, 22.0);
        assert_eq!(obs.description, "Clear sky");
    }

    #[test]
    fn test_kelvin_to_celsius_rounds_to_one_decimal() {
        assert_eq!(kelvin_to_celsius(273.15), 0.0);
        assert_eq!(kelvin_to_celsius(295.61), 22.5);
        assert_eq!(kelvin_to_celsius(295.69), 22.5);
        assert_eq!(kelvin_to_celsius(263.15), -10.0);
    }

    #[test]
    fn test_capitalize_description() {
        assert_eq!(capitalize_description("clear sky"), "Clear sky");
        assert_eq!(capitalize_description("Broken clouds"), "Broken clouds");
        assert_eq!(capitalize_description(""), "");
    }

    #[test]
    fn test_display_line() {
        let obs = Observation::from_provider("Durban", 295.15, "clear sky");
        assert_eq!(obs.to_string(), "Weather in Durban: 22.0 degrees C, Clear sky");
    }

    #[test]
    fn test_display_keeps_one_decimal_for_whole_degrees() {
        let obs = Observation::from_provider("Pretoria", 298.15, "few clouds");
        assert_eq!(obs.to_string(), "Weather in Pretoria: 25.0 degrees C, Few clouds");
    }

    #[test]
    fn test_serde_round_trip() {
        let obs = Observation::from_provider("Cape Town", 290.15, "light rain");
        let json = serde_json::to_string(&obs).unwrap();
        let back: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, obs);
    }
}
