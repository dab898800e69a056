//! Current-weather integration (weatherstack)
//!
//! This module provides the per-city weather observations that feed the
//! demand model's feature vector.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::config::WeatherConfig;

/// Current weather observation for one city
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub temperature: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_degree: f64,
    pub precipitation: f64,
    pub cloud_cover: f64,
}

/// Weatherstack API client
pub struct WeatherClient {
    client: Client,
    base_url: String,
    access_key: String,
    country: String,
}

impl WeatherClient {
    /// Create a new client from configuration
    pub fn new(cfg: &WeatherConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: cfg.base_url.clone(),
            access_key: cfg.access_key.clone(),
            country: cfg.country.clone(),
        }
    }

    /// Fetch current observations for a set of cities.
    ///
    /// One upstream call per city, no retries. A city whose call fails or
    /// whose response lacks the `current` section is logged and omitted from
    /// the returned map; it never aborts the remaining cities.
    pub async fn fetch_current(&self, cities: &[String]) -> HashMap<String, WeatherRecord> {
        let mut observations = HashMap::new();

        for city in cities {
            match self.fetch_city(city).await {
                Ok(record) => {
                    observations.insert(city.clone(), record);
                }
                Err(e) => {
                    warn!(%city, error = %e, "failed to fetch weather observation");
                }
            }
        }

        observations
    }

    async fn fetch_city(&self, city: &str) -> Result<WeatherRecord> {
        let url = format!("{}/current", self.base_url);
        let query = format!("{},{}", city, self.country);

        debug!(%city, %url, "fetching current weather");

        let response = self
            .client
            .get(&url)
            .query(&[("access_key", self.access_key.as_str()), ("query", query.as_str())])
            .send()
            .await
            .context("Failed to send request to weather provider")?;

        if !response.status().is_success() {
            anyhow::bail!("Weather provider error: {}", response.status());
        }

        let payload: CurrentWeatherResponse = response
            .json()
            .await
            .context("Failed to parse weather provider response")?;

        let current = payload
            .current
            .with_context(|| format!("Weather response missing current observation for {city}"))?;

        info!(%city, "fetched current weather observation");

        Ok(WeatherRecord {
            temperature: current.temperature,
            pressure: current.pressure,
            humidity: current.humidity,
            wind_speed: current.wind_speed,
            wind_degree: current.wind_degree,
            precipitation: current.precip,
            cloud_cover: current.cloudcover,
        })
    }
}

// Weatherstack API response structures
#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    current: Option<CurrentObservation>,
}

#[derive(Debug, Deserialize)]
struct CurrentObservation {
    temperature: f64,
    pressure: f64,
    humidity: f64,
    wind_speed: f64,
    wind_degree: f64,
    precip: f64,
    cloudcover: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> WeatherConfig {
        WeatherConfig {
            base_url: base_url.to_string(),
            access_key: "test-key".to_string(),
            country: "India".to_string(),
        }
    }

    #[test]
    fn parses_current_section() {
        let body = r#"{
            "current": {
                "temperature": 30.0,
                "pressure": 1010.0,
                "humidity": 60.0,
                "wind_speed": 5.0,
                "wind_degree": 180.0,
                "precip": 0.0,
                "cloudcover": 20.0
            }
        }"#;

        let parsed: CurrentWeatherResponse = serde_json::from_str(body).unwrap();
        let current = parsed.current.unwrap();
        assert_eq!(current.temperature, 30.0);
        assert_eq!(current.wind_degree, 180.0);
        assert_eq!(current.cloudcover, 20.0);
    }

    #[test]
    fn missing_current_section_is_none() {
        let parsed: CurrentWeatherResponse =
            serde_json::from_str(r#"{"error": {"code": 101}}"#).unwrap();
        assert!(parsed.current.is_none());
    }

    #[tokio::test]
    async fn failed_city_is_omitted_not_fatal() {
        // Unroutable base URL: the call fails, the map is simply empty.
        let client = WeatherClient::new(&test_config("http://127.0.0.1:1"));
        let observations = client.fetch_current(&["Mumbai".to_string()]).await;
        assert!(observations.is_empty());
    }
}
