//! Open-Meteo current weather client.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::{TemperatureSource, WeatherError};

/// Default base URL for Open-Meteo.
pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";

/// Configuration for the weather client.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub base_url: String,
    /// Connect and whole-request timeout. Kept short: the board waits on it.
    pub timeout: Duration,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl WeatherConfig {
    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeather>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: Option<f64>,
}

impl ForecastResponse {
    fn temperature(&self) -> Result<f64, WeatherError> {
        self.current_weather
            .as_ref()
            .and_then(|w| w.temperature)
            .ok_or(WeatherError::MissingTemperature)
    }
}

/// Open-Meteo API client.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn forecast_url(&self) -> String {
        format!("{}/v1/forecast", self.base_url)
    }
}

impl TemperatureSource for WeatherClient {
    async fn current_temperature(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<f64, WeatherError> {
        debug!(latitude, longitude, "requesting current weather");

        let response = self
            .http
            .get(self.forecast_url())
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
            });
        }

        let forecast: ForecastResponse = response.json().await?;
        forecast.temperature()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_forecast() {
        let json = r#"{
            "latitude": 51.48,
            "longitude": -3.18,
            "current_weather": {"temperature": 11.7, "windspeed": 14.2, "weathercode": 3}
        }"#;

        let forecast: ForecastResponse = serde_json::from_str(json).unwrap();
        assert_eq!(forecast.temperature().unwrap(), 11.7);
    }

    #[test]
    fn forecast_without_current_weather() {
        let forecast: ForecastResponse = serde_json::from_str(r#"{"latitude": 51.48}"#).unwrap();
        assert!(matches!(
            forecast.temperature(),
            Err(WeatherError::MissingTemperature)
        ));
    }

    #[test]
    fn config_defaults() {
        let config = WeatherConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn forecast_url() {
        let client =
            WeatherClient::new(WeatherConfig::default().with_base_url("http://localhost:9000/"))
                .unwrap();
        assert_eq!(client.forecast_url(), "http://localhost:9000/v1/forecast");
    }
}
