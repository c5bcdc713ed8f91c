//! Temperature service error types.

/// Errors from the temperature service.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// HTTP request failed (network error, timeout, bad JSON)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with an error status
    #[error("weather API error {status}")]
    Status { status: u16 },

    /// Response did not contain a current temperature
    #[error("response has no current temperature")]
    MissingTemperature,
}
