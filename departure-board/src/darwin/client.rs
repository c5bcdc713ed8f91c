//! Darwin LDB HTTP client.
//!
//! Queries the Darwin Live Departure Boards JSON API for a station's
//! departure board and for individual service details.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use tracing::debug;

use crate::domain::Crs;

use super::error::DarwinError;
use super::types::{ServiceDetails, StationBoard};

/// Default base URL for Darwin LDB API.
pub const DEFAULT_BASE_URL: &str =
    "https://api1.raildata.org.uk/1010-live-departure-board-dep1_2/LDBWS";

/// Darwin caps a board at this many rows.
pub const MAX_ROWS: u8 = 150;

/// Characters of a bad response body kept in error messages.
const BODY_EXCERPT: usize = 500;

/// The two Darwin operations the board consumes.
///
/// Implemented by [`DarwinClient`]; tests substitute scripted responses.
#[allow(async_fn_in_trait)]
pub trait DarwinApi {
    /// Up to `num_rows` departures from `crs`.
    async fn departure_board(&self, crs: &Crs, num_rows: u8)
    -> Result<StationBoard, DarwinError>;

    /// Details (including subsequent calling points) for one service.
    async fn service_details(&self, service_id: &str) -> Result<ServiceDetails, DarwinError>;
}

/// Configuration for the Darwin client.
#[derive(Debug, Clone)]
pub struct DarwinConfig {
    /// API key for authentication
    pub api_key: String,
    /// Base URL for the API (defaults to production Darwin)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl DarwinConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Darwin LDB API client.
#[derive(Debug, Clone)]
pub struct DarwinClient {
    http: reqwest::Client,
    base_url: String,
}

impl DarwinClient {
    /// Create a new Darwin client with the given configuration.
    pub fn new(config: DarwinConfig) -> Result<Self, DarwinError> {
        if config.api_key.trim().is_empty() {
            return Err(DarwinError::NotConfigured("API_KEY is empty".to_string()));
        }

        let mut headers = HeaderMap::new();

        // Darwin uses "x-apikey" for authentication
        let api_key =
            HeaderValue::from_str(&config.api_key).map_err(|_| DarwinError::ApiError {
                status: 0,
                message: "Invalid API key format".to_string(),
            })?;
        headers.insert("x-apikey", api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn board_url(&self, crs: &Crs) -> String {
        format!(
            "{}/api/20220120/GetDepartureBoard/{}",
            self.base_url,
            crs.as_str()
        )
    }

    fn details_url(&self, service_id: &str) -> String {
        format!(
            "{}/api/20220120/GetServiceDetails/{}",
            self.base_url, service_id
        )
    }
}

impl DarwinApi for DarwinClient {
    async fn departure_board(
        &self,
        crs: &Crs,
        num_rows: u8,
    ) -> Result<StationBoard, DarwinError> {
        let num_rows = num_rows.clamp(1, MAX_ROWS);
        debug!(station = %crs, num_rows, "requesting departure board");

        let response = self
            .http
            .get(self.board_url(crs))
            .query(&[("numRows", num_rows.to_string())])
            .send()
            .await?;

        let body = check_status(response).await?;

        serde_json::from_str(&body).map_err(|e| DarwinError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(BODY_EXCERPT).collect()),
        })
    }

    /// **Important:** Darwin service IDs are ephemeral and only valid while
    /// the service appears on a departure board. Expired IDs come back as
    /// `ServiceNotFound`.
    async fn service_details(&self, service_id: &str) -> Result<ServiceDetails, DarwinError> {
        debug!(service_id, "requesting service details");

        let response = self.http.get(self.details_url(service_id)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DarwinError::ServiceNotFound);
        }

        let body = check_status(response).await?;

        // Darwin returns null/empty for expired service IDs
        if body.trim().is_empty() || body.trim() == "null" {
            return Err(DarwinError::ServiceNotFound);
        }

        serde_json::from_str(&body).map_err(|e| DarwinError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(BODY_EXCERPT).collect()),
        })
    }
}

/// Map error statuses to `DarwinError` and return the body of a success.
async fn check_status(response: Response) -> Result<String, DarwinError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(DarwinError::Unauthorized);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(DarwinError::RateLimited);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DarwinError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }

    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = DarwinConfig::new("test-key")
            .with_base_url("http://localhost:8080")
            .with_timeout(60);

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn config_defaults() {
        let config = DarwinConfig::new("test-key");

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn client_creation() {
        let client = DarwinClient::new(DarwinConfig::new("test-key"));
        assert!(client.is_ok());
    }

    #[test]
    fn empty_api_key_is_not_configured() {
        let err = DarwinClient::new(DarwinConfig::new("  ")).unwrap_err();
        assert!(matches!(err, DarwinError::NotConfigured(_)));
    }

    #[test]
    fn urls() {
        let client =
            DarwinClient::new(DarwinConfig::new("k").with_base_url("http://localhost:8080/ldb/"))
                .unwrap();
        let crs = Crs::parse("CDF").unwrap();

        assert_eq!(
            client.board_url(&crs),
            "http://localhost:8080/ldb/api/20220120/GetDepartureBoard/CDF"
        );
        assert_eq!(
            client.details_url("abc123"),
            "http://localhost:8080/ldb/api/20220120/GetServiceDetails/abc123"
        );
    }

    // Requests against the real API need a key and are not run here.
}
