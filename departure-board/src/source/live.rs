//! Live departure source backed by Darwin.

use std::time::Instant;

use tracing::{debug, info};

use crate::cache::{CacheConfig, ServiceDetailCache};
use crate::darwin::{DarwinApi, DarwinError, departure_from_service};
use crate::domain::{Crs, join_calling_points};

use super::{Board, DepartureSource};

/// Settings for the live source.
#[derive(Debug, Clone)]
pub struct LiveSourceConfig {
    /// Rows requested from the departure board.
    pub num_rows: u8,
    /// Departures kept per platform.
    pub per_platform: usize,
    /// Whether to look up calling points for each kept departure.
    pub fetch_calling_points: bool,
    pub cache: CacheConfig,
}

impl Default for LiveSourceConfig {
    fn default() -> Self {
        Self {
            num_rows: 6,
            per_platform: 2,
            fetch_calling_points: true,
            cache: CacheConfig::default(),
        }
    }
}

/// Departure source that queries Darwin.
///
/// One departure board request per fetch, then one cached detail lookup per
/// departure that makes it onto the page.
pub struct LiveSource<A: DarwinApi> {
    api: A,
    cache: ServiceDetailCache,
    num_rows: u8,
    per_platform: usize,
    fetch_calling_points: bool,
}

impl<A: DarwinApi> LiveSource<A> {
    pub fn new(api: A, config: &LiveSourceConfig) -> Self {
        Self {
            api,
            cache: ServiceDetailCache::new(&config.cache, Instant::now()),
            num_rows: config.num_rows,
            per_platform: config.per_platform,
            fetch_calling_points: config.fetch_calling_points,
        }
    }

    /// Resolve the calling-at line for one service.
    ///
    /// A failed lookup only blanks this service's calling points.
    async fn calling_at(&mut self, station: &Crs, service_id: Option<&str>) -> String {
        let Some(service_id) = service_id.filter(|_| self.fetch_calling_points) else {
            return String::new();
        };

        match self
            .cache
            .get_or_fetch(&self.api, service_id, Instant::now())
            .await
        {
            Ok(points) => join_calling_points(&points),
            Err(e) => {
                debug!(station = %station, service_id, error = %e, "no calling points");
                String::new()
            }
        }
    }

    pub fn cache(&self) -> &ServiceDetailCache {
        &self.cache
    }
}

impl<A: DarwinApi> DepartureSource for LiveSource<A> {
    async fn fetch(&mut self, station: &Crs, platforms: &[String]) -> Result<Board, DarwinError> {
        let response = self.api.departure_board(station, self.num_rows).await?;

        let mut board = Board::for_platforms(platforms, self.per_platform);

        for item in response.services() {
            let Some(platform) = item.platform.as_deref() else {
                continue;
            };
            if !board.has_room(platform) {
                continue;
            }

            let calling_at = self.calling_at(station, item.service_id.as_deref()).await;
            board.offer(departure_from_service(item, calling_at));
        }

        info!(
            station = %station,
            services = response.services().len(),
            kept = board.record_count(),
            "fetched departure board"
        );

        Ok(board)
    }

    fn describe(&self) -> &'static str {
        "darwin"
    }
}
