//! Caching layer for Darwin service details.
//!
//! Every departure on the board needs a `GetServiceDetails` request to learn
//! its calling points. The same services stay on the board across many
//! refreshes, so results are remembered until the cache window elapses, at
//! which point the whole cache is dropped at once. There is no per-entry
//! expiry: staleness tolerance is the window length.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::darwin::{DarwinApi, DarwinError, calling_points_from_details};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long cached details live before the whole cache is reset.
    pub ttl: Duration,

    /// Pause after each remote lookup, to stay under Darwin's rate limit.
    pub request_delay: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            request_delay: Duration::from_millis(200),
        }
    }
}

/// What a previous lookup found out about a service.
#[derive(Debug, Clone)]
enum CachedDetail {
    CallingPoints(Vec<String>),
    /// Darwin no longer knows the service ID.
    NotFound,
}

/// Service-detail cache keyed by Darwin service ID.
#[derive(Debug)]
pub struct ServiceDetailCache {
    entries: HashMap<String, CachedDetail>,
    window_started: Instant,
    ttl: Duration,
    request_delay: Duration,
}

impl ServiceDetailCache {
    /// Create an empty cache whose first window starts at `now`.
    pub fn new(config: &CacheConfig, now: Instant) -> Self {
        Self {
            entries: HashMap::new(),
            window_started: now,
            ttl: config.ttl,
            request_delay: config.request_delay,
        }
    }

    /// Calling points for `service_id`, from the cache or from Darwin.
    ///
    /// Successful lookups and "service not found" answers are cached until
    /// the window resets. Transient failures are returned but not cached, so
    /// the next fetch cycle asks again.
    pub async fn get_or_fetch<A: DarwinApi>(
        &mut self,
        api: &A,
        service_id: &str,
        now: Instant,
    ) -> Result<Vec<String>, DarwinError> {
        self.expire_window(now);

        if let Some(cached) = self.entries.get(service_id) {
            return match cached {
                CachedDetail::CallingPoints(points) => Ok(points.clone()),
                CachedDetail::NotFound => Err(DarwinError::ServiceNotFound),
            };
        }

        let result = api
            .service_details(service_id)
            .await
            .map(|details| calling_points_from_details(&details));

        match &result {
            Ok(points) => {
                self.entries.insert(
                    service_id.to_string(),
                    CachedDetail::CallingPoints(points.clone()),
                );
            }
            Err(e) if e.is_definitive() => {
                debug!(service_id, "service no longer known to Darwin");
                self.entries
                    .insert(service_id.to_string(), CachedDetail::NotFound);
            }
            Err(e) => {
                warn!(service_id, error = %e, "service detail lookup failed");
            }
        }

        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        result
    }

    /// Drop every entry if the current window has elapsed.
    fn expire_window(&mut self, now: Instant) {
        if now.saturating_duration_since(self.window_started) >= self.ttl {
            if !self.entries.is_empty() {
                debug!(entries = self.entries.len(), "resetting service detail cache");
            }
            self.entries.clear();
            self.window_started = now;
        }
    }

    /// Number of cached services.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
