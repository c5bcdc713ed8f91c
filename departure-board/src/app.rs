//! Application context and the main loop.

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveTime};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::cache::CacheConfig;
use crate::config::{AppConfig, ConfigError, sample_path_for, write_sample};
use crate::darwin::{DarwinClient, DarwinConfig};
use crate::render::{RenderOutcome, Renderer};
use crate::schedule::{RotationScheduler, TickOutcome};
use crate::source::{DepartureFeed, DepartureSource, FixtureSource, LiveSource, LiveSourceConfig};
use crate::weather::{TemperatureSource, WeatherClient, WeatherConfig, WeatherError};

/// Loop frequency. Timers are checked this often; remote calls happen far
/// less.
pub const TICK_RATE_HZ: u32 = 60;

/// Errors building the application at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create weather client: {0}")]
    Weather(#[from] WeatherError),
}

/// Load the config at `path`.
///
/// On failure a sample document is written beside `path` before the error is
/// returned, so the caller only has to report it and exit.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    AppConfig::load(path).inspect_err(|e| {
        error!(path = ?path, error = %e, "cannot load configuration");

        let sample = sample_path_for(path);
        match write_sample(&sample) {
            Ok(()) => info!(path = ?sample, "wrote sample configuration"),
            Err(e) => error!(path = ?sample, error = %e, "cannot write sample configuration"),
        }
    })
}

/// Pick the departure source for `config`.
///
/// Test mode serves the fixture. Live mode falls back to the fixture if the
/// Darwin client cannot be built.
pub fn select_feed(config: &AppConfig) -> DepartureFeed {
    let fixture = || FixtureSource::new(&config.fixture_path, config.departures_per_platform);

    if config.test_mode {
        let source = fixture();
        info!(path = ?source.path(), "test mode, serving fixture departures");
        return DepartureFeed::Fixture(source);
    }

    let darwin = DarwinConfig::new(config.api_key.clone().unwrap_or_default())
        .with_base_url(&config.darwin_base_url);

    match DarwinClient::new(darwin) {
        Ok(client) => {
            let live = LiveSourceConfig {
                num_rows: config.num_rows,
                per_platform: config.departures_per_platform,
                fetch_calling_points: config.fetch_calling_points,
                cache: CacheConfig {
                    ttl: config.service_details_ttl,
                    ..CacheConfig::default()
                },
            };
            info!(base_url = %config.darwin_base_url, "serving live departures");
            DepartureFeed::Live(LiveSource::new(client, &live))
        }
        Err(e) => {
            warn!(error = %e, "Darwin client unavailable, falling back to fixture departures");
            DepartureFeed::Fixture(fixture())
        }
    }
}

/// Config, scheduler and renderer, built once at startup.
pub struct AppContext<S, W, R> {
    config: AppConfig,
    scheduler: RotationScheduler<S, W>,
    renderer: R,
}

impl<R: Renderer> AppContext<DepartureFeed, WeatherClient, R> {
    /// Wire up the production sources for `config`.
    pub fn from_config(config: AppConfig, renderer: R) -> Result<Self, StartupError> {
        let feed = select_feed(&config);
        let weather =
            WeatherClient::new(WeatherConfig::default().with_base_url(&config.weather_base_url))?;
        let scheduler = RotationScheduler::new(
            config.stations.clone(),
            config.rotation.clone(),
            feed,
            weather,
            Instant::now(),
        )?;

        Ok(Self::new(config, scheduler, renderer))
    }
}

impl<S: DepartureSource, W: TemperatureSource, R: Renderer> AppContext<S, W, R> {
    pub fn new(config: AppConfig, scheduler: RotationScheduler<S, W>, renderer: R) -> Self {
        Self {
            config,
            scheduler,
            renderer,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &RotationScheduler<S, W> {
        &self.scheduler
    }

    /// One loop iteration: advance the scheduler, then draw.
    pub async fn step(&mut self, now: Instant, clock: NaiveTime) -> RenderOutcome {
        match self.scheduler.tick(now).await {
            TickOutcome::Refreshed {
                station,
                page_index,
                records,
            } => debug!(station = %station, page = page_index, records, "board updated"),
            TickOutcome::StationExhausted { station } => {
                debug!(station = %station, "station had nothing to show")
            }
            TickOutcome::Idle | TickOutcome::CoolingDown => {}
        }

        let frame = self.scheduler.frame(clock);
        self.renderer.draw(&frame)
    }

    /// Run until Ctrl-C or until the renderer asks to quit.
    pub async fn run(&mut self) {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(1) / TICK_RATE_HZ);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let quit = tokio::signal::ctrl_c();
        tokio::pin!(quit);
        let mut listening = true;

        info!(
            stations = self.config.stations.len(),
            source = self.scheduler.source().describe(),
            "departure board running"
        );

        loop {
            tokio::select! {
                biased;
                result = &mut quit, if listening => match result {
                    Ok(()) => {
                        info!("interrupted, shutting down");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "cannot listen for Ctrl-C");
                        listening = false;
                        continue;
                    }
                },
                _ = ticker.tick() => {}
            }

            if self.step(Instant::now(), Local::now().time()).await == RenderOutcome::Quit {
                info!("renderer requested quit");
                break;
            }
        }
    }
}
