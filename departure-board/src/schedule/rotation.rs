//! The display-rotation and data-refresh scheduler.
//!
//! A timed state machine evaluated once per loop tick. It decides which
//! station and platform page is live, when to re-fetch departures, and skips
//! pages and stations with nothing to show. Every remote call is awaited
//! inline, so a slow call holds up the tick that made it.

use std::time::{Duration, Instant};

use chrono::NaiveTime;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, RotationConfig, StationConfig};
use crate::domain::Crs;
use crate::render::BoardFrame;
use crate::source::{Board, DepartureSource};
use crate::weather::{Temperature, TemperatureSource};

use super::PlatformPages;

/// Scheduler bookkeeping. Only the scheduler mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationState {
    pub station_index: usize,
    pub page_index: usize,
    /// Last time departures were fetched; `None` until the first fetch.
    pub last_fetch: Option<Instant>,
    pub last_station_rotate: Instant,
    pub last_page_rotate: Instant,
    pub last_temperature_refresh: Option<Instant>,
    /// No rotation or fetch happens before this instant.
    pub cooldown_until: Option<Instant>,
    /// A fetch is owed regardless of the update timer.
    pub refresh_pending: bool,
}

impl RotationState {
    fn new(now: Instant) -> Self {
        Self {
            station_index: 0,
            page_index: 0,
            last_fetch: None,
            last_station_rotate: now,
            last_page_rotate: now,
            last_temperature_refresh: None,
            cooldown_until: None,
            refresh_pending: true,
        }
    }
}

/// What a tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing was due.
    Idle,
    /// Waiting out the pause after an empty station.
    CoolingDown,
    /// A page with departures is now on display.
    Refreshed {
        station: Crs,
        page_index: usize,
        records: usize,
    },
    /// Every page of `station` was empty; the next station is queued behind
    /// a cooldown.
    StationExhausted { station: Crs },
}

/// The board on screen and the (station, page) pair it was fetched for.
#[derive(Debug)]
struct DisplayedBoard {
    station_index: usize,
    page_index: usize,
    board: Board,
}

/// Rotation scheduler over a departure source and a temperature source.
pub struct RotationScheduler<S, W> {
    stations: Vec<StationConfig>,
    rotation: RotationConfig,
    source: S,
    weather: W,
    pages: PlatformPages,
    state: RotationState,
    displayed: Option<DisplayedBoard>,
    temperatures: Vec<Temperature>,
}

fn elapsed(now: Instant, since: Instant) -> Duration {
    now.saturating_duration_since(since)
}

impl<S: DepartureSource, W: TemperatureSource> RotationScheduler<S, W> {
    /// Start on the first station's first page at `now`.
    ///
    /// The first tick fetches departures and temperatures immediately.
    pub fn new(
        stations: Vec<StationConfig>,
        rotation: RotationConfig,
        source: S,
        weather: W,
        now: Instant,
    ) -> Result<Self, ConfigError> {
        let first = stations
            .first()
            .ok_or_else(|| ConfigError::Invalid("no stations to display".to_string()))?;
        let pages = PlatformPages::new(&first.platforms, rotation.platforms_per_screen);
        let temperatures = vec![Temperature::Unavailable; stations.len()];

        Ok(Self {
            stations,
            rotation,
            source,
            weather,
            pages,
            state: RotationState::new(now),
            displayed: None,
            temperatures,
        })
    }

    /// Evaluate every timer against `now` and act on the ones that are due.
    pub async fn tick(&mut self, now: Instant) -> TickOutcome {
        self.refresh_temperatures_if_due(now).await;

        if let Some(until) = self.state.cooldown_until {
            if now < until {
                return TickOutcome::CoolingDown;
            }
            // The station moved to during the cooldown gets a full slot.
            self.state.cooldown_until = None;
            self.state.last_station_rotate = now;
            self.state.last_page_rotate = now;
        }

        let mut rotated = false;

        if elapsed(now, self.state.last_station_rotate) >= self.rotation.station_rotate {
            self.advance_station(now);
            rotated = true;
        }

        if self.pages.rotates()
            && elapsed(now, self.state.last_page_rotate) >= self.rotation.screen_rotate
        {
            self.advance_page(now);
            rotated = true;
        }

        let update_due = self
            .state
            .last_fetch
            .is_none_or(|last| elapsed(now, last) >= self.rotation.update);

        if rotated || update_due || self.state.refresh_pending {
            self.refresh(now).await
        } else {
            TickOutcome::Idle
        }
    }

    /// Fetch the current page, moving past empty pages, and past the whole
    /// station if every page is empty.
    async fn refresh(&mut self, now: Instant) -> TickOutcome {
        let station = self.current_station().code;

        for _ in 0..self.pages.len() {
            let page_index = self.state.page_index;

            let board = match self.source.fetch(&station, self.pages.page(page_index)).await {
                Ok(board) => board,
                Err(e) => {
                    warn!(
                        station = %station,
                        page = page_index,
                        source = self.source.describe(),
                        error = %e,
                        "departure fetch failed"
                    );
                    Board::for_platforms(self.pages.page(page_index), 0)
                }
            };

            if !board.is_empty() {
                let records = board.record_count();
                debug!(station = %station, page = page_index, records, "page refreshed");

                self.displayed = Some(DisplayedBoard {
                    station_index: self.state.station_index,
                    page_index,
                    board,
                });
                self.state.last_fetch = Some(now);
                self.state.refresh_pending = false;

                return TickOutcome::Refreshed {
                    station,
                    page_index,
                    records,
                };
            }

            debug!(station = %station, page = page_index, "no departures, skipping page");
            self.displayed = None;
            self.state.page_index = self.pages.next_index(page_index);
        }

        info!(
            station = %station,
            pages = self.pages.len(),
            cooldown_secs = self.rotation.no_departures_cooldown.as_secs(),
            "no departures on any page, moving to next station"
        );

        self.advance_station(now);
        self.state.last_fetch = Some(now);
        self.state.refresh_pending = true;
        self.state.cooldown_until = Some(now + self.rotation.no_departures_cooldown);

        TickOutcome::StationExhausted { station }
    }

    async fn refresh_temperatures_if_due(&mut self, now: Instant) {
        let due = self
            .state
            .last_temperature_refresh
            .is_none_or(|last| elapsed(now, last) >= self.rotation.temperature);
        if !due {
            return;
        }

        for (index, station) in self.stations.iter().enumerate() {
            let Some(coordinates) = station.coordinates else {
                self.temperatures[index] = Temperature::Unavailable;
                continue;
            };

            self.temperatures[index] = match self
                .weather
                .current_temperature(coordinates.latitude, coordinates.longitude)
                .await
            {
                Ok(reading) => Temperature::from_reading(reading),
                Err(e) => {
                    warn!(station = %station.code, error = %e, "temperature unavailable");
                    Temperature::Unavailable
                }
            };
        }

        self.state.last_temperature_refresh = Some(now);
    }
}

impl<S, W> RotationScheduler<S, W> {
    fn advance_station(&mut self, now: Instant) {
        self.state.station_index = (self.state.station_index + 1) % self.stations.len();
        self.state.page_index = 0;
        self.state.last_station_rotate = now;
        self.state.last_page_rotate = now;

        let station = &self.stations[self.state.station_index];
        self.pages = PlatformPages::new(&station.platforms, self.rotation.platforms_per_screen);
        self.displayed = None;

        info!(station = %station.code, name = %station.name, pages = self.pages.len(), "rotated station");
    }

    fn advance_page(&mut self, now: Instant) {
        self.state.page_index = self.pages.next_index(self.state.page_index);
        self.state.last_page_rotate = now;
        self.displayed = None;

        debug!(
            station = %self.current_station().code,
            page = self.state.page_index,
            "rotated page"
        );
    }

    pub fn state(&self) -> &RotationState {
        &self.state
    }

    pub fn current_station(&self) -> &StationConfig {
        &self.stations[self.state.station_index]
    }

    pub fn pages(&self) -> &PlatformPages {
        &self.pages
    }

    /// Platforms of the live page.
    pub fn current_page(&self) -> &[String] {
        self.pages.page(self.state.page_index)
    }

    /// The board for the live (station, page) pair, if one has been fetched.
    pub fn displayed_board(&self) -> Option<&Board> {
        self.displayed
            .as_ref()
            .filter(|d| {
                d.station_index == self.state.station_index && d.page_index == self.state.page_index
            })
            .map(|d| &d.board)
    }

    pub fn temperature(&self, station_index: usize) -> Temperature {
        self.temperatures
            .get(station_index)
            .copied()
            .unwrap_or_default()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Everything the renderer needs for the current frame.
    pub fn frame(&self, clock: NaiveTime) -> BoardFrame<'_> {
        let station = self.current_station();
        BoardFrame {
            station_code: station.code,
            station_name: &station.name,
            page: self.current_page(),
            page_index: self.state.page_index,
            page_count: self.pages.len(),
            board: self.displayed_board(),
            temperature: self.temperature(self.state.station_index),
            clock,
        }
    }
}

#[cfg(test)]
#[path = "rotation_tests.rs"]
mod tests;
