//! Unit tests for the rotation scheduler.

use super::*;
use crate::config::Coordinates;
use crate::darwin::DarwinError;
use crate::domain::{DepartureRecord, DepartureStatus};
use crate::weather::WeatherError;
use std::cell::Cell;
use std::collections::HashMap;

const SECOND: Duration = Duration::from_secs(1);

fn crs(s: &str) -> Crs {
    Crs::parse(s).unwrap()
}

fn platforms(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn station(code: &str, name: &str, ids: &[&str]) -> StationConfig {
    StationConfig {
        code: crs(code),
        name: name.to_string(),
        platforms: platforms(ids),
        coordinates: None,
    }
}

fn rotation() -> RotationConfig {
    RotationConfig {
        station_rotate: Duration::from_secs(60),
        screen_rotate: Duration::from_secs(20),
        update: Duration::from_secs(30),
        temperature: Duration::from_secs(600),
        no_departures_cooldown: Duration::from_secs(60),
        platforms_per_screen: 4,
    }
}

fn record(platform: &str, time: &str) -> DepartureRecord {
    DepartureRecord {
        departure_time: time.to_string(),
        destination: "Swansea".to_string(),
        calling_at: String::new(),
        status: DepartureStatus::OnTime,
        platform: platform.to_string(),
        operator: None,
    }
}

/// Source serving canned departures per station.
#[derive(Default)]
struct StubSource {
    departures: HashMap<Crs, Vec<DepartureRecord>>,
    failing: bool,
    requests: Vec<(Crs, Vec<String>)>,
}

impl StubSource {
    fn with(mut self, code: &str, records: Vec<DepartureRecord>) -> Self {
        self.departures.insert(crs(code), records);
        self
    }
}

impl DepartureSource for StubSource {
    async fn fetch(&mut self, station: &Crs, platforms: &[String]) -> Result<Board, DarwinError> {
        self.requests.push((*station, platforms.to_vec()));
        if self.failing {
            return Err(DarwinError::RateLimited);
        }

        let mut board = Board::for_platforms(platforms, 2);
        for record in self.departures.get(station).into_iter().flatten() {
            board.offer(record.clone());
        }
        Ok(board)
    }

    fn describe(&self) -> &'static str {
        "stub"
    }
}

/// Weather service answering with a fixed reading, or failing when `None`.
struct StubWeather {
    reading: Option<f64>,
    requests: Cell<usize>,
}

impl StubWeather {
    fn reading(reading: Option<f64>) -> Self {
        Self {
            reading,
            requests: Cell::new(0),
        }
    }
}

impl TemperatureSource for StubWeather {
    async fn current_temperature(&self, _: f64, _: f64) -> Result<f64, WeatherError> {
        self.requests.set(self.requests.get() + 1);
        self.reading.ok_or(WeatherError::Status { status: 503 })
    }
}

fn scheduler(
    stations: Vec<StationConfig>,
    source: StubSource,
    now: Instant,
) -> RotationScheduler<StubSource, StubWeather> {
    RotationScheduler::new(stations, rotation(), source, StubWeather::reading(None), now).unwrap()
}

/// Cardiff with six platforms (two pages) and Newcastle with two (one page).
fn two_stations() -> Vec<StationConfig> {
    vec![
        station("CDF", "Cardiff Central", &["1", "2", "3", "4", "5", "6"]),
        station("NCL", "Newcastle", &["1", "2"]),
    ]
}

fn busy_source() -> StubSource {
    StubSource::default()
        .with(
            "CDF",
            vec![record("1", "10:00"), record("2", "10:05"), record("5", "10:10")],
        )
        .with("NCL", vec![record("1", "10:02")])
}

#[test]
fn no_stations_rejected() {
    let result = RotationScheduler::new(
        Vec::new(),
        rotation(),
        StubSource::default(),
        StubWeather::reading(None),
        Instant::now(),
    );
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[tokio::test]
async fn first_tick_fetches_first_page() {
    let t0 = Instant::now();
    let mut scheduler = scheduler(two_stations(), busy_source(), t0);

    let outcome = scheduler.tick(t0).await;

    assert_eq!(
        outcome,
        TickOutcome::Refreshed {
            station: crs("CDF"),
            page_index: 0,
            records: 2
        }
    );
    assert_eq!(scheduler.source().requests.len(), 1);
    assert_eq!(scheduler.source().requests[0].1, platforms(&["1", "2", "3", "4"]));
    assert_eq!(scheduler.state().last_fetch, Some(t0));
    assert!(!scheduler.state().refresh_pending);
    assert!(scheduler.displayed_board().is_some());
}

#[tokio::test]
async fn idle_until_update_interval() {
    let t0 = Instant::now();
    let stations = vec![station("NCL", "Newcastle", &["1", "2"])];
    let mut scheduler = scheduler(stations, busy_source(), t0);

    scheduler.tick(t0).await;
    assert_eq!(scheduler.tick(t0 + 29 * SECOND).await, TickOutcome::Idle);
    assert_eq!(scheduler.source().requests.len(), 1);

    assert!(matches!(
        scheduler.tick(t0 + 30 * SECOND).await,
        TickOutcome::Refreshed { .. }
    ));
    assert_eq!(scheduler.source().requests.len(), 2);
}

#[tokio::test]
async fn page_rotation_wraps() {
    let t0 = Instant::now();
    let mut scheduler = scheduler(two_stations(), busy_source(), t0);

    scheduler.tick(t0).await;

    let outcome = scheduler.tick(t0 + 20 * SECOND).await;
    assert_eq!(
        outcome,
        TickOutcome::Refreshed {
            station: crs("CDF"),
            page_index: 1,
            records: 1
        }
    );
    assert_eq!(scheduler.current_page(), platforms(&["5", "6"]).as_slice());

    scheduler.tick(t0 + 40 * SECOND).await;
    assert_eq!(scheduler.state().page_index, 0);
    assert_eq!(scheduler.state().station_index, 0);
}

#[tokio::test]
async fn empty_page_skipped_within_same_tick() {
    let t0 = Instant::now();
    let source = StubSource::default().with("CDF", vec![record("1", "10:00"), record("2", "10:05")]);
    let mut scheduler = scheduler(two_stations(), source, t0);

    scheduler.tick(t0).await;
    let outcome = scheduler.tick(t0 + 20 * SECOND).await;

    assert_eq!(
        outcome,
        TickOutcome::Refreshed {
            station: crs("CDF"),
            page_index: 0,
            records: 2
        }
    );
    // First page, then the empty second page, then the first page again.
    let pages: Vec<&Vec<String>> = scheduler.source().requests.iter().map(|(_, p)| p).collect();
    assert_eq!(pages.len(), 3);
    assert_eq!(*pages[1], platforms(&["5", "6"]));
    assert_eq!(*pages[2], platforms(&["1", "2", "3", "4"]));
    assert!(scheduler.state().cooldown_until.is_none());
}

#[tokio::test]
async fn empty_station_moves_on_after_cooldown() {
    let t0 = Instant::now();
    let source = StubSource::default().with("NCL", vec![record("2", "10:02")]);
    let mut scheduler = scheduler(two_stations(), source, t0);

    let outcome = scheduler.tick(t0).await;
    assert_eq!(outcome, TickOutcome::StationExhausted { station: crs("CDF") });
    assert_eq!(scheduler.source().requests.len(), 2);
    assert_eq!(scheduler.state().station_index, 1);
    assert_eq!(scheduler.state().page_index, 0);
    assert_eq!(scheduler.state().cooldown_until, Some(t0 + 60 * SECOND));
    assert!(scheduler.state().refresh_pending);
    assert!(scheduler.displayed_board().is_none());

    assert_eq!(scheduler.tick(t0 + 10 * SECOND).await, TickOutcome::CoolingDown);
    assert_eq!(scheduler.tick(t0 + 59 * SECOND).await, TickOutcome::CoolingDown);
    assert_eq!(scheduler.source().requests.len(), 2);

    let outcome = scheduler.tick(t0 + 60 * SECOND).await;
    assert_eq!(
        outcome,
        TickOutcome::Refreshed {
            station: crs("NCL"),
            page_index: 0,
            records: 1
        }
    );
    assert!(scheduler.state().cooldown_until.is_none());
}

#[tokio::test]
async fn station_gets_full_slot_after_cooldown() {
    let t0 = Instant::now();
    let source = StubSource::default().with("NCL", vec![record("2", "10:02")]);
    let mut scheduler = scheduler(two_stations(), source, t0);

    scheduler.tick(t0).await;
    scheduler.tick(t0 + 60 * SECOND).await;

    // Newcastle stays up for a whole station interval after the cooldown.
    scheduler.tick(t0 + 119 * SECOND).await;
    assert_eq!(scheduler.state().station_index, 1);

    // Back to (still empty) Cardiff.
    assert_eq!(
        scheduler.tick(t0 + 120 * SECOND).await,
        TickOutcome::StationExhausted { station: crs("CDF") }
    );
}

#[tokio::test]
async fn fetch_errors_count_as_empty_pages() {
    let t0 = Instant::now();
    let source = StubSource {
        failing: true,
        ..busy_source()
    };
    let mut scheduler = scheduler(two_stations(), source, t0);

    let outcome = scheduler.tick(t0).await;

    assert_eq!(outcome, TickOutcome::StationExhausted { station: crs("CDF") });
    assert_eq!(scheduler.source().requests.len(), 2);
}

#[tokio::test]
async fn lone_empty_station_stays_put() {
    let t0 = Instant::now();
    let stations = vec![station("CDF", "Cardiff Central", &["1"])];
    let mut scheduler = scheduler(stations, StubSource::default(), t0);

    assert_eq!(
        scheduler.tick(t0).await,
        TickOutcome::StationExhausted { station: crs("CDF") }
    );
    assert_eq!(scheduler.state().station_index, 0);
}

#[tokio::test]
async fn station_rotation_resets_page() {
    let t0 = Instant::now();
    let mut scheduler = scheduler(two_stations(), busy_source(), t0);

    scheduler.tick(t0).await;
    scheduler.tick(t0 + 20 * SECOND).await;
    assert_eq!(scheduler.state().page_index, 1);

    let outcome = scheduler.tick(t0 + 60 * SECOND).await;

    assert_eq!(
        outcome,
        TickOutcome::Refreshed {
            station: crs("NCL"),
            page_index: 0,
            records: 1
        }
    );
    assert_eq!(scheduler.current_station().name, "Newcastle");
    assert_eq!(scheduler.pages().len(), 1);
}

#[tokio::test]
async fn temperatures_refreshed_on_their_own_interval() {
    let t0 = Instant::now();
    let mut stations = two_stations();
    stations[0].coordinates = Some(Coordinates {
        latitude: 51.48,
        longitude: -3.18,
    });
    let mut scheduler =
        RotationScheduler::new(stations, rotation(), busy_source(), StubWeather::reading(Some(11.6)), t0)
            .unwrap();

    scheduler.tick(t0).await;
    assert_eq!(scheduler.temperature(0), Temperature::Celsius(12));
    assert_eq!(scheduler.temperature(1), Temperature::Unavailable);
    // Only stations with coordinates are looked up.
    assert_eq!(scheduler.weather.requests.get(), 1);

    scheduler.tick(t0 + 599 * SECOND).await;
    assert_eq!(scheduler.weather.requests.get(), 1);

    scheduler.tick(t0 + 600 * SECOND).await;
    assert_eq!(scheduler.weather.requests.get(), 2);
}

#[tokio::test]
async fn temperature_failure_is_unavailable() {
    let t0 = Instant::now();
    let mut stations = two_stations();
    stations[0].coordinates = Some(Coordinates {
        latitude: 51.48,
        longitude: -3.18,
    });
    let mut scheduler = scheduler(stations, busy_source(), t0);

    let outcome = scheduler.tick(t0).await;

    assert!(matches!(outcome, TickOutcome::Refreshed { .. }));
    assert_eq!(scheduler.temperature(0), Temperature::Unavailable);
}

#[tokio::test]
async fn frame_describes_live_page() {
    let t0 = Instant::now();
    let mut scheduler = scheduler(two_stations(), busy_source(), t0);
    let clock = NaiveTime::from_hms_opt(10, 1, 30).unwrap();

    let frame = scheduler.frame(clock);
    assert!(frame.board.is_none());

    scheduler.tick(t0).await;
    let frame = scheduler.frame(clock);

    assert_eq!(frame.station_code, crs("CDF"));
    assert_eq!(frame.station_name, "Cardiff Central");
    assert_eq!(frame.page_index, 0);
    assert_eq!(frame.page_count, 2);
    assert_eq!(frame.page, platforms(&["1", "2", "3", "4"]).as_slice());
    assert_eq!(frame.board.map(Board::record_count), Some(2));
    assert_eq!(frame.temperature, Temperature::Unavailable);
    assert_eq!(frame.clock, clock);
}
