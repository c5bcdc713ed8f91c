//! Board configuration.
//!
//! Loaded once at startup from a JSON document with SCREAMING_SNAKE_CASE
//! keys. `STATIONS` is either a list of station objects carrying a `CODE`, or
//! an object keyed by station code; either way display order is document
//! order.
//! Anything missing or malformed is fatal: the caller reports the error and
//! a sample document is written next to the requested path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::darwin::{self, MAX_ROWS};
use crate::domain::{Crs, PlatformLabel};
use crate::weather;

/// Environment variable that overrides `API_KEY`.
pub const API_KEY_ENV: &str = "DARWIN_API_KEY";

/// File name of the generated sample, written beside the config path.
pub const SAMPLE_FILE_NAME: &str = "config.sample.json";

const DEFAULT_STATION_ROTATE_SECS: u64 = 60;
const DEFAULT_SCREEN_ROTATE_SECS: u64 = 20;
const DEFAULT_UPDATE_SECS: u64 = 30;
const DEFAULT_TEMPERATURE_SECS: u64 = 600;
const DEFAULT_SERVICE_DETAILS_TTL_SECS: u64 = 600;
const DEFAULT_NO_DEPARTURES_COOLDOWN_SECS: u64 = 60;
const DEFAULT_PLATFORMS_PER_SCREEN: usize = 4;
const DEFAULT_DEPARTURES_PER_PLATFORM: usize = 2;
const DEFAULT_NUM_ROWS: u8 = 6;
const DEFAULT_FIXTURE_PATH: &str = "data/test_data.json";

/// Errors loading or validating the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file {path:?} not found")]
    NotFound { path: PathBuf },

    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("missing required key {0}")]
    MissingKey(&'static str),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Latitude/longitude used for the temperature lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One station the board rotates through.
#[derive(Debug, Clone, PartialEq)]
pub struct StationConfig {
    pub code: Crs,
    pub name: String,
    /// Platforms in display order.
    pub platforms: Vec<String>,
    pub coordinates: Option<Coordinates>,
}

/// Timers and pagination for the rotation scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationConfig {
    pub station_rotate: Duration,
    pub screen_rotate: Duration,
    pub update: Duration,
    pub temperature: Duration,
    /// Pause after a station turned out to have no departures on any page.
    pub no_departures_cooldown: Duration,
    pub platforms_per_screen: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            station_rotate: Duration::from_secs(DEFAULT_STATION_ROTATE_SECS),
            screen_rotate: Duration::from_secs(DEFAULT_SCREEN_ROTATE_SECS),
            update: Duration::from_secs(DEFAULT_UPDATE_SECS),
            temperature: Duration::from_secs(DEFAULT_TEMPERATURE_SECS),
            no_departures_cooldown: Duration::from_secs(DEFAULT_NO_DEPARTURES_COOLDOWN_SECS),
            platforms_per_screen: DEFAULT_PLATFORMS_PER_SCREEN,
        }
    }
}

/// Settings consumed by graphical renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub fullscreen: bool,
    /// Draw the board upside down, for screens mounted inverted.
    pub rotate_display: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 480,
            fullscreen: false,
            rotate_display: false,
        }
    }
}

/// Validated board configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub stations: Vec<StationConfig>,
    pub rotation: RotationConfig,
    pub service_details_ttl: Duration,
    pub departures_per_platform: usize,
    pub num_rows: u8,
    pub fetch_calling_points: bool,
    pub test_mode: bool,
    pub fixture_path: PathBuf,
    pub darwin_base_url: String,
    pub weather_base_url: String,
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct RawConfig {
    api_key: Option<String>,
    stations: Option<RawStations>,
    station_rotate_interval: Option<u64>,
    screen_rotate_interval: Option<u64>,
    update_interval: Option<u64>,
    temperature_interval: Option<u64>,
    service_details_ttl: Option<u64>,
    no_departures_cooldown: Option<u64>,
    platforms_per_screen: Option<usize>,
    departures_per_platform: Option<usize>,
    num_rows: Option<u8>,
    fetch_calling_points: Option<bool>,
    test_mode: Option<bool>,
    fixture_path: Option<PathBuf>,
    darwin_base_url: Option<String>,
    weather_base_url: Option<String>,
    window_width: Option<u32>,
    window_height: Option<u32>,
    fullscreen: Option<bool>,
    rotate_display: Option<bool>,
}

/// `STATIONS` as a list, or as an object keyed by station code.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawStations {
    List(Vec<RawStation>),
    ByCode(serde_json::Map<String, serde_json::Value>),
}

impl RawStations {
    /// Flatten to a list in document order. Keyed entries take their code
    /// from the key.
    fn into_list(self) -> Result<Vec<RawStation>, ConfigError> {
        match self {
            RawStations::List(stations) => Ok(stations),
            RawStations::ByCode(map) => map
                .into_iter()
                .map(|(code, value)| -> Result<RawStation, ConfigError> {
                    let mut station: RawStation = serde_json::from_value(value)?;
                    station.code = Some(code);
                    Ok(station)
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct RawStation {
    code: Option<String>,
    name: Option<String>,
    platforms: Option<Vec<PlatformLabel>>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl AppConfig {
    /// Read and validate the config file at `path`.
    ///
    /// `DARWIN_API_KEY`, when set and non-empty, replaces `API_KEY`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let env_key = std::env::var(API_KEY_ENV).ok();
        Self::parse(&json, env_key)
    }

    /// Parse and validate a config document.
    pub fn parse(json: &str, env_api_key: Option<String>) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json)?;

        let stations = validate_stations(
            raw.stations
                .ok_or(ConfigError::MissingKey("STATIONS"))?
                .into_list()?,
        )?;

        let test_mode = raw.test_mode.unwrap_or(true);
        let api_key = env_api_key
            .or(raw.api_key)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        if !test_mode && api_key.is_none() {
            return Err(ConfigError::MissingKey("API_KEY"));
        }

        let rotation = RotationConfig {
            station_rotate: seconds(
                "STATION_ROTATE_INTERVAL",
                raw.station_rotate_interval,
                DEFAULT_STATION_ROTATE_SECS,
            )?,
            screen_rotate: seconds(
                "SCREEN_ROTATE_INTERVAL",
                raw.screen_rotate_interval,
                DEFAULT_SCREEN_ROTATE_SECS,
            )?,
            update: seconds("UPDATE_INTERVAL", raw.update_interval, DEFAULT_UPDATE_SECS)?,
            temperature: seconds(
                "TEMPERATURE_INTERVAL",
                raw.temperature_interval,
                DEFAULT_TEMPERATURE_SECS,
            )?,
            no_departures_cooldown: seconds(
                "NO_DEPARTURES_COOLDOWN",
                raw.no_departures_cooldown,
                DEFAULT_NO_DEPARTURES_COOLDOWN_SECS,
            )?,
            platforms_per_screen: positive(
                "PLATFORMS_PER_SCREEN",
                raw.platforms_per_screen,
                DEFAULT_PLATFORMS_PER_SCREEN,
            )?,
        };

        let num_rows = raw.num_rows.unwrap_or(DEFAULT_NUM_ROWS);
        if num_rows == 0 || num_rows > MAX_ROWS {
            return Err(ConfigError::Invalid(format!(
                "NUM_ROWS must be between 1 and {MAX_ROWS}, got {num_rows}"
            )));
        }

        let defaults = DisplayConfig::default();

        Ok(Self {
            api_key,
            stations,
            rotation,
            service_details_ttl: seconds(
                "SERVICE_DETAILS_TTL",
                raw.service_details_ttl,
                DEFAULT_SERVICE_DETAILS_TTL_SECS,
            )?,
            departures_per_platform: positive(
                "DEPARTURES_PER_PLATFORM",
                raw.departures_per_platform,
                DEFAULT_DEPARTURES_PER_PLATFORM,
            )?,
            num_rows,
            fetch_calling_points: raw.fetch_calling_points.unwrap_or(true),
            test_mode,
            fixture_path: raw
                .fixture_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FIXTURE_PATH)),
            darwin_base_url: raw
                .darwin_base_url
                .unwrap_or_else(|| darwin::DEFAULT_BASE_URL.to_string()),
            weather_base_url: raw
                .weather_base_url
                .unwrap_or_else(|| weather::DEFAULT_BASE_URL.to_string()),
            display: DisplayConfig {
                window_width: raw.window_width.unwrap_or(defaults.window_width),
                window_height: raw.window_height.unwrap_or(defaults.window_height),
                fullscreen: raw.fullscreen.unwrap_or(defaults.fullscreen),
                rotate_display: raw.rotate_display.unwrap_or(defaults.rotate_display),
            },
        })
    }
}

fn seconds(key: &str, value: Option<u64>, default: u64) -> Result<Duration, ConfigError> {
    match value.unwrap_or(default) {
        0 => Err(ConfigError::Invalid(format!("{key} must be at least 1 second"))),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn positive(key: &str, value: Option<usize>, default: usize) -> Result<usize, ConfigError> {
    match value.unwrap_or(default) {
        0 => Err(ConfigError::Invalid(format!("{key} must be at least 1"))),
        n => Ok(n),
    }
}

fn validate_stations(raw: Vec<RawStation>) -> Result<Vec<StationConfig>, ConfigError> {
    if raw.is_empty() {
        return Err(ConfigError::Invalid("STATIONS must not be empty".to_string()));
    }

    let mut stations: Vec<StationConfig> = Vec::with_capacity(raw.len());

    for (index, station) in raw.into_iter().enumerate() {
        let code = station.code.ok_or(ConfigError::MissingKey("STATIONS[].CODE"))?;
        let code = Crs::from_config(&code)
            .map_err(|e| ConfigError::Invalid(format!("station {}: {}", index + 1, e)))?;

        if stations.iter().any(|s| s.code == code) {
            return Err(ConfigError::Invalid(format!(
                "station {code} is listed more than once"
            )));
        }

        let platforms: Vec<String> = station
            .platforms
            .ok_or(ConfigError::MissingKey("STATIONS[].PLATFORMS"))?
            .into_iter()
            .map(String::from)
            .collect();

        if platforms.is_empty() || platforms.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "station {code} needs at least one platform and no blank platforms"
            )));
        }
        if let Some(dup) = platforms
            .iter()
            .enumerate()
            .find_map(|(i, p)| platforms[..i].contains(p).then_some(p))
        {
            return Err(ConfigError::Invalid(format!(
                "station {code} lists platform {dup} more than once"
            )));
        }

        let coordinates = match (station.latitude, station.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "station {code} needs both LATITUDE and LONGITUDE, or neither"
                )));
            }
        };

        let name = station
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| code.to_string());

        stations.push(StationConfig {
            code,
            name,
            platforms,
            coordinates,
        });
    }

    Ok(stations)
}

/// A complete, valid config document to start from.
pub fn sample_document() -> serde_json::Value {
    json!({
        "API_KEY": "YOUR_API_KEY_HERE",
        "STATIONS": [
            {
                "CODE": "CDF",
                "NAME": "Cardiff Central",
                "PLATFORMS": [0, 1, 2, 3, 4, 5],
                "LATITUDE": 51.48,
                "LONGITUDE": -3.18
            },
            {
                "CODE": "NCL",
                "NAME": "Newcastle",
                "PLATFORMS": [1, 2, 3, 4, 5, 6],
                "LATITUDE": 54.97,
                "LONGITUDE": -1.62
            }
        ],
        "STATION_ROTATE_INTERVAL": DEFAULT_STATION_ROTATE_SECS,
        "PLATFORMS_PER_SCREEN": DEFAULT_PLATFORMS_PER_SCREEN,
        "SCREEN_ROTATE_INTERVAL": DEFAULT_SCREEN_ROTATE_SECS,
        "UPDATE_INTERVAL": DEFAULT_UPDATE_SECS,
        "TEMPERATURE_INTERVAL": DEFAULT_TEMPERATURE_SECS,
        "SERVICE_DETAILS_TTL": DEFAULT_SERVICE_DETAILS_TTL_SECS,
        "NO_DEPARTURES_COOLDOWN": DEFAULT_NO_DEPARTURES_COOLDOWN_SECS,
        "DEPARTURES_PER_PLATFORM": DEFAULT_DEPARTURES_PER_PLATFORM,
        "NUM_ROWS": DEFAULT_NUM_ROWS,
        "FETCH_CALLING_POINTS": true,
        "TEST_MODE": true,
        "FIXTURE_PATH": DEFAULT_FIXTURE_PATH,
        "ROTATE_DISPLAY": false,
        "FULLSCREEN": false,
        "WINDOW_WIDTH": 800,
        "WINDOW_HEIGHT": 480
    })
}

/// Where the sample document goes for a given config path.
pub fn sample_path_for(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(SAMPLE_FILE_NAME),
        _ => PathBuf::from(SAMPLE_FILE_NAME),
    }
}

/// Write the sample document to `path`.
pub fn write_sample(path: &Path) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(&sample_document())?;
    std::fs::write(path, json + "\n").map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
