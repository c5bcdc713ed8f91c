//! Fixture departure source for running without API access.
//!
//! Reads synthetic departures from a JSON document and serves them as if
//! they were live. The document is re-read on every fetch so it can be
//! edited while the board runs; it is never written to.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::darwin::DarwinError;
use crate::domain::{Crs, DepartureRecord, DepartureStatus, PlatformLabel};

use super::{Board, DepartureSource};

/// One synthetic departure in the fixture document.
#[derive(Debug, Clone, Deserialize)]
struct FixtureEntry {
    platform: PlatformLabel,
    #[serde(default)]
    departure_time: String,
    #[serde(default)]
    destination: String,
    #[serde(default)]
    calling_at: String,
    /// Raw estimate text, classified like Darwin's `etd`.
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    operator: Option<String>,
    /// Restricts the entry to one station; absent means every station.
    #[serde(default)]
    station: Option<String>,
}

impl FixtureEntry {
    fn serves(&self, station: &Crs) -> bool {
        match &self.station {
            None => true,
            Some(code) => Crs::from_config(code).is_ok_and(|crs| &crs == station),
        }
    }

    fn to_record(&self) -> DepartureRecord {
        DepartureRecord {
            departure_time: self.departure_time.clone(),
            destination: self.destination.clone(),
            calling_at: self.calling_at.clone(),
            status: DepartureStatus::from_estimate(self.status.as_deref().unwrap_or("On time")),
            platform: self.platform.0.clone(),
            operator: self.operator.clone(),
        }
    }
}

/// Departure source that serves a JSON fixture.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    path: PathBuf,
    per_platform: usize,
}

impl FixtureSource {
    /// Serve departures from the fixture at `path`, keeping at most
    /// `per_platform` per platform.
    pub fn new(path: impl Into<PathBuf>, per_platform: usize) -> Self {
        Self {
            path: path.into(),
            per_platform,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<FixtureEntry>, String> {
        let json = std::fs::read_to_string(&self.path)
            .map_err(|e| format!("failed to read {:?}: {}", self.path, e))?;
        serde_json::from_str(&json).map_err(|e| format!("failed to parse {:?}: {}", self.path, e))
    }

    /// Group fixture entries for one page. Never fails: an unreadable
    /// fixture gives an empty board.
    pub fn board_for(&self, station: &Crs, platforms: &[String]) -> Board {
        let mut board = Board::for_platforms(platforms, self.per_platform);

        let entries = match self.load() {
            Ok(entries) => entries,
            Err(message) => {
                warn!(station = %station, error = %message, "fixture unavailable, showing no departures");
                return board;
            }
        };

        for entry in entries.iter().filter(|e| e.serves(station)) {
            if board.has_room(&entry.platform.0) {
                board.offer(entry.to_record());
            }
        }

        board
    }
}

impl DepartureSource for FixtureSource {
    async fn fetch(&mut self, station: &Crs, platforms: &[String]) -> Result<Board, DarwinError> {
        Ok(self.board_for(station, platforms))
    }

    fn describe(&self) -> &'static str {
        "fixture"
    }
}
