//! Departure data sources.
//!
//! A source answers one question: what departs from these platforms of this
//! station? Two implementations exist:
//! - [`FixtureSource`] reads synthetic departures from a JSON document
//! - [`LiveSource`] queries Darwin and resolves calling points through the
//!   service-detail cache
//!
//! Both return a [`Board`] holding only the requested platforms, in the
//! requested order, with at most a fixed number of departures per platform.

mod board;
mod fixture;
mod live;

pub use board::{Board, PlatformDepartures};
pub use fixture::FixtureSource;
pub use live::{LiveSource, LiveSourceConfig};

use crate::darwin::{DarwinClient, DarwinError};
use crate::domain::Crs;

/// Something the scheduler can ask for departures.
#[allow(async_fn_in_trait)]
pub trait DepartureSource {
    /// Departures from `platforms` at `station`.
    ///
    /// An error means the remote service could not answer; the caller
    /// decides how to degrade.
    async fn fetch(&mut self, station: &Crs, platforms: &[String]) -> Result<Board, DarwinError>;

    /// Short name for log lines.
    fn describe(&self) -> &'static str;
}

/// The source chosen at startup.
pub enum DepartureFeed {
    Fixture(FixtureSource),
    Live(LiveSource<DarwinClient>),
}

impl DepartureSource for DepartureFeed {
    async fn fetch(&mut self, station: &Crs, platforms: &[String]) -> Result<Board, DarwinError> {
        match self {
            DepartureFeed::Fixture(source) => source.fetch(station, platforms).await,
            DepartureFeed::Live(source) => source.fetch(station, platforms).await,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            DepartureFeed::Fixture(source) => source.describe(),
            DepartureFeed::Live(source) => source.describe(),
        }
    }
}
