//! Domain types for the departure board.
//!
//! Station codes are validated at construction time; departure records are
//! plain values rebuilt on every fetch.

mod departure;
mod station;

pub use departure::{DepartureRecord, DepartureStatus, PlatformLabel, join_calling_points};
pub use station::{Crs, InvalidCrs};
