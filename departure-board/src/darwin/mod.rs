//! Darwin LDB (Live Departure Boards) client.
//!
//! This module provides an HTTP client for the National Rail Darwin API,
//! which provides real-time train departure information.
//!
//! Key characteristics of Darwin:
//! - Service IDs are **ephemeral** - only valid while the service appears
//!   on a departure board (~2 minutes after expected departure)
//! - Times are in "HH:MM" format (UK local time)
//! - `GetDepartureBoard` does not include calling points; they come from a
//!   separate `GetServiceDetails` request per service

mod client;
mod convert;
mod error;
mod types;

pub use client::{DEFAULT_BASE_URL, DarwinApi, DarwinClient, DarwinConfig, MAX_ROWS};
pub use convert::{calling_points_from_details, departure_from_service};
pub use error::DarwinError;
pub use types::{
    ArrayOfCallingPoints, CallingPoint, ServiceDetails, ServiceItem, ServiceLocation,
    StationBoard,
};
