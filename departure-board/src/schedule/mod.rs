//! When to show what.
//!
//! [`RotationScheduler`] cycles through stations and their platform pages,
//! decides when departures and temperatures are stale, and passes over
//! anything with nothing to show.

mod pages;
mod rotation;

pub use pages::PlatformPages;
pub use rotation::{RotationScheduler, RotationState, TickOutcome};
