//! Ambient temperature shown beside the clock.
//!
//! Best effort only: any failure shows as [`Temperature::Unavailable`].

mod client;
mod error;

pub use client::{DEFAULT_BASE_URL, WeatherClient, WeatherConfig};
pub use error::WeatherError;

use std::fmt;

/// Something that can report the current temperature at a location.
#[allow(async_fn_in_trait)]
pub trait TemperatureSource {
    /// Current temperature in degrees Celsius.
    async fn current_temperature(&self, latitude: f64, longitude: f64)
    -> Result<f64, WeatherError>;
}

/// Temperature as displayed on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Temperature {
    /// Whole degrees Celsius.
    Celsius(i32),
    #[default]
    Unavailable,
}

impl Temperature {
    /// Round a reading to the whole degrees shown on the board.
    pub fn from_reading(celsius: f64) -> Self {
        if celsius.is_finite() {
            Temperature::Celsius(celsius.round() as i32)
        } else {
            Temperature::Unavailable
        }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temperature::Celsius(c) => write!(f, "{c}°C"),
            Temperature::Unavailable => f.write_str("N/A"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_whole_degrees() {
        assert_eq!(Temperature::from_reading(12.4), Temperature::Celsius(12));
        assert_eq!(Temperature::from_reading(12.5), Temperature::Celsius(13));
        assert_eq!(Temperature::from_reading(-0.6), Temperature::Celsius(-1));
    }

    #[test]
    fn non_finite_reading_is_unavailable() {
        assert_eq!(Temperature::from_reading(f64::NAN), Temperature::Unavailable);
    }

    #[test]
    fn display() {
        assert_eq!(Temperature::Celsius(7).to_string(), "7°C");
        assert_eq!(Temperature::Celsius(-3).to_string(), "-3°C");
        assert_eq!(Temperature::Unavailable.to_string(), "N/A");
        assert_eq!(Temperature::default(), Temperature::Unavailable);
    }
}
