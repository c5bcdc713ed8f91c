//! Departure records as shown on the board.

use std::fmt;

use serde::Deserialize;

/// A platform identifier as written in config and fixture documents.
///
/// Platforms are labels, not numbers ("3", "3A", "0"), but documents often
/// write them as bare integers. Both forms deserialize to the same label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "PlatformRepr")]
pub struct PlatformLabel(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum PlatformRepr {
    Number(u64),
    Text(String),
}

impl From<PlatformRepr> for PlatformLabel {
    fn from(repr: PlatformRepr) -> Self {
        match repr {
            PlatformRepr::Number(n) => PlatformLabel(n.to_string()),
            PlatformRepr::Text(s) => PlatformLabel(s.trim().to_string()),
        }
    }
}

impl From<PlatformLabel> for String {
    fn from(label: PlatformLabel) -> Self {
        label.0
    }
}

/// Expected-departure status of a service.
///
/// Derived from Darwin's free-text estimate (`etd`) by
/// [`DepartureStatus::from_estimate`]. Anything other than
/// [`DepartureStatus::OnTime`] is highlighted on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepartureStatus {
    OnTime,
    /// Running late with a known estimate (the trimmed raw text, e.g. "18:42").
    ExpectedAt(String),
    /// Delayed, cancelled, or anything else without a usable estimate.
    ExpectedUnknown,
}

impl DepartureStatus {
    /// Classify a raw estimate string.
    ///
    /// The comparison is made on the trimmed, lowercased text:
    /// - exactly `on time` is [`OnTime`](Self::OnTime)
    /// - a time of day (contains `:`) or text starting with `exp` is
    ///   [`ExpectedAt`](Self::ExpectedAt), keeping the trimmed raw text
    /// - everything else is [`ExpectedUnknown`](Self::ExpectedUnknown)
    ///
    /// ```
    /// use departure_board::domain::DepartureStatus;
    ///
    /// assert_eq!(DepartureStatus::from_estimate("On Time"), DepartureStatus::OnTime);
    /// assert_eq!(
    ///     DepartureStatus::from_estimate("18:42"),
    ///     DepartureStatus::ExpectedAt("18:42".to_string())
    /// );
    /// assert_eq!(DepartureStatus::from_estimate("delayed"), DepartureStatus::ExpectedUnknown);
    /// ```
    pub fn from_estimate(raw: &str) -> Self {
        let trimmed = raw.trim();
        let normalised = trimmed.to_lowercase();

        if normalised == "on time" {
            DepartureStatus::OnTime
        } else if normalised.contains(':') || normalised.starts_with("exp") {
            DepartureStatus::ExpectedAt(trimmed.to_string())
        } else {
            DepartureStatus::ExpectedUnknown
        }
    }

    /// Whether the board should draw this status in the alert colour.
    pub fn is_alert(&self) -> bool {
        !matches!(self, DepartureStatus::OnTime)
    }
}

impl fmt::Display for DepartureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepartureStatus::OnTime => f.write_str("On time"),
            DepartureStatus::ExpectedAt(estimate) => {
                if estimate.to_lowercase().starts_with("exp") {
                    f.write_str(estimate)
                } else {
                    write!(f, "Exp {estimate}")
                }
            }
            DepartureStatus::ExpectedUnknown => f.write_str("Exp unknown"),
        }
    }
}

/// One row of the departure board.
///
/// Built fresh on every fetch and replaced wholesale by the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureRecord {
    /// Scheduled departure, "HH:MM". Blank when Darwin omits it.
    pub departure_time: String,
    pub destination: String,
    /// Subsequent calling points joined with ", ". Empty when unknown.
    pub calling_at: String,
    pub status: DepartureStatus,
    pub platform: String,
    pub operator: Option<String>,
}

impl DepartureRecord {
    pub fn has_calling_points(&self) -> bool {
        !self.calling_at.is_empty()
    }
}

/// Join calling point names into the single line scrolled under a departure.
pub fn join_calling_points<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
