//! The normalised result of a departure fetch.

use crate::domain::DepartureRecord;

/// Departures for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDepartures {
    pub platform: String,
    pub departures: Vec<DepartureRecord>,
}

/// Departures grouped by platform, in page order.
///
/// Only platforms of the requested page are present and each holds at most
/// `per_platform` departures. Records offered for other platforms, or for a
/// platform that is already full, are turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    platforms: Vec<PlatformDepartures>,
    per_platform: usize,
}

impl Board {
    /// An empty board with a slot for each of `platforms`.
    pub fn for_platforms(platforms: &[String], per_platform: usize) -> Self {
        let mut slots: Vec<PlatformDepartures> = Vec::with_capacity(platforms.len());
        for platform in platforms {
            if slots.iter().all(|slot| &slot.platform != platform) {
                slots.push(PlatformDepartures {
                    platform: platform.clone(),
                    departures: Vec::new(),
                });
            }
        }

        Self {
            platforms: slots,
            per_platform,
        }
    }

    fn slot(&self, platform: &str) -> Option<&PlatformDepartures> {
        self.platforms.iter().find(|slot| slot.platform == platform)
    }

    /// Whether a departure from `platform` would still be accepted.
    pub fn has_room(&self, platform: &str) -> bool {
        self.slot(platform)
            .is_some_and(|slot| slot.departures.len() < self.per_platform)
    }

    /// Add a departure if its platform is on the board and not full.
    ///
    /// Returns whether the record was kept.
    pub fn offer(&mut self, record: DepartureRecord) -> bool {
        let per_platform = self.per_platform;
        match self
            .platforms
            .iter_mut()
            .find(|slot| slot.platform == record.platform)
        {
            Some(slot) if slot.departures.len() < per_platform => {
                slot.departures.push(record);
                true
            }
            _ => false,
        }
    }

    pub fn platforms(&self) -> &[PlatformDepartures] {
        &self.platforms
    }

    /// Departures from one platform, empty if it is not on the board.
    pub fn departures_for(&self, platform: &str) -> &[DepartureRecord] {
        self.slot(platform)
            .map(|slot| slot.departures.as_slice())
            .unwrap_or_default()
    }

    pub fn record_count(&self) -> usize {
        self.platforms.iter().map(|slot| slot.departures.len()).sum()
    }

    /// True when no platform has a departure.
    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }
}
