//! Darwin API response DTOs.
//!
//! These types map directly to the Darwin LDB JSON API responses. Darwin
//! omits fields rather than sending nulls, so every field is optional or
//! defaulted and conversion code never probes for presence at runtime.

use serde::Deserialize;

/// Response from `GetDepartureBoard`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StationBoard {
    /// When this response was generated (ISO 8601 datetime).
    pub generated_at: Option<String>,

    /// Human-readable name of the station.
    pub location_name: Option<String>,

    /// CRS code of the station.
    pub crs: Option<String>,

    /// Train services at this station. Absent when nothing is running.
    pub train_services: Option<Vec<ServiceItem>>,

    /// Whether platform information is available at this station.
    pub platform_available: Option<bool>,

    /// Whether services are available (false during disruption).
    pub are_services_available: Option<bool>,
}

impl StationBoard {
    /// Train services, or an empty slice when Darwin sent none.
    pub fn services(&self) -> &[ServiceItem] {
        self.train_services.as_deref().unwrap_or(&[])
    }
}

/// A service on the departure board.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceItem {
    /// Ephemeral Darwin service ID. Only valid while on the departure board.
    #[serde(rename = "serviceID")]
    pub service_id: Option<String>,

    /// Scheduled time of departure from this station.
    pub std: Option<String>,

    /// Estimated time of departure from this station.
    /// May be "On time", "Delayed", "Cancelled", or a time like "10:15".
    pub etd: Option<String>,

    /// Platform number/letter.
    pub platform: Option<String>,

    /// Train operating company name.
    pub operator: Option<String>,

    /// Train operating company ATOC code.
    pub operator_code: Option<String>,

    /// Whether this service is cancelled.
    pub is_cancelled: Option<bool>,

    /// Destination station(s). More than one for services that divide.
    pub destination: Option<Vec<ServiceLocation>>,
}

/// Response from `GetServiceDetails`.
///
/// Note: This endpoint only works while the service is on a departure board
/// (~2 minutes after expected departure).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceDetails {
    pub generated_at: Option<String>,

    /// Station name where this detail request originated.
    pub location_name: Option<String>,

    pub crs: Option<String>,

    pub operator: Option<String>,

    pub platform: Option<String>,

    pub std: Option<String>,

    pub etd: Option<String>,

    /// Subsequent calling points (stations still to visit).
    pub subsequent_calling_points: Option<Vec<ArrayOfCallingPoints>>,
}

/// Wrapper for a list of calling points.
///
/// Darwin wraps calling points in this structure to support split/join services,
/// where multiple arrays represent different portions of a train.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArrayOfCallingPoints {
    pub calling_point: Vec<CallingPoint>,

    /// Whether a change of service is required at the split point.
    pub service_change_required: Option<bool>,
}

/// A single calling point (station stop).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallingPoint {
    pub location_name: Option<String>,

    pub crs: Option<String>,

    /// Scheduled time.
    pub st: Option<String>,

    /// Estimated time.
    pub et: Option<String>,

    pub is_cancelled: Option<bool>,
}

/// Origin or destination location.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceLocation {
    pub location_name: Option<String>,

    pub crs: Option<String>,

    /// "via" text (e.g., "via Bristol Parkway").
    pub via: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_station_board() {
        let json = r#"{
            "generatedAt": "2025-03-15T10:30:00Z",
            "locationName": "Cardiff Central",
            "crs": "CDF",
            "platformAvailable": true,
            "trainServices": [
                {
                    "serviceID": "abc123",
                    "std": "10:45",
                    "etd": "On time",
                    "platform": "1",
                    "operator": "Great Western Railway",
                    "operatorCode": "GW",
                    "destination": [
                        {"locationName": "London Paddington", "crs": "PAD"}
                    ]
                }
            ]
        }"#;

        let board: StationBoard = serde_json::from_str(json).unwrap();

        assert_eq!(board.location_name.as_deref(), Some("Cardiff Central"));
        assert_eq!(board.crs.as_deref(), Some("CDF"));
        assert_eq!(board.platform_available, Some(true));

        let services = board.services();
        assert_eq!(services.len(), 1);

        let service = &services[0];
        assert_eq!(service.service_id.as_deref(), Some("abc123"));
        assert_eq!(service.std.as_deref(), Some("10:45"));
        assert_eq!(service.etd.as_deref(), Some("On time"));
        assert_eq!(service.platform.as_deref(), Some("1"));

        let dest = service.destination.as_ref().unwrap();
        assert_eq!(dest[0].location_name.as_deref(), Some("London Paddington"));
    }

    #[test]
    fn board_without_services() {
        let json = r#"{"locationName": "Cardiff Central", "crs": "CDF"}"#;
        let board: StationBoard = serde_json::from_str(json).unwrap();
        assert!(board.train_services.is_none());
        assert!(board.services().is_empty());
    }

    #[test]
    fn service_with_missing_fields_uses_defaults() {
        let json = r#"{"serviceID": "xyz789", "etd": "Cancelled", "isCancelled": true}"#;
        let service: ServiceItem = serde_json::from_str(json).unwrap();

        assert_eq!(service.is_cancelled, Some(true));
        assert!(service.std.is_none());
        assert!(service.platform.is_none());
        assert!(service.destination.is_none());
    }

    #[test]
    fn deserialize_service_details() {
        let json = r#"{
            "generatedAt": "2025-03-15T10:30:00Z",
            "locationName": "Cardiff Central",
            "crs": "CDF",
            "operator": "Transport for Wales",
            "platform": "7",
            "std": "10:27",
            "etd": "On time",
            "previousCallingPoints": [
                {"callingPoint": [{"locationName": "Swansea", "crs": "SWA", "st": "09:30"}]}
            ],
            "subsequentCallingPoints": [
                {
                    "callingPoint": [
                        {"locationName": "Newport", "crs": "NWP", "st": "10:52"},
                        {"locationName": "Bristol Parkway", "crs": "BPW", "st": "11:30"}
                    ]
                }
            ]
        }"#;

        let details: ServiceDetails = serde_json::from_str(json).unwrap();

        assert_eq!(details.operator.as_deref(), Some("Transport for Wales"));

        let subseq = details.subsequent_calling_points.as_ref().unwrap();
        assert_eq!(subseq[0].calling_point.len(), 2);
        assert_eq!(
            subseq[0].calling_point[0].location_name.as_deref(),
            Some("Newport")
        );
    }

    #[test]
    fn calling_point_without_name() {
        let cp: CallingPoint = serde_json::from_str(r#"{"crs": "NWP"}"#).unwrap();
        assert!(cp.location_name.is_none());
        assert_eq!(cp.crs.as_deref(), Some("NWP"));
    }
}
