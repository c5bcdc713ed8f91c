//! Conversion from Darwin DTOs to board records.

use crate::domain::{DepartureRecord, DepartureStatus};

use super::types::{ServiceDetails, ServiceItem};

/// Destination shown when Darwin gives none.
const UNKNOWN_DESTINATION: &str = "Unknown";

/// Convert a board service into a departure record.
///
/// `calling_at` is resolved separately (see [`calling_points_from_details`])
/// because the plain departure board does not carry calling points.
pub fn departure_from_service(item: &ServiceItem, calling_at: String) -> DepartureRecord {
    DepartureRecord {
        departure_time: item.std.clone().unwrap_or_default(),
        destination: parse_destination(item),
        calling_at,
        status: DepartureStatus::from_estimate(item.etd.as_deref().unwrap_or_default()),
        platform: item.platform.clone().unwrap_or_default(),
        operator: item.operator.clone().filter(|op| !op.is_empty()),
    }
}

/// Names of the stops after the board station.
///
/// Only the first calling point list is used; for a dividing train that is
/// the portion the board's destination refers to.
pub fn calling_points_from_details(details: &ServiceDetails) -> Vec<String> {
    details
        .subsequent_calling_points
        .as_deref()
        .and_then(|lists| lists.first())
        .map(|list| {
            list.calling_point
                .iter()
                .filter_map(|cp| cp.location_name.clone())
                .collect()
        })
        .unwrap_or_default()
}

/// Extract the destination name, joining multiple destinations.
fn parse_destination(item: &ServiceItem) -> String {
    let names: Vec<&str> = item
        .destination
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(|d| d.location_name.as_deref())
        .collect();

    if names.is_empty() {
        UNKNOWN_DESTINATION.to_string()
    } else {
        // Multiple destinations (dividing service)
        names.join(" & ")
    }
}
