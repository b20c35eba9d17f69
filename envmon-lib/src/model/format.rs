//! Cell formatting helpers shared by the column factories.

use chrono::DateTime;
use chrono::Utc;

use super::Coordinate;

/// Formats a timestamp the way the listings show dates, e.g. `01 Mar 2024 10:00`.
pub fn format_date(value: &DateTime<Utc>) -> String {
    value.format("%d %b %Y %H:%M").to_string()
}

/// Formats an optional timestamp, `-` when absent.
pub fn format_optional_date(value: Option<&DateTime<Utc>>) -> String {
    value.map(format_date).unwrap_or_else(|| "-".to_string())
}

/// Google Maps link for a coordinate.
pub fn maps_url(coordinate: Coordinate) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={},{}",
        coordinate.lat, coordinate.lng
    )
}
