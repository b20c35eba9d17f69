//! Map markers mirrored from table rows.
//!
//! A map next to a table subscribes to the table's loaded rows and turns
//! them into markers, so both show the same data from a single fetch.

use super::Coordinate;
use super::NodeData;
use super::PrivateNode;
use super::SubscribedNode;
use crate::config::MAP_CENTER;

/// Rows that can be placed on a map.
pub trait Locatable {
    /// Node shown by the marker.
    fn node_id(&self) -> i64;
    /// Marker tooltip.
    fn label(&self) -> &str;
    /// Position, if the node has one.
    fn coordinate(&self) -> Option<Coordinate>;
}

impl Locatable for NodeData {
    fn node_id(&self) -> i64 {
        self.node_id
    }
    fn label(&self) -> &str {
        &self.name
    }
    fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }
}

impl Locatable for SubscribedNode {
    fn node_id(&self) -> i64 {
        self.node_id
    }
    fn label(&self) -> &str {
        &self.name
    }
    fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }
}

impl Locatable for PrivateNode {
    fn node_id(&self) -> i64 {
        self.node_id
    }
    fn label(&self) -> &str {
        &self.name
    }
    fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }
}

/// A single node marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub node_id: i64,
    pub label: String,
    pub position: Coordinate,
}

impl MapMarker {
    /// Marker for `row`, `None` when it has no coordinate.
    pub fn from_row<R: Locatable>(row: &R) -> Option<Self> {
        Some(Self {
            node_id: row.node_id(),
            label: row.label().to_string(),
            position: row.coordinate()?,
        })
    }
}

/// Markers for every located row, in row order.
pub fn markers<R: Locatable>(rows: &[R]) -> Vec<MapMarker> {
    rows.iter().filter_map(MapMarker::from_row).collect()
}

/// Where to centre a map showing `markers`: their mean position, or
/// [`MAP_CENTER`] when there is nothing to show.
pub fn map_center(markers: &[MapMarker]) -> Coordinate {
    if markers.is_empty() {
        let (lat, lng) = MAP_CENTER;
        return Coordinate::new(lat, lng);
    }
    let n = markers.len() as f64;
    let (lat, lng) = markers.iter().fold((0.0, 0.0), |(lat, lng), m| {
        (lat + m.position.lat, lng + m.position.lng)
    });
    Coordinate::new(lat / n, lng / n)
}
