//! Node rows

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// A latitude/longitude pair, serialized as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Creates a coordinate.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lat, c.lng]
    }
}

/// Operational status of a monitoring node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeStatus {
    Active,
    Nonactive,
    /// A status this client does not know about.
    Other(String),
}

impl NodeStatus {
    /// Wire value.
    pub fn as_str(&self) -> &str {
        match self {
            NodeStatus::Active => "active",
            NodeStatus::Nonactive => "nonactive",
            NodeStatus::Other(s) => s,
        }
    }

    /// Display label.
    pub fn label(&self) -> &str {
        match self {
            NodeStatus::Active => "Aktif",
            NodeStatus::Nonactive => "Nonaktif",
            NodeStatus::Other(s) => s,
        }
    }
}

impl From<String> for NodeStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "active" => NodeStatus::Active,
            "nonactive" => NodeStatus::Nonactive,
            _ => NodeStatus::Other(value),
        }
    }
}

impl From<NodeStatus> for String {
    fn from(status: NodeStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Row of the node listing (`/nodes`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub node_id: i64,
    pub name: String,
    pub status: NodeStatus,
    /// Owning company for private nodes; `None` for public nodes.
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
    #[serde(default)]
    pub last_data_sent: Option<DateTime<Utc>>,
}

impl NodeData {
    /// Returns `true` for nodes owned by a company.
    pub fn is_private(&self) -> bool {
        self.company_id.is_some()
    }
}

/// Row of a company's public node subscriptions (`/companies/{id}/nodes`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedNode {
    pub subscription_id: i64,
    pub node_id: i64,
    pub name: String,
    pub status: NodeStatus,
    pub joined_at: DateTime<Utc>,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
}

/// Row of a company's private nodes (`/companies/{id}/private-nodes`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateNode {
    pub node_id: i64,
    pub name: String,
    pub status: NodeStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
}

/// One bucket of a summary breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountBucket {
    pub value: String,
    pub count: u64,
}

/// Node counts shown above the node listing (`/nodes/summary`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodesSummary {
    pub all: u64,
    #[serde(default)]
    pub ownership: Vec<CountBucket>,
    #[serde(default)]
    pub status: Vec<CountBucket>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_data_from_json() {
        let node: NodeData = serde_json::from_str(
            r#"{
                "nodeId": 4,
                "name": "Sensor Kali Progo",
                "status": "active",
                "companyId": null,
                "coordinate": [-7.51, 110.08],
                "lastDataSent": "2024-03-01T10:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(node.node_id, 4);
        assert_eq!(node.status, NodeStatus::Active);
        assert!(!node.is_private());
        assert_eq!(node.coordinate, Some(Coordinate::new(-7.51, 110.08)));
    }

    #[test]
    fn test_unknown_status_round_trips() {
        let status: NodeStatus = serde_json::from_str("\"maintenance\"").unwrap();
        assert_eq!(status, NodeStatus::Other("maintenance".to_string()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"maintenance\"");
    }

    #[test]
    fn test_summary_from_json() {
        let summary: NodesSummary = serde_json::from_str(
            r#"{"all":7,"ownership":[{"value":"public","count":5}],"status":[]}"#,
        )
        .unwrap();
        assert_eq!(summary.all, 7);
        assert_eq!(summary.ownership[0].count, 5);
    }
}
