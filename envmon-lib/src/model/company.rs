//! Company rows

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Row of a node's company subscribers (`/nodes/{id}/companies`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedCompany {
    pub company_id: i64,
    pub name: String,
    /// Company category, e.g. `industry` or `regular`.
    #[serde(rename = "type")]
    pub company_type: String,
    pub joined_at: DateTime<Utc>,
}
