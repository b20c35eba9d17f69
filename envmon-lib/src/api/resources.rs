//! Resource paths of the monitoring API and the mutations the admin pages use.

use serde_json::json;

use super::Mutation;
use crate::model::Coordinate;

/// Node collection.
pub const NODES: &str = "/nodes";

/// Node counts by ownership and status.
pub const NODES_SUMMARY: &str = "/nodes/summary";

/// Company collection.
pub const COMPANIES: &str = "/companies";

/// A single node.
pub fn node(node_id: i64) -> String {
    format!("{}/{}", NODES, node_id)
}

/// Companies subscribed to a node.
pub fn node_companies(node_id: i64) -> String {
    format!("{}/companies", node(node_id))
}

/// A single company.
pub fn company(company_id: i64) -> String {
    format!("{}/{}", COMPANIES, company_id)
}

/// Public nodes a company subscribes to.
pub fn company_nodes(company_id: i64) -> String {
    format!("{}/nodes", company(company_id))
}

/// Private nodes installed at a company.
pub fn company_private_nodes(company_id: i64) -> String {
    format!("{}/private-nodes", company(company_id))
}

/// Removes a company from a node's subscriber list.
pub fn remove_company_subscription(node_id: i64, company_id: i64) -> Mutation {
    let list = node_companies(node_id);
    Mutation::delete(format!("{}/{}", list, company_id)).invalidates(list)
}

/// Removes a public node from a company's subscriptions.
pub fn remove_node_subscription(company_id: i64, node_id: i64) -> Mutation {
    let list = company_nodes(company_id);
    Mutation::delete(format!("{}/{}", list, node_id)).invalidates(list)
}

/// Moves a company to a new location.
pub fn update_company_coordinate(company_id: i64, coordinate: Coordinate) -> Mutation {
    let path = company(company_id);
    Mutation::patch(
        path.clone(),
        json!({ "coordinate": [coordinate.lat, coordinate.lng] }),
    )
    .invalidates(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(node_companies(42), "/nodes/42/companies");
        assert_eq!(company_nodes(3), "/companies/3/nodes");
        assert_eq!(company_private_nodes(3), "/companies/3/private-nodes");
    }

    #[test]
    fn test_remove_company_subscription_invalidates_list() {
        let op = remove_company_subscription(42, 7);
        assert_eq!(op.path(), "/nodes/42/companies/7");
        assert_eq!(op.invalidated_prefixes(), &["/nodes/42/companies"]);
    }

    #[test]
    fn test_update_coordinate_body() {
        let op = update_company_coordinate(3, Coordinate::new(-7.5, 110.1));
        assert_eq!(op.body().unwrap()["coordinate"], json!([-7.5, 110.1]));
        assert_eq!(op.invalidated_prefixes(), &["/companies/3"]);
    }
}
