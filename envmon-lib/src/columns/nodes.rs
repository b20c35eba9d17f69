//! Node listings

use super::ACTIONS;
use super::REMOVE;
use super::VIEW;
use super::status_badge;
use crate::api::resources;
use crate::model::Coordinate;
use crate::model::NodeData;
use crate::model::PrivateNode;
use crate::model::SubscribedNode;
use crate::model::format_date;
use crate::model::format_optional_date;
use crate::model::maps_url;
use crate::table::ActionColumn;
use crate::table::Cell;
use crate::table::CellValue;
use crate::table::ColumnSet;
use crate::table::DataColumn;
use crate::table::DisplayColumn;
use crate::table::RowAction;
use crate::table::Tone;

/// Columns of the node listing (`/nodes`).
pub fn nodes_columns() -> ColumnSet<NodeData> {
    ColumnSet::from_static(vec![
        DataColumn::new("name", "Nama", |n: &NodeData| n.name.as_str().into())
            .sortable()
            .into(),
        DataColumn::new("status", "Status", |n: &NodeData| n.status.as_str().into())
            .render(|n: &NodeData, _| status_badge(&n.status))
            .into(),
        DataColumn::new("companyId", "Kepemilikan", |n: &NodeData| n.company_id.into())
            .render(|n: &NodeData, _| match n.is_private() {
                true => Cell::badge("Privat", Tone::Warning),
                false => Cell::badge("Publik", Tone::Info),
            })
            .into(),
        DataColumn::tuple("coordinate", "Koordinat", |n: &NodeData| match n.coordinate {
            Some(c) => vec![c.lat.into(), c.lng.into()],
            None => Vec::new(),
        })
        .render(|_, value| coordinate_link(value))
        .into(),
        DataColumn::new("lastDataSent", "Terakhir data dikirim", |n: &NodeData| {
            n.last_data_sent.into()
        })
        .render(|n: &NodeData, _| Cell::text(format_optional_date(n.last_data_sent.as_ref())))
        .into(),
        ActionColumn::new(ACTIONS, "Aksi", |n: &NodeData| n.node_id)
            .action(view_node(|n: &NodeData| n.node_id))
            .into(),
    ])
}

/// Columns of a company's public node subscriptions.
///
/// `on_remove` receives the subscription id of the row.
pub fn subscribed_nodes_columns(
    on_remove: impl Fn(i64) + Send + Sync + 'static,
) -> ColumnSet<SubscribedNode> {
    ColumnSet::from_static(vec![
        DataColumn::new("name", "Nama", |n: &SubscribedNode| n.name.as_str().into())
            .sortable()
            .into(),
        DataColumn::new("status", "Status", |n: &SubscribedNode| n.status.as_str().into())
            .render(|n: &SubscribedNode, _| status_badge(&n.status))
            .into(),
        DataColumn::new("joinedAt", "Bergabung Pada", |n: &SubscribedNode| n.joined_at.into())
            .sortable()
            .render(|n: &SubscribedNode, _| Cell::text(format_date(&n.joined_at)))
            .into(),
        ActionColumn::new(ACTIONS, "Aksi", |n: &SubscribedNode| n.subscription_id)
            .action(RowAction::handler(REMOVE, "Hapus", on_remove).tone(Tone::Danger))
            .action(view_node(|n: &SubscribedNode| n.node_id))
            .into(),
    ])
}

/// Columns of a company's private nodes.
pub fn private_nodes_columns() -> ColumnSet<PrivateNode> {
    ColumnSet::from_static(vec![
        DataColumn::new("name", "Nama", |n: &PrivateNode| n.name.as_str().into())
            .sortable()
            .into(),
        DataColumn::new("status", "Status", |n: &PrivateNode| n.status.as_str().into())
            .render(|n: &PrivateNode, _| status_badge(&n.status))
            .into(),
        DataColumn::new("createdAt", "Dibuat Pada", |n: &PrivateNode| n.created_at.into())
            .sortable()
            .render(|n: &PrivateNode, _| Cell::text(format_date(&n.created_at)))
            .into(),
        DisplayColumn::new(ACTIONS, "Aksi", |n: &PrivateNode| {
            Cell::link("Lihat Node", resources::node(n.node_id))
        })
        .into(),
    ])
}

fn view_node<R: 'static>(node_id: impl Fn(&R) -> i64 + Send + Sync + 'static) -> RowAction<R> {
    RowAction::navigate(VIEW, "Lihat Node", move |row: &R| resources::node(node_id(row))).tone(Tone::Info)
}

fn coordinate_link(value: &CellValue) -> Cell {
    match (value.float_at(0), value.float_at(1)) {
        (Some(lat), Some(lng)) => Cell::link(format!("{}, {}", lat, lng), maps_url(Coordinate::new(lat, lng))),
        _ => Cell::Empty,
    }
}
