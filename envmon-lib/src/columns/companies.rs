//! Company listings

use super::ACTIONS;
use super::REMOVE;
use super::VIEW;
use crate::api::resources;
use crate::model::SubscribedCompany;
use crate::model::format_date;
use crate::table::ActionColumn;
use crate::table::Cell;
use crate::table::ColumnSet;
use crate::table::DataColumn;
use crate::table::RowAction;
use crate::table::Tone;

/// Columns of a node's company subscribers.
///
/// `on_remove` receives the company id of the row.
pub fn company_subscriptions_columns(
    on_remove: impl Fn(i64) + Send + Sync + 'static,
) -> ColumnSet<SubscribedCompany> {
    ColumnSet::from_static(vec![
        DataColumn::new("name", "Nama", |c: &SubscribedCompany| c.name.as_str().into())
            .sortable()
            .into(),
        DataColumn::new("type", "Jenis", |c: &SubscribedCompany| c.company_type.as_str().into())
            .sortable()
            .render(|c: &SubscribedCompany, _| Cell::badge(company_type_label(&c.company_type), Tone::Info))
            .into(),
        DataColumn::new("joinedAt", "Berlangganan sejak", |c: &SubscribedCompany| c.joined_at.into())
            .sortable()
            .render(|c: &SubscribedCompany, _| Cell::text(format_date(&c.joined_at)))
            .into(),
        ActionColumn::new(ACTIONS, "Aksi", |c: &SubscribedCompany| c.company_id)
            .action(RowAction::handler(REMOVE, "Hapus", on_remove).tone(Tone::Danger))
            .action(
                RowAction::navigate(VIEW, "Lihat Perusahaan", |c: &SubscribedCompany| {
                    resources::company(c.company_id)
                })
                .tone(Tone::Info),
            )
            .into(),
    ])
}

fn company_type_label(company_type: &str) -> &str {
    match company_type {
        "industry" => "Industri",
        "regular" => "Umum",
        other => other,
    }
}
