//! Render-ready snapshot of a table.

use super::Cell;
use crate::api::query::SortOrder;
use crate::error::TableError;

/// Everything a frontend needs to draw a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub headers: Vec<HeaderCell>,
    pub body: TableBody,
    /// `None` when pagination is hidden or there is nothing to page through.
    pub pager: Option<Pager>,
}

impl TableView {
    /// Rendered rows, including stale rows shown while loading or failed.
    pub fn rows(&self) -> &[Vec<Cell>] {
        match &self.body {
            TableBody::Idle | TableBody::Empty { .. } => &[],
            TableBody::Loading { rows } | TableBody::Rows(rows) | TableBody::Error { rows, .. } => rows,
        }
    }
}

/// A column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub id: String,
    pub label: String,
    /// Whether the header offers a sort affordance.
    pub sortable: bool,
    /// Current direction when this column is the active sort field.
    pub sorted: Option<SortOrder>,
}

/// The table body.
#[derive(Debug, Clone, PartialEq)]
pub enum TableBody {
    Idle,
    /// Fetch in flight; `rows` are the last good rows, if any.
    Loading { rows: Vec<Vec<Cell>> },
    Rows(Vec<Vec<Cell>>),
    /// The server reported zero matches.
    Empty { title: String, subtitle: Option<String> },
    /// The fetch failed; the frontend offers a retry.
    Error { error: TableError, rows: Vec<Vec<Cell>> },
}

/// Pagination controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    /// 1-indexed.
    pub page: u32,
    pub page_count: u32,
    pub page_size: u32,
    pub total: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl Pager {
    pub(crate) fn new(page: u32, page_size: u32, total: u64, page_count: u32) -> Self {
        Self {
            page,
            page_count,
            page_size,
            total,
            has_previous: page > 1,
            has_next: page < page_count,
        }
    }
}
