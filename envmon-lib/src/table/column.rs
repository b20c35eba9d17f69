//! Column descriptors
//!
//! A table's shape is a [`ColumnSet`]: an ordered list of [`Column`]s, each
//! one of three kinds.
//!
//! - [`DataColumn`] reads a value out of the row and renders it.
//! - [`ActionColumn`] wires the row's id into injected [`RowAction`]s.
//! - [`DisplayColumn`] has no backing field and renders straight from the row.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;

use crate::error::ColumnError;

/// A value read out of a row by a [`DataColumn`] accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(DateTime<Utc>),
    /// Tuple accessors (e.g. latitude/longitude) produce a list.
    List(Vec<CellValue>),
}

impl CellValue {
    /// Plain text rendering used by the default renderer.
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Int(i) => Some(i.to_string()),
            CellValue::Float(f) => Some(f.to_string()),
            CellValue::Text(s) => Some(s.clone()),
            CellValue::DateTime(dt) => Some(dt.to_rfc3339()),
            CellValue::List(items) => {
                let parts: Vec<String> = items.iter().filter_map(CellValue::to_text).collect();
                Some(parts.join(", "))
            }
        }
    }

    /// Returns the float at `index` of a list value.
    pub fn float_at(&self, index: usize) -> Option<f64> {
        match self {
            CellValue::List(items) => match items.get(index)? {
                CellValue::Float(f) => Some(*f),
                CellValue::Int(i) => Some(*i as f64),
                _ => None,
            },
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(value: DateTime<Utc>) -> Self {
        CellValue::DateTime(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// Colour hint for badges and action buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Neutral,
    Info,
    Success,
    Warning,
    Danger,
}

/// A rendered cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Badge { label: String, tone: Tone },
    Link { label: String, href: String },
    Actions(Vec<ActionButton>),
}

impl Cell {
    /// Text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Badge cell.
    pub fn badge(label: impl Into<String>, tone: Tone) -> Self {
        Cell::Badge {
            label: label.into(),
            tone,
        }
    }

    /// Link cell.
    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Cell::Link {
            label: label.into(),
            href: href.into(),
        }
    }
}

/// A button rendered inside an action cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    /// Action name passed back to [`ColumnSet::invoke`].
    pub name: String,
    pub label: String,
    pub tone: Tone,
}

type ValueFn<R> = Arc<dyn Fn(&R) -> CellValue + Send + Sync>;
type TupleFn<R> = Arc<dyn Fn(&R) -> Vec<CellValue> + Send + Sync>;
type RenderFn<R> = Arc<dyn Fn(&R, &CellValue) -> Cell + Send + Sync>;
type DisplayFn<R> = Arc<dyn Fn(&R) -> Cell + Send + Sync>;
type IdFn<R> = Arc<dyn Fn(&R) -> i64 + Send + Sync>;

/// How a [`DataColumn`] reads its value.
pub enum Accessor<R> {
    /// A single field.
    Field(ValueFn<R>),
    /// Several fields read together, e.g. latitude and longitude.
    Tuple(TupleFn<R>),
}

impl<R> Accessor<R> {
    /// Reads the value of `row`. Tuples become [`CellValue::List`].
    pub fn read(&self, row: &R) -> CellValue {
        match self {
            Accessor::Field(f) => f(row),
            Accessor::Tuple(f) => CellValue::List(f(row)),
        }
    }

    /// Returns `true` for tuple accessors.
    pub fn is_tuple(&self) -> bool {
        matches!(self, Accessor::Tuple(_))
    }
}

/// A column backed by a row field.
pub struct DataColumn<R> {
    id: String,
    header: String,
    accessor: Accessor<R>,
    renderer: Option<RenderFn<R>>,
    sortable: bool,
}

impl<R> DataColumn<R> {
    /// Column reading a single field. Not sortable until [`sortable`](Self::sortable) is called.
    pub fn new(
        id: impl Into<String>,
        header: impl Into<String>,
        accessor: impl Fn(&R) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            accessor: Accessor::Field(Arc::new(accessor)),
            renderer: None,
            sortable: false,
        }
    }

    /// Column reading several fields at once. Never sortable unless flagged.
    pub fn tuple(
        id: impl Into<String>,
        header: impl Into<String>,
        accessor: impl Fn(&R) -> Vec<CellValue> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            accessor: Accessor::Tuple(Arc::new(accessor)),
            renderer: None,
            sortable: false,
        }
    }

    /// Marks the column as a server-recognized sort field.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Sets the cell renderer. Without one, the value renders as text.
    pub fn render(mut self, renderer: impl Fn(&R, &CellValue) -> Cell + Send + Sync + 'static) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn accessor(&self) -> &Accessor<R> {
        &self.accessor
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// Reads and renders the cell of `row`.
    pub fn render_cell(&self, row: &R) -> Cell {
        let value = self.accessor.read(row);
        match &self.renderer {
            Some(render) => render(row, &value),
            None => value.to_text().map(Cell::Text).unwrap_or(Cell::Empty),
        }
    }
}

/// What happens when a row action is triggered.
pub enum ActionTrigger<R> {
    /// Calls an injected handler with the row id.
    Handler(Arc<dyn Fn(i64) + Send + Sync>),
    /// Builds a path to navigate to from the row.
    Navigate(Arc<dyn Fn(&R) -> String + Send + Sync>),
}

impl<R> Clone for ActionTrigger<R> {
    fn clone(&self) -> Self {
        match self {
            ActionTrigger::Handler(f) => ActionTrigger::Handler(Arc::clone(f)),
            ActionTrigger::Navigate(f) => ActionTrigger::Navigate(Arc::clone(f)),
        }
    }
}

/// Result of invoking a row action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The injected handler ran.
    Handled,
    /// The caller should navigate to this path.
    Navigate(String),
}

/// A single action offered on every row of an [`ActionColumn`].
pub struct RowAction<R> {
    name: String,
    label: String,
    tone: Tone,
    trigger: ActionTrigger<R>,
}

impl<R> Clone for RowAction<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            label: self.label.clone(),
            tone: self.tone,
            trigger: self.trigger.clone(),
        }
    }
}

impl<R> RowAction<R> {
    /// Action calling `handler` with the row id.
    pub fn handler(
        name: impl Into<String>,
        label: impl Into<String>,
        handler: impl Fn(i64) + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            tone: Tone::Neutral,
            trigger: ActionTrigger::Handler(Arc::new(handler)),
        }
    }

    /// Action navigating to the path built from the row.
    pub fn navigate(
        name: impl Into<String>,
        label: impl Into<String>,
        path: impl Fn(&R) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            tone: Tone::Neutral,
            trigger: ActionTrigger::Navigate(Arc::new(path)),
        }
    }

    pub fn tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn trigger(&self) -> &ActionTrigger<R> {
        &self.trigger
    }

    /// Runs the action for `row`, whose id is `id`.
    pub fn invoke(&self, id: i64, row: &R) -> ActionOutcome {
        match &self.trigger {
            ActionTrigger::Handler(handler) => {
                handler(id);
                ActionOutcome::Handled
            }
            ActionTrigger::Navigate(path) => ActionOutcome::Navigate(path(row)),
        }
    }

    fn button(&self) -> ActionButton {
        ActionButton {
            name: self.name.clone(),
            label: self.label.clone(),
            tone: self.tone,
        }
    }
}

/// A column of per-row actions keyed by a row id.
pub struct ActionColumn<R> {
    id: String,
    header: String,
    row_id: IdFn<R>,
    actions: Vec<RowAction<R>>,
}

impl<R> ActionColumn<R> {
    /// Creates an action column; `row_id` picks the id handed to actions.
    pub fn new(
        id: impl Into<String>,
        header: impl Into<String>,
        row_id: impl Fn(&R) -> i64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            row_id: Arc::new(row_id),
            actions: Vec::new(),
        }
    }

    /// Appends an action.
    pub fn action(mut self, action: RowAction<R>) -> Self {
        self.actions.push(action);
        self
    }

    pub fn actions(&self) -> &[RowAction<R>] {
        &self.actions
    }

    /// Returns the id actions receive for `row`.
    pub fn row_id(&self, row: &R) -> i64 {
        (self.row_id)(row)
    }

    /// Triggers the action named `name` for `row`.
    pub fn invoke(&self, name: &str, row: &R) -> Option<ActionOutcome> {
        let action = self.actions.iter().find(|a| a.name == name)?;
        Some(action.invoke(self.row_id(row), row))
    }
}

/// A column with no backing data field.
pub struct DisplayColumn<R> {
    id: String,
    header: String,
    render: DisplayFn<R>,
}

impl<R> DisplayColumn<R> {
    pub fn new(
        id: impl Into<String>,
        header: impl Into<String>,
        render: impl Fn(&R) -> Cell + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            render: Arc::new(render),
        }
    }
}

/// A column descriptor.
pub enum Column<R> {
    Data(DataColumn<R>),
    Action(ActionColumn<R>),
    Display(DisplayColumn<R>),
}

impl<R> Column<R> {
    pub fn id(&self) -> &str {
        match self {
            Column::Data(c) => &c.id,
            Column::Action(c) => &c.id,
            Column::Display(c) => &c.id,
        }
    }

    pub fn header(&self) -> &str {
        match self {
            Column::Data(c) => &c.header,
            Column::Action(c) => &c.header,
            Column::Display(c) => &c.header,
        }
    }

    /// Only data columns flagged sortable can be sorted on.
    pub fn is_sortable(&self) -> bool {
        matches!(self, Column::Data(c) if c.sortable)
    }

    /// Raw value of `row`; [`CellValue::Null`] for columns without a field.
    pub fn value(&self, row: &R) -> CellValue {
        match self {
            Column::Data(c) => c.accessor.read(row),
            Column::Action(_) | Column::Display(_) => CellValue::Null,
        }
    }

    /// Renders the cell of `row`.
    pub fn render(&self, row: &R) -> Cell {
        match self {
            Column::Data(c) => c.render_cell(row),
            Column::Action(c) => Cell::Actions(c.actions.iter().map(RowAction::button).collect()),
            Column::Display(c) => (c.render)(row),
        }
    }
}

impl<R> From<DataColumn<R>> for Column<R> {
    fn from(column: DataColumn<R>) -> Self {
        Column::Data(column)
    }
}

impl<R> From<ActionColumn<R>> for Column<R> {
    fn from(column: ActionColumn<R>) -> Self {
        Column::Action(column)
    }
}

impl<R> From<DisplayColumn<R>> for Column<R> {
    fn from(column: DisplayColumn<R>) -> Self {
        Column::Display(column)
    }
}

impl<R> std::fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Column::Data(_) => "Data",
            Column::Action(_) => "Action",
            Column::Display(_) => "Display",
        };
        f.debug_struct("Column")
            .field("kind", &kind)
            .field("id", &self.id())
            .field("sortable", &self.is_sortable())
            .finish()
    }
}

/// An ordered list of columns with unique, non-empty ids.
///
/// # Example
///
/// ```
/// use envmon_lib::table::{CellValue, Column, ColumnSet, DataColumn, DisplayColumn, Cell};
///
/// struct Row { name: String }
///
/// let columns = ColumnSet::try_from(vec![
///     Column::from(DataColumn::new("name", "Nama", |r: &Row| CellValue::from(r.name.as_str())).sortable()),
///     Column::from(DisplayColumn::new("hint", "", |_: &Row| Cell::text("..."))),
/// ]).unwrap();
///
/// assert!(columns.is_sortable("name"));
/// assert!(!columns.is_sortable("hint"));
/// ```
pub struct ColumnSet<R> {
    columns: Vec<Column<R>>,
}

impl<R> ColumnSet<R> {
    /// Validates and wraps `columns`.
    pub fn new(columns: Vec<Column<R>>) -> Result<Self, ColumnError> {
        validate(&columns)?;
        Ok(Self { columns })
    }

    /// Wraps the built-in column sets, whose ids are fixed.
    pub(crate) fn from_static(columns: Vec<Column<R>>) -> Self {
        debug_assert!(validate(&columns).is_ok(), "invalid built-in column set");
        Self { columns }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column<R>> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Looks a column up by id.
    pub fn get(&self, id: &str) -> Option<&Column<R>> {
        self.columns.iter().find(|c| c.id() == id)
    }

    /// Returns the ids of all columns, in order.
    pub fn ids(&self) -> Vec<&str> {
        self.columns.iter().map(Column::id).collect()
    }

    /// Returns `true` if `id` names a sortable column.
    pub fn is_sortable(&self, id: &str) -> bool {
        self.get(id).is_some_and(Column::is_sortable)
    }

    /// Renders every cell of `row`, in column order.
    pub fn render_row(&self, row: &R) -> Vec<Cell> {
        self.columns.iter().map(|c| c.render(row)).collect()
    }

    /// Triggers action `action` of column `column_id` for `row`.
    ///
    /// Returns `None` if the column is not an action column or has no such action.
    pub fn invoke(&self, column_id: &str, action: &str, row: &R) -> Option<ActionOutcome> {
        match self.get(column_id)? {
            Column::Action(c) => c.invoke(action, row),
            Column::Data(_) | Column::Display(_) => None,
        }
    }
}

fn validate<R>(columns: &[Column<R>]) -> Result<(), ColumnError> {
    let mut seen = HashSet::new();
    for column in columns {
        if column.id().trim().is_empty() {
            return Err(ColumnError::EmptyId {
                header: column.header().to_string(),
            });
        }
        if !seen.insert(column.id()) {
            return Err(ColumnError::DuplicateId {
                id: column.id().to_string(),
            });
        }
    }
    Ok(())
}

impl<R> std::fmt::Debug for ColumnSet<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.columns.iter()).finish()
    }
}

impl<R> TryFrom<Vec<Column<R>>> for ColumnSet<R> {
    type Error = ColumnError;

    fn try_from(columns: Vec<Column<R>>) -> Result<Self, Self::Error> {
        Self::new(columns)
    }
}

impl<'a, R> IntoIterator for &'a ColumnSet<R> {
    type Item = &'a Column<R>;
    type IntoIter = std::slice::Iter<'a, Column<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Row {
        id: i64,
        name: String,
        lat: f64,
        lng: f64,
    }

    fn row() -> Row {
        Row {
            id: 7,
            name: "Kali Progo".to_string(),
            lat: -7.5,
            lng: 110.0,
        }
    }

    fn name_column() -> Column<Row> {
        DataColumn::new("name", "Nama", |r: &Row| CellValue::from(r.name.as_str()))
            .sortable()
            .into()
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let err = ColumnSet::new(vec![name_column(), name_column()]).unwrap_err();
        assert_eq!(err, ColumnError::DuplicateId { id: "name".to_string() });
    }

    #[test]
    fn test_empty_id_is_rejected() {
        let display = DisplayColumn::new(" ", "Aksi", |_: &Row| Cell::Empty);
        let err = ColumnSet::new(vec![display.into()]).unwrap_err();
        assert!(matches!(err, ColumnError::EmptyId { .. }));
    }

    #[test]
    fn test_tuple_column_is_not_sortable_by_default() {
        let coordinate: Column<Row> =
            DataColumn::tuple("coordinate", "Koordinat", |r: &Row| vec![r.lat.into(), r.lng.into()]).into();
        assert!(!coordinate.is_sortable());

        let value = coordinate.value(&row());
        assert_eq!(value.float_at(0), Some(-7.5));
        assert_eq!(value.float_at(1), Some(110.0));
    }

    #[test]
    fn test_display_column_has_no_value() {
        let column: Column<Row> = DisplayColumn::new("hint", "", |r: &Row| Cell::text(r.name.to_uppercase())).into();
        assert_eq!(column.value(&row()), CellValue::Null);
        assert_eq!(column.render(&row()), Cell::text("KALI PROGO"));
    }

    #[test]
    fn test_handler_receives_row_id() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let seen = calls.clone();
        let actions = ActionColumn::new("actions", "", |r: &Row| r.id)
            .action(RowAction::handler("remove", "Hapus", move |id| seen.lock().unwrap().push(id)).tone(Tone::Danger))
            .action(RowAction::navigate("view", "Lihat", |r: &Row| format!("/nodes/{}", r.id)));
        let columns = ColumnSet::new(vec![name_column(), actions.into()]).unwrap();

        assert_eq!(columns.invoke("actions", "remove", &row()), Some(ActionOutcome::Handled));
        assert_eq!(*calls.lock().unwrap(), vec![7]);
        assert_eq!(
            columns.invoke("actions", "view", &row()),
            Some(ActionOutcome::Navigate("/nodes/7".to_string()))
        );
        assert_eq!(columns.invoke("name", "remove", &row()), None);
    }

    #[test]
    fn test_render_row_in_column_order() {
        let columns = ColumnSet::new(vec![
            name_column(),
            ActionColumn::new("actions", "", |r: &Row| r.id)
                .action(RowAction::navigate("view", "Lihat", |r: &Row| format!("/nodes/{}", r.id)))
                .into(),
        ])
        .unwrap();

        let cells = columns.render_row(&row());
        assert_eq!(cells[0], Cell::text("Kali Progo"));
        assert!(matches!(&cells[1], Cell::Actions(buttons) if buttons[0].name == "view"));
    }
}
