//! Sorting state for server-sorted tables.

use serde::Deserialize;
use serde::Serialize;

/// Sort direction as understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl SortOrder {
    /// Returns the wire form, `ASC` or `DESC`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    /// Returns the opposite direction.
    pub fn reversed(&self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    /// Builds a direction from a data-grid style `desc` flag.
    pub fn from_desc(desc: bool) -> Self {
        if desc { SortOrder::Desc } else { SortOrder::Asc }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single active sort of a table: a field plus a direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    /// Server-recognised sort field.
    pub field: String,
    /// Sort direction.
    pub order: SortOrder,
}

impl SortSpec {
    /// Creates a sort spec.
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    /// Descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::asc("name")
    }
}

/// One entry of a data-grid sorting list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortingEntry {
    /// Column id being sorted.
    pub id: String,
    /// `true` for descending.
    pub desc: bool,
}

impl SortingEntry {
    /// Creates a sorting entry.
    pub fn new(id: impl Into<String>, desc: bool) -> Self {
        Self { id: id.into(), desc }
    }
}

impl From<&SortSpec> for SortingEntry {
    fn from(spec: &SortSpec) -> Self {
        Self::new(spec.field.clone(), spec.order == SortOrder::Desc)
    }
}

/// Owns the current sort of a table.
///
/// Accepts the `{id, desc}` lists produced by sorting widgets and collapses
/// them to a single [`SortSpec`]. Only the first entry counts. An empty list
/// means "back to the default": the backend always needs a sort field, so
/// there is no unsorted state.
///
/// # Example
///
/// ```
/// use envmon_lib::api::query::{SortOrder, SortSpec, SortState, SortingEntry};
///
/// let mut sort = SortState::new(SortSpec::asc("name"));
/// sort.set_sorting(vec![SortingEntry::new("joinedAt", true)]);
/// assert_eq!(sort.spec(), SortSpec::desc("joinedAt"));
///
/// sort.set_sorting(Vec::new());
/// assert_eq!(sort.spec(), SortSpec::asc("name"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    default: SortSpec,
    sorting: Vec<SortingEntry>,
}

impl SortState {
    /// Creates a sort state starting at `default`.
    pub fn new(default: SortSpec) -> Self {
        let sorting = vec![SortingEntry::from(&default)];
        Self { default, sorting }
    }

    /// Returns the default sort this state falls back to.
    pub fn default_spec(&self) -> &SortSpec {
        &self.default
    }

    /// Returns the sorting list in data-grid form.
    pub fn sorting(&self) -> &[SortingEntry] {
        &self.sorting
    }

    /// Replaces the sorting list; entries past the first are dropped.
    pub fn set_sorting(&mut self, entries: Vec<SortingEntry>) {
        self.sorting = entries.into_iter().take(1).collect();
    }

    /// Returns the active sort, falling back to the default when cleared.
    pub fn spec(&self) -> SortSpec {
        match self.sorting.first() {
            Some(entry) => SortSpec::new(entry.id.clone(), SortOrder::from_desc(entry.desc)),
            None => self.default.clone(),
        }
    }

    /// Returns the explicit direction on `field`, if it is the sorted column.
    pub fn order_of(&self, field: &str) -> Option<SortOrder> {
        self.sorting
            .first()
            .filter(|entry| entry.id == field)
            .map(|entry| SortOrder::from_desc(entry.desc))
    }

    /// Header-click cycle for `field`: ascending, then descending, then cleared.
    pub fn toggle(&mut self, field: &str) {
        let next = match self.order_of(field) {
            None => vec![SortingEntry::new(field, false)],
            Some(SortOrder::Asc) => vec![SortingEntry::new(field, true)],
            Some(SortOrder::Desc) => Vec::new(),
        };
        self.set_sorting(next);
    }

    /// Restores the default sort.
    pub fn reset(&mut self) {
        self.sorting = vec![SortingEntry::from(&self.default)];
    }
}

impl Default for SortState {
    fn default() -> Self {
        Self::new(SortSpec::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_default() {
        let sort = SortState::new(SortSpec::desc("createdAt"));
        assert_eq!(sort.spec(), SortSpec::desc("createdAt"));
        assert_eq!(sort.sorting(), &[SortingEntry::new("createdAt", true)]);
    }

    #[test]
    fn test_clearing_falls_back_to_default() {
        let default = SortSpec::asc("name");
        let sequences = vec![
            vec![],
            vec![SortingEntry::new("status", false)],
            vec![SortingEntry::new("status", true), SortingEntry::new("name", false)],
            vec![SortingEntry::new("joinedAt", true)],
        ];

        for sequence in sequences {
            let mut sort = SortState::new(default.clone());
            sort.set_sorting(sequence);
            sort.set_sorting(Vec::new());
            assert_eq!(sort.spec(), default);
        }
    }

    #[test]
    fn test_multi_entry_list_collapses_to_first() {
        let mut sort = SortState::default();
        sort.set_sorting(vec![
            SortingEntry::new("type", true),
            SortingEntry::new("name", false),
        ]);
        assert_eq!(sort.spec(), SortSpec::desc("type"));
        assert_eq!(sort.sorting().len(), 1);
    }

    #[test]
    fn test_toggle_cycle() {
        let mut sort = SortState::new(SortSpec::asc("name"));

        sort.toggle("joinedAt");
        assert_eq!(sort.spec(), SortSpec::asc("joinedAt"));

        sort.toggle("joinedAt");
        assert_eq!(sort.spec(), SortSpec::desc("joinedAt"));

        sort.toggle("joinedAt");
        assert_eq!(sort.spec(), SortSpec::asc("name"));
        assert!(sort.sorting().is_empty());
        assert_eq!(sort.order_of("name"), None);
    }

    #[test]
    fn test_order_wire_form() {
        assert_eq!(SortOrder::Asc.as_str(), "ASC");
        assert_eq!(SortOrder::Desc.to_string(), "DESC");
        assert_eq!(serde_json::to_string(&SortOrder::Desc).unwrap(), "\"DESC\"");
    }
}
