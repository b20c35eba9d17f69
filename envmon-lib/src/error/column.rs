//! Column definition errors

/// Errors raised when assembling a [`ColumnSet`](crate::table::ColumnSet).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColumnError {
    /// Two columns share the same id.
    #[error("Duplicate column id '{id}'")]
    DuplicateId { id: String },

    /// A column id was empty.
    #[error("Column id must not be empty (header '{header}')")]
    EmptyId { header: String },
}
