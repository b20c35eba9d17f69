//! Table fetch state machine

use crate::api::query::Page;
use crate::error::TableError;

/// Where a table is in its fetch cycle.
///
/// `Idle -> Loading -> {Success, Error}`, back to `Loading` on every
/// page/sort/search change or invalidation. Loading and error states keep
/// the last successful page so it can stay on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum TableState<R> {
    /// Nothing fetched yet for the current URL.
    Idle,
    /// A fetch is in flight.
    Loading {
        /// Last successful page, if any.
        stale: Option<Page<R>>,
    },
    /// The last fetch succeeded.
    Success(Page<R>),
    /// The last fetch failed.
    Error {
        error: TableError,
        /// Last successful page, if any.
        stale: Option<Page<R>>,
    },
}

impl<R> Default for TableState<R> {
    fn default() -> Self {
        TableState::Idle
    }
}

impl<R> TableState<R> {
    /// Enters `Loading`, carrying the last good page along.
    pub(crate) fn into_loading(self) -> Self {
        TableState::Loading {
            stale: self.into_page(),
        }
    }

    /// Enters `Error`, carrying the last good page along.
    pub(crate) fn into_error(self, error: TableError) -> Self {
        TableState::Error {
            error,
            stale: self.into_page(),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, TableState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, TableState::Loading { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TableState::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TableState::Error { .. })
    }

    /// The page on screen: the current one, or the stale one while loading or failed.
    pub fn page(&self) -> Option<&Page<R>> {
        match self {
            TableState::Idle => None,
            TableState::Success(page) => Some(page),
            TableState::Loading { stale } | TableState::Error { stale, .. } => stale.as_ref(),
        }
    }

    /// Rows on screen.
    pub fn rows(&self) -> &[R] {
        self.page().map(Page::rows).unwrap_or(&[])
    }

    pub fn error(&self) -> Option<&TableError> {
        match self {
            TableState::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    fn into_page(self) -> Option<Page<R>> {
        match self {
            TableState::Idle => None,
            TableState::Success(page) => Some(page),
            TableState::Loading { stale } | TableState::Error { stale, .. } => stale,
        }
    }
}
