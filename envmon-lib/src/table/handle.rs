//! Shared table handle

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::sync::MutexGuard;
use tokio::sync::broadcast;

use super::Applied;
use super::DataTable;
use super::FetchTicket;
use super::TableView;
use crate::api::query::FetchPolicy;
use crate::api::query::RemoteCollectionQuery;
use crate::api::query::SortingEntry;

/// A [`DataTable`] shared between tasks.
///
/// The lock is held only to change parameters and apply results, never
/// while a request is in flight, so a page change can be issued while an
/// earlier fetch is still pending. The later fetch wins.
pub struct TableHandle<R> {
    inner: Arc<Mutex<DataTable<R>>>,
}

impl<R> Clone for TableHandle<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> TableHandle<R>
where
    R: Clone + DeserializeOwned + Send + Sync + 'static,
{
    /// Creates a handle owning `table`.
    pub fn new(table: DataTable<R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(table)),
        }
    }

    /// Locks the table.
    pub async fn lock(&self) -> MutexGuard<'_, DataTable<R>> {
        self.inner.lock().await
    }

    /// Fetches the current key without holding the lock across the request.
    pub async fn refresh(&self) -> Applied {
        let (ticket, query) = {
            let mut table = self.inner.lock().await;
            let ticket = table.begin_fetch(FetchPolicy::CacheFirst);
            (ticket, table.query().clone())
        };
        self.complete(ticket, query).await
    }

    /// Refetches from the network after a failure, without holding the lock
    /// across the request. Returns `None` when the table is not in the error
    /// state.
    pub async fn retry(&self) -> Option<Applied> {
        let (ticket, query) = {
            let mut table = self.inner.lock().await;
            if !table.state().is_error() {
                return None;
            }
            let ticket = table.begin_fetch(FetchPolicy::NetworkOnly);
            (ticket, table.query().clone())
        };
        Some(self.complete(ticket, query).await)
    }

    async fn complete(&self, ticket: FetchTicket, query: RemoteCollectionQuery) -> Applied {
        let result = query
            .fetch::<R>(ticket.key(), ticket.policy())
            .await
            .map(|response| response.into_inner());

        self.inner.lock().await.apply(&ticket, result)
    }

    /// Fetches if the table is idle, dirty or invalidated.
    pub async fn sync(&self) -> Option<Applied> {
        if !self.inner.lock().await.needs_fetch() {
            return None;
        }
        Some(self.refresh().await)
    }

    /// Moves to `page` and fetches it.
    pub async fn set_page(&self, page: u32) -> Applied {
        self.inner.lock().await.set_page(page);
        self.refresh().await
    }

    /// Applies a sorting list and fetches page 1.
    pub async fn set_sorting(&self, entries: Vec<SortingEntry>) -> Applied {
        self.inner.lock().await.set_sorting(entries);
        self.refresh().await
    }

    /// Sets the search term and fetches page 1.
    pub async fn set_search(&self, term: Option<&str>) -> Applied {
        self.inner.lock().await.set_search(term);
        self.refresh().await
    }

    /// Header click on `column_id`, followed by a fetch.
    ///
    /// Returns `None` without fetching for non-sortable columns.
    pub async fn toggle_sort(&self, column_id: &str) -> Option<Applied> {
        if !self.inner.lock().await.toggle_sort(column_id) {
            return None;
        }
        Some(self.refresh().await)
    }

    /// Snapshot for rendering.
    pub async fn view(&self) -> TableView {
        self.inner.lock().await.view()
    }

    /// Subscribes to the rows of every successful fetch.
    pub async fn subscribe(&self) -> broadcast::Receiver<Arc<Vec<R>>> {
        self.inner.lock().await.subscribe()
    }
}

impl<R> From<DataTable<R>> for TableHandle<R>
where
    R: Clone + DeserializeOwned + Send + Sync + 'static,
{
    fn from(table: DataTable<R>) -> Self {
        Self::new(table)
    }
}
