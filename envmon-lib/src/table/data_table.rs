//! Server-driven data table

use std::sync::Arc;

use log::debug;
use log::trace;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use super::ActionOutcome;
use super::Cell;
use super::ColumnSet;
use super::HeaderCell;
use super::Pager;
use super::TableBody;
use super::TableState;
use super::TableView;
use crate::api::query::FetchPolicy;
use crate::api::query::Page;
use crate::api::query::PageRequest;
use crate::api::query::QueryKey;
use crate::api::query::RemoteCollectionQuery;
use crate::api::query::SortSpec;
use crate::api::query::SortState;
use crate::api::query::SortingEntry;
use crate::api::query::normalize_search;
use crate::cache::CacheEvent;
use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::Error;
use crate::error::TableError;

const ROWS_CHANNEL_CAPACITY: usize = 16;

/// Title and optional subtitle shown when the server reports no rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyMessage {
    /// Headline of the empty state.
    pub title: String,
    /// Hint below the title, e.g. how to add the first row.
    pub subtitle: Option<String>,
}

impl EmptyMessage {
    /// Creates a message with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
        }
    }

    /// Adds a subtitle.
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }
}

impl Default for EmptyMessage {
    fn default() -> Self {
        Self::new("Tidak ada data")
    }
}

/// Per-table options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    /// Shown when the server reports a total of zero.
    pub empty_msg: EmptyMessage,
    /// Fetch every matching row in one request and render no pager.
    pub hidden_pagination: bool,
    /// Rows per page, at least 1.
    pub page_size: u32,
    /// Sort used while no column is sorted.
    pub default_sort: SortSpec,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            empty_msg: EmptyMessage::default(),
            hidden_pagination: false,
            page_size: DEFAULT_PAGE_SIZE,
            default_sort: SortSpec::default(),
        }
    }
}

impl TableOptions {
    /// Sets the empty-state message.
    pub fn with_empty_msg(mut self, empty_msg: EmptyMessage) -> Self {
        self.empty_msg = empty_msg;
        self
    }

    /// Fetches all rows at once and hides the pager.
    pub fn with_hidden_pagination(mut self, hidden: bool) -> Self {
        self.hidden_pagination = hidden;
        self
    }

    /// Sets the page size; `0` is treated as `1`.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sets the fallback sort.
    pub fn with_default_sort(mut self, sort: SortSpec) -> Self {
        self.default_sort = sort;
        self
    }
}

/// Identifies one issued fetch.
///
/// Only the most recently issued ticket can change what the table shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    key: QueryKey,
    policy: FetchPolicy,
}

impl FetchTicket {
    /// Issue number, increasing per table.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Key the fetch was issued for.
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Whether the fetch may be served from cache.
    pub fn policy(&self) -> FetchPolicy {
        self.policy
    }
}

/// Whether a fetch result changed the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The result is now on screen.
    Applied,
    /// A newer fetch was issued, or the key moved on; the result was dropped.
    Superseded,
}

/// A table bound to a REST collection.
///
/// Owns the sort, page and search of one listing, fetches through a
/// [`RemoteCollectionQuery`] and renders rows with a [`ColumnSet`].
/// Successful pages are published to subscribers (see
/// [`subscribe`](Self::subscribe)) so a sibling view such as a map can
/// mirror the rows without fetching again.
///
/// # Example
///
/// ```ignore
/// let mut table = DataTable::new("/nodes", columns::nodes_columns(), client.query(), TableOptions::default());
/// table.load().await;
///
/// table.toggle_sort("name");
/// table.sync().await;
/// let view = table.view();
/// ```
pub struct DataTable<R> {
    api_url: String,
    columns: ColumnSet<R>,
    options: TableOptions,
    sort: SortState,
    page: u32,
    search: Option<String>,
    state: TableState<R>,
    query: RemoteCollectionQuery,
    events: broadcast::Receiver<CacheEvent>,
    rows_tx: broadcast::Sender<Arc<Vec<R>>>,
    issued: u64,
    dirty: bool,
    /// The cache dropped the current key since the last fetch.
    invalidated: bool,
}

impl<R> DataTable<R>
where
    R: Clone + DeserializeOwned + Send + Sync + 'static,
{
    /// Creates an idle table over `api_url`.
    pub fn new(
        api_url: impl Into<String>,
        columns: ColumnSet<R>,
        query: RemoteCollectionQuery,
        options: TableOptions,
    ) -> Self {
        let events = query.cache().subscribe();
        let (rows_tx, _) = broadcast::channel(ROWS_CHANNEL_CAPACITY);
        Self {
            api_url: api_url.into(),
            columns,
            sort: SortState::new(options.default_sort.clone()),
            options,
            page: 1,
            search: None,
            state: TableState::Idle,
            query,
            events,
            rows_tx,
            issued: 0,
            dirty: false,
            invalidated: false,
        }
    }

    /// Collection the table is bound to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Column definitions.
    pub fn columns(&self) -> &ColumnSet<R> {
        &self.columns
    }

    /// Options the table was created with.
    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// Sort state, including the default fallback.
    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    /// Current 1-indexed page.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Normalized search term, if any.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Current load state.
    pub fn state(&self) -> &TableState<R> {
        &self.state
    }

    /// Rows on screen, stale rows included.
    pub fn rows(&self) -> &[R] {
        self.state.rows()
    }

    /// Query layer the table fetches through.
    pub fn query(&self) -> &RemoteCollectionQuery {
        &self.query
    }

    /// Request for the current page, sort and search.
    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.sort.spec())
            .page(self.page)
            .page_size(self.options.page_size)
            .search(self.search.as_deref())
            .all(self.options.hidden_pagination)
    }

    /// Cache key of the current request.
    pub fn query_key(&self) -> QueryKey {
        QueryKey::derive(&self.api_url, &self.request())
    }

    /// Applies a data-grid sorting list and goes back to page 1.
    ///
    /// The field is not checked against the column set; the server decides.
    pub fn set_sorting(&mut self, entries: Vec<SortingEntry>) {
        self.sort.set_sorting(entries);
        self.page = 1;
        self.dirty = true;
    }

    /// Header click on `column_id`. Returns `false` for non-sortable columns.
    pub fn toggle_sort(&mut self, column_id: &str) -> bool {
        if !self.columns.is_sortable(column_id) {
            return false;
        }
        self.sort.toggle(column_id);
        self.page = 1;
        self.dirty = true;
        true
    }

    /// Moves to a 1-indexed page; `0` is treated as `1`.
    ///
    /// Ignored when pagination is hidden, since every row is already loaded.
    pub fn set_page(&mut self, page: u32) {
        if self.options.hidden_pagination {
            return;
        }
        let page = page.max(1);
        if page != self.page {
            self.page = page;
            self.dirty = true;
        }
    }

    /// Sets the search term and goes back to page 1. Blank terms clear the search.
    pub fn set_search(&mut self, term: Option<&str>) {
        let search = normalize_search(term);
        if search != self.search {
            self.search = search;
            self.page = 1;
            self.dirty = true;
        }
    }

    /// Points the table at another collection.
    ///
    /// Drops everything shown so far (no stale rows across resources) and
    /// goes back to page 1. Sort and search are kept.
    pub fn set_api_url(&mut self, api_url: impl Into<String>) {
        let api_url = api_url.into();
        if api_url != self.api_url {
            debug!("table: {} -> {}, resetting", self.api_url, api_url);
            self.api_url = api_url;
            self.page = 1;
            self.state = TableState::Idle;
            self.dirty = true;
        }
    }

    /// Enters `Loading` and issues a ticket for the current key.
    ///
    /// The ticket supersedes every earlier one. After an invalidation of
    /// the current key the fetch always goes to the network, whatever
    /// `policy` asks for.
    pub fn begin_fetch(&mut self, policy: FetchPolicy) -> FetchTicket {
        // Events so far are about data this fetch replaces.
        self.poll_invalidation();
        let policy = if self.invalidated {
            FetchPolicy::NetworkOnly
        } else {
            policy
        };
        self.issued += 1;
        self.dirty = false;
        self.invalidated = false;
        self.state = std::mem::take(&mut self.state).into_loading();
        let ticket = FetchTicket {
            seq: self.issued,
            key: self.query_key(),
            policy,
        };
        trace!("table: issued #{} for {}", ticket.seq, ticket.key);
        ticket
    }

    /// Applies the result of the fetch behind `ticket`.
    ///
    /// Results of superseded tickets are dropped. Successful pages are
    /// published to subscribers; failures keep the last good page.
    pub fn apply(&mut self, ticket: &FetchTicket, result: Result<Page<R>, Error>) -> Applied {
        if ticket.seq != self.issued || ticket.key != self.query_key() {
            debug!(
                "table: dropping #{} for {} (latest #{})",
                ticket.seq, ticket.key, self.issued
            );
            return Applied::Superseded;
        }

        let previous = std::mem::take(&mut self.state);
        self.state = match result {
            Ok(page) => {
                debug!("table: {} rows of {} for {}", page.len(), page.total(), ticket.key);
                // No subscribers is fine.
                let _ = self.rows_tx.send(Arc::new(page.rows().to_vec()));
                TableState::Success(page)
            }
            Err(e) => {
                debug!("table: fetch for {} failed: {}", ticket.key, e);
                previous.into_error(TableError::from(&e))
            }
        };
        Applied::Applied
    }

    /// Fetches the current key and applies the result.
    pub async fn load(&mut self) -> Applied {
        self.fetch_with(FetchPolicy::CacheFirst).await
    }

    /// Refetches from the network after a failure. Returns `None` when the
    /// table is not in the error state.
    pub async fn retry(&mut self) -> Option<Applied> {
        if !self.state.is_error() {
            return None;
        }
        Some(self.fetch_with(FetchPolicy::NetworkOnly).await)
    }

    async fn fetch_with(&mut self, policy: FetchPolicy) -> Applied {
        let ticket = self.begin_fetch(policy);
        let query = self.query.clone();
        let result = query
            .fetch::<R>(ticket.key(), ticket.policy())
            .await
            .map(|response| response.into_inner());
        self.apply(&ticket, result)
    }

    /// Drains cache events. Returns `true` if the current key was
    /// invalidated or a parameter changed since the last fetch.
    pub fn poll_invalidation(&mut self) -> bool {
        let key = self.query_key();
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    if event.affects(&key) {
                        trace!("table: {} invalidated by {:?}", key, event);
                        self.dirty = true;
                        self.invalidated = true;
                    }
                }
                Err(TryRecvError::Lagged(missed)) => {
                    debug!("table: missed {} cache events, refetching {}", missed, key);
                    self.dirty = true;
                    self.invalidated = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        self.dirty
    }

    /// Returns `true` if the next [`sync`](Self::sync) would fetch.
    pub fn needs_fetch(&mut self) -> bool {
        self.poll_invalidation() || self.state.is_idle()
    }

    /// Fetches if anything changed since the last fetch or the table is idle.
    pub async fn sync(&mut self) -> Option<Applied> {
        if !self.needs_fetch() {
            return None;
        }
        Some(self.load().await)
    }

    /// Subscribes to the rows of every successful fetch.
    ///
    /// Each successful fetch publishes exactly once: the page's rows, or
    /// every row when pagination is hidden.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Vec<R>>> {
        self.rows_tx.subscribe()
    }

    /// Triggers an action on the row at `index` of the rows on screen.
    pub fn invoke_action(&self, index: usize, column_id: &str, action: &str) -> Option<ActionOutcome> {
        let row = self.rows().get(index)?;
        self.columns.invoke(column_id, action, row)
    }

    /// Snapshot for rendering.
    pub fn view(&self) -> TableView {
        let spec = self.sort.spec();
        let headers = self
            .columns
            .iter()
            .map(|column| HeaderCell {
                id: column.id().to_string(),
                label: column.header().to_string(),
                sortable: column.is_sortable(),
                sorted: (column.is_sortable() && column.id() == spec.field).then_some(spec.order),
            })
            .collect();

        let body = match &self.state {
            TableState::Idle => TableBody::Idle,
            TableState::Loading { .. } => TableBody::Loading {
                rows: self.render_rows(),
            },
            TableState::Success(page) if page.total() == 0 => TableBody::Empty {
                title: self.options.empty_msg.title.clone(),
                subtitle: self.options.empty_msg.subtitle.clone(),
            },
            TableState::Success(_) => TableBody::Rows(self.render_rows()),
            TableState::Error { error, .. } => TableBody::Error {
                error: error.clone(),
                rows: self.render_rows(),
            },
        };

        TableView {
            headers,
            body,
            pager: self.pager(),
        }
    }

    fn render_rows(&self) -> Vec<Vec<Cell>> {
        self.rows().iter().map(|row| self.columns.render_row(row)).collect()
    }

    fn pager(&self) -> Option<Pager> {
        if self.options.hidden_pagination {
            return None;
        }
        let page = self.state.page()?;
        if page.total() == 0 {
            return None;
        }
        Some(Pager::new(
            self.page,
            self.options.page_size,
            page.total(),
            page.page_count(self.options.page_size),
        ))
    }
}

impl<R> std::fmt::Debug for DataTable<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataTable")
            .field("api_url", &self.api_url)
            .field("columns", &self.columns)
            .field("sort", &self.sort)
            .field("page", &self.page)
            .field("search", &self.search)
            .field("issued", &self.issued)
            .finish_non_exhaustive()
    }
}
