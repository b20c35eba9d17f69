//! Page requests and the cache keys derived from them.

use std::fmt;

use url::form_urlencoded;

use super::SortSpec;
use crate::config::DEFAULT_PAGE_SIZE;

/// Parameters of one collection fetch.
///
/// Pages are 1-indexed. When `all` is set the table runs without a pager and
/// the request asks the server for every matching row instead of one page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
    sort: SortSpec,
    search: Option<String>,
    all: bool,
}

impl PageRequest {
    /// First page with the default page size.
    pub fn new(sort: SortSpec) -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort,
            search: None,
            all: false,
        }
    }

    /// Sets the 1-indexed page; `0` is treated as `1`.
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Sets the page size; `0` is treated as `1`.
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sets the sort.
    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    /// Sets the free-text search. Blank terms clear the search.
    pub fn search(mut self, term: Option<&str>) -> Self {
        self.search = normalize_search(term);
        self
    }

    /// Requests every matching row in one go.
    pub fn all(mut self, all: bool) -> Self {
        self.all = all;
        self
    }

    /// Returns the 1-indexed page.
    pub fn page_number(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    pub fn page_size_value(&self) -> u32 {
        self.page_size
    }

    /// Returns the sort.
    pub fn sort_spec(&self) -> &SortSpec {
        &self.sort
    }

    /// Returns the normalised search term.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Returns `true` when the request fetches all rows.
    pub fn is_all(&self) -> bool {
        self.all
    }

    /// Builds the query string, parameters in a fixed order.
    pub fn query_string(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if self.all {
            query.append_pair("all", "true");
        } else {
            query.append_pair("page", &self.page.to_string());
            query.append_pair("pageSize", &self.page_size.to_string());
        }
        query.append_pair("sortField", &self.sort.field);
        query.append_pair("sortOrder", self.sort.order.as_str());
        if let Some(search) = &self.search {
            query.append_pair("search", search);
        }
        query.finish()
    }
}

/// Trims a search term and drops it when nothing is left.
pub fn normalize_search(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Cache key of a collection fetch: the full request path and query string.
///
/// Keys are derived, never hand-written, so the same inputs always give the
/// same string. The key doubles as the URL (relative to the API base) that
/// is requested.
///
/// # Example
///
/// ```
/// use envmon_lib::api::query::{PageRequest, QueryKey, SortSpec};
///
/// let request = PageRequest::new(SortSpec::asc("name")).page(2);
/// let key = QueryKey::derive("/nodes/42/companies", &request);
///
/// assert_eq!(
///     key.as_str(),
///     "/nodes/42/companies?page=2&pageSize=10&sortField=name&sortOrder=ASC"
/// );
/// assert!(key.starts_with("/nodes/42/companies"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(String);

impl QueryKey {
    /// Derives the key for `request` against the resource at `base_url`.
    pub fn derive(base_url: &str, request: &PageRequest) -> Self {
        let base = base_url.trim_end_matches(['?', '&']);
        let separator = if base.contains('?') { '&' } else { '?' };
        Self(format!("{}{}{}", base, separator, request.query_string()))
    }

    /// Returns the key as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the resource part of the key (everything before the query).
    pub fn resource(&self) -> &str {
        self.0.split_once('?').map_or(self.0.as_str(), |(path, _)| path)
    }

    /// Literal string prefix test used by bulk invalidation.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for QueryKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
