//! Collection queries: sorting, page requests, cache keys and fetching.
//!
//! - [`SortState`] - the single active sort of a table
//! - [`PageRequest`] / [`QueryKey`] - what to fetch and the key it is cached under
//! - [`Page`] - rows plus the total match count
//! - [`RemoteCollectionQuery`] - fetches pages through the [`QueryCache`](crate::cache::QueryCache)

mod key;
mod page;
mod remote;
mod sort;

pub use key::PageRequest;
pub use key::QueryKey;
pub use key::normalize_search;
pub use page::Page;
pub use remote::FetchPolicy;
pub use remote::RemoteCollectionQuery;
pub use remote::Transport;
pub use sort::SortOrder;
pub use sort::SortSpec;
pub use sort::SortState;
pub use sort::SortingEntry;
