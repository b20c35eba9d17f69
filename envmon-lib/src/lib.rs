//! Environmental monitoring API client library
//!
//! Server-driven data tables over the monitoring REST API: sort state,
//! cached paginated collection queries with prefix invalidation, column
//! descriptors for the admin listings and a table state machine that
//! frontends render from.

pub mod api;
pub mod auth;
pub mod cache;
pub mod columns;
pub mod config;
pub mod error;
pub mod model;
pub mod response;
pub mod retry;
pub mod table;

mod client;

pub use client::*;
pub use response::CacheStatus;
pub use response::Response;
pub use retry::RetryConfig;
