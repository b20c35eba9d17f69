//! REST API operations

mod mutation;
pub mod query;
pub mod resources;

pub use mutation::*;
