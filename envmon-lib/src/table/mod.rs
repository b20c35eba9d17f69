//! Server-driven data tables: column descriptors, fetch state and views.

mod column;
mod data_table;
mod handle;
mod state;
mod view;

pub use column::*;
pub use data_table::*;
pub use handle::*;
pub use state::*;
pub use view::*;
