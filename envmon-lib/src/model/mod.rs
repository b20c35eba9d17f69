//! Row types returned by the monitoring API.

mod company;
mod format;
mod map;
mod node;

pub use company::*;
pub use format::*;
pub use map::*;
pub use node::*;
