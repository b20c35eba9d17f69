//! Column sets of the admin listings.
//!
//! Factories only describe columns; handlers are injected and nothing here
//! performs I/O.

mod companies;
mod nodes;

pub use companies::*;
pub use nodes::*;

use crate::model::NodeStatus;
use crate::table::Cell;
use crate::table::Tone;

pub(crate) const ACTIONS: &str = "actions";

/// Action name of "remove" buttons.
pub const REMOVE: &str = "remove";

/// Action name of "view detail" buttons.
pub const VIEW: &str = "view";

pub(crate) fn status_badge(status: &NodeStatus) -> Cell {
    let tone = match status {
        NodeStatus::Active => Tone::Success,
        NodeStatus::Nonactive => Tone::Danger,
        NodeStatus::Other(_) => Tone::Neutral,
    };
    Cell::badge(status.label(), tone)
}
