//! Terminal and JSON output
//!
//! - `tree` - the visible part of a UI tree, with box-drawing connectors
//! - `walk` - nodes returned by a walk, optionally with their phase
//! - `edits` - structural edits emitted by reconciliation
//! - `json` - pretty-printed JSON for any serializable value

mod config;
mod edits;
mod json;
mod tree;
mod walk;

pub use config::OutputConfig;
pub use edits::EditFormatter;
pub use json::print_json;
pub use tree::TreeFormatter;
pub use walk::{VisitRecord, WalkFormatter, collect_visits};
