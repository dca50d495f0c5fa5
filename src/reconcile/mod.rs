//! Directory-tree reconciliation
//!
//! `DirectoryTree` owns a `UiTree` and keeps it in line with the listings
//! returned by an `EntryProvider`. Each listing is merged into the existing
//! children with a sorted two-cursor walk: matching items are kept (and keep
//! their `ItemId`), missing ones are inserted, vanished ones are removed.
//! Every change is reported to an `EditSink` in the order it happens.

mod config;
mod directory;
mod edit;
mod item;
mod merge;
mod ticket;

pub use config::{Comparator, ReconcileConfig};
pub use directory::{ChangeKind, DirectoryTree, EntryChange};
pub use edit::{Edit, EditSink, structural};
pub use item::{ItemId, UiItem, UiTree};
pub use ticket::{ApplyOutcome, ProbeTicket, ReconcileOutcome, UpdateTicket};
