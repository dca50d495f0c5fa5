//! Grove - ordered tree walking and directory-tree reconciliation
//!
//! - `walker`: a restartable pre-order cursor over any `TreeProvider`
//! - `reconcile`: keeps a UI tree in sync with an asynchronous `EntryProvider`
//! - `arena`, `fs`: ready-made providers for in-memory and on-disk trees

pub mod arena;
pub mod error;
pub mod fs;
pub mod output;
pub mod provider;
pub mod reconcile;
pub mod snapshot;
pub mod walker;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use arena::{ArenaTree, NodeId};
pub use error::{OutlineError, ProviderError, ReconcileError, SnapshotError};
pub use fs::{FsConfig, FsTree};
pub use output::{
    EditFormatter, OutputConfig, TreeFormatter, VisitRecord, WalkFormatter, collect_visits,
    print_json,
};
pub use provider::{Entry, EntryProvider, NodeKind, TreeProvider, node_depth};
pub use reconcile::{
    ApplyOutcome, ChangeKind, Comparator, DirectoryTree, Edit, EditSink, EntryChange, ItemId,
    ProbeTicket, ReconcileConfig, ReconcileOutcome, UiItem, UiTree, UpdateTicket, structural,
};
pub use snapshot::{Snapshot, SnapshotItem, read_snapshot, write_snapshot};
pub use walker::{Direction, Phase, Restrictions, TreeWalker, WalkerState};
