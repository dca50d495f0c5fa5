//! Configuration for directory-tree reconciliation

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// Total order shared by the sorted listing and the UI children.
pub type Comparator<K> = Arc<dyn Fn(&K, &K) -> Ordering + Send + Sync>;

/// Reconciliation behaviour.
#[derive(Debug, Clone, Default)]
pub struct ReconcileConfig {
    /// Recursive updates only descend into expanded children, and every kept
    /// child is shown with an expander whether or not it has children.
    /// Collapsing an item also collapses its children.
    pub delay_expansion: bool,
    /// Upper bound on a single child listing. `None` waits forever.
    pub fetch_timeout: Option<Duration>,
}

pub(crate) fn natural_order<K: Ord>() -> Comparator<K> {
    Arc::new(|a: &K, b: &K| a.cmp(b))
}
