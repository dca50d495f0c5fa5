//! Sorted-merge diff of an authoritative listing against UI children

use std::cmp::Ordering;

use tracing::debug;

use crate::provider::Entry;

use super::edit::EditSink;
use super::item::{ItemId, UiTree};

pub(crate) struct MergeResult<K> {
    /// Items matched by key, in order.
    pub kept: Vec<ItemId>,
    /// Grand-root entries that must be probed before they are shown.
    pub probes: Vec<Entry<K>>,
}

/// Sort `entries` with `compare` and drop duplicate keys.
pub(crate) fn sort_entries<K>(entries: &mut Vec<Entry<K>>, compare: &dyn Fn(&K, &K) -> Ordering) {
    entries.sort_by(|a, b| compare(&a.key, &b.key));
    entries.dedup_by(|a, b| compare(&a.key, &b.key) == Ordering::Equal);
}

/// Bring the children of `parent` in line with `entries`, which must already
/// be sorted by `compare`. Runs to completion without yielding.
///
/// Existing grand roots are kept and re-probed; absent ones are not inserted
/// here but returned for probing.
pub(crate) fn merge_children<K, S>(
    tree: &mut UiTree<K>,
    parent: ItemId,
    entries: &[Entry<K>],
    compare: &dyn Fn(&K, &K) -> Ordering,
    sink: &mut S,
) -> MergeResult<K>
where
    K: Clone,
    S: EditSink<K> + ?Sized,
{
    let mut kept = Vec::new();
    let mut probes = Vec::new();
    let mut inserted = 0usize;
    let mut removed = 0usize;

    let mut index = 0;
    let mut next = 0;
    while let Some(entry) = entries.get(next) {
        if entry.is_grand_root() && !has_child_with_key(tree, parent, &entry.key, compare) {
            probes.push(entry.clone());
            next += 1;
            continue;
        }

        let current = tree.children_of(parent).get(index).copied();
        let order = current
            .and_then(|id| tree.key_of(id))
            .map(|key| compare(&entry.key, key));

        match (current, order) {
            (Some(id), Some(Ordering::Equal)) => {
                sink.keep(parent, index, id, &entry.key);
                if entry.is_grand_root() {
                    probes.push(entry.clone());
                }
                kept.push(id);
                index += 1;
                next += 1;
            }
            (Some(id), Some(Ordering::Greater)) => {
                // The current item sorts before the entry, so it is gone.
                if let Some(key) = tree.key_of(id).cloned() {
                    tree.remove_child(parent, index);
                    sink.remove_at(parent, index, id, &key);
                    removed += 1;
                }
            }
            _ => {
                // Entry sorts before the current item, or the UI list ran out.
                let key = entry.key.clone();
                if let Some(id) =
                    tree.insert_child(parent, index, key, entry.label.clone(), entry.kind)
                {
                    sink.insert_at(parent, index, id, &entry.key);
                    inserted += 1;
                }
                index += 1;
                next += 1;
            }
        }
    }

    while let Some(id) = tree.children_of(parent).get(index).copied() {
        let Some(key) = tree.key_of(id).cloned() else {
            break;
        };
        tree.remove_child(parent, index);
        sink.remove_at(parent, index, id, &key);
        removed += 1;
    }

    let count = tree.children_of(parent).len();
    if count > 0 || probes.is_empty() {
        tree.set_child_flags(parent, count > 0);
    }

    debug!(
        %parent,
        entries = entries.len(),
        kept = kept.len(),
        inserted,
        removed,
        probes = probes.len(),
        "merged child listing"
    );

    MergeResult { kept, probes }
}

fn has_child_with_key<K>(
    tree: &UiTree<K>,
    parent: ItemId,
    key: &K,
    compare: &dyn Fn(&K, &K) -> Ordering,
) -> bool {
    tree.children_of(parent)
        .iter()
        .filter_map(|id| tree.key_of(*id))
        .any(|k| compare(k, key) == Ordering::Equal)
}
