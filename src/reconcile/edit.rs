//! Structural edits emitted to the presentation layer

use serde::Serialize;

use super::item::ItemId;

/// One structural change to a parent's ordered child list.
///
/// `index` is the position in the parent's children at the moment the edit
/// is applied, so edits must be replayed in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit<K> {
    Insert {
        parent: ItemId,
        index: usize,
        item: ItemId,
        key: K,
    },
    Remove {
        parent: ItemId,
        index: usize,
        item: ItemId,
        key: K,
    },
    Keep {
        parent: ItemId,
        index: usize,
        item: ItemId,
        key: K,
    },
}

impl<K> Edit<K> {
    /// `Keep` edits carry no change.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Edit::Keep { .. })
    }

    pub fn key(&self) -> &K {
        match self {
            Edit::Insert { key, .. } | Edit::Remove { key, .. } | Edit::Keep { key, .. } => key,
        }
    }

    pub fn item(&self) -> ItemId {
        match self {
            Edit::Insert { item, .. } | Edit::Remove { item, .. } | Edit::Keep { item, .. } => {
                *item
            }
        }
    }

    pub fn parent(&self) -> ItemId {
        match self {
            Edit::Insert { parent, .. }
            | Edit::Remove { parent, .. }
            | Edit::Keep { parent, .. } => *parent,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Edit::Insert { index, .. } | Edit::Remove { index, .. } | Edit::Keep { index, .. } => {
                *index
            }
        }
    }
}

/// Receiver of reconciliation edits (the tree view, a recorder, ...).
pub trait EditSink<K> {
    fn insert_at(&mut self, parent: ItemId, index: usize, item: ItemId, key: &K);

    fn remove_at(&mut self, parent: ItemId, index: usize, item: ItemId, key: &K);

    fn keep(&mut self, _parent: ItemId, _index: usize, _item: ItemId, _key: &K) {}
}

impl<K: Clone> EditSink<K> for Vec<Edit<K>> {
    fn insert_at(&mut self, parent: ItemId, index: usize, item: ItemId, key: &K) {
        self.push(Edit::Insert {
            parent,
            index,
            item,
            key: key.clone(),
        });
    }

    fn remove_at(&mut self, parent: ItemId, index: usize, item: ItemId, key: &K) {
        self.push(Edit::Remove {
            parent,
            index,
            item,
            key: key.clone(),
        });
    }

    fn keep(&mut self, parent: ItemId, index: usize, item: ItemId, key: &K) {
        self.push(Edit::Keep {
            parent,
            index,
            item,
            key: key.clone(),
        });
    }
}

/// Structural edits only.
pub fn structural<K>(edits: &[Edit<K>]) -> impl Iterator<Item = &Edit<K>> {
    edits.iter().filter(|e| e.is_structural())
}
