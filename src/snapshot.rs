//! JSON snapshots of a UI tree
//!
//! A snapshot records the shown structure and which items were expanded, so
//! a later run can start from the same view and reconcile it against the
//! current state of the provider.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::provider::NodeKind;
use crate::reconcile::{ItemId, UiItem, UiTree};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "K: Deserialize<'de>"))]
pub struct Snapshot<K> {
    pub taken_at: DateTime<Utc>,
    pub root: SnapshotItem<K>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "K: Deserialize<'de>"))]
pub struct SnapshotItem<K> {
    pub key: K,
    pub label: String,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub expanded: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotItem<K>>,
}

impl<K: Clone> UiTree<K> {
    pub fn to_snapshot(&self) -> Snapshot<K> {
        Snapshot {
            taken_at: Utc::now(),
            root: self.snapshot_item(self.root_item()),
        }
    }

    fn snapshot_item(&self, item: &UiItem<K>) -> SnapshotItem<K> {
        SnapshotItem {
            key: item.key().clone(),
            label: item.label().to_string(),
            kind: item.kind(),
            expanded: item.is_expanded(),
            children: item
                .children()
                .iter()
                .filter_map(|child| self.get(*child))
                .map(|child| self.snapshot_item(child))
                .collect(),
        }
    }
}

impl<K> UiTree<K> {
    /// Rebuild a tree from a snapshot. Item ids are assigned afresh.
    pub fn from_snapshot(snapshot: Snapshot<K>) -> Self {
        let SnapshotItem {
            key,
            label,
            expanded,
            children,
            ..
        } = snapshot.root;
        let mut tree = UiTree::new(key, label);
        let root = tree.root();
        tree.set_expanded(root, expanded);

        let mut pending: Vec<(ItemId, Vec<SnapshotItem<K>>)> = vec![(root, children)];
        while let Some((parent, children)) = pending.pop() {
            for (index, child) in children.into_iter().enumerate() {
                let Some(id) = tree.insert_child(parent, index, child.key, child.label, child.kind)
                else {
                    continue;
                };
                tree.set_expanded(id, child.expanded);
                if !child.children.is_empty() {
                    pending.push((id, child.children));
                }
            }
        }
        tree
    }
}

pub fn write_snapshot<K: Serialize>(
    path: &Path,
    snapshot: &Snapshot<K>,
) -> Result<(), SnapshotError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_snapshot<K: DeserializeOwned>(path: &Path) -> Result<Snapshot<K>, SnapshotError> {
    let text = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}
