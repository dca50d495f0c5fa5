//! Provider traits through which the walker and the reconciler see a tree
//!
//! The tree itself is owned elsewhere (a host application, the filesystem,
//! an in-memory arena). Two views are exposed:
//!
//! - `TreeProvider`: synchronous structural access, used by `TreeWalker`
//! - `EntryProvider`: asynchronous child listing, used by `DirectoryTree`

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Synchronous, read-only access to an externally owned ordered tree.
///
/// Only `parent`, `children`, `key` and `label` are required. The sibling
/// helpers are derived from them and treat a node that cannot be found
/// among its parent's children as gone, returning `None`.
pub trait TreeProvider {
    type Node: Clone + PartialEq + Debug;
    type Key: Ord + Clone + Debug;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn key(&self, node: &Self::Node) -> Self::Key;

    fn label(&self, node: &Self::Node) -> String;

    fn first_child(&self, node: &Self::Node) -> Option<Self::Node> {
        self.children(node).into_iter().next()
    }

    fn last_child(&self, node: &Self::Node) -> Option<Self::Node> {
        self.children(node).pop()
    }

    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node> {
        let parent = self.parent(node)?;
        let siblings = self.children(&parent);
        let position = siblings.iter().position(|c| c == node)?;
        siblings.into_iter().nth(position + 1)
    }

    fn previous_sibling(&self, node: &Self::Node) -> Option<Self::Node> {
        let parent = self.parent(node)?;
        let siblings = self.children(&parent);
        let position = siblings.iter().position(|c| c == node)?;
        position
            .checked_sub(1)
            .and_then(|i| siblings.into_iter().nth(i))
    }

    fn has_children(&self, node: &Self::Node) -> bool {
        self.first_child(node).is_some()
    }

    /// Returns true if `ancestor` is a strict ancestor of `node`.
    fn is_ancestor(&self, ancestor: &Self::Node, node: &Self::Node) -> bool {
        let mut current = self.parent(node);
        while let Some(n) = current {
            if &n == ancestor {
                return true;
            }
            current = self.parent(&n);
        }
        false
    }
}

/// Number of ancestors of `node` in `provider`.
pub fn node_depth<P: TreeProvider + ?Sized>(provider: &P, node: &P::Node) -> usize {
    let mut depth = 0;
    let mut current = provider.parent(node);
    while let Some(parent) = current {
        depth += 1;
        current = provider.parent(&parent);
    }
    depth
}

/// Closed set of item variants. Chosen when an entry is listed and never
/// changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    #[default]
    Directory,
    /// Synthetic grouping that is only shown while it has at least one child.
    GrandRoot,
}

/// One authoritative child descriptor returned by an `EntryProvider`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry<K> {
    pub key: K,
    pub label: String,
    #[serde(default)]
    pub kind: NodeKind,
}

impl<K> Entry<K> {
    pub fn new(key: K, label: impl Into<String>) -> Self {
        Self {
            key,
            label: label.into(),
            kind: NodeKind::Directory,
        }
    }

    pub fn grand_root(key: K, label: impl Into<String>) -> Self {
        Self {
            key,
            label: label.into(),
            kind: NodeKind::GrandRoot,
        }
    }

    pub fn is_grand_root(&self) -> bool {
        self.kind == NodeKind::GrandRoot
    }
}

/// Asynchronous child listing for the reconciler.
///
/// `list_children` returns the complete listing for `key`. Batching, if the
/// underlying source delivers results in chunks, happens inside the
/// provider.
#[async_trait]
pub trait EntryProvider: Send + Sync {
    type Key: Ord + Clone + Debug + Send + Sync;

    async fn list_children(&self, key: &Self::Key)
    -> Result<Vec<Entry<Self::Key>>, ProviderError>;

    /// Key of the parent entry, or `None` at the top of the provider.
    fn parent_key(&self, key: &Self::Key) -> Option<Self::Key>;
}
