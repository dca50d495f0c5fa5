//! In-memory tree provider
//!
//! `ArenaTree` stores nodes in a flat vector and addresses them with
//! `NodeId`. It is the simplest way to hand a tree to the walker or the
//! reconciler: hosts can mirror their own structure into it, and tests build
//! fixtures from indented outlines.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use crate::error::{OutlineError, ProviderError};
use crate::provider::{Entry, EntryProvider, NodeKind, TreeProvider};

const INDENT: usize = 2;
const GRAND_ROOT_MARKER: char = '*';

/// Handle to a node in an `ArenaTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct ArenaNode {
    key: String,
    label: String,
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    removed: bool,
}

/// Ordered tree of string-keyed nodes with a single root.
#[derive(Debug, Clone)]
pub struct ArenaTree {
    nodes: Vec<ArenaNode>,
    by_key: HashMap<String, NodeId>,
}

impl ArenaTree {
    /// Create a tree with a single root node whose key and label are `key`.
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let mut by_key = HashMap::new();
        by_key.insert(key.clone(), NodeId(0));
        Self {
            nodes: vec![ArenaNode {
                label: key.clone(),
                key,
                kind: NodeKind::Directory,
                parent: None,
                children: Vec::new(),
                removed: false,
            }],
            by_key,
        }
    }

    /// Parse an indented outline: one node per line, two spaces per level.
    /// A trailing `*` marks the node as a grand root. Blank lines are ignored.
    ///
    /// ```
    /// use grove::ArenaTree;
    ///
    /// let tree = ArenaTree::from_outline("root\n  a\n    b\n  groups*\n").unwrap();
    /// assert!(tree.find("b").is_some());
    /// ```
    pub fn from_outline(text: &str) -> Result<Self, OutlineError> {
        let mut tree: Option<ArenaTree> = None;
        // Last node seen at each depth.
        let mut stack: Vec<NodeId> = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            if raw.trim().is_empty() {
                continue;
            }
            let indent = raw.len() - raw.trim_start_matches(' ').len();
            if indent % INDENT != 0 {
                return Err(OutlineError::OddIndent { line });
            }
            let depth = indent / INDENT;
            let name = raw.trim();
            let (key, kind) = match name.strip_suffix(GRAND_ROOT_MARKER) {
                Some(stripped) => (stripped.trim_end(), NodeKind::GrandRoot),
                None => (name, NodeKind::Directory),
            };

            if tree.is_none() {
                if depth != 0 {
                    return Err(OutlineError::IndentJump { line });
                }
                let mut arena = ArenaTree::new(key);
                arena.nodes[0].kind = kind;
                stack.push(arena.root());
                tree = Some(arena);
                continue;
            }
            let Some(arena) = tree.as_mut() else {
                continue;
            };

            if depth == 0 {
                return Err(OutlineError::MultipleRoots { line });
            }
            if depth > stack.len() {
                return Err(OutlineError::IndentJump { line });
            }
            stack.truncate(depth);
            let parent = stack[depth - 1];
            if arena.by_key.contains_key(key) {
                return Err(OutlineError::DuplicateKey {
                    line,
                    key: key.to_string(),
                });
            }
            let id = arena.push_node(parent, key.to_string(), key.to_string(), kind);
            stack.push(id);
        }

        tree.ok_or(OutlineError::Empty)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a directory child. Returns `None` if the parent is gone or the
    /// key already exists.
    pub fn add_child(&mut self, parent: NodeId, key: impl Into<String>) -> Option<NodeId> {
        self.add_child_with(parent, key, NodeKind::Directory)
    }

    pub fn add_grand_root(&mut self, parent: NodeId, key: impl Into<String>) -> Option<NodeId> {
        self.add_child_with(parent, key, NodeKind::GrandRoot)
    }

    fn add_child_with(
        &mut self,
        parent: NodeId,
        key: impl Into<String>,
        kind: NodeKind,
    ) -> Option<NodeId> {
        let key = key.into();
        if !self.contains(parent) || self.by_key.contains_key(&key) {
            return None;
        }
        Some(self.push_node(parent, key.clone(), key, kind))
    }

    fn push_node(&mut self, parent: NodeId, key: String, label: String, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(ArenaNode {
            key: key.clone(),
            label,
            kind,
            parent: Some(parent),
            children: Vec::new(),
            removed: false,
        });
        self.nodes[parent.0].children.push(id);
        self.by_key.insert(key, id);
        id
    }

    /// Detach `node` and its whole subtree. The root cannot be removed.
    pub fn remove(&mut self, node: NodeId) -> bool {
        if node == self.root() || !self.contains(node) {
            return false;
        }
        if let Some(parent) = self.nodes[node.0].parent {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            let entry = &mut self.nodes[id.0];
            entry.removed = true;
            entry.parent = None;
            pending.extend(entry.children.drain(..));
            let key = entry.key.clone();
            self.by_key.remove(&key);
        }
        true
    }

    pub fn rename_label(&mut self, node: NodeId, label: impl Into<String>) -> bool {
        match self.node_mut(node) {
            Some(n) => {
                n.label = label.into();
                true
            }
            None => false,
        }
    }

    pub fn find(&self, key: &str) -> Option<NodeId> {
        self.by_key.get(key).copied()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.get(node.0).is_some_and(|n| !n.removed)
    }

    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.node(node).map(|n| n.kind)
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Depth of `node` below the root (root is 0).
    pub fn depth(&self, node: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.node(node).and_then(|n| n.parent);
        while let Some(id) = current {
            depth += 1;
            current = self.node(id).and_then(|n| n.parent);
        }
        depth
    }

    fn node(&self, id: NodeId) -> Option<&ArenaNode> {
        self.nodes.get(id.0).filter(|n| !n.removed)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut ArenaNode> {
        self.nodes.get_mut(id.0).filter(|n| !n.removed)
    }
}

impl TreeProvider for ArenaTree {
    type Node = NodeId;
    type Key = String;

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.node(*node).and_then(|n| n.parent)
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.node(*node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn key(&self, node: &NodeId) -> String {
        self.node(*node).map(|n| n.key.clone()).unwrap_or_default()
    }

    fn label(&self, node: &NodeId) -> String {
        self.node(*node).map(|n| n.label.clone()).unwrap_or_default()
    }

    fn first_child(&self, node: &NodeId) -> Option<NodeId> {
        self.node(*node).and_then(|n| n.children.first().copied())
    }

    fn last_child(&self, node: &NodeId) -> Option<NodeId> {
        self.node(*node).and_then(|n| n.children.last().copied())
    }
}

#[async_trait]
impl EntryProvider for ArenaTree {
    type Key = String;

    async fn list_children(&self, key: &String) -> Result<Vec<Entry<String>>, ProviderError> {
        let id = self
            .find(key)
            .ok_or_else(|| ProviderError::NotFound(key.clone()))?;
        Ok(self
            .children(&id)
            .into_iter()
            .filter_map(|c| self.node(c))
            .map(|n| Entry {
                key: n.key.clone(),
                label: n.label.clone(),
                kind: n.kind,
            })
            .collect())
    }

    fn parent_key(&self, key: &String) -> Option<String> {
        let id = self.find(key)?;
        self.parent(&id).map(|p| TreeProvider::key(self, &p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_outline_builds_structure() {
        let tree = ArenaTree::from_outline("1\n  2\n    3\n      4\n    5\n  6\n").unwrap();
        let n2 = tree.find("2").unwrap();
        let labels: Vec<String> = tree.children(&n2).iter().map(|c| tree.label(c)).collect();
        assert_eq!(labels, vec!["3", "5"]);
        assert_eq!(tree.depth(tree.find("4").unwrap()), 3);
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn test_from_outline_grand_root_marker() {
        let tree = ArenaTree::from_outline("drive\n  my\n  shared*\n").unwrap();
        let shared = tree.find("shared").unwrap();
        assert_eq!(tree.kind(shared), Some(NodeKind::GrandRoot));
    }

    #[test]
    fn test_from_outline_errors() {
        assert_eq!(
            ArenaTree::from_outline("a\n    b\n").unwrap_err(),
            OutlineError::IndentJump { line: 2 }
        );
        assert_eq!(
            ArenaTree::from_outline("a\n   b\n").unwrap_err(),
            OutlineError::OddIndent { line: 2 }
        );
        assert_eq!(
            ArenaTree::from_outline("a\n  b\n  b\n").unwrap_err(),
            OutlineError::DuplicateKey {
                line: 3,
                key: "b".to_string()
            }
        );
        assert_eq!(
            ArenaTree::from_outline("a\nb\n").unwrap_err(),
            OutlineError::MultipleRoots { line: 2 }
        );
        assert_eq!(ArenaTree::from_outline("\n\n").unwrap_err(), OutlineError::Empty);
    }

    #[test]
    fn test_siblings_and_removal() {
        let mut tree = ArenaTree::new("root");
        let root = tree.root();
        let a = tree.add_child(root, "a").unwrap();
        let b = tree.add_child(root, "b").unwrap();
        let c = tree.add_child(root, "c").unwrap();
        assert_eq!(tree.next_sibling(&a), Some(b));
        assert_eq!(tree.previous_sibling(&c), Some(b));
        assert_eq!(tree.previous_sibling(&a), None);

        assert!(tree.remove(b));
        assert_eq!(tree.next_sibling(&a), Some(c));
        assert!(!tree.contains(b));
        assert_eq!(tree.next_sibling(&b), None);
        assert!(tree.find("b").is_none());
        assert!(!tree.remove(root));
    }

    #[test]
    fn test_add_child_rejects_duplicates() {
        let mut tree = ArenaTree::new("root");
        let root = tree.root();
        assert!(tree.add_child(root, "a").is_some());
        assert!(tree.add_child(root, "a").is_none());
    }

    #[test]
    fn test_is_ancestor() {
        let tree = ArenaTree::from_outline("1\n  2\n    3\n  4\n").unwrap();
        let one = tree.find("1").unwrap();
        let three = tree.find("3").unwrap();
        let four = tree.find("4").unwrap();
        assert!(tree.is_ancestor(&one, &three));
        assert!(!tree.is_ancestor(&four, &three));
        assert!(!tree.is_ancestor(&three, &three));
    }

    #[tokio::test]
    async fn test_list_children_as_entries() {
        let tree = ArenaTree::from_outline("root\n  a\n  g*\n").unwrap();
        let entries = tree.list_children(&"root".to_string()).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], Entry::new("a".to_string(), "a"));
        assert!(entries[1].is_grand_root());
        assert_eq!(tree.parent_key(&"a".to_string()), Some("root".to_string()));
        assert_eq!(tree.parent_key(&"root".to_string()), None);

        let err = tree.list_children(&"missing".to_string()).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }
}
