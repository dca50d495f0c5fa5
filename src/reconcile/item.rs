//! UI items and the arena that owns them

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::provider::{NodeKind, TreeProvider};

/// Handle to a `UiItem`. Ids are never reused, so a handle to a removed item
/// stays invalid forever instead of aliasing a newer item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(usize);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// One row of the tree view.
///
/// Holds the key of the entry it shows rather than the entry itself, so the
/// host may replace entries freely between listings.
#[derive(Debug, Clone)]
pub struct UiItem<K> {
    key: K,
    label: String,
    kind: NodeKind,
    parent: Option<ItemId>,
    children: Vec<ItemId>,
    expanded: bool,
    has_children: bool,
    may_have_children: bool,
    generation: u64,
    attached: bool,
}

impl<K> UiItem<K> {
    fn new(key: K, label: String, kind: NodeKind, parent: Option<ItemId>) -> Self {
        Self {
            key,
            label,
            kind,
            parent,
            children: Vec::new(),
            expanded: false,
            has_children: false,
            may_have_children: false,
            generation: 0,
            attached: true,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    pub fn children(&self) -> &[ItemId] {
        &self.children
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn has_children(&self) -> bool {
        self.has_children
    }

    /// Shown with an expander before its children are known.
    pub fn may_have_children(&self) -> bool {
        self.may_have_children
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Arena of UI items rooted at a single, initially expanded, root item.
#[derive(Debug, Clone)]
pub struct UiTree<K> {
    items: Vec<UiItem<K>>,
    selected: Option<ItemId>,
}

impl<K> UiTree<K> {
    pub fn new(key: K, label: impl Into<String>) -> Self {
        let mut root = UiItem::new(key, label.into(), NodeKind::Directory, None);
        root.expanded = true;
        Self {
            items: vec![root],
            selected: None,
        }
    }

    pub fn root(&self) -> ItemId {
        ItemId(0)
    }

    /// The root is never detached.
    pub(crate) fn root_item(&self) -> &UiItem<K> {
        &self.items[0]
    }

    /// Attached item for `id`, or `None` if it was removed.
    pub fn get(&self, id: ItemId) -> Option<&UiItem<K>> {
        self.items.get(id.0).filter(|item| item.attached)
    }

    pub(crate) fn get_mut(&mut self, id: ItemId) -> Option<&mut UiItem<K>> {
        self.items.get_mut(id.0).filter(|item| item.attached)
    }

    pub fn is_attached(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    pub fn key_of(&self, id: ItemId) -> Option<&K> {
        self.get(id).map(|item| &item.key)
    }

    pub fn children_of(&self, id: ItemId) -> &[ItemId] {
        self.get(id).map(|item| item.children.as_slice()).unwrap_or(&[])
    }

    pub fn is_expanded(&self, id: ItemId) -> bool {
        self.get(id).is_some_and(|item| item.expanded)
    }

    pub fn set_expanded(&mut self, id: ItemId, expanded: bool) -> bool {
        match self.get_mut(id) {
            Some(item) => {
                item.expanded = expanded;
                true
            }
            None => false,
        }
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.selected.filter(|id| self.is_attached(*id))
    }

    pub fn select(&mut self, id: ItemId) -> bool {
        if self.is_attached(id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    /// Number of attached items, root included.
    pub fn len(&self) -> usize {
        self.items.iter().filter(|item| item.attached).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn depth(&self, id: ItemId) -> usize {
        let mut depth = 0;
        let mut current = self.get(id).and_then(|item| item.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.get(parent).and_then(|item| item.parent);
        }
        depth
    }

    /// Attached items in pre-order, starting at the root.
    pub fn preorder(&self) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children_of(id).iter().rev().copied());
        }
        out
    }

    /// Start an update of `id`: bumps and returns its generation.
    pub(crate) fn bump_generation(&mut self, id: ItemId) -> Option<u64> {
        let item = self.get_mut(id)?;
        item.generation += 1;
        Some(item.generation)
    }

    pub(crate) fn insert_child(
        &mut self,
        parent: ItemId,
        index: usize,
        key: K,
        label: String,
        kind: NodeKind,
    ) -> Option<ItemId> {
        if !self.is_attached(parent) {
            return None;
        }
        let id = ItemId(self.items.len());
        self.items.push(UiItem::new(key, label, kind, Some(parent)));
        let parent_item = &mut self.items[parent.0];
        let index = index.min(parent_item.children.len());
        parent_item.children.insert(index, id);
        parent_item.has_children = true;
        Some(id)
    }

    /// Remove the child at `index` of `parent` and detach its subtree.
    pub(crate) fn remove_child(&mut self, parent: ItemId, index: usize) -> Option<ItemId> {
        let parent_item = self.get_mut(parent)?;
        if index >= parent_item.children.len() {
            return None;
        }
        let removed = parent_item.children.remove(index);
        if parent_item.children.is_empty() {
            parent_item.has_children = false;
        }

        let mut pending = vec![removed];
        while let Some(id) = pending.pop() {
            let item = &mut self.items[id.0];
            item.attached = false;
            pending.extend(item.children.iter().copied());
        }
        Some(removed)
    }

    pub(crate) fn set_child_flags(&mut self, id: ItemId, has_children: bool) {
        if let Some(item) = self.get_mut(id) {
            item.has_children = has_children;
            if !has_children {
                item.expanded = false;
            }
        }
    }

    pub(crate) fn set_may_have_children(&mut self, id: ItemId, value: bool) {
        if let Some(item) = self.get_mut(id) {
            item.may_have_children = value;
        }
    }
}

impl<K: PartialEq> UiTree<K> {
    /// First attached item showing `key`, searching from the root.
    pub fn find(&self, key: &K) -> Option<ItemId> {
        self.preorder()
            .into_iter()
            .find(|id| self.key_of(*id) == Some(key))
    }

    /// Direct child of `parent` showing `key`.
    pub fn find_child(&self, parent: ItemId, key: &K) -> Option<ItemId> {
        self.children_of(parent)
            .iter()
            .copied()
            .find(|id| self.key_of(*id) == Some(key))
    }
}

impl<K> TreeProvider for UiTree<K>
where
    K: Ord + Clone + fmt::Debug,
{
    type Node = ItemId;
    type Key = K;

    fn parent(&self, node: &ItemId) -> Option<ItemId> {
        self.get(*node).and_then(|item| item.parent)
    }

    fn children(&self, node: &ItemId) -> Vec<ItemId> {
        self.children_of(*node).to_vec()
    }

    fn key(&self, node: &ItemId) -> K {
        // Callers only hand in attached ids; the root key stands in otherwise.
        self.get(*node)
            .map(|item| item.key.clone())
            .unwrap_or_else(|| self.items[0].key.clone())
    }

    fn label(&self, node: &ItemId) -> String {
        self.get(*node)
            .map(|item| item.label.clone())
            .unwrap_or_default()
    }

    fn first_child(&self, node: &ItemId) -> Option<ItemId> {
        self.children_of(*node).first().copied()
    }

    fn last_child(&self, node: &ItemId) -> Option<ItemId> {
        self.children_of(*node).last().copied()
    }
}
