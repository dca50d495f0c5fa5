//! DirectoryTree - keeps a UI tree in sync with an entry provider

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::{ProviderError, ReconcileError, SnapshotError};
use crate::provider::{Entry, EntryProvider, TreeProvider};
use crate::snapshot::Snapshot;
use crate::walker::{Direction, Restrictions, TreeWalker};

use super::config::{Comparator, ReconcileConfig, natural_order};
use super::edit::EditSink;
use super::item::{ItemId, UiTree};
use super::merge::{merge_children, sort_entries};
use super::ticket::{ApplyOutcome, ProbeTicket, ReconcileOutcome, UpdateTicket};

/// Kind of change reported by a watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Deleted,
}

/// Entries that were created or deleted underneath the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryChange<K> {
    pub kind: ChangeKind,
    pub keys: Vec<K>,
}

/// A UI tree mirrored from an `EntryProvider`.
///
/// All mutation goes through `&mut self`, so merges never interleave. Fetches
/// issued by one call run concurrently and are applied one at a time as they
/// complete. Hosts that run their own event loop can use the ticket API
/// (`begin_update`, `apply_listing`, `apply_probe`) instead of the async
/// operations.
pub struct DirectoryTree<P: EntryProvider> {
    provider: P,
    tree: UiTree<P::Key>,
    config: ReconcileConfig,
    compare: Comparator<P::Key>,
}

impl<P: EntryProvider> DirectoryTree<P> {
    /// Create a tree showing only `root`, expanded and not yet listed.
    pub fn new(provider: P, root: Entry<P::Key>, config: ReconcileConfig) -> Self {
        Self {
            provider,
            tree: UiTree::new(root.key, root.label),
            config,
            compare: natural_order(),
        }
    }

    /// Restore a tree previously captured with `snapshot`. The snapshot must
    /// be rooted at `expected_root`.
    pub fn from_snapshot(
        provider: P,
        expected_root: &P::Key,
        snapshot: Snapshot<P::Key>,
        config: ReconcileConfig,
    ) -> Result<Self, SnapshotError> {
        if snapshot.root.key != *expected_root {
            return Err(SnapshotError::RootMismatch);
        }
        Ok(Self {
            provider,
            tree: UiTree::from_snapshot(snapshot),
            config,
            compare: natural_order(),
        })
    }

    /// Replace the child order. Must agree with the order the provider
    /// sorts by.
    pub fn with_comparator(
        mut self,
        compare: impl Fn(&P::Key, &P::Key) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.compare = Arc::new(compare);
        self
    }

    pub fn tree(&self) -> &UiTree<P::Key> {
        &self.tree
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn root(&self) -> ItemId {
        self.tree.root()
    }

    pub fn snapshot(&self) -> Snapshot<P::Key> {
        self.tree.to_snapshot()
    }

    pub fn get_item_by_key(&self, key: &P::Key) -> Option<ItemId> {
        self.tree.find(key)
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.tree.selected()
    }

    /// Take a ticket for a new listing of `item`. Any older ticket for the
    /// same item becomes stale.
    pub fn begin_update(
        &mut self,
        item: ItemId,
        recursive: bool,
    ) -> Result<UpdateTicket<P::Key>, ReconcileError> {
        let key = self
            .tree
            .key_of(item)
            .cloned()
            .ok_or(ReconcileError::Detached(item))?;
        let generation = self
            .tree
            .bump_generation(item)
            .ok_or(ReconcileError::Detached(item))?;
        Ok(UpdateTicket {
            item,
            generation,
            key,
            recursive,
        })
    }

    /// True if `ticket` is still the newest one for a live item.
    pub fn is_current(&self, ticket: &UpdateTicket<P::Key>) -> bool {
        self.tree
            .get(ticket.item)
            .is_some_and(|item| item.generation() == ticket.generation)
    }

    /// Merge a listing fetched for `ticket`.
    pub fn apply_listing<S>(
        &mut self,
        ticket: UpdateTicket<P::Key>,
        entries: Vec<Entry<P::Key>>,
        sink: &mut S,
    ) -> ApplyOutcome<P::Key>
    where
        S: EditSink<P::Key> + ?Sized,
    {
        if !self.is_current(&ticket) {
            debug!(item = %ticket.item, key = ?ticket.key, "discarding stale listing");
            return ApplyOutcome::Stale;
        }
        ApplyOutcome::Applied(self.merge_into(ticket.item, entries, ticket.recursive, sink))
    }

    /// Apply the child listing of a probed grand root: show it when the
    /// listing is non-empty, drop it otherwise.
    pub fn apply_probe<S>(
        &mut self,
        ticket: ProbeTicket<P::Key>,
        entries: Vec<Entry<P::Key>>,
        sink: &mut S,
    ) -> ApplyOutcome<P::Key>
    where
        S: EditSink<P::Key> + ?Sized,
    {
        let parent = ticket.parent;
        let current = self
            .tree
            .get(parent)
            .is_some_and(|item| item.generation() == ticket.parent_generation);
        if !current {
            debug!(%parent, key = ?ticket.entry.key, "discarding stale probe");
            return ApplyOutcome::Stale;
        }

        let entry = ticket.entry;
        let existing = self.tree.find_child(parent, &entry.key);
        let mut outcome = ReconcileOutcome::default();

        match (existing, entries.is_empty()) {
            (None, false) => {
                let index = self.sorted_position(parent, &entry.key);
                let key = entry.key.clone();
                if let Some(id) = self
                    .tree
                    .insert_child(parent, index, key, entry.label, entry.kind)
                {
                    sink.insert_at(parent, index, id, &entry.key);
                    debug!(%parent, key = ?entry.key, "showing non-empty grand root");
                    if let Ok(follow_up) = self.begin_update(id, false) {
                        outcome.follow_ups.push(follow_up);
                    }
                }
            }
            (Some(id), true) => {
                if let Some(index) = self.tree.children_of(parent).iter().position(|c| *c == id) {
                    self.tree.remove_child(parent, index);
                    sink.remove_at(parent, index, id, &entry.key);
                    debug!(%parent, key = ?entry.key, "dropping empty grand root");
                }
            }
            _ => {}
        }
        // A parent left without children collapses.
        if self.tree.children_of(parent).is_empty() {
            self.tree.set_child_flags(parent, false);
        }

        ApplyOutcome::Applied(outcome)
    }

    /// Merge `entries` into the children of `item` synchronously. The
    /// returned outcome lists the follow-up work; nothing is fetched here.
    pub fn reconcile<S>(
        &mut self,
        item: ItemId,
        entries: Vec<Entry<P::Key>>,
        recursive: bool,
        sink: &mut S,
    ) -> Result<ReconcileOutcome<P::Key>, ReconcileError>
    where
        S: EditSink<P::Key> + ?Sized,
    {
        let ticket = self.begin_update(item, recursive)?;
        Ok(self.merge_into(ticket.item, entries, recursive, sink))
    }

    /// Fetch the children of `item`, merge them, then keep fetching and
    /// merging the follow-up work until none is left.
    ///
    /// Only the first listing can fail the call. Failures further down are
    /// logged and leave that part of the tree as it was.
    pub async fn update_sub_directories<S>(
        &mut self,
        item: ItemId,
        recursive: bool,
        sink: &mut S,
    ) -> Result<(), ReconcileError>
    where
        S: EditSink<P::Key> + ?Sized,
    {
        let ticket = self.begin_update(item, recursive)?;
        let entries = fetch(&self.provider, &ticket.key, self.config.fetch_timeout)
            .await
            .map_err(|source| ReconcileError::Provider {
                key: format!("{:?}", ticket.key),
                source,
            })?;
        if let ApplyOutcome::Applied(outcome) = self.apply_listing(ticket, entries, sink) {
            self.drive(outcome, sink).await;
        }
        Ok(())
    }

    /// Expand `item` and list it recursively. On failure the item is left
    /// collapsed.
    pub async fn expand<S>(&mut self, item: ItemId, sink: &mut S) -> Result<(), ReconcileError>
    where
        S: EditSink<P::Key> + ?Sized,
    {
        if !self.tree.set_expanded(item, true) {
            return Err(ReconcileError::Detached(item));
        }
        if let Err(err) = self.update_sub_directories(item, true, sink).await {
            self.tree.set_expanded(item, false);
            return Err(err);
        }
        Ok(())
    }

    /// Collapse `item`. With `delay_expansion` its children collapse too, so
    /// reopening it does not trigger a deep update.
    pub fn collapse(&mut self, item: ItemId) -> bool {
        if !self.tree.set_expanded(item, false) {
            return false;
        }
        if self.config.delay_expansion {
            let children = self.tree.children_of(item).to_vec();
            for child in children {
                self.tree.set_expanded(child, false);
            }
        }
        true
    }

    /// Refresh the root.
    pub async fn redraw<S>(&mut self, recursive: bool, sink: &mut S) -> Result<(), ReconcileError>
    where
        S: EditSink<P::Key> + ?Sized,
    {
        let root = self.tree.root();
        self.update_sub_directories(root, recursive, sink).await
    }

    /// Refresh the item showing `key`, if any.
    pub async fn update_item_by_key<S>(
        &mut self,
        key: &P::Key,
        sink: &mut S,
    ) -> Result<(), ReconcileError>
    where
        S: EditSink<P::Key> + ?Sized,
    {
        match self.tree.find(key) {
            Some(item) => self.update_sub_directories(item, false, sink).await,
            None => Ok(()),
        }
    }

    /// React to entries created or deleted underneath the provider by
    /// refreshing their shown parents, each at most once.
    ///
    /// A deleted entry whose parent can no longer be resolved triggers a
    /// recursive redraw.
    pub async fn on_entries_changed<S>(
        &mut self,
        change: EntryChange<P::Key>,
        sink: &mut S,
    ) -> Result<(), ReconcileError>
    where
        S: EditSink<P::Key> + ?Sized,
    {
        let mut parents = BTreeSet::new();
        let mut redraw = false;
        for key in &change.keys {
            match self.provider.parent_key(key) {
                Some(parent) => {
                    parents.insert(parent);
                }
                None if change.kind == ChangeKind::Deleted => redraw = true,
                None => {}
            }
        }

        if redraw {
            debug!(keys = change.keys.len(), "unresolved deletion, redrawing");
            return self.redraw(true, sink).await;
        }

        for parent in parents {
            if let Some(item) = self.tree.find(&parent) {
                self.update_sub_directories(item, false, sink).await?;
            }
        }
        Ok(())
    }

    /// Select the item for `key`, listing and expanding its ancestors until
    /// it is shown. Returns `None` if `key` cannot be reached from any shown
    /// item.
    pub async fn reveal<S>(
        &mut self,
        key: &P::Key,
        sink: &mut S,
    ) -> Result<Option<ItemId>, ReconcileError>
    where
        S: EditSink<P::Key> + ?Sized,
    {
        if let Some(item) = self.tree.find(key) {
            self.tree.select(item);
            return Ok(Some(item));
        }

        let mut pending = vec![key.clone()];
        let mut anchor = None;
        let mut current = self.provider.parent_key(key);
        while let Some(parent) = current {
            if let Some(item) = self.tree.find(&parent) {
                anchor = Some(item);
                break;
            }
            current = self.provider.parent_key(&parent);
            pending.push(parent);
        }
        let Some(mut item) = anchor else {
            return Ok(None);
        };

        while let Some(next) = pending.pop() {
            if self.tree.find_child(item, &next).is_none() {
                if self.tree.is_expanded(item) {
                    self.update_sub_directories(item, false, sink).await?;
                } else {
                    self.expand(item, sink).await?;
                }
            }
            match self.tree.find_child(item, &next) {
                Some(child) => item = child,
                None => return Ok(None),
            }
        }

        self.tree.select(item);
        Ok(Some(item))
    }

    /// Refresh every expanded item non-recursively, parents first. Items
    /// whose listing fails are logged and skipped. Returns the number of
    /// items refreshed.
    pub async fn refresh_expanded<S>(&mut self, sink: &mut S) -> Result<usize, ReconcileError>
    where
        S: EditSink<P::Key> + ?Sized,
    {
        let expanded = self.expanded_items();
        let mut refreshed = 0;
        for item in expanded {
            // A parent refreshed earlier may have removed it.
            if !self.tree.is_expanded(item) {
                continue;
            }
            match self.update_sub_directories(item, false, sink).await {
                Ok(()) => refreshed += 1,
                Err(err) => warn!(%item, error = %err, "failed to refresh expanded item"),
            }
        }
        Ok(refreshed)
    }

    fn expanded_items(&self) -> Vec<ItemId> {
        let tree = &self.tree;
        let root = tree.root();
        if !tree.is_expanded(root) {
            return Vec::new();
        }
        let restrictions = Restrictions::new()
            .leaf(move |id: &ItemId| !tree.is_expanded(*id))
            .visit(move |id: &ItemId| tree.is_expanded(*id));
        let walker = TreeWalker::new(tree, root, Direction::Forward, restrictions);
        std::iter::once(root)
            .chain(walker.filter_map(|state| state.node))
            .collect()
    }

    fn merge_into<S>(
        &mut self,
        item: ItemId,
        mut entries: Vec<Entry<P::Key>>,
        recursive: bool,
        sink: &mut S,
    ) -> ReconcileOutcome<P::Key>
    where
        S: EditSink<P::Key> + ?Sized,
    {
        let compare = Arc::clone(&self.compare);
        sort_entries(&mut entries, &*compare);

        let parent_generation = self
            .tree
            .get(item)
            .map(|i| i.generation())
            .unwrap_or_default();
        let result = merge_children(&mut self.tree, item, &entries, &*compare, sink);

        let delay = self.config.delay_expansion;
        let descend = recursive && self.tree.is_expanded(item);
        let mut outcome = ReconcileOutcome::default();
        for child in result.kept {
            if delay {
                self.tree.set_may_have_children(child, true);
            }
            if descend && (!delay || self.tree.is_expanded(child)) {
                if let Ok(ticket) = self.begin_update(child, true) {
                    outcome.follow_ups.push(ticket);
                }
            }
        }
        outcome.probes = result
            .probes
            .into_iter()
            .map(|entry| ProbeTicket {
                parent: item,
                parent_generation,
                entry,
            })
            .collect();
        outcome
    }

    fn sorted_position(&self, parent: ItemId, key: &P::Key) -> usize {
        let children = self.tree.children_of(parent);
        children.partition_point(|id| {
            self.tree
                .key_of(*id)
                .is_some_and(|k| (self.compare)(k, key) == Ordering::Less)
        })
    }

    async fn drive<S>(&mut self, mut outcome: ReconcileOutcome<P::Key>, sink: &mut S)
    where
        S: EditSink<P::Key> + ?Sized,
    {
        while !outcome.is_empty() {
            let ReconcileOutcome { follow_ups, probes } = std::mem::take(&mut outcome);
            let provider = &self.provider;
            let limit = self.config.fetch_timeout;

            let listings = join_all(follow_ups.into_iter().map(|ticket| async move {
                let result = fetch(provider, &ticket.key, limit).await;
                (ticket, result)
            }));
            let probed = join_all(probes.into_iter().map(|ticket| async move {
                let result = fetch(provider, &ticket.entry.key, limit).await;
                (ticket, result)
            }));
            let (listings, mut probed) = futures::join!(listings, probed);
            // Empty probes last, so a parent still gaining a group is not collapsed.
            probed.sort_by_key(|(_, result)| matches!(result, Ok(entries) if entries.is_empty()));

            for (ticket, result) in listings {
                match result {
                    Ok(entries) => {
                        let applied = self.apply_listing(ticket, entries, sink);
                        if let ApplyOutcome::Applied(next) = applied {
                            outcome.extend(next);
                        }
                    }
                    Err(err) => {
                        warn!(key = ?ticket.key, error = %err, "failed to list children")
                    }
                }
            }
            for (ticket, result) in probed {
                match result {
                    Ok(entries) => {
                        let applied = self.apply_probe(ticket, entries, sink);
                        if let ApplyOutcome::Applied(next) = applied {
                            outcome.extend(next);
                        }
                    }
                    Err(err) => {
                        warn!(key = ?ticket.entry.key, error = %err, "failed to probe grand root")
                    }
                }
            }
        }
    }
}

async fn fetch<P: EntryProvider>(
    provider: &P,
    key: &P::Key,
    limit: Option<Duration>,
) -> Result<Vec<Entry<P::Key>>, ProviderError> {
    match limit {
        Some(limit) => match tokio::time::timeout(limit, provider.list_children(key)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(limit)),
        },
        None => provider.list_children(key).await,
    }
}

impl<P: EntryProvider> TreeProvider for DirectoryTree<P> {
    type Node = ItemId;
    type Key = P::Key;

    fn parent(&self, node: &ItemId) -> Option<ItemId> {
        self.tree.parent(node)
    }

    fn children(&self, node: &ItemId) -> Vec<ItemId> {
        self.tree.children(node)
    }

    fn key(&self, node: &ItemId) -> P::Key {
        TreeProvider::key(&self.tree, node)
    }

    fn label(&self, node: &ItemId) -> String {
        self.tree.label(node)
    }
}
