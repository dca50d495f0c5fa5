//! Update and probe tickets
//!
//! A ticket is taken synchronously before a listing is fetched and handed
//! back when the listing arrives. Taking a ticket bumps the item's
//! generation, so only the newest ticket for an item may apply; older ones
//! (and tickets for items removed in the meantime) come back as stale.

use crate::provider::Entry;

use super::item::ItemId;

/// Pending child listing for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTicket<K> {
    pub(crate) item: ItemId,
    pub(crate) generation: u64,
    pub(crate) key: K,
    pub(crate) recursive: bool,
}

impl<K> UpdateTicket<K> {
    pub fn item(&self) -> ItemId {
        self.item
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }
}

/// Pending emptiness probe for a grand-root entry of `parent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTicket<K> {
    pub(crate) parent: ItemId,
    pub(crate) parent_generation: u64,
    pub(crate) entry: Entry<K>,
}

impl<K> ProbeTicket<K> {
    pub fn parent(&self) -> ItemId {
        self.parent
    }

    pub fn key(&self) -> &K {
        &self.entry.key
    }

    pub fn entry(&self) -> &Entry<K> {
        &self.entry
    }
}

/// Work left after a merge: child listings to recurse into and grand roots
/// to probe. Both may be fetched concurrently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome<K> {
    pub follow_ups: Vec<UpdateTicket<K>>,
    pub probes: Vec<ProbeTicket<K>>,
}

impl<K> ReconcileOutcome<K> {
    pub fn is_empty(&self) -> bool {
        self.follow_ups.is_empty() && self.probes.is_empty()
    }

    pub fn extend(&mut self, other: ReconcileOutcome<K>) {
        self.follow_ups.extend(other.follow_ups);
        self.probes.extend(other.probes);
    }
}

impl<K> Default for ReconcileOutcome<K> {
    fn default() -> Self {
        Self {
            follow_ups: Vec::new(),
            probes: Vec::new(),
        }
    }
}

/// Result of handing a listing back with its ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome<K> {
    Applied(ReconcileOutcome<K>),
    /// The item was removed or a newer update began; nothing was changed.
    Stale,
}
