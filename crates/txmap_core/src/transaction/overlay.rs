//! Transaction overlay state.

use crate::types::TransactionId;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// A context's private view of the shared store during a transaction.
///
/// The overlay starts as a full copy of the store and is then mutated in
/// place. Once open it never consults the store again: every read by the
/// owning context resolves against `entries`.
///
/// Alongside the copy the overlay tracks which keys were written and which
/// were removed, so a commit only pushes this transaction's own changes.
#[derive(Debug)]
pub struct Overlay<K, V> {
    id: TransactionId,
    /// Snapshot copy with this transaction's changes applied.
    entries: HashMap<K, V>,
    /// Keys written since open. Always present in `entries`.
    written: HashSet<K>,
    /// Keys removed since open and not written again afterwards.
    removed: HashSet<K>,
}

impl<K, V> Overlay<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Opens an overlay over a snapshot of the shared store.
    pub(crate) fn open(id: TransactionId, snapshot: HashMap<K, V>) -> Self {
        Self {
            id,
            entries: snapshot,
            written: HashSet::new(),
            removed: HashSet::new(),
        }
    }

    /// Returns the transaction ID.
    #[must_use]
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Reads a key from the overlay view.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Writes a key, returning the value previously visible to this overlay.
    ///
    /// Clears any removal mark so a removed-then-put key reappears on commit.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.removed.remove(&key);
        self.written.insert(key.clone());
        self.entries.insert(key, value)
    }

    /// Deletes a key, returning the value previously visible to this overlay.
    ///
    /// The removal is recorded even if the key is absent from the overlay,
    /// so the commit also deletes a copy another context may have inserted
    /// into the store since this overlay was opened.
    pub fn delete(&mut self, key: &K) -> Option<V> {
        self.written.remove(key);
        self.removed.insert(key.clone());
        self.entries.remove(key)
    }

    /// Returns true if the key is visible in the overlay.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns true if the key is marked removed in this transaction.
    #[must_use]
    pub fn is_removed(&self, key: &K) -> bool {
        self.removed.contains(key)
    }

    /// Returns the number of visible entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entries are visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the visible keys.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Iterates the visible entries.
    pub fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    /// Returns the number of keys written in this transaction.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.written.len()
    }

    /// Returns the number of keys removed in this transaction.
    #[must_use]
    pub fn removal_count(&self) -> usize {
        self.removed.len()
    }

    /// Consumes the overlay into the `(removed, writes)` pair a commit merges.
    pub(crate) fn into_parts(mut self) -> (HashSet<K>, HashMap<K, V>) {
        let writes = self
            .written
            .into_iter()
            .filter_map(|key| self.entries.remove_entry(&key))
            .collect();
        (self.removed, writes)
    }
}
