//! Shared store trait definition.

use std::collections::{HashMap, HashSet};

/// The shared, globally visible key-value store.
///
/// Stores hold the state every context sees when it has no open
/// transaction. Absent keys are reported as `None`; no operation on a store
/// can fail.
///
/// # Invariants
///
/// - `put` returns the value previously stored under the key
/// - `remove` returns the removed value, or `None` if the key was absent
/// - `merge_from` applies all removals, then all writes, as one atomic step
///   with respect to every other mutating call
/// - `merge_count` increases by exactly one per `merge_from`
/// - Stores must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryStore`]
pub trait KeyValueStore<K, V>: Send + Sync {
    /// Returns a copy of the value stored under `key`.
    fn get(&self, key: &K) -> Option<V>;

    /// Inserts or overwrites `key`, returning the previous value.
    fn put(&self, key: K, value: V) -> Option<V>;

    /// Removes `key`, returning the previous value.
    fn remove(&self, key: &K) -> Option<V>;

    /// Returns true if `key` is present.
    fn contains_key(&self, key: &K) -> bool;

    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Returns true if the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns every key currently present, in no particular order.
    fn keys(&self) -> Vec<K>;

    /// Returns a point-in-time copy of all entries.
    ///
    /// The copy is taken under a single read lock, so it never observes a
    /// half-applied merge.
    fn snapshot(&self) -> HashMap<K, V>;

    /// Applies `removed` and then `writes` as a single critical section.
    ///
    /// A key present in both sets ends up present with the written value.
    ///
    /// Returns the store's merge count after this merge.
    fn merge_from(&self, removed: HashSet<K>, writes: HashMap<K, V>) -> u64;

    /// Returns the number of merges applied so far.
    fn merge_count(&self) -> u64;
}
