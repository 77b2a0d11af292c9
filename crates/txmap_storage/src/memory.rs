//! In-memory shared store.

use crate::store::KeyValueStore;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

struct Inner<K, V> {
    entries: HashMap<K, V>,
    merges: u64,
}

/// An in-memory shared store.
///
/// Entries live in a `HashMap` behind a single `RwLock`. Reads share the
/// lock; direct mutations and merges take it exclusively, which makes every
/// merge linearizable with respect to other merges and direct writes.
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use txmap_storage::{InMemoryStore, KeyValueStore};
///
/// let store = InMemoryStore::new();
/// assert_eq!(store.put("k", "v1"), None);
/// assert_eq!(store.put("k", "v2"), Some("v1"));
/// assert_eq!(store.len(), 1);
/// ```
pub struct InMemoryStore<K, V> {
    inner: RwLock<Inner<K, V>>,
}

impl<K, V> InMemoryStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new empty store pre-sized for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_entries(HashMap::with_capacity(capacity))
    }

    /// Creates a store holding the given entries.
    ///
    /// Useful for seeding state in tests.
    #[must_use]
    pub fn with_entries(entries: HashMap<K, V>) -> Self {
        Self {
            inner: RwLock::new(Inner { entries, merges: 0 }),
        }
    }
}

impl<K, V> Default for InMemoryStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for InMemoryStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::with_entries(iter.into_iter().collect())
    }
}

impl<K, V> fmt::Debug for InMemoryStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("InMemoryStore")
            .field("len", &inner.entries.len())
            .field("merges", &inner.merges)
            .finish()
    }
}

impl<K, V> KeyValueStore<K, V> for InMemoryStore<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> Option<V> {
        self.inner.read().entries.get(key).cloned()
    }

    fn put(&self, key: K, value: V) -> Option<V> {
        self.inner.write().entries.insert(key, value)
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.inner.write().entries.remove(key)
    }

    fn contains_key(&self, key: &K) -> bool {
        self.inner.read().entries.contains_key(key)
    }

    fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    fn keys(&self) -> Vec<K> {
        self.inner.read().entries.keys().cloned().collect()
    }

    fn snapshot(&self) -> HashMap<K, V> {
        self.inner.read().entries.clone()
    }

    fn merge_from(&self, removed: HashSet<K>, writes: HashMap<K, V>) -> u64 {
        let removals = removed.len();
        let write_count = writes.len();

        let mut inner = self.inner.write();
        // Removals first so a delete-then-reinsert keeps the written value.
        for key in &removed {
            inner.entries.remove(key);
        }
        inner.entries.extend(writes);
        inner.merges += 1;

        tracing::trace!(
            merge = inner.merges,
            removals,
            writes = write_count,
            "merged into shared store"
        );
        inner.merges
    }

    fn merge_count(&self) -> u64 {
        self.inner.read().merges
    }
}
