//! Context-bound handle to a transactional map.

use crate::error::CoreResult;
use crate::map::TransactionalMap;
use crate::types::{ContextId, SequenceNumber, TransactionId};
use std::collections::HashMap;
use std::hash::Hash;
use txmap_storage::KeyValueStore;

/// A [`TransactionalMap`] bound to one calling context.
///
/// Sessions are cheap borrowed handles: every call forwards to the map with
/// the bound `ContextId`. Dropping a session does not close its
/// transaction; the overlay lives in the map until commit or rollback.
///
/// # Example
///
/// ```rust
/// use txmap_core::TransactionalMap;
///
/// let map = TransactionalMap::new();
/// let session = map.new_session();
///
/// session.start_transaction()?;
/// session.put("k", "v");
/// session.commit()?;
///
/// assert_eq!(map.new_session().get(&"k"), Some("v"));
/// # Ok::<(), txmap_core::CoreError>(())
/// ```
pub struct Session<'a, K, V, S> {
    map: &'a TransactionalMap<K, V, S>,
    context: ContextId,
}

impl<'a, K, V, S> Session<'a, K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: KeyValueStore<K, V>,
{
    pub(crate) fn new(map: &'a TransactionalMap<K, V, S>, context: ContextId) -> Self {
        Self { map, context }
    }

    /// Returns the bound context.
    #[must_use]
    pub fn context(&self) -> ContextId {
        self.context
    }

    /// See [`TransactionalMap::start_transaction`].
    pub fn start_transaction(&self) -> CoreResult<TransactionId> {
        self.map.start_transaction(self.context)
    }

    /// See [`TransactionalMap::commit`].
    pub fn commit(&self) -> CoreResult<SequenceNumber> {
        self.map.commit(self.context)
    }

    /// See [`TransactionalMap::rollback`].
    pub fn rollback(&self) -> CoreResult<()> {
        self.map.rollback(self.context)
    }

    /// Returns true if the bound context has an open transaction.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.map.in_transaction(self.context)
    }

    /// See [`TransactionalMap::get`].
    pub fn get(&self, key: &K) -> Option<V> {
        self.map.get(self.context, key)
    }

    /// See [`TransactionalMap::put`].
    pub fn put(&self, key: K, value: V) -> Option<V> {
        self.map.put(self.context, key, value)
    }

    /// See [`TransactionalMap::remove`].
    pub fn remove(&self, key: &K) -> Option<V> {
        self.map.remove(self.context, key)
    }

    /// See [`TransactionalMap::contains_key`].
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(self.context, key)
    }

    /// See [`TransactionalMap::len`].
    pub fn len(&self) -> usize {
        self.map.len(self.context)
    }

    /// See [`TransactionalMap::is_empty`].
    pub fn is_empty(&self) -> bool {
        self.map.is_empty(self.context)
    }

    /// See [`TransactionalMap::keys`].
    pub fn keys(&self) -> Vec<K> {
        self.map.keys(self.context)
    }

    /// See [`TransactionalMap::to_map`].
    pub fn to_map(&self) -> HashMap<K, V> {
        self.map.to_map(self.context)
    }
}

impl<K, V, S> Clone for Session<'_, K, V, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, S> Copy for Session<'_, K, V, S> {}
