//! Transactional map facade.

use crate::config::Config;
use crate::error::CoreResult;
use crate::session::Session;
use crate::stats::MapStats;
use crate::transaction::TransactionManager;
use crate::types::{ContextId, SequenceNumber, TransactionId};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use txmap_storage::{InMemoryStore, KeyValueStore};

/// A key-value map with per-context transactions.
///
/// Every operation names the calling context. If that context has an open
/// transaction the call is served by its private overlay; otherwise it goes
/// straight to the shared store.
///
/// The map owns its store and never hands it out, so nothing can mutate
/// shared state around the transaction-aware dispatch.
///
/// # Example
///
/// ```rust
/// use txmap_core::TransactionalMap;
///
/// let map = TransactionalMap::from_entries([("A", "1"), ("B", "2")]);
/// let (writer, reader) = (map.context(), map.context());
///
/// map.start_transaction(writer)?;
/// map.put(writer, "C", "3");
/// assert_eq!(map.len(writer), 3);
/// assert_eq!(map.get(reader, &"C"), None);
///
/// map.commit(writer)?;
/// assert_eq!(map.get(reader, &"C"), Some("3"));
/// # Ok::<(), txmap_core::CoreError>(())
/// ```
pub struct TransactionalMap<K, V, S = InMemoryStore<K, V>> {
    store: Arc<S>,
    transactions: TransactionManager<K, V, S>,
    stats: Arc<MapStats>,
    config: Config,
    next_context: AtomicU64,
}

impl<K, V> TransactionalMap<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    /// Creates an empty map with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty map with the given configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        let store = InMemoryStore::with_capacity(config.initial_capacity);
        Self::with_store(store, config)
    }

    /// Creates a map whose shared store starts with `entries`.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::with_store(entries.into_iter().collect(), Config::default())
    }
}

impl<K, V> Default for TransactionalMap<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> TransactionalMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: KeyValueStore<K, V>,
{
    /// Creates a map over an existing store.
    pub fn with_store(store: S, config: Config) -> Self {
        let store = Arc::new(store);
        let stats = Arc::new(MapStats::new());
        let transactions =
            TransactionManager::new(Arc::clone(&store), Arc::clone(&stats), config.reopen_policy);

        Self {
            store,
            transactions,
            stats,
            config,
            next_context: AtomicU64::new(1),
        }
    }

    /// Allocates a fresh calling context.
    ///
    /// Allocated IDs are never reused by this map. Callers mixing these
    /// with hand-built `ContextId`s are responsible for avoiding clashes.
    pub fn context(&self) -> ContextId {
        ContextId::new(self.next_context.fetch_add(1, Ordering::Relaxed))
    }

    /// Binds `context` to this map.
    pub fn session(&self, context: ContextId) -> Session<'_, K, V, S> {
        Session::new(self, context)
    }

    /// Allocates a fresh context and binds it to this map.
    pub fn new_session(&self) -> Session<'_, K, V, S> {
        self.session(self.context())
    }

    // === Transaction lifecycle ===

    /// Opens a transaction for `context`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::TransactionAlreadyOpen` if one is already open
    /// and the map is configured with `ReopenPolicy::Reject`. Under the
    /// default `ReopenPolicy::Replace` the open transaction is discarded
    /// and this never fails.
    pub fn start_transaction(&self, context: ContextId) -> CoreResult<TransactionId> {
        self.transactions.begin(context)
    }

    /// Merges the context's transaction into the shared store.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidState` if `context` has no open
    /// transaction.
    pub fn commit(&self, context: ContextId) -> CoreResult<SequenceNumber> {
        self.transactions.commit(context)
    }

    /// Discards the context's transaction.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidState` if `context` has no open
    /// transaction.
    pub fn rollback(&self, context: ContextId) -> CoreResult<()> {
        self.transactions.rollback(context)
    }

    /// Runs `f` inside a transaction for `context`.
    ///
    /// Commits if `f` returns `Ok`, rolls back if it returns `Err`. If `f`
    /// closes the transaction itself, the commit fails with
    /// `CoreError::InvalidState`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use txmap_core::{CoreError, TransactionalMap};
    ///
    /// let map = TransactionalMap::new();
    /// let ctx = map.context();
    ///
    /// let result: Result<(), _> = map.transaction(ctx, |tx| {
    ///     tx.put("k", 1);
    ///     Err(CoreError::transaction_aborted("changed my mind"))
    /// });
    ///
    /// assert!(result.is_err());
    /// assert_eq!(map.get(ctx, &"k"), None);
    /// ```
    pub fn transaction<F, T>(&self, context: ContextId, f: F) -> CoreResult<T>
    where
        F: FnOnce(&Session<'_, K, V, S>) -> CoreResult<T>,
    {
        self.start_transaction(context)?;

        match f(&self.session(context)) {
            Ok(value) => {
                self.commit(context)?;
                Ok(value)
            }
            Err(err) => {
                if self.in_transaction(context) {
                    self.rollback(context)?;
                }
                Err(err)
            }
        }
    }

    /// Returns true if `context` has an open transaction.
    #[must_use]
    pub fn in_transaction(&self, context: ContextId) -> bool {
        self.transactions.is_open(context)
    }

    // === Transaction-aware map operations ===

    /// Returns the value visible to `context` under `key`.
    pub fn get(&self, context: ContextId, key: &K) -> Option<V> {
        self.stats.record_read();
        self.transactions
            .with_overlay(context, |overlay| overlay.get(key).cloned())
            .unwrap_or_else(|| self.store.get(key))
    }

    /// Writes `key`, returning the value previously visible to `context`.
    pub fn put(&self, context: ContextId, key: K, value: V) -> Option<V> {
        self.stats.record_write();
        // Only consumed when an overlay is open.
        let mut pending = Some((key, value));
        let overlaid = self.transactions.with_overlay(context, |overlay| {
            pending
                .take()
                .and_then(|(key, value)| overlay.put(key, value))
        });
        match (overlaid, pending) {
            (Some(previous), _) => previous,
            (None, Some((key, value))) => self.store.put(key, value),
            (None, None) => None,
        }
    }

    /// Removes `key`, returning the value previously visible to `context`.
    pub fn remove(&self, context: ContextId, key: &K) -> Option<V> {
        self.stats.record_delete();
        self.transactions
            .with_overlay(context, |overlay| overlay.delete(key))
            .unwrap_or_else(|| self.store.remove(key))
    }

    /// Returns true if `key` is visible to `context`.
    pub fn contains_key(&self, context: ContextId, key: &K) -> bool {
        self.transactions
            .with_overlay(context, |overlay| overlay.contains_key(key))
            .unwrap_or_else(|| self.store.contains_key(key))
    }

    /// Returns the number of entries visible to `context`.
    ///
    /// Inside a transaction this is the overlay's size: the snapshot, minus
    /// removals, plus newly written keys.
    pub fn len(&self, context: ContextId) -> usize {
        self.transactions
            .with_overlay(context, |overlay| overlay.len())
            .unwrap_or_else(|| self.store.len())
    }

    /// Returns true if no entries are visible to `context`.
    pub fn is_empty(&self, context: ContextId) -> bool {
        self.len(context) == 0
    }

    /// Returns the keys visible to `context`, in no particular order.
    pub fn keys(&self, context: ContextId) -> Vec<K> {
        self.transactions
            .with_overlay(context, |overlay| overlay.keys().cloned().collect())
            .unwrap_or_else(|| self.store.keys())
    }

    /// Returns an owned copy of every entry visible to `context`.
    pub fn to_map(&self, context: ContextId) -> HashMap<K, V> {
        self.transactions
            .with_overlay(context, |overlay| {
                overlay
                    .entries()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_else(|| self.store.snapshot())
    }

    // === Introspection ===

    /// Returns the number of open transactions across all contexts.
    #[must_use]
    pub fn active_transactions(&self) -> usize {
        self.transactions.active_count()
    }

    /// Returns the sequence number of the latest commit.
    #[must_use]
    pub fn committed_seq(&self) -> SequenceNumber {
        self.transactions.committed_seq()
    }

    /// Returns the map's statistics.
    #[must_use]
    pub fn stats(&self) -> &MapStats {
        &self.stats
    }

    /// Returns the map's configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<K, V, S> fmt::Debug for TransactionalMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: KeyValueStore<K, V> + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionalMap")
            .field("store", &self.store)
            .field("active_transactions", &self.active_transactions())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReopenPolicy;
    use crate::error::CoreError;

    fn seeded() -> TransactionalMap<&'static str, &'static str> {
        TransactionalMap::from_entries([("A", "1"), ("B", "2")])
    }

    #[test]
    fn direct_put_and_get() {
        let map = TransactionalMap::new();
        let ctx = map.context();

        assert_eq!(map.put(ctx, "first", 1), None);
        assert_eq!(map.put(ctx, "second", 2), None);

        assert_eq!(map.len(ctx), 2);
        assert!(map.contains_key(ctx, &"first"));
        assert!(map.contains_key(ctx, &"second"));
    }

    #[test]
    fn contexts_are_distinct() {
        let map: TransactionalMap<u8, u8> = TransactionalMap::new();
        assert_ne!(map.context(), map.context());
    }

    #[test]
    fn put_remove_put_without_transaction() {
        let map = TransactionalMap::new();
        let ctx = map.context();

        map.put(ctx, "k", "v1");
        assert_eq!(map.remove(ctx, &"k"), Some("v1"));
        map.put(ctx, "k", "v2");

        assert_eq!(map.get(ctx, &"k"), Some("v2"));
        assert_eq!(map.len(ctx), 1);
    }

    #[test]
    fn missing_key_is_none_everywhere() {
        let map = seeded();
        let ctx = map.context();

        assert_eq!(map.get(ctx, &"nope"), None);
        assert_eq!(map.remove(ctx, &"nope"), None);

        map.start_transaction(ctx).unwrap();
        assert_eq!(map.get(ctx, &"nope"), None);
        assert_eq!(map.remove(ctx, &"nope"), None);
        map.rollback(ctx).unwrap();
    }

    #[test]
    fn transaction_sees_snapshot_and_own_writes() {
        let map = seeded();
        let ctx = map.context();

        map.start_transaction(ctx).unwrap();
        assert_eq!(map.get(ctx, &"A"), Some("1"));

        assert_eq!(map.put(ctx, "A", "10"), Some("1"));
        assert_eq!(map.get(ctx, &"A"), Some("10"));
        assert_eq!(map.len(ctx), 2);
    }

    #[test]
    fn start_put_size_commit() {
        let map = seeded();
        let t1 = map.context();

        map.start_transaction(t1).unwrap();
        map.put(t1, "C", "3");
        assert_eq!(map.len(t1), 3);
        map.commit(t1).unwrap();

        let other = map.context();
        assert_eq!(map.len(t1), 3);
        assert_eq!(map.len(other), 3);
        assert_eq!(
            map.to_map(other),
            HashMap::from([("A", "1"), ("B", "2"), ("C", "3")])
        );
    }

    #[test]
    fn start_put_rollback() {
        let map = TransactionalMap::from_entries([("A", "1")]);
        let t2 = map.context();

        map.start_transaction(t2).unwrap();
        map.put(t2, "D", "4");
        map.put(t2, "B", "2");
        map.rollback(t2).unwrap();

        assert_eq!(map.to_map(t2), HashMap::from([("A", "1")]));
        assert_eq!(map.len(t2), 1);
    }

    #[test]
    fn remove_inside_transaction_is_isolated() {
        let map = seeded();
        let (owner, other) = (map.context(), map.context());

        map.start_transaction(owner).unwrap();
        assert_eq!(map.remove(owner, &"A"), Some("1"));

        assert!(!map.contains_key(owner, &"A"));
        assert_eq!(map.len(owner), 1);
        assert_eq!(map.get(other, &"A"), Some("1"));
        assert_eq!(map.len(other), 2);

        map.commit(owner).unwrap();
        assert_eq!(map.get(other, &"A"), None);
        assert_eq!(map.keys(other), vec!["B"]);
    }

    #[test]
    fn remove_then_rollback_restores() {
        let map = seeded();
        let ctx = map.context();

        map.start_transaction(ctx).unwrap();
        map.remove(ctx, &"A");
        map.rollback(ctx).unwrap();

        assert_eq!(map.get(ctx, &"A"), Some("1"));
        assert_eq!(map.len(ctx), 2);
    }

    #[test]
    fn delete_then_reinsert_survives_commit() {
        let map = seeded();
        let ctx = map.context();

        map.start_transaction(ctx).unwrap();
        map.remove(ctx, &"A");
        map.put(ctx, "A", "again");
        map.commit(ctx).unwrap();

        assert_eq!(map.get(ctx, &"A"), Some("again"));
    }

    #[test]
    fn commit_and_rollback_without_transaction_fail() {
        let map = seeded();
        let ctx = map.context();

        for _ in 0..3 {
            assert_eq!(map.commit(ctx), Err(CoreError::not_open()));
            assert_eq!(map.rollback(ctx), Err(CoreError::not_open()));
        }
        assert_eq!(map.committed_seq(), SequenceNumber::new(0));
    }

    #[test]
    fn commit_returns_increasing_sequence() {
        let map = seeded();
        let ctx = map.context();

        map.start_transaction(ctx).unwrap();
        let s1 = map.commit(ctx).unwrap();
        map.start_transaction(ctx).unwrap();
        let s2 = map.commit(ctx).unwrap();

        assert_eq!(s2.as_u64(), s1.as_u64() + 1);
        assert_eq!(map.committed_seq(), s2);
    }

    #[test]
    fn reject_policy_keeps_open_transaction() {
        let map: TransactionalMap<&str, u32> =
            TransactionalMap::with_config(Config::new().reopen_policy(ReopenPolicy::Reject));
        let ctx = map.context();

        map.start_transaction(ctx).unwrap();
        map.put(ctx, "k", 1);

        assert_eq!(
            map.start_transaction(ctx),
            Err(CoreError::TransactionAlreadyOpen { context: ctx })
        );
        map.commit(ctx).unwrap();
        assert_eq!(map.get(ctx, &"k"), Some(1));
    }

    #[test]
    fn replace_policy_discards_open_transaction() {
        let map: TransactionalMap<&str, u32> = TransactionalMap::new();
        let ctx = map.context();

        map.start_transaction(ctx).unwrap();
        map.put(ctx, "lost", 1);
        map.start_transaction(ctx).unwrap();
        map.commit(ctx).unwrap();

        assert_eq!(map.get(ctx, &"lost"), None);
        assert_eq!(map.stats().transactions_replaced(), 1);
        assert_eq!(map.stats().active_transactions(), 0);
    }

    #[test]
    fn transaction_closure_commits_on_ok() {
        let map = seeded();
        let ctx = map.context();

        let seen = map
            .transaction(ctx, |tx| {
                tx.put("C", "3");
                Ok(tx.len())
            })
            .unwrap();

        assert_eq!(seen, 3);
        assert!(!map.in_transaction(ctx));
        assert_eq!(map.get(ctx, &"C"), Some("3"));
    }

    #[test]
    fn transaction_closure_rolls_back_on_err() {
        let map = seeded();
        let ctx = map.context();

        let result: CoreResult<()> = map.transaction(ctx, |tx| {
            tx.remove(&"A");
            Err(CoreError::transaction_aborted("test"))
        });

        assert_eq!(result, Err(CoreError::transaction_aborted("test")));
        assert!(!map.in_transaction(ctx));
        assert_eq!(map.get(ctx, &"A"), Some("1"));
        assert_eq!(map.stats().transactions_rolled_back(), 1);
    }

    #[test]
    fn transaction_closure_that_commits_itself_fails() {
        let map = seeded();
        let ctx = map.context();

        let result = map.transaction(ctx, |tx| {
            tx.put("C", "3");
            tx.commit().map(|_| ())
        });

        assert!(matches!(result, Err(CoreError::InvalidState { .. })));
        assert_eq!(map.get(ctx, &"C"), Some("3"));
    }

    #[test]
    fn stats_track_operations() {
        let map = seeded();
        let ctx = map.context();

        map.get(ctx, &"A");
        map.start_transaction(ctx).unwrap();
        map.put(ctx, "C", "3");
        map.remove(ctx, &"B");
        map.commit(ctx).unwrap();

        let stats = map.stats().snapshot();
        assert_eq!(stats.reads, 1);
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.deletes, 1);
        assert_eq!(stats.transactions_started, 1);
        assert_eq!(stats.transactions_committed, 1);
        assert_eq!(stats.active_transactions, 0);
    }
}
