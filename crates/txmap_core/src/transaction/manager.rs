//! Transaction manager.

use crate::config::ReopenPolicy;
use crate::error::{CoreError, CoreResult};
use crate::stats::MapStats;
use crate::transaction::overlay::Overlay;
use crate::types::{ContextId, SequenceNumber, TransactionId};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use txmap_storage::KeyValueStore;

/// Manages per-context transaction overlays over a shared store.
///
/// The manager provides:
/// - At most one open overlay per context
/// - Snapshot isolation: an overlay is a private copy of the store
/// - Atomic commit via the store's `merge_from`
/// - Commit ordering via sequence numbers
///
/// ## Locking
///
/// The overlay registry lock is held only to find, insert, or remove a
/// context's entry. Each overlay sits behind its own mutex; only the owning
/// context ever takes it, so it is never contended. Commits remove the
/// overlay from the registry first and only then take the store's write
/// lock, so the registry lock is never held while waiting on the store.
pub struct TransactionManager<K, V, S> {
    /// Shared store overlays are opened from and merged into.
    store: Arc<S>,
    stats: Arc<MapStats>,
    reopen_policy: ReopenPolicy,
    /// Next transaction ID.
    next_txid: AtomicU64,
    /// Open overlays by owning context.
    overlays: RwLock<HashMap<ContextId, Mutex<Overlay<K, V>>>>,
}

impl<K, V, S> TransactionManager<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: KeyValueStore<K, V>,
{
    /// Creates a new transaction manager.
    pub fn new(store: Arc<S>, stats: Arc<MapStats>, reopen_policy: ReopenPolicy) -> Self {
        Self {
            store,
            stats,
            reopen_policy,
            next_txid: AtomicU64::new(1),
            overlays: RwLock::new(HashMap::new()),
        }
    }

    /// Opens a transaction for `context`.
    ///
    /// The overlay is a copy of the store at this instant. If the context
    /// already has an open transaction, the reopen policy decides whether
    /// the old overlay is discarded or this call fails.
    pub fn begin(&self, context: ContextId) -> CoreResult<TransactionId> {
        let snapshot = self.store.snapshot();

        let mut overlays = self.overlays.write();
        if self.reopen_policy == ReopenPolicy::Reject && overlays.contains_key(&context) {
            return Err(CoreError::TransactionAlreadyOpen { context });
        }
        let txid = TransactionId::new(self.next_txid.fetch_add(1, Ordering::SeqCst));
        let replaced = overlays
            .insert(context, Mutex::new(Overlay::open(txid, snapshot)))
            .map(|previous| previous.into_inner());
        // Under the registry lock, so a racing commit never decrements first.
        self.stats.record_transaction_start();
        if replaced.is_some() {
            self.stats.record_transaction_replaced();
        }
        drop(overlays);

        if let Some(previous) = replaced {
            tracing::warn!(
                %context,
                discarded = %previous.id(),
                pending_writes = previous.write_count(),
                pending_removals = previous.removal_count(),
                "open transaction replaced by a new one"
            );
        }
        tracing::debug!(%context, txid = %txid, "transaction started");

        Ok(txid)
    }

    /// Commits the context's transaction into the shared store.
    ///
    /// Removals are applied before writes, in one critical section of the
    /// store. Returns the sequence number of the commit.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidState` if the context has no open
    /// transaction.
    pub fn commit(&self, context: ContextId) -> CoreResult<SequenceNumber> {
        let overlay = self.take(context)?;
        let txid = overlay.id();
        let (removed, writes) = overlay.into_parts();
        let (removals, write_count) = (removed.len(), writes.len());

        let sequence = SequenceNumber::new(self.store.merge_from(removed, writes));

        self.stats.record_transaction_commit();
        tracing::debug!(
            %context,
            txid = %txid,
            %sequence,
            removals,
            writes = write_count,
            "transaction committed"
        );

        Ok(sequence)
    }

    /// Discards the context's transaction without touching the store.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidState` if the context has no open
    /// transaction.
    pub fn rollback(&self, context: ContextId) -> CoreResult<()> {
        let overlay = self.take(context)?;

        self.stats.record_transaction_rollback();
        tracing::debug!(%context, txid = %overlay.id(), "transaction rolled back");

        Ok(())
    }

    /// Runs `f` against the context's overlay, if one is open.
    ///
    /// Returns `None` when the context has no open transaction; the caller
    /// then falls through to the shared store.
    pub fn with_overlay<R>(
        &self,
        context: ContextId,
        f: impl FnOnce(&mut Overlay<K, V>) -> R,
    ) -> Option<R> {
        let overlays = self.overlays.read();
        let overlay = overlays.get(&context)?;
        let mut guard = overlay.lock();
        Some(f(&mut guard))
    }

    /// Returns true if the context has an open transaction.
    #[must_use]
    pub fn is_open(&self, context: ContextId) -> bool {
        self.overlays.read().contains_key(&context)
    }

    /// Returns the ID of the context's open transaction.
    #[must_use]
    pub fn current(&self, context: ContextId) -> Option<TransactionId> {
        self.with_overlay(context, |overlay| overlay.id())
    }

    /// Returns the number of open transactions.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.overlays.read().len()
    }

    /// Returns the sequence number of the latest commit.
    #[must_use]
    pub fn committed_seq(&self) -> SequenceNumber {
        SequenceNumber::new(self.store.merge_count())
    }

    /// Detaches the context's overlay from the registry.
    fn take(&self, context: ContextId) -> CoreResult<Overlay<K, V>> {
        self.overlays
            .write()
            .remove(&context)
            .map(|overlay| overlay.into_inner())
            .ok_or_else(CoreError::not_open)
    }
}
