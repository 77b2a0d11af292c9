//! Sequential reference model.
//!
//! `ModelMap` restates the transactional map's semantics with plain
//! `HashMap`s and no concurrency. Property tests drive the same steps
//! through the model and a real [`TransactionalMap`] and compare every
//! outcome.

use std::collections::{HashMap, HashSet};
use txmap_core::{ContextId, TransactionalMap};

/// Key type used by generated operations.
pub type ModelKey = u8;
/// Value type used by generated operations.
pub type ModelValue = u16;
/// Map type the model is compared against.
pub type ModelSubject = TransactionalMap<ModelKey, ModelValue>;

/// One map operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Start a transaction.
    Begin,
    /// Commit the open transaction.
    Commit,
    /// Roll back the open transaction.
    Rollback,
    /// Write a key.
    Put(ModelKey, ModelValue),
    /// Remove a key.
    Remove(ModelKey),
    /// Read a key.
    Get(ModelKey),
    /// Read the visible size.
    Len,
}

/// An operation issued by one of several contexts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Index into the caller's context table.
    pub context: usize,
    /// The operation.
    pub op: Op,
}

/// The observable result of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Lifecycle call succeeded.
    Done,
    /// Lifecycle call failed because nothing was open.
    NotOpen,
    /// Value returned by put, remove, or get.
    Value(Option<ModelValue>),
    /// Visible size.
    Len(usize),
}

#[derive(Debug, Clone)]
struct ModelTxn {
    view: HashMap<ModelKey, ModelValue>,
    written: HashSet<ModelKey>,
    removed: HashSet<ModelKey>,
}

/// Sequential model of a transactional map with the default reopen policy.
#[derive(Debug, Clone, Default)]
pub struct ModelMap {
    store: HashMap<ModelKey, ModelValue>,
    open: HashMap<usize, ModelTxn>,
}

impl ModelMap {
    /// Creates a model whose shared store starts with `entries`.
    pub fn new(entries: HashMap<ModelKey, ModelValue>) -> Self {
        Self {
            store: entries,
            open: HashMap::new(),
        }
    }

    /// Returns the model's shared store.
    pub fn store(&self) -> &HashMap<ModelKey, ModelValue> {
        &self.store
    }

    /// Applies one step and returns its outcome.
    pub fn apply(&mut self, step: &Step) -> Outcome {
        let ctx = step.context;
        match &step.op {
            Op::Begin => {
                let txn = ModelTxn {
                    view: self.store.clone(),
                    written: HashSet::new(),
                    removed: HashSet::new(),
                };
                self.open.insert(ctx, txn);
                Outcome::Done
            }
            Op::Commit => match self.open.remove(&ctx) {
                Some(txn) => {
                    for key in &txn.removed {
                        self.store.remove(key);
                    }
                    for key in &txn.written {
                        if let Some(value) = txn.view.get(key) {
                            self.store.insert(*key, *value);
                        }
                    }
                    Outcome::Done
                }
                None => Outcome::NotOpen,
            },
            Op::Rollback => match self.open.remove(&ctx) {
                Some(_) => Outcome::Done,
                None => Outcome::NotOpen,
            },
            Op::Put(key, value) => Outcome::Value(match self.open.get_mut(&ctx) {
                Some(txn) => {
                    txn.removed.remove(key);
                    txn.written.insert(*key);
                    txn.view.insert(*key, *value)
                }
                None => self.store.insert(*key, *value),
            }),
            Op::Remove(key) => Outcome::Value(match self.open.get_mut(&ctx) {
                Some(txn) => {
                    txn.written.remove(key);
                    txn.removed.insert(*key);
                    txn.view.remove(key)
                }
                None => self.store.remove(key),
            }),
            Op::Get(key) => Outcome::Value(match self.open.get(&ctx) {
                Some(txn) => txn.view.get(key).copied(),
                None => self.store.get(key).copied(),
            }),
            Op::Len => Outcome::Len(match self.open.get(&ctx) {
                Some(txn) => txn.view.len(),
                None => self.store.len(),
            }),
        }
    }
}

/// Applies one step to a real map, using `contexts[step.context]`.
pub fn apply_to_map(map: &ModelSubject, contexts: &[ContextId], step: &Step) -> Outcome {
    let ctx = contexts[step.context];
    match &step.op {
        Op::Begin => match map.start_transaction(ctx) {
            Ok(_) => Outcome::Done,
            Err(_) => Outcome::NotOpen,
        },
        Op::Commit => match map.commit(ctx) {
            Ok(_) => Outcome::Done,
            Err(_) => Outcome::NotOpen,
        },
        Op::Rollback => match map.rollback(ctx) {
            Ok(()) => Outcome::Done,
            Err(_) => Outcome::NotOpen,
        },
        Op::Put(key, value) => Outcome::Value(map.put(ctx, *key, *value)),
        Op::Remove(key) => Outcome::Value(map.remove(ctx, key)),
        Op::Get(key) => Outcome::Value(map.get(ctx, key)),
        Op::Len => Outcome::Len(map.len(ctx)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(context: usize, op: Op) -> Step {
        Step { context, op }
    }

    #[test]
    fn model_commit_applies_removals_before_writes() {
        let mut model = ModelMap::new(HashMap::from([(1, 10)]));
        model.apply(&step(0, Op::Begin));
        model.apply(&step(0, Op::Remove(1)));
        model.apply(&step(0, Op::Put(1, 11)));
        assert_eq!(model.apply(&step(0, Op::Commit)), Outcome::Done);
        assert_eq!(model.store(), &HashMap::from([(1, 11)]));
    }

    #[test]
    fn model_and_map_agree_on_scripted_steps() {
        let map = ModelSubject::from_entries([(1, 10), (2, 20)]);
        let contexts = [map.context(), map.context()];
        let mut model = ModelMap::new(HashMap::from([(1, 10), (2, 20)]));

        let steps = [
            step(0, Op::Begin),
            step(0, Op::Put(3, 30)),
            step(1, Op::Get(3)),
            step(0, Op::Len),
            step(1, Op::Remove(1)),
            step(0, Op::Get(1)),
            step(0, Op::Commit),
            step(1, Op::Commit),
            step(1, Op::Len),
        ];

        for s in &steps {
            assert_eq!(apply_to_map(&map, &contexts, s), model.apply(s), "{s:?}");
        }
        assert_eq!(&map.to_map(contexts[1]), model.store());
    }
}
