//! Property-based test generators using proptest.
//!
//! Keys are drawn from a small space so generated steps collide often:
//! the same key gets written, removed, and re-written across contexts.

use crate::model::{ModelKey, ModelValue, Op, Step};
use proptest::prelude::*;
use std::collections::HashMap;

/// Number of distinct keys generated operations touch.
pub const KEY_SPACE: ModelKey = 16;

/// Strategy for generating keys.
pub fn key_strategy() -> impl Strategy<Value = ModelKey> {
    0..KEY_SPACE
}

/// Strategy for generating an initial shared store.
pub fn seed_strategy() -> impl Strategy<Value = HashMap<ModelKey, ModelValue>> {
    prop::collection::hash_map(key_strategy(), any::<ModelValue>(), 0..KEY_SPACE as usize)
}

/// Strategy for generating data operations (no lifecycle calls).
pub fn data_op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (key_strategy(), any::<ModelValue>()).prop_map(|(k, v)| Op::Put(k, v)),
        2 => key_strategy().prop_map(Op::Remove),
        2 => key_strategy().prop_map(Op::Get),
        1 => Just(Op::Len),
    ]
}

/// Strategy for generating any operation, lifecycle calls included.
pub fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => data_op_strategy(),
        1 => Just(Op::Begin),
        1 => Just(Op::Commit),
        1 => Just(Op::Rollback),
    ]
}

/// Strategy for generating steps spread over `contexts` contexts.
pub fn steps_strategy(contexts: usize, len: usize) -> impl Strategy<Value = Vec<Step>> {
    prop::collection::vec(
        (0..contexts, op_strategy()).prop_map(|(context, op)| Step { context, op }),
        0..len,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    #[test]
    fn steps_stay_within_context_table() {
        let mut runner = TestRunner::default();
        let strategy = steps_strategy(3, 32);

        for _ in 0..20 {
            let steps = strategy.new_tree(&mut runner).unwrap().current();
            assert!(steps.len() < 32);
            assert!(steps.iter().all(|s| s.context < 3));
        }
    }

    #[test]
    fn keys_stay_within_key_space() {
        let mut runner = TestRunner::default();
        let strategy = data_op_strategy();

        for _ in 0..50 {
            match strategy.new_tree(&mut runner).unwrap().current() {
                Op::Put(k, _) | Op::Remove(k) | Op::Get(k) => assert!(k < KEY_SPACE),
                Op::Len => {}
                other => panic!("unexpected lifecycle op {other:?}"),
            }
        }
    }
}
