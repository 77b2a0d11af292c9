//! Benchmark utilities.

use rand::Rng;
use txmap_core::TransactionalMap;

/// Generate `count` random keys.
pub fn random_keys(count: usize) -> Vec<u64> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| rng.gen()).collect()
}

/// Generate `count` random key-value pairs.
pub fn random_entries(count: usize) -> Vec<(u64, u64)> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| (rng.gen(), rng.gen())).collect()
}

/// Build a map whose shared store holds `size` sequential entries.
pub fn populated_map(size: u64) -> TransactionalMap<u64, u64> {
    TransactionalMap::from_entries((0..size).map(|i| (i, i)))
}
