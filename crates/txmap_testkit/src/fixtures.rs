//! Map fixtures for tests.

use std::sync::Arc;
use txmap_core::{Config, TransactionalMap};

/// Map type used by the numeric fixtures and stress harnesses.
pub type NumericMap = TransactionalMap<u64, u64>;

/// Returns a map seeded with `{"A": "1", "B": "2"}`.
pub fn letters_map() -> TransactionalMap<String, String> {
    TransactionalMap::from_entries([
        ("A".to_string(), "1".to_string()),
        ("B".to_string(), "2".to_string()),
    ])
}

/// Returns a map seeded with keys `0..count`, each mapped to itself.
pub fn numeric_map(count: u64) -> NumericMap {
    TransactionalMap::from_entries((0..count).map(|i| (i, i)))
}

/// Returns a shareable empty numeric map built from `config`.
pub fn shared_map(config: Config) -> Arc<NumericMap> {
    Arc::new(TransactionalMap::with_config(config))
}
