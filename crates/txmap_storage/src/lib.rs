//! # txmap Storage
//!
//! Shared key-value store for txmap.
//!
//! This crate provides the globally visible state that transactions are
//! layered on top of. A store is a plain key to value mapping; it knows
//! nothing about transactions, contexts, or overlays.
//!
//! ## Design Principles
//!
//! - Stores are simple keyed maps (get, put, remove, merge)
//! - All methods take `&self` and synchronize internally
//! - A merge is one critical section: no other mutation interleaves with it
//! - Must be `Send + Sync` for concurrent access
//!
//! ## Available Stores
//!
//! - [`InMemoryStore`] - `HashMap` guarded by a reader-writer lock
//!
//! ## Example
//!
//! ```rust
//! use std::collections::{HashMap, HashSet};
//! use txmap_storage::{InMemoryStore, KeyValueStore};
//!
//! let store = InMemoryStore::new();
//! store.put("a", 1);
//! store.put("b", 2);
//!
//! let removed = HashSet::from(["a"]);
//! let writes = HashMap::from([("c", 3)]);
//! store.merge_from(removed, writes);
//!
//! assert_eq!(store.get(&"a"), None);
//! assert_eq!(store.get(&"c"), Some(3));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod memory;
mod store;

pub use memory::InMemoryStore;
pub use store::KeyValueStore;
