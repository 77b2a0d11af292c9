//! # txmap Core
//!
//! Per-context transactions over a shared key-value map.
//!
//! This crate provides:
//! - [`TransactionalMap`]: the map facade, dispatching each call to the
//!   caller's open transaction or to the shared store
//! - [`Overlay`]: one context's private snapshot-plus-diff
//! - [`TransactionManager`]: the registry of open overlays and the commit path
//! - [`Session`]: a map handle bound to one calling context
//!
//! Calling contexts are explicit [`ContextId`] tokens rather than ambient
//! thread identity, so the same map serves OS threads, pooled workers, and
//! async tasks alike.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod map;
mod session;
mod stats;
pub mod transaction;
mod types;

pub use config::{Config, ReopenPolicy};
pub use error::{CoreError, CoreResult};
pub use map::TransactionalMap;
pub use session::Session;
pub use stats::{MapStats, StatsSnapshot};
pub use transaction::{Overlay, TransactionManager};
pub use txmap_storage::{InMemoryStore, KeyValueStore};
pub use types::{ContextId, SequenceNumber, TransactionId};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
