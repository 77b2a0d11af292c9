//! Per-context transactions.
//!
//! A transaction gives one calling context a private copy of the shared
//! store:
//! - **Isolation**: writes are invisible to other contexts until commit
//! - **Atomicity**: a commit's removals and writes land in one step
//! - **Rollback**: discarding an overlay leaves the store untouched

mod manager;
mod overlay;

pub use manager::TransactionManager;
pub use overlay::Overlay;
