//! # txmap Testkit
//!
//! Test utilities for txmap.
//!
//! This crate provides:
//! - Seeded map fixtures
//! - A sequential reference model of transactional map semantics
//! - Property-based operation generators using proptest
//! - Concurrent stress harnesses
//!
//! ## Usage
//!
//! ```rust
//! use txmap_testkit::prelude::*;
//!
//! let map = letters_map();
//! let ctx = map.context();
//! assert_eq!(map.len(ctx), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod model;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::model::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use model::*;
pub use stress::*;
