//! Benchmark utilities for txmap.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod utils;
