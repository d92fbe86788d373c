//! # WireDB Testkit
//!
//! Test utilities for WireDB.
//!
//! This crate provides:
//! - Deterministic codec fixtures and temporary segment logs
//! - Property-based generators for every value variant
//! - Golden file helpers and pinned segment vectors
//! - Concurrency stress helpers for the atomic counter
//!
//! ## Usage
//!
//! ```rust
//! use wiredb_testkit::prelude::*;
//! use wiredb_core::Number;
//!
//! let fixture = CodecFixture::new();
//! let segment = fixture.codec.build_live("k", &Number::new(1), 0).unwrap();
//! assert_eq!(segment.created_at(), FIXED_START);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod golden;
pub mod stress;
pub mod vectors;

#[cfg(test)]
mod integration;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::golden::*;
    pub use crate::stress::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use golden::*;
pub use stress::*;
pub use vectors::*;
