//! Shared utilities.
//!
//! Content hashing, log dumping, and test helpers.

pub mod dump;
pub mod hash;
