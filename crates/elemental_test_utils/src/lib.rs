//! # Elemental Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Fixture settings and a recording combatant
//! - Determinism test harness for reaction scenarios
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
