//! # Elemental Development Tools
//!
//! Command-line tools for development:
//! - Settings loading from RON files
//! - Settings validation
//! - One-hit reaction simulation

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod loader;
pub mod simulate;
pub mod validate;
