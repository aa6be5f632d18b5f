//! Error types for the reaction core.
//!
//! Reaction evaluation itself never fails: malformed rules, missing
//! capabilities and re-entrant calls all degrade to "no reaction applied".
//! These errors cover the operations that have a caller to report to.

use thiserror::Error;

use crate::combatant::EntityId;

/// Result type alias using [`ElementalError`].
pub type Result<T> = std::result::Result<T, ElementalError>;

/// Top-level error type for the reaction core.
#[derive(Debug, Error)]
pub enum ElementalError {
    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// Effect ID not present in the effect catalog.
    #[error("Unknown effect: {0}")]
    UnknownEffect(String),

    /// Settings text could not be parsed.
    #[error("Failed to parse reaction settings: {0}")]
    SettingsParse(#[from] ron::error::SpannedError),

    /// Max health must be finite and positive.
    #[error("Invalid max health {0}: must be finite and greater than zero")]
    InvalidMaxHealth(f32),
}
