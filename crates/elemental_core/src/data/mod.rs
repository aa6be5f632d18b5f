//! Data structures for reaction configuration.
//!
//! This module contains pure data structures that define reaction rules,
//! effects and equipment. All structs are designed to be deserialized from
//! RON files.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by `elemental_tools`.

mod effect_data;
mod equipment_data;
mod rule_data;
mod settings;

pub use effect_data::EffectData;
pub use equipment_data::EquipmentData;
pub use rule_data::ReactionRuleData;
pub use settings::ReactionSettings;

/// Normalize a tag name or ID from settings: surrounding whitespace is
/// dropped and a blank value counts as unset.
///
/// Every consumer of settings text (validation, rule building, catalogs)
/// goes through this, so a value validates exactly as it behaves at runtime.
#[must_use]
pub fn normalize_id(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
