//! Effect definitions for data-driven effects.

use serde::{Deserialize, Serialize};

/// Data-driven effect definition.
///
/// Applying an effect first adjusts the target's tags, then routes `damage`
/// (if positive) through the incoming-damage meta attribute.
///
/// # Example RON
///
/// ```ron
/// EffectData(
///     id: "GE_Explosion",
///     damage: 40.0,
///     removed_tags: ["Status.Oil"],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectData {
    /// Unique effect identifier, referenced by reaction rules.
    pub id: String,

    /// Damage dealt to the target.
    #[serde(default)]
    pub damage: f32,

    /// Tags granted to the target.
    #[serde(default)]
    pub granted_tags: Vec<String>,

    /// Tags removed from the target.
    #[serde(default)]
    pub removed_tags: Vec<String>,
}

impl EffectData {
    /// Create a plain damage effect.
    #[must_use]
    pub fn damage(id: &str, damage: f32) -> Self {
        Self {
            id: id.to_string(),
            damage,
            granted_tags: Vec::new(),
            removed_tags: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let effect: EffectData = ron::from_str(r#"(id: "GE_Oil", granted_tags: ["Status.Oil"])"#)
            .unwrap();
        assert_eq!(effect.damage, 0.0);
        assert_eq!(effect.granted_tags, vec!["Status.Oil".to_string()]);
        assert!(effect.removed_tags.is_empty());
    }

    #[test]
    fn test_damage_constructor() {
        let effect = EffectData::damage("GE_Damage", 30.0);
        assert_eq!(effect.id, "GE_Damage");
        assert_eq!(effect.damage, 30.0);
        assert!(effect.granted_tags.is_empty());
    }
}
