//! Top-level reaction settings.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::effect_data::EffectData;
use super::equipment_data::EquipmentData;
use super::rule_data::ReactionRuleData;
use super::normalize_id;
use crate::error::Result;

/// Complete reaction configuration.
///
/// Loaded once at startup. Rule order is evaluation order.
///
/// # Example RON
///
/// ```ron
/// ReactionSettings(
///     reaction_rules: [
///         ReactionRuleData(
///             source_tag: Some("Element.Fire"),
///             target_tag: Some("Status.Oil"),
///             reaction_effect: Some("GE_Explosion"),
///         ),
///     ],
///     effects: [
///         EffectData(id: "GE_Explosion", damage: 40.0),
///     ],
///     equipment: [],
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionSettings {
    /// Ordered reaction rules.
    #[serde(default)]
    pub reaction_rules: Vec<ReactionRuleData>,

    /// Effect catalog.
    #[serde(default)]
    pub effects: Vec<EffectData>,

    /// Equipment catalog.
    #[serde(default)]
    pub equipment: Vec<EquipmentData>,
}

impl ReactionSettings {
    /// Parse settings from RON text.
    pub fn from_ron(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    /// Find an effect by its ID.
    #[must_use]
    pub fn get_effect(&self, id: &str) -> Option<&EffectData> {
        let id = normalize_id(id)?;
        self.effects.iter().find(|e| normalize_id(&e.id) == Some(id))
    }

    /// Find equipment by its ID.
    #[must_use]
    pub fn get_equipment(&self, id: &str) -> Option<&EquipmentData> {
        let id = normalize_id(id)?;
        self.equipment.iter().find(|e| normalize_id(&e.id) == Some(id))
    }

    /// Rules with all three fields set.
    pub fn complete_rules(&self) -> impl Iterator<Item = &ReactionRuleData> {
        self.reaction_rules.iter().filter(|r| r.is_complete())
    }

    /// Validate internal consistency of the settings.
    ///
    /// Checks for:
    /// - Rules referencing effects missing from a non-empty effect catalog
    /// - Duplicate rules
    /// - Duplicate effect and equipment IDs
    /// - Negative or non-finite damage
    ///
    /// Incomplete rules are not errors; see [`Self::warnings`].
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut seen_rules = HashSet::new();
        for (index, rule) in self.reaction_rules.iter().enumerate() {
            if !rule.is_complete() {
                continue;
            }

            if !seen_rules.insert((rule.source(), rule.target(), rule.effect())) {
                errors.push(format!(
                    "Reaction rule {index} duplicates an earlier rule ({})",
                    rule.describe()
                ));
            }

            // An empty catalog means effects are provided by the host.
            if !self.effects.is_empty() {
                if let Some(effect) = rule.effect() {
                    if self.get_effect(effect).is_none() {
                        errors.push(format!(
                            "Reaction rule {index} applies unknown effect '{effect}'"
                        ));
                    }
                }
            }
        }

        let mut seen_effects = HashSet::new();
        for effect in &self.effects {
            if !seen_effects.insert(normalize_id(&effect.id)) {
                errors.push(format!("Duplicate effect ID '{}'", effect.id));
            }
            if !effect.damage.is_finite() || effect.damage < 0.0 {
                errors.push(format!(
                    "Effect '{}' has invalid damage {}",
                    effect.id, effect.damage
                ));
            }
        }

        let mut seen_equipment = HashSet::new();
        for item in &self.equipment {
            if !seen_equipment.insert(normalize_id(&item.id)) {
                errors.push(format!("Duplicate equipment ID '{}'", item.id));
            }
        }

        errors
    }

    /// Non-fatal problems: rules that will load but never fire.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        self.reaction_rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| !rule.is_complete())
            .map(|(index, rule)| {
                format!(
                    "Reaction rule {index} is inert, missing {}",
                    rule.missing_fields().join(", ")
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_settings() -> ReactionSettings {
        ReactionSettings {
            reaction_rules: vec![
                ReactionRuleData::new("Element.Fire", "Status.Oil", "GE_Explosion"),
                ReactionRuleData::new("Element.Ice", "Status.Wet", "GE_Freeze"),
            ],
            effects: vec![
                EffectData::damage("GE_Explosion", 40.0),
                EffectData::damage("GE_Freeze", 5.0),
            ],
            equipment: vec![EquipmentData {
                id: "flame_sword".to_string(),
                tags: vec!["Element.Fire".to_string()],
            }],
        }
    }

    #[test]
    fn test_validate_valid_settings() {
        let settings = create_test_settings();
        let errors = settings.validate();
        assert!(errors.is_empty(), "Errors: {:?}", errors);
        assert!(settings.warnings().is_empty());
    }

    #[test]
    fn test_validate_unknown_effect() {
        let mut settings = create_test_settings();
        settings
            .reaction_rules
            .push(ReactionRuleData::new("Element.Fire", "Status.Wet", "GE_Steam"));

        let errors = settings.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("unknown effect 'GE_Steam'"));
    }

    #[test]
    fn test_host_provided_effects_are_not_checked() {
        let mut settings = create_test_settings();
        settings.effects.clear();
        assert!(settings.validate().is_empty());
    }

    #[test]
    fn test_validate_duplicates() {
        let mut settings = create_test_settings();
        settings.reaction_rules.push(settings.reaction_rules[0].clone());
        settings.effects.push(EffectData::damage("GE_Freeze", 1.0));

        let errors = settings.validate();
        assert!(errors.iter().any(|e| e.contains("duplicates an earlier rule")));
        assert!(errors.iter().any(|e| e.contains("Duplicate effect ID 'GE_Freeze'")));
    }

    #[test]
    fn test_padded_ids_validate_like_trimmed_ones() {
        let mut settings = create_test_settings();
        settings.reaction_rules[0] =
            ReactionRuleData::new("Element.Fire ", " Status.Oil", "  GE_Explosion ");
        assert!(settings.validate().is_empty());
        assert_eq!(settings.get_effect(" GE_Freeze").map(|e| e.damage), Some(5.0));

        // Padding does not hide a duplicate.
        settings
            .reaction_rules
            .push(ReactionRuleData::new("Element.Fire", "Status.Oil", "GE_Explosion"));
        settings.effects.push(EffectData::damage("GE_Freeze  ", 1.0));
        let errors = settings.validate();
        assert_eq!(errors.len(), 2, "Errors: {:?}", errors);
        assert!(errors[0].contains("rule 2 duplicates"));
        assert!(errors[1].contains("Duplicate effect ID"));
    }

    #[test]
    fn test_validate_negative_damage() {
        let mut settings = create_test_settings();
        settings.effects[0].damage = -3.0;
        let errors = settings.validate();
        assert!(errors[0].contains("invalid damage"));
    }

    #[test]
    fn test_incomplete_rules_are_warnings() {
        let mut settings = create_test_settings();
        settings.reaction_rules.push(ReactionRuleData {
            source_tag: Some("Element.Fire".to_string()),
            ..Default::default()
        });
        settings.reaction_rules.push(ReactionRuleData::default());

        assert!(settings.validate().is_empty());
        let warnings = settings.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("rule 2"));
        assert!(warnings[0].contains("target_tag, reaction_effect"));
        assert_eq!(settings.complete_rules().count(), 2);
    }

    #[test]
    fn test_from_ron() {
        let text = r#"
            ReactionSettings(
                reaction_rules: [
                    (
                        source_tag: Some("Element.Fire"),
                        target_tag: Some("Status.Oil"),
                        reaction_effect: Some("GE_Explosion"),
                    ),
                ],
                effects: [(id: "GE_Explosion", damage: 40.0)],
            )
        "#;
        let settings = ReactionSettings::from_ron(text).unwrap();
        assert_eq!(settings.reaction_rules.len(), 1);
        assert!(settings.equipment.is_empty());
        assert_eq!(settings.get_effect("GE_Explosion").map(|e| e.damage), Some(40.0));
    }

    #[test]
    fn test_from_ron_rejects_garbage() {
        assert!(ReactionSettings::from_ron("ReactionSettings(reaction_rules: 5)").is_err());
    }
}
