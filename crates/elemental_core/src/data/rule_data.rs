//! Reaction rule records as they appear in settings files.

use serde::{Deserialize, Serialize};

use super::normalize_id;

/// One configured reaction rule.
///
/// Every field is optional in the file so a half-authored rule still loads.
/// Such a rule is inert: it never matches and never applies anything.
///
/// # Example RON
///
/// ```ron
/// ReactionRuleData(
///     source_tag: Some("Element.Fire"),
///     target_tag: Some("Status.Oil"),
///     reaction_effect: Some("GE_Explosion"),
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReactionRuleData {
    /// Tag the attacker must own.
    #[serde(default)]
    pub source_tag: Option<String>,

    /// Tag the victim must own.
    #[serde(default)]
    pub target_tag: Option<String>,

    /// Effect applied from attacker to victim when both tags match.
    #[serde(default)]
    pub reaction_effect: Option<String>,
}

fn normalized(field: Option<&String>) -> Option<&str> {
    field.and_then(|s| normalize_id(s))
}

impl ReactionRuleData {
    /// Create a fully specified rule.
    #[must_use]
    pub fn new(source_tag: &str, target_tag: &str, reaction_effect: &str) -> Self {
        Self {
            source_tag: Some(source_tag.to_string()),
            target_tag: Some(target_tag.to_string()),
            reaction_effect: Some(reaction_effect.to_string()),
        }
    }

    /// Normalized source tag, `None` if unset or blank.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        normalized(self.source_tag.as_ref())
    }

    /// Normalized target tag, `None` if unset or blank.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        normalized(self.target_tag.as_ref())
    }

    /// Normalized reaction effect ID, `None` if unset or blank.
    #[must_use]
    pub fn effect(&self) -> Option<&str> {
        normalized(self.reaction_effect.as_ref())
    }

    /// Names of the fields left unset (missing or blank).
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.source().is_none() {
            missing.push("source_tag");
        }
        if self.target().is_none() {
            missing.push("target_tag");
        }
        if self.effect().is_none() {
            missing.push("reaction_effect");
        }
        missing
    }

    /// Check if all three fields are set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Short human readable form, `Fire + Oil -> Explosion`.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "{} + {} -> {}",
            self.source().unwrap_or("<unset>"),
            self.target().unwrap_or("<unset>"),
            self.effect().unwrap_or("<unset>")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_rule() {
        let rule = ReactionRuleData::new("Element.Fire", "Status.Oil", "GE_Explosion");
        assert!(rule.is_complete());
        assert_eq!(rule.describe(), "Element.Fire + Status.Oil -> GE_Explosion");
    }

    #[test]
    fn test_missing_fields() {
        let rule = ReactionRuleData {
            source_tag: Some("Element.Fire".to_string()),
            target_tag: Some("  ".to_string()),
            reaction_effect: None,
        };
        assert_eq!(rule.missing_fields(), vec!["target_tag", "reaction_effect"]);
        assert!(!rule.is_complete());
    }

    #[test]
    fn test_parse_partial_rule() {
        let rule: ReactionRuleData =
            ron::from_str(r#"(source_tag: Some("Element.Fire"))"#).unwrap();
        assert_eq!(rule.source_tag.as_deref(), Some("Element.Fire"));
        assert!(rule.target_tag.is_none());
    }

    #[test]
    fn test_padded_fields_are_normalized() {
        let rule = ReactionRuleData::new(" Element.Fire", "Status.Oil ", "  GE_Explosion");
        assert!(rule.is_complete());
        assert_eq!(rule.effect(), Some("GE_Explosion"));
        assert_eq!(rule.describe(), "Element.Fire + Status.Oil -> GE_Explosion");
    }
}
