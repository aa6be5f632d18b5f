//! Reaction rules and the immutable rule set.
//!
//! A [`RuleSet`] is built once from settings and never mutated. Reloading
//! goes through [`RuleSetHandle::replace`], which swaps the whole set in one
//! write so no evaluation ever sees a partially updated collection.

use std::sync::{Arc, PoisonError, RwLock};

use crate::combatant::EffectId;
use crate::data::ReactionSettings;
use crate::tags::{Tag, TagRegistry, TagSet};

/// One reaction rule.
///
/// Eligible only when all three fields are set. An ineligible rule is
/// permanently inert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionRule {
    /// Tag the attacker must own.
    pub source_tag: Option<Tag>,
    /// Tag the victim must own.
    pub target_tag: Option<Tag>,
    /// Effect to apply on a match.
    pub reaction_effect: Option<EffectId>,
}

impl ReactionRule {
    /// Create a fully specified rule.
    #[must_use]
    pub fn new(source_tag: Tag, target_tag: Tag, reaction_effect: EffectId) -> Self {
        Self {
            source_tag: Some(source_tag),
            target_tag: Some(target_tag),
            reaction_effect: Some(reaction_effect),
        }
    }

    /// The three fields, if all are set.
    #[must_use]
    pub fn parts(&self) -> Option<(Tag, Tag, &EffectId)> {
        match (self.source_tag, self.target_tag, &self.reaction_effect) {
            (Some(source), Some(target), Some(effect)) => Some((source, target, effect)),
            _ => None,
        }
    }

    /// Check if the rule can ever fire.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.parts().is_some()
    }

    /// Check whether the tag pair satisfies this rule.
    #[must_use]
    pub fn matches(&self, source_tags: &TagSet, target_tags: &TagSet) -> bool {
        self.parts().is_some_and(|(source, target, _)| {
            source_tags.contains(source) && target_tags.contains(target)
        })
    }
}

/// Ordered, immutable collection of reaction rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Arc<[ReactionRule]>,
}

impl RuleSet {
    /// Create a rule set from rules in evaluation order.
    #[must_use]
    pub fn new(rules: Vec<ReactionRule>) -> Self {
        Self {
            rules: rules.into(),
        }
    }

    /// Empty rule set.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Build a rule set from settings, interning tags through `registry`.
    ///
    /// Incomplete rules are kept in position but stay inert.
    #[must_use]
    pub fn from_settings(settings: &ReactionSettings, registry: &TagRegistry) -> Self {
        let rules = settings
            .reaction_rules
            .iter()
            .map(|data| ReactionRule {
                source_tag: registry.intern_optional(data.source()),
                target_tag: registry.intern_optional(data.target()),
                reaction_effect: data.effect().map(EffectId::new),
            })
            .collect();
        Self::new(rules)
    }

    /// Iterate over rules in declared order.
    pub fn iter(&self) -> std::slice::Iter<'_, ReactionRule> {
        self.rules.iter()
    }

    /// Number of rules, eligible or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of rules that can fire.
    #[must_use]
    pub fn eligible_count(&self) -> usize {
        self.rules.iter().filter(|r| r.is_eligible()).count()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a ReactionRule;
    type IntoIter = std::slice::Iter<'a, ReactionRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Shared, atomically replaceable reference to the current rule set.
#[derive(Debug, Default)]
pub struct RuleSetHandle {
    current: RwLock<Arc<RuleSet>>,
}

impl RuleSetHandle {
    /// Wrap an initial rule set.
    #[must_use]
    pub fn new(rules: RuleSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(rules)),
        }
    }

    /// The rule set in force right now.
    ///
    /// The returned snapshot is unaffected by later replacements.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RuleSet> {
        // The lock only guards an Arc swap, so a poisoned lock still holds a valid set.
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Swap in a new rule set, returning the previous one.
    pub fn replace(&self, rules: RuleSet) -> Arc<RuleSet> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, Arc::new(rules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ReactionRuleData;

    #[test]
    fn test_rule_matching() {
        let registry = TagRegistry::new();
        let fire = registry.intern("Element.Fire");
        let oil = registry.intern("Status.Oil");
        let rule = ReactionRule::new(fire, oil, EffectId::new("GE_Explosion"));

        let source: TagSet = [fire].into_iter().collect();
        let target: TagSet = [oil].into_iter().collect();
        assert!(rule.matches(&source, &target));
        assert!(!rule.matches(&target, &source));
        assert!(!rule.matches(&source, &TagSet::new()));
    }

    #[test]
    fn test_incomplete_rule_never_matches() {
        let registry = TagRegistry::new();
        let fire = registry.intern("Element.Fire");
        let rule = ReactionRule {
            source_tag: Some(fire),
            target_tag: None,
            reaction_effect: Some(EffectId::new("GE_Explosion")),
        };
        let tags: TagSet = [fire].into_iter().collect();
        assert!(!rule.is_eligible());
        assert!(!rule.matches(&tags, &tags));
    }

    #[test]
    fn test_from_settings_preserves_order_and_inert_rules() {
        let registry = TagRegistry::new();
        let settings = ReactionSettings {
            reaction_rules: vec![
                ReactionRuleData::new("Element.Fire", "Status.Oil", "GE_Explosion"),
                ReactionRuleData {
                    source_tag: Some("Element.Ice".to_string()),
                    target_tag: Some(String::new()),
                    reaction_effect: Some("GE_Freeze".to_string()),
                },
                ReactionRuleData::new("Element.Fire", "Status.Wet", "GE_Steam"),
            ],
            ..Default::default()
        };

        let rules = RuleSet::from_settings(&settings, &registry);
        assert_eq!(rules.len(), 3);
        assert_eq!(rules.eligible_count(), 2);

        let effects: Vec<_> = rules
            .iter()
            .filter_map(|r| r.reaction_effect.as_ref().map(EffectId::as_str))
            .collect();
        assert_eq!(effects, vec!["GE_Explosion", "GE_Freeze", "GE_Steam"]);
        assert!(rules.iter().nth(1).is_some_and(|r| r.target_tag.is_none()));
    }

    #[test]
    fn test_handle_swap_leaves_old_snapshots_intact() {
        let registry = TagRegistry::new();
        let fire = registry.intern("Element.Fire");
        let oil = registry.intern("Status.Oil");

        let handle = RuleSetHandle::new(RuleSet::new(vec![ReactionRule::new(
            fire,
            oil,
            EffectId::new("GE_Explosion"),
        )]));

        let before = handle.snapshot();
        let previous = handle.replace(RuleSet::empty());

        assert_eq!(before.len(), 1);
        assert_eq!(previous.len(), 1);
        assert!(handle.snapshot().is_empty());
    }
}
