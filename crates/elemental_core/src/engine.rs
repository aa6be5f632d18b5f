//! Reaction engine: tag matching and reaction application.
//!
//! [`ReactionEngine::evaluate`] runs after an entity has taken damage. It
//! compares the attacker's and victim's owned tags against every rule in the
//! current [`RuleSet`] and applies each matching reaction effect from the
//! attacker to the victim.
//!
//! # Recursion
//!
//! A reaction effect usually deals damage, which re-enters the damage step
//! and therefore `evaluate` on the same victim. The victim's
//! [`ReactionGuard`] blocks that nested call while the outer one is still on
//! the stack. Reactions landing on a *different* entity are evaluated in
//! full, and a chain that comes back to the original victim after its
//! evaluation has returned is evaluated again.
//!
//! # Failure semantics
//!
//! Nothing here returns an error. Malformed rules are skipped, missing
//! capabilities and re-entrant calls are no-ops. The returned
//! [`ReactionReport`] only says which of these happened.

use std::sync::Arc;

use tracing::{info, trace};

use crate::combatant::{Capability, EffectContext, EffectId};
use crate::guard::ReactionGuard;
use crate::rules::{RuleSet, RuleSetHandle};
use crate::tags::{TagRegistry, TagSet};

/// What a single `evaluate` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionReport {
    /// The victim's guard was already held; nothing was scanned.
    Blocked,
    /// Attacker or victim has no combatant capability.
    MissingCapability,
    /// Rules were scanned.
    Evaluated {
        /// Number of rules scanned.
        scanned: usize,
        /// Reaction effects applied, in rule order.
        applied: Vec<EffectId>,
    },
}

impl ReactionReport {
    /// Reaction effects applied by this call.
    #[must_use]
    pub fn applied(&self) -> &[EffectId] {
        match self {
            Self::Evaluated { applied, .. } => applied,
            Self::Blocked | Self::MissingCapability => &[],
        }
    }

    /// Check if the call was stopped by the re-entrancy guard.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked)
    }
}

/// Matches tag pairs against the rule set and applies reactions.
#[derive(Debug)]
pub struct ReactionEngine {
    rules: Arc<RuleSetHandle>,
    registry: TagRegistry,
    reaction_tags: TagSet,
}

impl ReactionEngine {
    /// Create an engine over an owned rule set.
    #[must_use]
    pub fn new(rules: RuleSet, registry: &TagRegistry) -> Self {
        Self::with_handle(Arc::new(RuleSetHandle::new(rules)), registry)
    }

    /// Create an engine sharing a rule set handle with other owners.
    #[must_use]
    pub fn with_handle(rules: Arc<RuleSetHandle>, registry: &TagRegistry) -> Self {
        let reaction_tags = [registry.reaction_tag()].into_iter().collect();
        Self {
            rules,
            registry: registry.clone(),
            reaction_tags,
        }
    }

    /// The rule set in force right now.
    #[must_use]
    pub fn rules(&self) -> Arc<RuleSet> {
        self.rules.snapshot()
    }

    /// Replace the rule set. Evaluations already running keep their snapshot.
    pub fn reload(&self, rules: RuleSet) {
        let eligible = rules.eligible_count();
        let total = rules.len();
        self.rules.replace(rules);
        info!("Reloaded reaction rules: {eligible} eligible of {total}");
    }

    /// Evaluate reactions for one damage event.
    ///
    /// `guard` belongs to the victim. `source` and `target` are the resolved
    /// capabilities of attacker and victim.
    pub fn evaluate(
        &self,
        guard: &ReactionGuard,
        ctx: &EffectContext,
        source: Capability<'_>,
        target: Capability<'_>,
    ) -> ReactionReport {
        let Some(_scope) = guard.try_enter() else {
            trace!(
                target_entity = %ctx.target,
                effect = %ctx.applied_effect,
                "Reaction evaluation blocked by re-entrancy guard"
            );
            return ReactionReport::Blocked;
        };

        let (Some(source), Some(target)) = (source.combatant(), target.combatant()) else {
            trace!(
                source_entity = %ctx.source,
                target_entity = %ctx.target,
                "Reaction evaluation skipped, combatant capability missing"
            );
            return ReactionReport::MissingCapability;
        };

        let rules = self.rules.snapshot();
        let source_tags = source.owned_tags();
        let target_tags = target.owned_tags();
        let mut applied = Vec::new();

        for (index, rule) in rules.iter().enumerate() {
            // A reaction never re-triggers the rule that spawned it.
            if rule.reaction_effect.as_ref() == Some(&ctx.applied_effect) {
                trace!(rule = index, effect = %ctx.applied_effect, "Skipping self-triggered rule");
                continue;
            }

            let Some((source_tag, target_tag, effect)) = rule.parts() else {
                trace!(rule = index, "Skipping incomplete rule");
                continue;
            };

            if !rule.matches(&source_tags, &target_tags) {
                continue;
            }

            info!(
                "Elemental reaction triggered: {} on {} -> applying {} ({} -> {})",
                self.registry.name(source_tag),
                self.registry.name(target_tag),
                effect,
                source.entity(),
                target.entity()
            );
            source.apply_effect(effect, target.entity(), &self.reaction_tags);
            applied.push(effect.clone());
        }

        ReactionReport::Evaluated {
            scanned: rules.len(),
            applied,
        }
    }
}
