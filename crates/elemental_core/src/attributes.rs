//! Per-entity attribute state and the damage application step.
//!
//! Damage never writes health directly. An effect sets the transient
//! `incoming_damage` meta attribute, and the attribute-change notification
//! ([`AttributeState::post_effect_execute`]) consumes it exactly once:
//!
//! 1. read the pending damage and reset it to zero;
//! 2. stop if it is not positive;
//! 3. clamp `health - damage` into `[0, max_health]`;
//! 4. run reaction evaluation for the hit.
//!
//! All fields live in [`Cell`]s so a reaction triggered in step 4 can damage
//! this same entity again while the outer call is still on the stack.

use std::cell::Cell;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combatant::{Capability, EffectContext};
use crate::engine::{ReactionEngine, ReactionReport};
use crate::error::{ElementalError, Result};
use crate::guard::ReactionGuard;

/// Attributes an effect can modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// Current health.
    Health,
    /// Upper bound for health.
    MaxHealth,
    /// Transient damage waiting to be applied.
    IncomingDamage,
}

/// Health change produced by one damage step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthChange {
    /// Damage consumed from the meta attribute.
    pub damage: f32,
    /// Health before the hit.
    pub previous: f32,
    /// Health after the hit.
    pub current: f32,
}

/// Outcome of a damage step that changed health.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageResolution {
    /// The health change.
    pub change: HealthChange,
    /// What reaction evaluation did afterwards.
    pub reactions: ReactionReport,
}

/// Health, max health, the incoming-damage meta value and the reaction guard.
///
/// Invariant: `0 <= health <= max_health`.
#[derive(Debug)]
pub struct AttributeState {
    health: Cell<f32>,
    max_health: Cell<f32>,
    incoming_damage: Cell<f32>,
    guard: ReactionGuard,
}

fn check_max_health(max_health: f32) -> Result<f32> {
    if max_health.is_finite() && max_health > 0.0 {
        Ok(max_health)
    } else {
        Err(ElementalError::InvalidMaxHealth(max_health))
    }
}

impl AttributeState {
    /// Create state at full health.
    pub fn new(max_health: f32) -> Result<Self> {
        let max_health = check_max_health(max_health)?;
        Ok(Self {
            health: Cell::new(max_health),
            max_health: Cell::new(max_health),
            incoming_damage: Cell::new(0.0),
            guard: ReactionGuard::new(),
        })
    }

    /// Current health.
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health.get()
    }

    /// Maximum health.
    #[must_use]
    pub fn max_health(&self) -> f32 {
        self.max_health.get()
    }

    /// Pending damage not yet consumed.
    #[must_use]
    pub fn incoming_damage(&self) -> f32 {
        self.incoming_damage.get()
    }

    /// Read an attribute by name.
    #[must_use]
    pub fn get(&self, attribute: Attribute) -> f32 {
        match attribute {
            Attribute::Health => self.health(),
            Attribute::MaxHealth => self.max_health(),
            Attribute::IncomingDamage => self.incoming_damage(),
        }
    }

    /// This entity's reaction guard.
    #[must_use]
    pub fn guard(&self) -> &ReactionGuard {
        &self.guard
    }

    /// Check if health has reached zero.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health.get() <= 0.0
    }

    /// Stage damage for the next damage step.
    pub fn set_incoming_damage(&self, damage: f32) {
        self.incoming_damage.set(damage);
    }

    /// Change max health, clamping current health into the new range.
    pub fn set_max_health(&self, max_health: f32) -> Result<()> {
        let max_health = check_max_health(max_health)?;
        self.max_health.set(max_health);
        self.health.set(self.health.get().min(max_health));
        Ok(())
    }

    /// Restore health up to max, returning the amount actually healed.
    pub fn heal(&self, amount: f32) -> f32 {
        if amount.is_nan() || amount <= 0.0 {
            return 0.0;
        }
        let previous = self.health.get();
        let healed = (previous + amount).min(self.max_health.get());
        self.health.set(healed);
        healed - previous
    }

    /// Steps 1-3 of the damage step: consume the meta value and apply it.
    ///
    /// Returns `None` when there was no positive damage pending. The meta
    /// value reads zero afterwards either way.
    pub fn consume_incoming_damage(&self) -> Option<HealthChange> {
        let damage = self.incoming_damage.replace(0.0);
        if damage.is_nan() || damage <= 0.0 {
            return None;
        }

        let previous = self.health.get();
        let current = (previous - damage).clamp(0.0, self.max_health.get());
        self.health.set(current);

        Some(HealthChange {
            damage,
            previous,
            current,
        })
    }

    /// Attribute-change notification after an effect executed.
    ///
    /// Acts only when `changed` is [`Attribute::IncomingDamage`]: consumes the
    /// pending damage, then calls `on_health_changed` and evaluates
    /// reactions with `ctx`. `source` and `target` are the capabilities of
    /// the attacker and of this entity.
    ///
    /// Health is always updated, whatever reaction evaluation does.
    pub fn post_effect_execute<F>(
        &self,
        changed: Attribute,
        ctx: &EffectContext,
        engine: &ReactionEngine,
        source: Capability<'_>,
        target: Capability<'_>,
        on_health_changed: F,
    ) -> Option<DamageResolution>
    where
        F: FnOnce(&HealthChange),
    {
        if changed != Attribute::IncomingDamage {
            return None;
        }

        let change = self.consume_incoming_damage()?;
        debug!(
            target_entity = %ctx.target,
            effect = %ctx.applied_effect,
            "Applied {} damage: {} -> {}",
            change.damage,
            change.previous,
            change.current
        );
        on_health_changed(&change);

        let reactions = engine.evaluate(&self.guard, ctx, source, target);
        Some(DamageResolution { change, reactions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{EffectId, EntityId};
    use crate::rules::RuleSet;
    use crate::tags::TagRegistry;

    fn engine() -> ReactionEngine {
        ReactionEngine::new(RuleSet::empty(), &TagRegistry::new())
    }

    fn context() -> EffectContext {
        EffectContext::new(EntityId(1), EntityId(2), EffectId::new("GE_Damage"))
    }

    fn apply(state: &AttributeState, damage: f32) -> Option<DamageResolution> {
        state.set_incoming_damage(damage);
        state.post_effect_execute(
            Attribute::IncomingDamage,
            &context(),
            &engine(),
            Capability::Missing,
            Capability::Missing,
            |_| {},
        )
    }

    #[test]
    fn test_damage_reduces_health_and_resets_meta() {
        let state = AttributeState::new(100.0).unwrap();

        let resolution = apply(&state, 30.0).expect("positive damage resolves");

        assert_eq!(state.health(), 70.0);
        assert_eq!(state.incoming_damage(), 0.0);
        assert_eq!(
            resolution.change,
            HealthChange {
                damage: 30.0,
                previous: 100.0,
                current: 70.0
            }
        );
        assert_eq!(resolution.reactions, ReactionReport::MissingCapability);
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let state = AttributeState::new(50.0).unwrap();
        apply(&state, 80.0);
        assert_eq!(state.health(), 0.0);
        assert!(state.is_dead());
    }

    #[test]
    fn test_non_positive_damage_is_ignored() {
        let state = AttributeState::new(100.0).unwrap();

        for damage in [0.0, -10.0, f32::NAN] {
            let mut notified = false;
            state.set_incoming_damage(damage);
            let result = state.post_effect_execute(
                Attribute::IncomingDamage,
                &context(),
                &engine(),
                Capability::Missing,
                Capability::Missing,
                |_| notified = true,
            );
            assert!(result.is_none());
            assert!(!notified);
            assert_eq!(state.health(), 100.0);
            assert_eq!(state.incoming_damage(), 0.0);
        }
    }

    #[test]
    fn test_other_attributes_do_not_trigger_damage_step() {
        let state = AttributeState::new(100.0).unwrap();
        state.set_incoming_damage(25.0);

        let result = state.post_effect_execute(
            Attribute::Health,
            &context(),
            &engine(),
            Capability::Missing,
            Capability::Missing,
            |_| {},
        );

        assert!(result.is_none());
        assert_eq!(state.incoming_damage(), 25.0);
        assert_eq!(state.health(), 100.0);
    }

    #[test]
    fn test_damage_is_never_double_applied() {
        let state = AttributeState::new(100.0).unwrap();
        apply(&state, 10.0);
        assert!(state.consume_incoming_damage().is_none());
        assert_eq!(state.health(), 90.0);
    }

    #[test]
    fn test_max_health_validation_and_clamp() {
        assert!(AttributeState::new(0.0).is_err());
        assert!(AttributeState::new(f32::INFINITY).is_err());

        let state = AttributeState::new(100.0).unwrap();
        state.set_max_health(60.0).unwrap();
        assert_eq!(state.health(), 60.0);
        assert!(state.set_max_health(-1.0).is_err());
        assert_eq!(state.get(Attribute::MaxHealth), 60.0);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let state = AttributeState::new(100.0).unwrap();
        apply(&state, 40.0);
        assert_eq!(state.heal(25.0), 25.0);
        assert_eq!(state.heal(100.0), 15.0);
        assert_eq!(state.health(), 100.0);
        assert_eq!(state.heal(-5.0), 0.0);
    }

    #[test]
    fn test_guard_idle_after_damage_step() {
        let state = AttributeState::new(100.0).unwrap();
        apply(&state, 10.0);
        assert!(!state.guard().is_held());
    }
}
