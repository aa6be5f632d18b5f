//! Test fixtures and helpers.
//!
//! Pre-built settings and combatants for consistent testing.

use std::cell::RefCell;

use elemental_core::combatant::{Combatant, EffectId, EntityId};
use elemental_core::data::{EffectData, EquipmentData, ReactionRuleData, ReactionSettings};
use elemental_core::tags::{TagRegistry, TagSet};
use elemental_core::world::{CombatWorld, EntitySpawnParams};

/// Fire source tag.
pub const FIRE: &str = "Element.Fire";
/// Oil status tag.
pub const OIL: &str = "Status.Oil";
/// Wet status tag.
pub const WET: &str = "Status.Wet";
/// Lightning source tag.
pub const LIGHTNING: &str = "Element.Lightning";

/// Settings holding only the given `(source, target, effect)` rules.
#[must_use]
pub fn rules_settings(rules: &[(&str, &str, &str)]) -> ReactionSettings {
    ReactionSettings {
        reaction_rules: rules
            .iter()
            .map(|(s, t, e)| ReactionRuleData::new(s, t, e))
            .collect(),
        ..Default::default()
    }
}

/// The standard fire/oil/lightning settings used across tests.
///
/// - `Fire + Oil -> GE_Explosion` (40 damage)
/// - `Lightning + Wet -> GE_Shock` (25 damage)
/// - `GE_Fireball` deals 30, `GE_Zap` deals 10, `GE_Douse` grants Wet
/// - `flame_sword` grants Fire
#[must_use]
pub fn elemental_settings() -> ReactionSettings {
    let mut settings = rules_settings(&[(FIRE, OIL, "GE_Explosion"), (LIGHTNING, WET, "GE_Shock")]);
    settings.effects = vec![
        EffectData::damage("GE_Fireball", 30.0),
        EffectData::damage("GE_Zap", 10.0),
        EffectData::damage("GE_Explosion", 40.0),
        EffectData::damage("GE_Shock", 25.0),
        EffectData {
            id: "GE_Douse".to_string(),
            damage: 0.0,
            granted_tags: vec![WET.to_string()],
            removed_tags: vec![],
        },
    ];
    settings.equipment = vec![EquipmentData {
        id: "flame_sword".to_string(),
        tags: vec![FIRE.to_string()],
    }];
    settings
}

/// Build a world from settings with a fresh registry.
#[must_use]
pub fn world_from_settings(settings: &ReactionSettings) -> CombatWorld {
    CombatWorld::from_settings(settings, TagRegistry::new())
}

/// Spawn a full-health combatant owning `tags`.
///
/// # Panics
///
/// Panics if `max_health` is not a positive finite number.
pub fn spawn_with_tags(world: &mut CombatWorld, max_health: f32, tags: &[&str]) -> EntityId {
    let tags = tags.iter().map(|t| world.registry().intern(t)).collect();
    world
        .spawn_entity(EntitySpawnParams {
            max_health: Some(max_health),
            tags,
            ..Default::default()
        })
        .expect("fixture max health must be valid")
}

/// One `apply_effect` call seen by a [`RecordingCombatant`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedApplication {
    /// Effect requested.
    pub effect: EffectId,
    /// Recipient.
    pub target: EntityId,
    /// Extra tags passed along.
    pub extra_tags: TagSet,
}

/// A combatant with fixed tags that records every effect it is asked to apply.
#[derive(Debug)]
pub struct RecordingCombatant {
    id: EntityId,
    tags: TagSet,
    applied: RefCell<Vec<RecordedApplication>>,
}

impl RecordingCombatant {
    /// Create a combatant owning `tags`.
    #[must_use]
    pub fn new(id: u64, registry: &TagRegistry, tags: &[&str]) -> Self {
        Self {
            id: EntityId(id),
            tags: registry.tag_set(tags.iter().copied()),
            applied: RefCell::new(Vec::new()),
        }
    }

    /// Applications recorded so far.
    #[must_use]
    pub fn applied(&self) -> Vec<RecordedApplication> {
        self.applied.borrow().clone()
    }

    /// Effect IDs applied so far, in order.
    #[must_use]
    pub fn applied_effects(&self) -> Vec<String> {
        self.applied
            .borrow()
            .iter()
            .map(|a| a.effect.as_str().to_string())
            .collect()
    }
}

impl Combatant for RecordingCombatant {
    fn entity(&self) -> EntityId {
        self.id
    }

    fn owned_tags(&self) -> TagSet {
        self.tags.clone()
    }

    fn apply_effect(&self, effect: &EffectId, target: EntityId, extra_tags: &TagSet) {
        self.applied.borrow_mut().push(RecordedApplication {
            effect: effect.clone(),
            target,
            extra_tags: extra_tags.clone(),
        });
    }
}
