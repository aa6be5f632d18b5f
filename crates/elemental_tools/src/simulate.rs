//! One-hit reaction simulation.
//!
//! Spawns an attacker and a victim with the given tags, applies one effect
//! and reports the resulting event log.

use std::fmt::Write as _;

use elemental_core::combatant::{EffectId, EntityId};
use elemental_core::data::ReactionSettings;
use elemental_core::error::{ElementalError, Result};
use elemental_core::tags::{TagRegistry, TagSet};
use elemental_core::world::{CombatEvent, CombatWorld, EntitySpawnParams};
use serde::Serialize;

/// What to simulate.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    /// Tags owned by the attacker.
    pub source_tags: Vec<String>,
    /// Tags owned by the victim.
    pub target_tags: Vec<String>,
    /// Effect the attacker applies.
    pub effect: String,
    /// Max health of the victim.
    pub target_health: f32,
}

/// Final state of one simulated combatant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombatantSummary {
    /// Entity ID.
    pub id: EntityId,
    /// Health after the hit.
    pub health: f32,
    /// Tags after the hit, sorted.
    pub tags: Vec<String>,
}

/// Result of a simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutcome {
    /// Attacker after the hit.
    pub source: CombatantSummary,
    /// Victim after the hit.
    pub target: CombatantSummary,
    /// Everything that happened, in order.
    pub events: Vec<CombatEvent>,
}

impl SimulationOutcome {
    /// Reaction effects applied, in order.
    #[must_use]
    pub fn reactions(&self) -> Vec<&EffectId> {
        self.events
            .iter()
            .filter_map(|event| match event {
                CombatEvent::EffectApplied {
                    effect,
                    is_reaction: true,
                    ..
                } => Some(effect),
                _ => None,
            })
            .collect()
    }

    /// Plain text rendering for terminal output.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for event in &self.events {
            let _ = match event {
                CombatEvent::EffectApplied {
                    source,
                    target,
                    effect,
                    is_reaction,
                } => writeln!(
                    out,
                    "{}{effect}: {source} -> {target}",
                    if *is_reaction { "reaction " } else { "" }
                ),
                CombatEvent::DamageTaken {
                    target,
                    damage,
                    previous_health,
                    health,
                } => writeln!(out, "  {target} took {damage} ({previous_health} -> {health})"),
            };
        }
        let _ = writeln!(
            out,
            "source {} [{}] health {}",
            self.source.id,
            self.source.tags.join(", "),
            self.source.health
        );
        let _ = writeln!(
            out,
            "target {} [{}] health {}",
            self.target.id,
            self.target.tags.join(", "),
            self.target.health
        );
        out
    }
}

fn summarize(world: &CombatWorld, id: EntityId) -> Result<CombatantSummary> {
    let entity = world.get_entity(id).ok_or(ElementalError::EntityNotFound(id))?;
    Ok(CombatantSummary {
        id,
        health: entity.attributes().health(),
        tags: world.registry().sorted_names(&entity.owned_tags()),
    })
}

/// Run one hit against fresh combatants.
///
/// # Errors
///
/// Returns an error if the effect is unknown or the victim's health is not a
/// positive finite number.
pub fn simulate(settings: &ReactionSettings, request: &SimulationRequest) -> Result<SimulationOutcome> {
    let mut world = CombatWorld::from_settings(settings, TagRegistry::new());
    let effect = EffectId::new(&request.effect);
    if world.effect(&effect).is_none() {
        return Err(ElementalError::UnknownEffect(request.effect.clone()));
    }

    let source_tags = request.source_tags.iter().map(|t| world.registry().intern(t)).collect();
    let target_tags = request.target_tags.iter().map(|t| world.registry().intern(t)).collect();
    let source = world.spawn_entity(EntitySpawnParams {
        tags: source_tags,
        ..Default::default()
    })?;
    let target = world.spawn_entity(EntitySpawnParams {
        max_health: Some(request.target_health),
        tags: target_tags,
        ..Default::default()
    })?;

    world.apply_effect(source, &effect, target, &TagSet::new());

    Ok(SimulationOutcome {
        source: summarize(&world, source)?,
        target: summarize(&world, target)?,
        events: world.take_events(),
    })
}
