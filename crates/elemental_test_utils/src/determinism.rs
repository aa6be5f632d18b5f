//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a reaction scenario produces the
//! identical event log every time it is run.
//!
//! # Testing Strategy
//!
//! Reaction evaluation must be reproducible: the same settings and the same
//! hits always produce the same reactions, in the same order, with the same
//! resulting health. Possible sources of drift include:
//!
//! - **HashMap iteration order**: rules live in an ordered slice and entities
//!   in a `BTreeMap`; only lookups go through hash maps.
//!
//! - **Tag interning order**: tag keys depend on interning order, so nothing
//!   may iterate tag sets to decide what fires.
//!
//! - **Thread scheduling**: each run builds its own world, so runs on
//!   separate threads must agree.

use std::thread;

use elemental_core::combatant::{EffectId, EntityId};
use elemental_core::data::ReactionSettings;
use elemental_core::tags::{TagRegistry, TagSet};
use elemental_core::world::{CombatEvent, CombatWorld, EntitySpawnParams};

/// An entity to spawn at the start of a scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySpec {
    /// Maximum (and starting) health.
    pub max_health: f32,
    /// Tags owned from the start.
    pub tags: Vec<String>,
}

impl EntitySpec {
    /// Entity with 100 health and the given tags.
    #[must_use]
    pub fn with_tags(tags: &[&str]) -> Self {
        Self {
            max_health: 100.0,
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

/// One effect application, by index into the scenario's entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    /// Index of the applier.
    pub source: usize,
    /// Effect ID.
    pub effect: String,
    /// Index of the recipient.
    pub target: usize,
}

/// Settings, entities and a sequence of hits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scenario {
    /// Reaction settings.
    pub settings: ReactionSettings,
    /// Entities spawned in order.
    pub entities: Vec<EntitySpec>,
    /// Hits applied in order.
    pub hits: Vec<Hit>,
}

/// What a scenario run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOutcome {
    /// Full event log.
    pub events: Vec<CombatEvent>,
    /// Final health per entity, in spawn order.
    pub health: Vec<f32>,
}

impl ScenarioOutcome {
    /// Number of reaction effects applied.
    #[must_use]
    pub fn reaction_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, CombatEvent::EffectApplied { is_reaction: true, .. }))
            .count()
    }
}

impl Scenario {
    /// Run the scenario in a fresh world.
    ///
    /// Hits referencing entities out of range are skipped.
    ///
    /// # Panics
    ///
    /// Panics if an entity spec has an invalid max health.
    #[must_use]
    pub fn run(&self) -> ScenarioOutcome {
        let mut world = CombatWorld::from_settings(&self.settings, TagRegistry::new());
        let ids: Vec<EntityId> = self
            .entities
            .iter()
            .map(|spec| {
                let tags = spec.tags.iter().map(|t| world.registry().intern(t)).collect();
                world
                    .spawn_entity(EntitySpawnParams {
                        max_health: Some(spec.max_health),
                        tags,
                        ..Default::default()
                    })
                    .expect("scenario entity must have valid max health")
            })
            .collect();

        for hit in &self.hits {
            let (Some(&source), Some(&target)) = (ids.get(hit.source), ids.get(hit.target)) else {
                continue;
            };
            world.apply_effect(source, &EffectId::new(&hit.effect), target, &TagSet::new());
        }

        ScenarioOutcome {
            events: world.take_events(),
            health: ids.iter().filter_map(|id| world.health(*id)).collect(),
        }
    }
}

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical outcomes.
    pub is_deterministic: bool,
    /// Outcome of each run.
    pub outcomes: Vec<ScenarioOutcome>,
}

impl DeterminismResult {
    /// Assert that the scenario was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if any run differed from the first.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let first = &self.outcomes[0];
            let diverged = self.outcomes.iter().position(|o| o != first).unwrap_or(0);
            panic!(
                "Scenario is non-deterministic!\n\
                 Runs: {}\n\
                 First divergent run: {}\n\
                 Expected: {:?}\n\
                 Got: {:?}",
                self.outcomes.len(),
                diverged,
                first,
                self.outcomes[diverged]
            );
        }
    }
}

/// Run a scenario `num_runs` times on separate threads and compare outcomes.
///
/// # Panics
///
/// Panics if `num_runs` is zero or a run panics.
#[must_use]
pub fn verify_determinism(scenario: &Scenario, num_runs: usize) -> DeterminismResult {
    assert!(num_runs > 0, "need at least one run");

    let outcomes: Vec<ScenarioOutcome> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_runs).map(|_| s.spawn(|| scenario.run())).collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("scenario thread panicked"))
            .collect()
    });

    let is_deterministic = outcomes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        outcomes,
    }
}

/// Property-based testing strategies.
pub mod strategies {
    use elemental_core::data::{EffectData, ReactionRuleData, ReactionSettings};
    use proptest::prelude::*;

    use super::{EntitySpec, Hit, Scenario};

    /// Tag names used by generated settings.
    pub const TAG_POOL: &[&str] = &[
        "Element.Fire",
        "Element.Ice",
        "Element.Lightning",
        "Status.Oil",
        "Status.Wet",
        "Status.Frozen",
    ];

    /// Effect IDs used by generated settings.
    pub const EFFECT_POOL: &[&str] = &["GE_Explosion", "GE_Shock", "GE_Shatter", "GE_Steam"];

    /// Pick one tag name from [`TAG_POOL`].
    pub fn arb_tag_name() -> impl Strategy<Value = String> {
        proptest::sample::select(TAG_POOL).prop_map(str::to_string)
    }

    /// A subset of [`TAG_POOL`].
    pub fn arb_tag_names() -> impl Strategy<Value = Vec<String>> {
        proptest::sample::subsequence(TAG_POOL, 0..=TAG_POOL.len())
            .prop_map(|names| names.into_iter().map(str::to_string).collect())
    }

    /// Pick one effect ID from [`EFFECT_POOL`].
    pub fn arb_effect_id() -> impl Strategy<Value = String> {
        proptest::sample::select(EFFECT_POOL).prop_map(str::to_string)
    }

    /// A rule record; each field is unset one time in eight.
    pub fn arb_rule_data() -> impl Strategy<Value = ReactionRuleData> {
        (
            proptest::option::weighted(0.875, arb_tag_name()),
            proptest::option::weighted(0.875, arb_tag_name()),
            proptest::option::weighted(0.875, arb_effect_id()),
        )
            .prop_map(|(source_tag, target_tag, reaction_effect)| ReactionRuleData {
                source_tag,
                target_tag,
                reaction_effect,
            })
    }

    /// Damage values (0-100).
    pub fn arb_damage() -> impl Strategy<Value = f32> {
        0.0f32..100.0f32
    }

    /// Health values (1-1000).
    pub fn arb_health() -> impl Strategy<Value = f32> {
        1.0f32..1000.0f32
    }

    /// Settings with up to `max_rules` rules and a damage value for every
    /// effect in [`EFFECT_POOL`].
    pub fn arb_settings(max_rules: usize) -> impl Strategy<Value = ReactionSettings> {
        (
            proptest::collection::vec(arb_rule_data(), 0..=max_rules),
            proptest::collection::vec(arb_damage(), EFFECT_POOL.len()),
        )
            .prop_map(|(reaction_rules, damages)| ReactionSettings {
                reaction_rules,
                effects: EFFECT_POOL
                    .iter()
                    .zip(damages)
                    .map(|(id, damage)| EffectData::damage(id, damage))
                    .collect(),
                equipment: Vec::new(),
            })
    }

    /// An entity with random health and tags.
    pub fn arb_entity_spec() -> impl Strategy<Value = EntitySpec> {
        (arb_health(), arb_tag_names()).prop_map(|(max_health, tags)| EntitySpec { max_health, tags })
    }

    /// A full scenario over 2-4 entities.
    pub fn arb_scenario() -> impl Strategy<Value = Scenario> {
        (
            arb_settings(8),
            proptest::collection::vec(arb_entity_spec(), 2..=4),
            proptest::collection::vec((0usize..4, arb_effect_id(), 0usize..4), 0..12),
        )
            .prop_map(|(settings, entities, hits)| Scenario {
                settings,
                entities,
                hits: hits
                    .into_iter()
                    .map(|(source, effect, target)| Hit {
                        source,
                        effect,
                        target,
                    })
                    .collect(),
            })
    }
}
