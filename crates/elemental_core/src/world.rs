//! In-memory combat world.
//!
//! A small host for the reaction core: it owns entities, the effect catalog
//! and the [`ReactionEngine`], and implements [`Combatant`] for its entities
//! through the [`Actor`] handle. Applying an effect runs the full pipeline
//! synchronously:
//!
//! ```text
//! apply_effect(src, GE_Fireball, dst)
//!   -> adjust dst tags
//!   -> dst.incoming_damage = 30
//!   -> damage step on dst (health 100 -> 70)
//!   -> evaluate(src, dst)
//!        -> rule Fire + Oil matches
//!        -> apply_effect(src, GE_Explosion, dst)      (reaction)
//!             -> damage step on dst (health 70 -> 30)
//!             -> evaluate(src, dst)  blocked: dst guard held
//! ```
//!
//! # Example
//!
//! ```
//! use elemental_core::prelude::*;
//!
//! let registry = TagRegistry::new();
//! let fire = registry.intern("Element.Fire");
//! let oil = registry.intern("Status.Oil");
//!
//! let rules = RuleSet::new(vec![ReactionRule::new(fire, oil, EffectId::new("GE_Explosion"))]);
//! let mut effects = EffectCatalog::new();
//! effects.insert(EffectDefinition::damage("GE_Fireball", 30.0));
//! effects.insert(EffectDefinition::damage("GE_Explosion", 40.0));
//!
//! let mut world = CombatWorld::new(registry, rules, effects);
//! let mage = world.spawn_entity(EntitySpawnParams { tags: vec![fire], ..Default::default() })?;
//! let target = world.spawn_entity(EntitySpawnParams { tags: vec![oil], ..Default::default() })?;
//!
//! world.apply_effect(mage, &EffectId::new("GE_Fireball"), target, &TagSet::new());
//! assert_eq!(world.health(target), Some(30.0));
//! # Ok::<(), elemental_core::error::ElementalError>(())
//! ```

use std::cell::RefCell;
use std::cell::Cell;
use std::collections::{BTreeMap, HashMap, VecDeque};

use serde::Serialize;
use tracing::{debug, warn};

use crate::attributes::{Attribute, AttributeState};
use crate::combatant::{Capability, Combatant, EffectContext, EffectId, EntityId};
use crate::data::{normalize_id, ReactionSettings};
use crate::effects::{EffectCatalog, EffectDefinition};
use crate::engine::ReactionEngine;
use crate::equipment::{EquipOutcome, EquipmentDefinition, EquipmentSlot};
use crate::error::{ElementalError, Result};
use crate::rules::RuleSet;
use crate::tags::{Tag, TagContainer, TagRegistry, TagSet};

/// Default max health for spawned entities.
pub const DEFAULT_MAX_HEALTH: f32 = 100.0;

/// Events kept before the oldest are dropped.
pub const DEFAULT_EVENT_CAPACITY: usize = 4096;

/// Parameters for spawning a new entity.
#[derive(Debug, Clone, Default)]
pub struct EntitySpawnParams {
    /// Maximum health (entity starts at full health). Defaults to
    /// [`DEFAULT_MAX_HEALTH`].
    pub max_health: Option<f32>,
    /// Tags owned from the start.
    pub tags: Vec<Tag>,
    /// Passive entities have no combatant capability: they take damage but
    /// never source or receive reactions.
    pub passive: bool,
}

/// Something that happened while applying effects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CombatEvent {
    /// An effect was applied.
    EffectApplied {
        /// Applier.
        source: EntityId,
        /// Recipient.
        target: EntityId,
        /// Effect applied.
        effect: EffectId,
        /// Whether the reaction engine applied it.
        is_reaction: bool,
    },
    /// An entity lost health.
    DamageTaken {
        /// Damaged entity.
        target: EntityId,
        /// Damage consumed.
        damage: f32,
        /// Health before.
        previous_health: f32,
        /// Health after.
        health: f32,
    },
}

/// One entity of the world.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    attributes: AttributeState,
    tags: RefCell<TagContainer>,
    equipment: EquipmentSlot,
    combatant: bool,
}

impl Entity {
    /// Entity identifier.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Attribute state.
    #[must_use]
    pub fn attributes(&self) -> &AttributeState {
        &self.attributes
    }

    /// Snapshot of owned tags.
    #[must_use]
    pub fn owned_tags(&self) -> TagSet {
        self.tags.borrow().to_set()
    }

    /// Currently worn equipment.
    #[must_use]
    pub fn equipment(&self) -> Option<&EquipmentDefinition> {
        self.equipment.current()
    }

    /// Whether the entity exposes the combatant capability.
    #[must_use]
    pub fn is_combatant(&self) -> bool {
        self.combatant
    }
}

/// Combatant handle for one entity of a [`CombatWorld`].
#[derive(Debug, Clone, Copy)]
pub struct Actor<'w> {
    world: &'w CombatWorld,
    id: EntityId,
}

impl Combatant for Actor<'_> {
    fn entity(&self) -> EntityId {
        self.id
    }

    fn owned_tags(&self) -> TagSet {
        self.world
            .entities
            .get(&self.id)
            .map(Entity::owned_tags)
            .unwrap_or_default()
    }

    fn apply_effect(&self, effect: &EffectId, target: EntityId, extra_tags: &TagSet) {
        self.world.apply_effect(self.id, effect, target, extra_tags);
    }
}

fn capability<'a>(actor: Option<&'a Actor<'_>>) -> Capability<'a> {
    match actor {
        Some(actor) => Capability::Available(actor),
        None => Capability::Missing,
    }
}

/// Entities, effects and the reaction engine.
///
/// Every hit appends to an event log. Hosts drain it with
/// [`Self::take_events`]; once it holds [`DEFAULT_EVENT_CAPACITY`] events
/// (see [`Self::with_event_capacity`]) the oldest are dropped and counted.
#[derive(Debug)]
pub struct CombatWorld {
    registry: TagRegistry,
    engine: ReactionEngine,
    effects: EffectCatalog,
    equipment: HashMap<String, EquipmentDefinition>,
    entities: BTreeMap<EntityId, Entity>,
    next_id: u64,
    events: RefCell<VecDeque<CombatEvent>>,
    event_capacity: usize,
    dropped_events: Cell<usize>,
}

impl CombatWorld {
    /// Create a world with the given rules and effects.
    #[must_use]
    pub fn new(registry: TagRegistry, rules: RuleSet, effects: EffectCatalog) -> Self {
        Self {
            engine: ReactionEngine::new(rules, &registry),
            registry,
            effects,
            equipment: HashMap::new(),
            entities: BTreeMap::new(),
            next_id: 1,
            events: RefCell::new(VecDeque::new()),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            dropped_events: Cell::new(0),
        }
    }

    /// Builder method to bound the event log. A capacity of zero keeps
    /// nothing.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Build a world from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &ReactionSettings, registry: TagRegistry) -> Self {
        let rules = RuleSet::from_settings(settings, &registry);
        let effects = EffectCatalog::from_data(&settings.effects, &registry);
        let mut world = Self::new(registry, rules, effects);
        for data in &settings.equipment {
            let item = EquipmentDefinition::from_data(data, &world.registry);
            world.equipment.insert(item.id.clone(), item);
        }
        debug!(
            "Combat world ready: {} rules, {} effects, {} equipment",
            world.engine.rules().len(),
            world.effects.len(),
            world.equipment.len()
        );
        world
    }

    /// The tag registry shared by rules and entities.
    #[must_use]
    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    /// The reaction engine.
    #[must_use]
    pub fn engine(&self) -> &ReactionEngine {
        &self.engine
    }

    /// Swap in a new rule set.
    pub fn reload_rules(&self, rules: RuleSet) {
        self.engine.reload(rules);
    }

    /// Look up an effect by ID.
    #[must_use]
    pub fn effect(&self, id: &EffectId) -> Option<&EffectDefinition> {
        self.effects.get(id)
    }

    /// Look up catalog equipment by ID.
    #[must_use]
    pub fn equipment(&self, id: &str) -> Option<&EquipmentDefinition> {
        normalize_id(id).and_then(|id| self.equipment.get(id))
    }

    /// Spawn an entity and return its ID.
    pub fn spawn_entity(&mut self, params: EntitySpawnParams) -> Result<EntityId> {
        let attributes = AttributeState::new(params.max_health.unwrap_or(DEFAULT_MAX_HEALTH))?;
        let mut tags = TagContainer::new();
        tags.add_all(&params.tags);

        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(
            id,
            Entity {
                id,
                attributes,
                tags: RefCell::new(tags),
                equipment: EquipmentSlot::new(),
                combatant: !params.passive,
            },
        );
        Ok(id)
    }

    /// Remove an entity.
    pub fn despawn_entity(&mut self, id: EntityId) -> Result<()> {
        self.entities
            .remove(&id)
            .map(|_| ())
            .ok_or(ElementalError::EntityNotFound(id))
    }

    /// Get an entity by ID.
    #[must_use]
    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the world has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Current health of an entity.
    #[must_use]
    pub fn health(&self, id: EntityId) -> Option<f32> {
        self.entities.get(&id).map(|e| e.attributes.health())
    }

    /// Tags an entity owns.
    #[must_use]
    pub fn owned_tags(&self, id: EntityId) -> Option<TagSet> {
        self.entities.get(&id).map(Entity::owned_tags)
    }

    /// Resolve the combatant capability of an entity.
    #[must_use]
    pub fn actor(&self, id: EntityId) -> Option<Actor<'_>> {
        self.entities
            .get(&id)
            .filter(|e| e.combatant)
            .map(|_| Actor { world: self, id })
    }

    /// Grant one loose tag.
    pub fn grant_tag(&self, id: EntityId, tag: Tag) -> Result<()> {
        let entity = self.entities.get(&id).ok_or(ElementalError::EntityNotFound(id))?;
        entity.tags.borrow_mut().add(tag);
        Ok(())
    }

    /// Remove one grant of a loose tag. Returns false if it was not owned.
    pub fn remove_tag(&self, id: EntityId, tag: Tag) -> Result<bool> {
        let entity = self.entities.get(&id).ok_or(ElementalError::EntityNotFound(id))?;
        let removed = entity.tags.borrow_mut().remove(tag);
        Ok(removed)
    }

    /// Put `item` on an entity, granting its tags.
    pub fn equip(&mut self, id: EntityId, item: &EquipmentDefinition) -> Result<EquipOutcome> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(ElementalError::EntityNotFound(id))?;
        Ok(entity.equipment.equip(item, entity.tags.get_mut()))
    }

    /// Take off whatever an entity wears, revoking its tags.
    pub fn unequip(&mut self, id: EntityId) -> Result<Option<EquipmentDefinition>> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(ElementalError::EntityNotFound(id))?;
        Ok(entity.equipment.unequip(entity.tags.get_mut()))
    }

    /// Apply an effect from `source` to `target`.
    ///
    /// Runs synchronously to completion, including every reaction the hit
    /// triggers. Unknown effects and unknown targets are ignored. An unknown
    /// or passive source still lands its damage, but no reaction fires.
    pub fn apply_effect(
        &self,
        source: EntityId,
        effect: &EffectId,
        target: EntityId,
        extra_tags: &TagSet,
    ) {
        let Some(definition) = self.effects.get(effect) else {
            warn!("Ignoring unknown effect '{effect}' from {source} on {target}");
            return;
        };
        let Some(recipient) = self.entities.get(&target) else {
            warn!("Ignoring effect '{effect}' on unknown entity {target}");
            return;
        };

        let ctx = EffectContext::new(source, target, effect.clone())
            .as_reaction(extra_tags.contains(self.registry.reaction_tag()));
        self.record(CombatEvent::EffectApplied {
            source,
            target,
            effect: effect.clone(),
            is_reaction: ctx.is_reaction,
        });

        self.execute(definition, recipient, &ctx);
    }

    fn execute(&self, definition: &EffectDefinition, recipient: &Entity, ctx: &EffectContext) {
        {
            let mut tags = recipient.tags.borrow_mut();
            tags.remove_all(&definition.removed_tags);
            tags.add_all(&definition.granted_tags);
        }

        if !definition.deals_damage() {
            return;
        }

        recipient.attributes.set_incoming_damage(definition.damage);

        let source_actor = self.actor(ctx.source);
        let target_actor = self.actor(ctx.target);
        recipient.attributes.post_effect_execute(
            Attribute::IncomingDamage,
            ctx,
            &self.engine,
            capability(source_actor.as_ref()),
            capability(target_actor.as_ref()),
            |change| {
                self.record(CombatEvent::DamageTaken {
                    target: ctx.target,
                    damage: change.damage,
                    previous_health: change.previous,
                    health: change.current,
                });
            },
        );
    }

    fn record(&self, event: CombatEvent) {
        let mut events = self.events.borrow_mut();
        events.push_back(event);
        if events.len() <= self.event_capacity {
            return;
        }

        events.pop_front();
        let dropped = self.dropped_events.get() + 1;
        if dropped == 1 {
            warn!(
                "Event log full ({} events), dropping oldest until drained",
                self.event_capacity
            );
        }
        self.dropped_events.set(dropped);
    }

    /// Events recorded so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<CombatEvent> {
        self.events.borrow().iter().cloned().collect()
    }

    /// Events dropped because the log was full since the last drain.
    #[must_use]
    pub fn dropped_events(&self) -> usize {
        self.dropped_events.get()
    }

    /// Drain the event log. Hosts should call this every frame or hit.
    pub fn take_events(&self) -> Vec<CombatEvent> {
        self.dropped_events.set(0);
        std::mem::take(&mut *self.events.borrow_mut()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ReactionRule;

    fn world_with(rules: &[(&str, &str, &str)], effects: Vec<EffectDefinition>) -> CombatWorld {
        let registry = TagRegistry::new();
        let rules = rules
            .iter()
            .map(|(s, t, e)| {
                ReactionRule::new(registry.intern(s), registry.intern(t), EffectId::new(e))
            })
            .collect();
        let mut catalog = EffectCatalog::new();
        for effect in effects {
            catalog.insert(effect);
        }
        CombatWorld::new(registry, RuleSet::new(rules), catalog)
    }

    fn spawn(world: &mut CombatWorld, tags: &[&str]) -> EntityId {
        let tags = tags.iter().map(|t| world.registry().intern(t)).collect();
        world
            .spawn_entity(EntitySpawnParams {
                tags,
                ..Default::default()
            })
            .unwrap()
    }

    #[test]
    fn test_spawn_entity() {
        let mut world = world_with(&[], vec![]);
        let id = world
            .spawn_entity(EntitySpawnParams {
                max_health: Some(250.0),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(id, EntityId(1));
        assert_eq!(world.health(id), Some(250.0));
        assert!(world.get_entity(id).unwrap().is_combatant());
        assert!(world
            .spawn_entity(EntitySpawnParams {
                max_health: Some(-5.0),
                ..Default::default()
            })
            .is_err());
    }

    #[test]
    fn test_despawn_entity() {
        let mut world = world_with(&[], vec![]);
        let id = spawn(&mut world, &[]);

        assert!(world.despawn_entity(id).is_ok());
        assert!(world.get_entity(id).is_none());
        assert!(world.despawn_entity(id).is_err());
    }

    #[test]
    fn test_plain_damage_records_events() {
        let mut world = world_with(&[], vec![EffectDefinition::damage("GE_Hit", 30.0)]);
        let a = spawn(&mut world, &[]);
        let b = spawn(&mut world, &[]);

        world.apply_effect(a, &EffectId::new("GE_Hit"), b, &TagSet::new());

        assert_eq!(world.health(b), Some(70.0));
        assert_eq!(
            world.take_events(),
            vec![
                CombatEvent::EffectApplied {
                    source: a,
                    target: b,
                    effect: EffectId::new("GE_Hit"),
                    is_reaction: false,
                },
                CombatEvent::DamageTaken {
                    target: b,
                    damage: 30.0,
                    previous_health: 100.0,
                    health: 70.0,
                },
            ]
        );
        assert!(world.events().is_empty());
    }

    #[test]
    fn test_event_log_drops_oldest_when_full() {
        let mut world =
            world_with(&[], vec![EffectDefinition::damage("GE_Hit", 1.0)]).with_event_capacity(3);
        let a = spawn(&mut world, &[]);
        let b = spawn(&mut world, &[]);

        for _ in 0..3 {
            world.apply_effect(a, &EffectId::new("GE_Hit"), b, &TagSet::new());
        }

        // Six events recorded, the first three dropped.
        assert_eq!(world.dropped_events(), 3);
        let events = world.take_events();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            CombatEvent::DamageTaken {
                target: b,
                damage: 1.0,
                previous_health: 99.0,
                health: 98.0,
            }
        );
        assert!(matches!(events[2], CombatEvent::DamageTaken { health, .. } if health == 97.0));
        assert_eq!(world.dropped_events(), 0);
        assert_eq!(world.health(b), Some(97.0));
    }

    #[test]
    fn test_effect_grants_and_removes_tags() {
        let mut world = world_with(&[], vec![]);
        let oil = world.registry().intern("Status.Oil");
        let wet = world.registry().intern("Status.Wet");
        let mut catalog = EffectCatalog::new();
        catalog.insert(
            EffectDefinition::damage("GE_Oil", 0.0)
                .with_granted_tags(vec![oil])
                .with_removed_tags(vec![wet]),
        );
        world.effects = catalog;

        let a = spawn(&mut world, &[]);
        let b = spawn(&mut world, &["Status.Wet"]);
        world.apply_effect(a, &EffectId::new("GE_Oil"), b, &TagSet::new());

        let tags = world.owned_tags(b).unwrap();
        assert!(tags.contains(oil));
        assert!(!tags.contains(wet));
        assert_eq!(world.health(b), Some(100.0));
    }

    #[test]
    fn test_unknown_effect_and_target_ignored() {
        let mut world = world_with(&[], vec![EffectDefinition::damage("GE_Hit", 10.0)]);
        let a = spawn(&mut world, &[]);

        world.apply_effect(a, &EffectId::new("GE_Nope"), a, &TagSet::new());
        world.apply_effect(a, &EffectId::new("GE_Hit"), EntityId(99), &TagSet::new());

        assert_eq!(world.health(a), Some(100.0));
        assert!(world.events().is_empty());
    }

    #[test]
    fn test_reaction_marks_context() {
        let mut world = world_with(
            &[("Element.Fire", "Status.Oil", "GE_Explosion")],
            vec![
                EffectDefinition::damage("GE_Fireball", 10.0),
                EffectDefinition::damage("GE_Explosion", 40.0),
            ],
        );
        let mage = spawn(&mut world, &["Element.Fire"]);
        let target = spawn(&mut world, &["Status.Oil"]);

        world.apply_effect(mage, &EffectId::new("GE_Fireball"), target, &TagSet::new());

        let reactions: Vec<_> = world
            .events()
            .into_iter()
            .filter(|e| matches!(e, CombatEvent::EffectApplied { is_reaction: true, .. }))
            .collect();
        assert_eq!(reactions.len(), 1);
        assert_eq!(world.health(target), Some(50.0));
    }

    #[test]
    fn test_passive_entity_takes_damage_without_reactions() {
        let mut world = world_with(
            &[("Element.Fire", "Status.Oil", "GE_Explosion")],
            vec![
                EffectDefinition::damage("GE_Fireball", 10.0),
                EffectDefinition::damage("GE_Explosion", 40.0),
            ],
        );
        let mage = spawn(&mut world, &["Element.Fire"]);
        let oil = world.registry().intern("Status.Oil");
        let barrel = world
            .spawn_entity(EntitySpawnParams {
                tags: vec![oil],
                passive: true,
                ..Default::default()
            })
            .unwrap();

        world.apply_effect(mage, &EffectId::new("GE_Fireball"), barrel, &TagSet::new());

        assert_eq!(world.health(barrel), Some(90.0));
        assert!(world.actor(barrel).is_none());
    }

    #[test]
    fn test_equip_changes_reaction_source_tags() {
        let mut world = world_with(
            &[("Element.Fire", "Status.Oil", "GE_Explosion")],
            vec![
                EffectDefinition::damage("GE_Slash", 5.0),
                EffectDefinition::damage("GE_Explosion", 40.0),
            ],
        );
        let fire = world.registry().intern("Element.Fire");
        let sword = EquipmentDefinition {
            id: "flame_sword".to_string(),
            tags: vec![fire],
        };
        let knight = spawn(&mut world, &[]);
        let target = spawn(&mut world, &["Status.Oil"]);

        world.equip(knight, &sword).unwrap();
        world.apply_effect(knight, &EffectId::new("GE_Slash"), target, &TagSet::new());
        assert_eq!(world.health(target), Some(55.0));

        world.unequip(knight).unwrap();
        world.apply_effect(knight, &EffectId::new("GE_Slash"), target, &TagSet::new());
        assert_eq!(world.health(target), Some(50.0));
    }

    #[test]
    fn test_tag_operations_on_missing_entity() {
        let world = world_with(&[], vec![]);
        let tag = world.registry().intern("Status.Oil");
        assert!(world.grant_tag(EntityId(5), tag).is_err());
        assert!(world.remove_tag(EntityId(5), tag).is_err());
    }
}
