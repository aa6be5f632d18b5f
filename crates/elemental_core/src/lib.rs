//! # Elemental Core
//!
//! Tag-driven elemental reactions for combat effects.
//!
//! When an entity takes damage, the attacker's tags and the victim's tags are
//! matched against a table of reaction rules (`Fire` + `Oil` -> `Explosion`).
//! Every matching rule applies its reaction effect from the attacker to the
//! victim, synchronously and within the same call.
//!
//! This crate contains **only** combat logic:
//! - No rendering
//! - No IO (settings are parsed from strings; loading files lives in
//!   `elemental_tools`)
//! - No global state
//!
//! ## Crate Structure
//!
//! - [`tags`] - Tag interning, tag sets and counted containers
//! - [`combatant`] - Entity/effect identities and the combatant capability
//! - [`guard`] - Per-entity re-entrancy guard
//! - [`rules`] - Reaction rules and the hot-swappable rule set
//! - [`engine`] - Reaction evaluation
//! - [`attributes`] - Health attributes and the damage step
//! - [`effects`] - Effect catalog
//! - [`equipment`] - Equipment tag loadouts
//! - [`world`] - In-memory host wiring everything together
//! - [`data`] - Serializable settings

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod attributes;
pub mod combatant;
pub mod data;
pub mod effects;
pub mod engine;
pub mod equipment;
pub mod error;
pub mod guard;
pub mod rules;
pub mod tags;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::attributes::{Attribute, AttributeState, DamageResolution, HealthChange};
    pub use crate::combatant::{Capability, Combatant, EffectContext, EffectId, EntityId};
    pub use crate::data::{EffectData, EquipmentData, ReactionRuleData, ReactionSettings};
    pub use crate::effects::{EffectCatalog, EffectDefinition};
    pub use crate::engine::{ReactionEngine, ReactionReport};
    pub use crate::equipment::{EquipOutcome, EquipmentDefinition, EquipmentSlot};
    pub use crate::error::{ElementalError, Result};
    pub use crate::guard::{GuardState, ReactionGuard};
    pub use crate::rules::{ReactionRule, RuleSet, RuleSetHandle};
    pub use crate::tags::{Tag, TagContainer, TagRegistry, TagSet, REACTION_TAG_NAME};
    pub use crate::world::{Actor, CombatEvent, CombatWorld, EntitySpawnParams};
}
