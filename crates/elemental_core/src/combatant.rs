//! The combatant capability consumed by the reaction engine.
//!
//! The engine never owns entities. It sees each side of an exchange through
//! the [`Combatant`] trait, resolved once per evaluation into a
//! [`Capability`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::tags::TagSet;

/// Unique identifier for an entity in the host world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of an effect definition ("GE_Explosion").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(Arc<str>);

impl EffectId {
    /// Create an effect id from a name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// Effect name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EffectId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for EffectId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EffectId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self(Arc::from(name)))
    }
}

/// Context carried along one effect application.
///
/// Created per application and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectContext {
    /// The originating attacker.
    pub source: EntityId,
    /// The entity receiving the effect.
    pub target: EntityId,
    /// The effect being applied.
    pub applied_effect: EffectId,
    /// Set when the reaction engine produced this effect.
    ///
    /// Informational only; rule self-exclusion compares effect ids.
    pub is_reaction: bool,
}

impl EffectContext {
    /// Context for a directly applied (non-reaction) effect.
    #[must_use]
    pub fn new(source: EntityId, target: EntityId, applied_effect: EffectId) -> Self {
        Self {
            source,
            target,
            applied_effect,
            is_reaction: false,
        }
    }

    /// Mark the context as produced by the reaction engine.
    #[must_use]
    pub fn as_reaction(mut self, is_reaction: bool) -> Self {
        self.is_reaction = is_reaction;
        self
    }
}

/// Per-entity surface the reaction engine works through.
///
/// `apply_effect` must be synchronous: any damage it causes, including
/// nested reactions, is fully resolved before it returns.
pub trait Combatant {
    /// The entity this capability belongs to.
    fn entity(&self) -> EntityId;

    /// Tags the entity currently owns.
    fn owned_tags(&self) -> TagSet;

    /// Apply `effect` from this entity to `target`, marking it with `extra_tags`.
    fn apply_effect(&self, effect: &EffectId, target: EntityId, extra_tags: &TagSet);
}

/// Result of resolving the combatant capability of an entity.
#[derive(Clone, Copy)]
pub enum Capability<'a> {
    /// The entity can report tags and apply effects.
    Available(&'a dyn Combatant),
    /// The entity has no combatant surface.
    Missing,
}

impl<'a> Capability<'a> {
    /// The combatant, if available.
    #[must_use]
    pub fn combatant(self) -> Option<&'a dyn Combatant> {
        match self {
            Self::Available(combatant) => Some(combatant),
            Self::Missing => None,
        }
    }

    /// Check if the capability is present.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

impl<'a> From<Option<&'a dyn Combatant>> for Capability<'a> {
    fn from(value: Option<&'a dyn Combatant>) -> Self {
        value.map_or(Self::Missing, Self::Available)
    }
}

impl fmt::Debug for Capability<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(combatant) => f
                .debug_tuple("Available")
                .field(&combatant.entity())
                .finish(),
            Self::Missing => f.write_str("Missing"),
        }
    }
}
