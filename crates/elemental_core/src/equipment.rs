//! Equipment tag loadouts.
//!
//! Equipping an item grants its tags to the wearer; unequipping removes
//! exactly those grants. Tags feed [`crate::combatant::Combatant::owned_tags`],
//! which is how a "flame sword" makes its wielder a Fire source.

use tracing::debug;

use crate::data::{normalize_id, EquipmentData};
use crate::tags::{Tag, TagContainer, TagRegistry};

/// Equipment with its tags interned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentDefinition {
    /// Unique equipment identifier.
    pub id: String,
    /// Tags granted while equipped.
    pub tags: Vec<Tag>,
}

impl EquipmentDefinition {
    /// Intern an equipment record's tags. IDs and tag names are normalized.
    #[must_use]
    pub fn from_data(data: &EquipmentData, registry: &TagRegistry) -> Self {
        Self {
            id: normalize_id(&data.id).unwrap_or_default().to_string(),
            tags: data
                .tags
                .iter()
                .filter_map(|t| registry.intern_optional(Some(t.as_str())))
                .collect(),
        }
    }
}

/// Result of an equip request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquipOutcome {
    /// The item was already worn; nothing changed.
    AlreadyEquipped,
    /// The item is now worn, replacing `previous` if there was one.
    Equipped {
        /// The item that was removed to make room.
        previous: Option<String>,
    },
}

/// The single equipment slot of one entity.
#[derive(Debug, Clone, Default)]
pub struct EquipmentSlot {
    current: Option<EquipmentDefinition>,
}

impl EquipmentSlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently worn item.
    #[must_use]
    pub fn current(&self) -> Option<&EquipmentDefinition> {
        self.current.as_ref()
    }

    /// Wear `item`, granting its tags into `tags`.
    ///
    /// Wearing the item already worn is a no-op. A different item already
    /// worn is unequipped first.
    pub fn equip(&mut self, item: &EquipmentDefinition, tags: &mut TagContainer) -> EquipOutcome {
        if self.current.as_ref().is_some_and(|c| c.id == item.id) {
            return EquipOutcome::AlreadyEquipped;
        }

        let previous = self.unequip(tags).map(|old| old.id);
        tags.add_all(&item.tags);
        self.current = Some(item.clone());
        debug!("Equipped '{}' granting {} tags", item.id, item.tags.len());

        EquipOutcome::Equipped { previous }
    }

    /// Remove the worn item and its tag grants.
    pub fn unequip(&mut self, tags: &mut TagContainer) -> Option<EquipmentDefinition> {
        let old = self.current.take()?;
        tags.remove_all(&old.tags);
        debug!("Unequipped '{}'", old.id);
        Some(old)
    }
}
