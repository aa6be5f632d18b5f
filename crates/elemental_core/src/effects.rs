//! Effect catalog.

use std::collections::HashMap;

use crate::combatant::EffectId;
use crate::data::{normalize_id, EffectData};
use crate::tags::{Tag, TagRegistry};

/// An effect with its tags interned.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectDefinition {
    /// Effect identity.
    pub id: EffectId,
    /// Damage routed through the incoming-damage meta attribute.
    pub damage: f32,
    /// Tags granted to the target.
    pub granted_tags: Vec<Tag>,
    /// Tags removed from the target.
    pub removed_tags: Vec<Tag>,
}

impl EffectDefinition {
    /// A plain damage effect.
    #[must_use]
    pub fn damage(id: &str, damage: f32) -> Self {
        Self {
            id: EffectId::new(id),
            damage,
            granted_tags: Vec::new(),
            removed_tags: Vec::new(),
        }
    }

    /// Builder method to grant tags.
    #[must_use]
    pub fn with_granted_tags(mut self, tags: Vec<Tag>) -> Self {
        self.granted_tags = tags;
        self
    }

    /// Builder method to remove tags.
    #[must_use]
    pub fn with_removed_tags(mut self, tags: Vec<Tag>) -> Self {
        self.removed_tags = tags;
        self
    }

    /// Intern an effect record. IDs and tag names are normalized; blank
    /// tag names are dropped.
    #[must_use]
    pub fn from_data(data: &EffectData, registry: &TagRegistry) -> Self {
        let intern_all = |names: &[String]| {
            names
                .iter()
                .filter_map(|t| registry.intern_optional(Some(t.as_str())))
                .collect()
        };
        Self {
            id: EffectId::new(normalize_id(&data.id).unwrap_or_default()),
            damage: data.damage,
            granted_tags: intern_all(&data.granted_tags),
            removed_tags: intern_all(&data.removed_tags),
        }
    }

    /// Check if this effect routes any damage.
    #[must_use]
    pub fn deals_damage(&self) -> bool {
        self.damage > 0.0
    }
}

/// Effects known to a world, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct EffectCatalog {
    effects: HashMap<EffectId, EffectDefinition>,
}

impl EffectCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from effect records. Later duplicates win.
    #[must_use]
    pub fn from_data(effects: &[EffectData], registry: &TagRegistry) -> Self {
        let mut catalog = Self::new();
        for data in effects {
            catalog.insert(EffectDefinition::from_data(data, registry));
        }
        catalog
    }

    /// Register an effect, returning the definition it replaced.
    pub fn insert(&mut self, effect: EffectDefinition) -> Option<EffectDefinition> {
        self.effects.insert(effect.id.clone(), effect)
    }

    /// Look up an effect.
    #[must_use]
    pub fn get(&self, id: &EffectId) -> Option<&EffectDefinition> {
        self.effects.get(id)
    }

    /// Number of registered effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_from_data() {
        let registry = TagRegistry::new();
        let data = vec![
            EffectData::damage("GE_Explosion", 40.0),
            EffectData {
                id: "GE_Oil".to_string(),
                damage: 0.0,
                granted_tags: vec!["Status.Oil".to_string()],
                removed_tags: vec![],
            },
        ];

        let catalog = EffectCatalog::from_data(&data, &registry);

        assert_eq!(catalog.len(), 2);
        let oil = catalog.get(&EffectId::new("GE_Oil")).unwrap();
        assert_eq!(oil.granted_tags, vec![registry.intern("Status.Oil")]);
        assert!(catalog.get(&EffectId::new("GE_Missing")).is_none());
        assert!(!oil.deals_damage());
        assert!(catalog.get(&EffectId::new("GE_Explosion")).unwrap().deals_damage());
    }

    #[test]
    fn test_padded_ids_are_normalized() {
        let registry = TagRegistry::new();
        let data = vec![EffectData {
            id: " GE_Oil ".to_string(),
            damage: 0.0,
            granted_tags: vec!["Status.Oil  ".to_string(), "  ".to_string()],
            removed_tags: vec![],
        }];

        let catalog = EffectCatalog::from_data(&data, &registry);

        let oil = catalog.get(&EffectId::new("GE_Oil")).unwrap();
        assert_eq!(oil.granted_tags, vec![registry.intern("Status.Oil")]);
    }

    #[test]
    fn test_insert_replaces() {
        let mut catalog = EffectCatalog::new();
        assert!(catalog.insert(EffectDefinition::damage("GE_Hit", 5.0)).is_none());
        let old = catalog.insert(EffectDefinition::damage("GE_Hit", 8.0));
        assert_eq!(old.map(|e| e.damage), Some(5.0));
        assert_eq!(catalog.len(), 1);
    }
}
