//! Equipment definitions.

use serde::{Deserialize, Serialize};

/// A piece of equipment and the tags it grants its wearer.
///
/// Visual meshes, attach sockets and granted abilities belong to the host
/// and are not modelled here.
///
/// # Example RON
///
/// ```ron
/// EquipmentData(
///     id: "flame_sword",
///     tags: ["Element.Fire", "Equipment.Type.Sword"],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentData {
    /// Unique equipment identifier.
    pub id: String,

    /// Tags applied to the owner while equipped.
    #[serde(default)]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_equipment() {
        let item: EquipmentData =
            ron::from_str(r#"(id: "flame_sword", tags: ["Element.Fire"])"#).unwrap();
        assert_eq!(item.id, "flame_sword");
        assert_eq!(item.tags, vec!["Element.Fire".to_string()]);

        let bare: EquipmentData = ron::from_str(r#"(id: "stick")"#).unwrap();
        assert!(bare.tags.is_empty());
    }
}
