//! Item definitions shared between client and server.

use serde::{Deserialize, Serialize};

/// Every stat a `Status` carries. Effects, consumables and equipment
/// bonuses address stats through this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stat {
    Hp,
    MaxHp,
    HpRegen,
    Mana,
    MaxMana,
    ManaRegen,
    Stamina,
    MaxStamina,
    StaminaRegen,
    Damage,
    Critical,
    Defense,
    Speed,
    Acceleration,
}

impl Stat {
    /// The max stat that caps this one, if it is a resource.
    pub fn max_pair(self) -> Option<Stat> {
        match self {
            Stat::Hp => Some(Stat::MaxHp),
            Stat::Mana => Some(Stat::MaxMana),
            Stat::Stamina => Some(Stat::MaxStamina),
            _ => None,
        }
    }
}

/// Named equipment slots. `Hand1`/`Hand2` only ever hold weapons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipSlot {
    Head,
    Body,
    Leg,
    Foot,
    Bag,
    Hands,
    Neck,
    Belt,
    Arm,
    Hand1,
    Hand2,
}

impl EquipSlot {
    pub const ALL: [EquipSlot; 11] = [
        EquipSlot::Head,
        EquipSlot::Body,
        EquipSlot::Leg,
        EquipSlot::Foot,
        EquipSlot::Bag,
        EquipSlot::Hands,
        EquipSlot::Neck,
        EquipSlot::Belt,
        EquipSlot::Arm,
        EquipSlot::Hand1,
        EquipSlot::Hand2,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn is_hand(&self) -> bool {
        matches!(self, EquipSlot::Hand1 | EquipSlot::Hand2)
    }

    pub fn name(&self) -> &'static str {
        match self {
            EquipSlot::Head => "head",
            EquipSlot::Body => "body",
            EquipSlot::Leg => "leg",
            EquipSlot::Foot => "foot",
            EquipSlot::Bag => "bag",
            EquipSlot::Hands => "hands",
            EquipSlot::Neck => "neck",
            EquipSlot::Belt => "belt",
            EquipSlot::Arm => "arm",
            EquipSlot::Hand1 => "hand1",
            EquipSlot::Hand2 => "hand2",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }
}

/// Category tag sent to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemCategory {
    Consumable,
    Equipment,
    Weapon,
}

/// Item definition (one row of the item catalog)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: u32,
    pub name: String,
    pub texture: u32,
    pub description: String,
    pub kind: ItemDefKind,
}

/// Variant-specific part of an item definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ItemDefKind {
    Consumable {
        stat: Stat,
        value: f32,
    },
    Equipment {
        slot: EquipSlot,
        bonuses: Vec<(Stat, f32)>,
    },
    Weapon {
        damage: f32,
        critical: f32,
        range: f32,
        /// Attacks per second
        speed: f32,
        #[serde(default)]
        action_texture: Option<u32>,
        #[serde(default = "default_projectile_texture")]
        projectile_texture: u32,
    },
}

/// Persisted reference to an item: catalog id plus stack size.
/// This is the element type of the inventory and equipment blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: u32,
    #[serde(default = "default_quantity")]
    pub quant: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Texture used for projectiles when a weapon does not name one
pub const DEFAULT_PROJECTILE_TEXTURE: u32 = 28;

fn default_projectile_texture() -> u32 {
    DEFAULT_PROJECTILE_TEXTURE
}

/// Built-in item definitions, used when the catalog table is empty
pub fn get_item_definitions() -> Vec<ItemDef> {
    vec![
        ItemDef {
            id: 1,
            name: "Health Potion".into(),
            texture: 40,
            description: "Restores 50 health.".into(),
            kind: ItemDefKind::Consumable { stat: Stat::Hp, value: 50.0 },
        },
        ItemDef {
            id: 2,
            name: "Mana Potion".into(),
            texture: 41,
            description: "Restores 30 mana.".into(),
            kind: ItemDefKind::Consumable { stat: Stat::Mana, value: 30.0 },
        },
        ItemDef {
            id: 3,
            name: "Stamina Tonic".into(),
            texture: 42,
            description: "Restores 40 stamina.".into(),
            kind: ItemDefKind::Consumable { stat: Stat::Stamina, value: 40.0 },
        },
        ItemDef {
            id: 10,
            name: "Leather Cap".into(),
            texture: 50,
            description: "Simple head protection.".into(),
            kind: ItemDefKind::Equipment {
                slot: EquipSlot::Head,
                bonuses: vec![(Stat::Defense, 2.0)],
            },
        },
        ItemDef {
            id: 11,
            name: "Traveler Boots".into(),
            texture: 51,
            description: "Light boots for long roads.".into(),
            kind: ItemDefKind::Equipment {
                slot: EquipSlot::Foot,
                bonuses: vec![(Stat::Speed, 0.5), (Stat::Defense, 1.0)],
            },
        },
        ItemDef {
            id: 20,
            name: "Short Bow".into(),
            texture: 60,
            description: "Fires arrows at a steady pace.".into(),
            kind: ItemDefKind::Weapon {
                damage: 6.0,
                critical: 0.05,
                range: 300.0,
                speed: 1.0,
                action_texture: Some(61),
                projectile_texture: DEFAULT_PROJECTILE_TEXTURE,
            },
        },
        ItemDef {
            id: 21,
            name: "Wand".into(),
            texture: 62,
            description: "Quick bolts with little punch.".into(),
            kind: ItemDefKind::Weapon {
                damage: 3.0,
                critical: 0.1,
                range: 200.0,
                speed: 2.0,
                action_texture: None,
                projectile_texture: 29,
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equip_slot_lookup() {
        assert_eq!(EquipSlot::from_name("hand2"), Some(EquipSlot::Hand2));
        assert_eq!(EquipSlot::from_name("tail"), None);
        assert!(EquipSlot::Hand1.is_hand());
        assert!(!EquipSlot::Belt.is_hand());
    }

    #[test]
    fn test_weapon_without_projectile_texture_uses_default() {
        let json = r#"{"Weapon":{"damage":6.0,"critical":0.0,"range":300.0,"speed":1.0}}"#;
        let kind: ItemDefKind = serde_json::from_str(json).unwrap();
        match kind {
            ItemDefKind::Weapon {
                action_texture,
                projectile_texture,
                ..
            } => {
                assert_eq!(action_texture, None);
                assert_eq!(projectile_texture, DEFAULT_PROJECTILE_TEXTURE);
            }
            other => panic!("expected weapon, got {:?}", other),
        }

        let json = r#"{"Weapon":{"damage":6.0,"critical":0.0,"range":300.0,"speed":1.0,"action_texture":61,"projectile_texture":29}}"#;
        let kind: ItemDefKind = serde_json::from_str(json).unwrap();
        assert!(matches!(
            kind,
            ItemDefKind::Weapon { action_texture: Some(61), projectile_texture: 29, .. }
        ));
    }
}
