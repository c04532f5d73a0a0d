//! Equipped items by named slot.

use log::warn;
use skirmish_shared::{EquipSlot, EquippedSnapshot, ItemRecord};

use super::item::{Item, ItemKind, Weapon};

/// One optional item per `EquipSlot`
#[derive(Debug, Clone)]
pub struct EquipmentSet {
    slots: [Option<Item>; EquipSlot::ALL.len()],
}

impl Default for EquipmentSet {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }
}

impl EquipmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: EquipSlot) -> Option<&Item> {
        self.slots[slot.index()].as_ref()
    }

    /// Slot an item would be placed into, `None` if it cannot be equipped.
    /// Weapons fill `hand1`, then `hand2`, then push into `hand1`.
    pub fn target_slot(&self, item: &Item) -> Option<EquipSlot> {
        match &item.kind {
            ItemKind::Consumable(_) => None,
            ItemKind::Equipment(equipment) if equipment.slot.is_hand() => None,
            ItemKind::Equipment(equipment) => Some(equipment.slot),
            ItemKind::Weapon(_) => {
                if self.get(EquipSlot::Hand1).is_none() {
                    Some(EquipSlot::Hand1)
                } else if self.get(EquipSlot::Hand2).is_none() {
                    Some(EquipSlot::Hand2)
                } else {
                    Some(EquipSlot::Hand1)
                }
            }
        }
    }

    /// Whether equipping `item` hands an already equipped item back
    pub fn would_displace(&self, item: &Item) -> bool {
        match (&item.kind, self.target_slot(item)) {
            (ItemKind::Weapon(_), Some(_)) => {
                self.get(EquipSlot::Hand1).is_some() && self.get(EquipSlot::Hand2).is_some()
            }
            (_, Some(slot)) => self.get(slot).is_some(),
            (_, None) => false,
        }
    }

    /// Equip an item and return whatever it displaced.
    ///
    /// With both hands full, a new weapon takes `hand1`, the old `hand1`
    /// moves to `hand2` and the old `hand2` is returned. Items that cannot
    /// be equipped come back as `Err`.
    pub fn equip(&mut self, item: Item) -> Result<Option<Item>, Item> {
        let Some(slot) = self.target_slot(&item) else {
            return Err(item);
        };

        if matches!(item.kind, ItemKind::Weapon(_))
            && self.get(EquipSlot::Hand1).is_some()
            && self.get(EquipSlot::Hand2).is_some()
        {
            let displaced = self.slots[EquipSlot::Hand2.index()].take();
            self.slots[EquipSlot::Hand2.index()] = self.slots[EquipSlot::Hand1.index()].take();
            self.slots[EquipSlot::Hand1.index()] = Some(item);
            return Ok(displaced);
        }

        Ok(self.slots[slot.index()].replace(item))
    }

    pub fn unequip(&mut self, slot: EquipSlot) -> Option<Item> {
        self.slots[slot.index()].take()
    }

    /// Weapon in `hand1`, the one used for attacks
    pub fn active_weapon(&self) -> Option<&Weapon> {
        match self.get(EquipSlot::Hand1).map(|i| &i.kind) {
            Some(ItemKind::Weapon(weapon)) => Some(weapon),
            _ => None,
        }
    }

    pub fn active_weapon_mut(&mut self) -> Option<&mut Weapon> {
        match self.slots[EquipSlot::Hand1.index()].as_mut().map(|i| &mut i.kind) {
            Some(ItemKind::Weapon(weapon)) => Some(weapon),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (EquipSlot, &Item)> {
        EquipSlot::ALL
            .iter()
            .filter_map(|slot| self.get(*slot).map(|item| (*slot, item)))
    }

    /// Restore persisted equipment. Records that name an unknown item, a
    /// slot the item does not fit, or a slot already filled are skipped.
    pub fn load_equips<F>(&mut self, records: &[(EquipSlot, ItemRecord)], factory: F)
    where
        F: Fn(&ItemRecord) -> Option<Item>,
    {
        for (slot, record) in records {
            let Some(item) = factory(record) else {
                warn!("Skipping unknown item {} in equipment slot {}", record.id, slot.name());
                continue;
            };
            let fits = match &item.kind {
                ItemKind::Weapon(_) => slot.is_hand(),
                ItemKind::Equipment(equipment) => equipment.slot == *slot,
                ItemKind::Consumable(_) => false,
            };
            if !fits || self.get(*slot).is_some() {
                warn!("Item {} does not fit equipment slot {}", record.id, slot.name());
                continue;
            }
            self.slots[slot.index()] = Some(item);
        }
    }

    pub fn to_records(&self) -> Vec<(EquipSlot, ItemRecord)> {
        self.iter().map(|(slot, item)| (slot, item.to_record())).collect()
    }

    pub fn snapshot(&self) -> Vec<EquippedSnapshot> {
        self.iter()
            .map(|(slot, item)| EquippedSnapshot {
                slot,
                item: item.snapshot(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::item::ItemCatalog;
    use skirmish_shared::{get_item_definitions, ItemDef, ItemDefKind};

    fn catalog() -> ItemCatalog {
        let mut defs = get_item_definitions();
        for id in [101, 102, 103] {
            defs.push(ItemDef {
                id,
                name: format!("Weapon {}", id),
                texture: id,
                description: String::new(),
                kind: ItemDefKind::Weapon {
                    damage: 1.0,
                    critical: 0.0,
                    range: 100.0,
                    speed: 1.0,
                    action_texture: None,
                    projectile_texture: 28,
                },
            });
        }
        ItemCatalog::new(defs)
    }

    fn item(catalog: &ItemCatalog, id: u32) -> Item {
        catalog.create(&ItemRecord { id, quant: 1 }).unwrap()
    }

    #[test]
    fn test_weapon_ring() {
        let catalog = catalog();
        let mut set = EquipmentSet::new();

        assert_eq!(set.equip(item(&catalog, 101)).unwrap(), None);
        assert_eq!(set.equip(item(&catalog, 102)).unwrap(), None);
        let returned = set.equip(item(&catalog, 103)).unwrap();

        assert_eq!(set.get(EquipSlot::Hand1).map(|i| i.id), Some(103));
        assert_eq!(set.get(EquipSlot::Hand2).map(|i| i.id), Some(101));
        assert_eq!(returned.map(|i| i.id), Some(102));
    }

    #[test]
    fn test_equipment_slot_returns_previous_occupant() {
        let catalog = catalog();
        let mut set = EquipmentSet::new();

        let first = item(&catalog, 10);
        assert_eq!(set.equip(first.clone()).unwrap(), None);
        let returned = set.equip(item(&catalog, 10)).unwrap();
        assert_eq!(returned, Some(first));
        assert_eq!(set.get(EquipSlot::Head).map(|i| i.id), Some(10));
    }

    #[test]
    fn test_consumable_cannot_be_equipped() {
        let catalog = catalog();
        let mut set = EquipmentSet::new();
        let potion = item(&catalog, 1);
        assert!(set.target_slot(&potion).is_none());
        assert_eq!(set.equip(potion).unwrap_err().id, 1);
    }

    #[test]
    fn test_would_displace() {
        let catalog = catalog();
        let mut set = EquipmentSet::new();
        let bow = item(&catalog, 20);
        assert!(!set.would_displace(&bow));
        set.equip(bow.clone()).unwrap();
        assert!(!set.would_displace(&bow));
        set.equip(bow.clone()).unwrap();
        assert!(set.would_displace(&bow));
        assert!(!set.would_displace(&item(&catalog, 11)));
    }

    #[test]
    fn test_active_weapon_is_hand1() {
        let catalog = catalog();
        let mut set = EquipmentSet::new();
        assert!(set.active_weapon().is_none());
        set.equip(item(&catalog, 21)).unwrap();
        assert_eq!(set.active_weapon().map(|w| w.projectile_texture), Some(29));
    }

    #[test]
    fn test_load_equips_skips_mismatched_slots() {
        let catalog = catalog();
        let mut set = EquipmentSet::new();
        let records = vec![
            (EquipSlot::Head, ItemRecord { id: 10, quant: 1 }),
            (EquipSlot::Belt, ItemRecord { id: 11, quant: 1 }),
            (EquipSlot::Hand2, ItemRecord { id: 20, quant: 1 }),
        ];
        set.load_equips(&records, |r| catalog.create(r));

        assert_eq!(set.get(EquipSlot::Head).map(|i| i.id), Some(10));
        assert!(set.get(EquipSlot::Belt).is_none());
        assert_eq!(set.get(EquipSlot::Hand2).map(|i| i.id), Some(20));
        assert_eq!(set.to_records().len(), 2);
    }
}
