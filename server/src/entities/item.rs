//! Server-side item instances and the item catalog.

use std::collections::HashMap;

use skirmish_shared::{
    EquipSlot, ItemCategory, ItemDef, ItemDefKind, ItemRecord, ItemSnapshot, Stat,
};

use super::projectile::Projectile;
use super::status::Status;

/// An item instance held in an inventory or equipment slot
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: u32,
    pub name: String,
    pub texture: u32,
    pub description: String,
    pub quantity: u32,
    pub kind: ItemKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Consumable(Consumable),
    Equipment(Equipment),
    Weapon(Weapon),
}

/// Restores (or drains) one stat when used
#[derive(Debug, Clone, PartialEq)]
pub struct Consumable {
    pub stat: Stat,
    pub value: f32,
}

impl Consumable {
    /// Apply to `status`, clamped to `[0, max]` for resources
    pub fn apply(&self, status: &mut Status) {
        status.buff_clamped(self.stat, self.value);
    }
}

/// Wearable with flat stat bonuses
#[derive(Debug, Clone, PartialEq)]
pub struct Equipment {
    pub slot: EquipSlot,
    pub bonuses: Vec<(Stat, f32)>,
}

impl Equipment {
    pub fn apply(&self, status: &mut Status) {
        for (stat, value) in &self.bonuses {
            status.buff(*stat, *value);
        }
    }

    pub fn revert(&self, status: &mut Status) {
        for (stat, value) in &self.bonuses {
            status.buff(*stat, -*value);
        }
    }
}

/// Ranged weapon. Held in `hand1`/`hand2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub damage: f32,
    pub critical: f32,
    pub range: f32,
    /// Attacks per second
    pub speed: f32,
    pub action_texture: Option<u32>,
    pub projectile_texture: u32,
    /// Simulation time of the last shot
    last_attack_ms: Option<u64>,
}

impl Weapon {
    pub fn new(
        damage: f32,
        critical: f32,
        range: f32,
        speed: f32,
        action_texture: Option<u32>,
        projectile_texture: u32,
    ) -> Self {
        Self {
            damage,
            critical,
            range,
            speed,
            action_texture,
            projectile_texture,
            last_attack_ms: None,
        }
    }

    /// Minimum time between two shots
    pub fn cooldown_ms(&self) -> f64 {
        if self.speed > 0.0 {
            1000.0 / self.speed as f64
        } else {
            f64::INFINITY
        }
    }

    pub fn can_attack(&self, now_ms: u64) -> bool {
        match self.last_attack_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) as f64 >= self.cooldown_ms(),
        }
    }

    /// Fire from `origin` toward `target`. The caller checks `can_attack` first.
    pub fn attack(
        &mut self,
        now_ms: u64,
        projectile_id: u64,
        owner: u64,
        origin: (f32, f32),
        target: (f32, f32),
    ) -> Projectile {
        self.last_attack_ms = Some(now_ms);

        let dx = target.0 - origin.0;
        let dy = target.1 - origin.1;
        let len = (dx * dx + dy * dy).sqrt();
        let direction = if len > 0.0 { (dx / len, dy / len) } else { (0.0, 0.0) };

        Projectile::new(
            projectile_id,
            owner,
            origin,
            direction,
            self.damage,
            self.range,
            self.projectile_texture,
        )
    }
}

impl Item {
    pub fn from_def(def: &ItemDef, quantity: u32) -> Self {
        let kind = match &def.kind {
            ItemDefKind::Consumable { stat, value } => ItemKind::Consumable(Consumable {
                stat: *stat,
                value: *value,
            }),
            ItemDefKind::Equipment { slot, bonuses } => ItemKind::Equipment(Equipment {
                slot: *slot,
                bonuses: bonuses.clone(),
            }),
            ItemDefKind::Weapon {
                damage,
                critical,
                range,
                speed,
                action_texture,
                projectile_texture,
            } => ItemKind::Weapon(Weapon::new(
                *damage,
                *critical,
                *range,
                *speed,
                *action_texture,
                *projectile_texture,
            )),
        };

        Self {
            id: def.id,
            name: def.name.clone(),
            texture: def.texture,
            description: def.description.clone(),
            quantity: quantity.max(1),
            kind,
        }
    }

    pub fn category(&self) -> ItemCategory {
        match self.kind {
            ItemKind::Consumable(_) => ItemCategory::Consumable,
            ItemKind::Equipment(_) => ItemCategory::Equipment,
            ItemKind::Weapon(_) => ItemCategory::Weapon,
        }
    }

    /// Only consumables stack
    pub fn is_stackable(&self) -> bool {
        matches!(self.kind, ItemKind::Consumable(_))
    }

    pub fn is_equippable(&self) -> bool {
        !self.is_stackable()
    }

    /// Stat bonuses granted while equipped
    pub fn apply_bonuses(&self, status: &mut Status) {
        if let ItemKind::Equipment(equipment) = &self.kind {
            equipment.apply(status);
        }
    }

    pub fn revert_bonuses(&self, status: &mut Status) {
        if let ItemKind::Equipment(equipment) = &self.kind {
            equipment.revert(status);
        }
    }

    pub fn to_record(&self) -> ItemRecord {
        ItemRecord {
            id: self.id,
            quant: self.quantity,
        }
    }

    pub fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            id: self.id,
            category: self.category(),
            texture_id: self.texture,
            quantity: self.quantity,
        }
    }
}

/// Item definitions by id. Builds item instances from persisted records.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    defs: HashMap<u32, ItemDef>,
}

impl ItemCatalog {
    pub fn new(defs: Vec<ItemDef>) -> Self {
        Self {
            defs: defs.into_iter().map(|def| (def.id, def)).collect(),
        }
    }

    /// `None` when the record names an unknown item
    pub fn create(&self, record: &ItemRecord) -> Option<Item> {
        self.defs
            .get(&record.id)
            .map(|def| Item::from_def(def, record.quant))
    }
}
