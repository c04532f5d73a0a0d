//! Server-side player entity.

use skirmish_shared::{Direction, PlayerInput, UiState, INVENTORY_SIZE};

use super::body::Body;
use super::equipment::EquipmentSet;
use super::inventory::Inventory;
use super::item::{Item, ItemCatalog};
use super::status::Status;
use crate::persistence::CharacterRecord;

/// Player bounding box edge
pub const PLAYER_SIZE: f32 = 32.0;

/// Animation row blocks, each followed by the four facings
const IDLE_ROW: u8 = 0;
const MOVING_ROW: u8 = 4;
const ATTACKING_ROW: u8 = 12;

/// Server-side player state
#[derive(Debug)]
pub struct ServerPlayer {
    /// Connection-scoped id, the key in the world registry
    pub id: u64,
    pub character_id: u64,
    pub user_id: u64,
    pub name: String,
    pub body: Body,
    pub status: Status,
    pub inventory: Inventory,
    pub equipment: EquipmentSet,
    pub direction: Direction,
    pub moving: bool,
    pub attacking: bool,
    /// Tick at which the attack animation ends
    pub attack_end_tick: u64,
    /// Last unarmed swing, simulation milliseconds
    pub last_swing_ms: Option<u64>,
    pub anim_row: u8,
    pub ui_state: UiState,
    /// Latest input received; reused every tick until replaced
    pub input: PlayerInput,
    /// Inventory key state seen on the previous tick
    pub inventory_key_latch: bool,
}

impl ServerPlayer {
    pub fn new(id: u64, name: String, x: f32, y: f32, texture: u32) -> Self {
        Self {
            id,
            character_id: 0,
            user_id: 0,
            name,
            body: Body::new(x, y, PLAYER_SIZE, PLAYER_SIZE, texture),
            status: Status::default(),
            inventory: Inventory::new(INVENTORY_SIZE),
            equipment: EquipmentSet::new(),
            direction: Direction::Down,
            moving: false,
            attacking: false,
            attack_end_tick: 0,
            last_swing_ms: None,
            anim_row: IDLE_ROW + Direction::Down.frame_offset(),
            ui_state: UiState::Hud,
            input: PlayerInput::default(),
            inventory_key_latch: false,
        }
    }

    /// Build a player from saved state. Equipment bonuses are re-applied on
    /// top of the stored base stats.
    pub fn from_record(id: u64, record: &CharacterRecord, catalog: &ItemCatalog) -> Self {
        let mut player = Self::new(id, record.name.clone(), record.x, record.y, record.texture);
        player.character_id = record.character_id;
        player.user_id = record.user_id;
        player.status = Status::from_block(&record.stats);
        player
            .inventory
            .load_items(&record.inventory, |r| catalog.create(r));
        player
            .equipment
            .load_equips(&record.equipment, |r| catalog.create(r));

        let equipped: Vec<Item> = player.equipment.iter().map(|(_, i)| i.clone()).collect();
        for item in &equipped {
            item.apply_bonuses(&mut player.status);
        }
        player
    }

    /// Saveable state. Stats are stored without equipment bonuses or effects.
    pub fn to_record(&self) -> CharacterRecord {
        let mut base = Status::from_block(&self.status.to_block());
        for (_, item) in self.equipment.iter() {
            item.revert_bonuses(&mut base);
        }
        CharacterRecord {
            character_id: self.character_id,
            user_id: self.user_id,
            name: self.name.clone(),
            texture: self.body.texture,
            x: self.body.x,
            y: self.body.y,
            stats: base.to_block(),
            inventory: self.inventory.to_records(),
            equipment: self.equipment.to_records(),
        }
    }

    /// Restore health and move to the spawn point
    pub fn respawn(&mut self, spawn: (f32, f32)) {
        self.status.hp = self.status.max_hp;
        self.body.x = spawn.0;
        self.body.y = spawn.1;
    }

    /// Pick the animation row from the current state and facing
    pub fn update_animation(&mut self) {
        let block = if self.attacking {
            ATTACKING_ROW
        } else if self.moving {
            MOVING_ROW
        } else {
            IDLE_ROW
        };
        self.anim_row = block + self.direction.frame_offset();
    }
}
