//! Network protocol definitions shared between client and server.

use serde::{Deserialize, Serialize};

use crate::entities::{Direction, UiState};
use crate::items::{EquipSlot, ItemCategory, Stat};

/// Protocol version for compatibility checking
pub const PROTOCOL_VERSION: u32 = 1;

/// Server tick rate in Hz
pub const SERVER_TICK_RATE: u32 = 60;

/// Default server port
pub const DEFAULT_PORT: u16 = 3000;

/// Number of slots in a player inventory
pub const INVENTORY_SIZE: usize = 35;

/// Mouse button that triggers an attack
pub const ATTACK_BUTTON: u8 = 1;

// =============================================================================
// Client -> Server Messages
// =============================================================================

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientMessage {
    /// Enter the game with a pre-issued session token and a character
    Join {
        protocol_version: u32,
        token: String,
        character_id: Option<u64>,
    },

    /// Latest input state (sent every client frame)
    PlayerInput(PlayerInput),

    /// Discrete inventory/equipment command
    InventoryAction(InventoryAction),

    /// Disconnect gracefully
    Disconnect,
}

/// Keyboard and mouse state for one client frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub keys: InputKeys,
    pub mouse: MouseInput,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Inventory UI toggle key
    pub inventory: bool,
}

/// Mouse state. `dx`/`dy` is the cursor offset from the player position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MouseInput {
    pub button: u8,
    pub dx: f32,
    pub dy: f32,
}

/// Inventory commands. Slots index the player's own inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryAction {
    UseItem { slot: u8 },
    DropItem { slot: u8, quantity: Option<u32> },
    EquipItem { slot: u8 },
    /// Equipment slot name: "head", "body", ..., "hand1", "hand2"
    UnequipItem { equipment_slot: String },
}

// =============================================================================
// Server -> Client Messages
// =============================================================================

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Join accepted; `id` is this connection's player id
    AssignId { id: u64 },

    /// Join refused; the server forgets the connection after sending this
    JoinRejected { reason: String },

    /// World state update (sent every server tick)
    GameState(WorldSnapshot),

    /// Inventory command applied
    InventorySuccess { message: String },

    /// Inventory command refused, nothing changed
    InventoryError { message: String },
}

// =============================================================================
// State Types
// =============================================================================

/// Sanitized world view broadcast once per tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub players: Vec<PlayerSnapshot>,
    pub mobs: Vec<MobSnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
}

/// Player state for world updates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub texture_id: u32,
    pub anim_row: u8,
    pub status: StatusSnapshot,
    pub inventory: Vec<Option<ItemSnapshot>>,
    pub equipment: Vec<EquippedSnapshot>,
    pub ui_state: UiState,
    /// Present only while attacking with a weapon that has an action texture
    pub weapon_animation: Option<WeaponAnimation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub hp: f32,
    pub max_hp: f32,
    pub hp_regen: f32,
    pub mana: f32,
    pub max_mana: f32,
    pub mana_regen: f32,
    pub stamina: f32,
    pub max_stamina: f32,
    pub stamina_regen: f32,
    pub damage: f32,
    pub critical: f32,
    pub defense: f32,
    pub speed: f32,
    pub acceleration: f32,
    pub effects: Vec<EffectSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectSnapshot {
    pub stat: Stat,
    pub value: f32,
    pub remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub id: u32,
    pub category: ItemCategory,
    pub texture_id: u32,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquippedSnapshot {
    pub slot: EquipSlot,
    pub item: ItemSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponAnimation {
    pub texture_id: u32,
    pub direction: Direction,
}

/// Mob state for world updates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MobSnapshot {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub texture_id: u32,
}

/// Projectile state for world updates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub texture_id: u32,
}

// =============================================================================
// Serialization helpers
// =============================================================================

impl ClientMessage {
    pub fn serialize(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_default()
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

impl ServerMessage {
    pub fn serialize(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_default()
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_datagram_is_rejected() {
        let data = ClientMessage::Join {
            protocol_version: PROTOCOL_VERSION,
            token: "7.secret".into(),
            character_id: Some(3),
        }
        .serialize();
        assert!(ClientMessage::deserialize(&data[..data.len() - 2]).is_err());
    }
}
