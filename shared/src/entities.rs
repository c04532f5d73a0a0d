//! Shared entity definitions.

use serde::{Deserialize, Serialize};

/// Base stats an entity is created with (persisted per character and per
/// creature template)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatBlock {
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
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            hp: 100.0,
            max_hp: 100.0,
            hp_regen: 1.0,
            mana: 50.0,
            max_mana: 50.0,
            mana_regen: 1.0,
            stamina: 100.0,
            max_stamina: 100.0,
            stamina_regen: 2.0,
            damage: 5.0,
            critical: 0.0,
            defense: 0.0,
            speed: 2.0,
            acceleration: 0.0,
        }
    }
}

/// Creature template a mob is spawned from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatureDef {
    pub id: u32,
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub texture: u32,
    pub stats: StatBlock,
}

/// Facing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Direction {
    Right,
    Left,
    #[default]
    Down,
    Up,
}

impl Direction {
    /// Column offset inside an animation block (right, left, down, up)
    pub fn frame_offset(&self) -> u8 {
        match self {
            Direction::Right => 0,
            Direction::Left => 1,
            Direction::Down => 2,
            Direction::Up => 3,
        }
    }
}

/// Which client UI layer the player has open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UiState {
    #[default]
    Hud,
    Inventory,
}

impl UiState {
    pub fn toggled(self) -> Self {
        match self {
            UiState::Hud => UiState::Inventory,
            UiState::Inventory => UiState::Hud,
        }
    }
}
