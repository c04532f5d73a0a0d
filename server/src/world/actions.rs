//! Inventory and equipment commands.
//!
//! Every command targets the requesting player only. A command either
//! succeeds completely or fails with an `ActionError` and leaves the world
//! untouched.

use log::{debug, warn};
use skirmish_shared::{EquipSlot, InventoryAction, ServerMessage};

use super::GameWorld;
use crate::entities::{Item, ItemKind, ServerPlayer};
use crate::error::ActionError;

impl GameWorld {
    /// Run an inventory command and build the reply for the requester
    pub fn handle_inventory_action(&mut self, player_id: u64, action: &InventoryAction) -> ServerMessage {
        let result = match action {
            InventoryAction::UseItem { slot } => self.use_item(player_id, *slot as usize),
            InventoryAction::DropItem { slot, quantity } => self
                .drop_item(player_id, *slot as usize, quantity.unwrap_or(1))
                .map(|item| format!("Dropped {} x{}", item.name, item.quantity)),
            InventoryAction::EquipItem { slot } => self.equip_item(player_id, *slot as usize),
            InventoryAction::UnequipItem { equipment_slot } => {
                self.unequip_item(player_id, equipment_slot)
            }
        };

        match result {
            Ok(message) => {
                debug!("Player {} {:?}: {}", player_id, action, message);
                ServerMessage::InventorySuccess { message }
            }
            Err(e) => {
                debug!("Player {} {:?} rejected: {}", player_id, action, e);
                ServerMessage::InventoryError {
                    message: e.to_string(),
                }
            }
        }
    }

    fn player_for_action(&mut self, player_id: u64) -> Result<&mut ServerPlayer, ActionError> {
        self.players
            .get_mut(&player_id)
            .ok_or(ActionError::PlayerNotFound)
    }

    /// Consume a consumable, or equip anything else
    pub fn use_item(&mut self, player_id: u64, slot: usize) -> Result<String, ActionError> {
        let consumable = match &occupied(self.player_for_action(player_id)?, slot)?.kind {
            ItemKind::Consumable(consumable) => Some(consumable.clone()),
            _ => None,
        };
        let Some(consumable) = consumable else {
            return self.equip_item(player_id, slot);
        };

        let player = self.player_for_action(player_id)?;
        consumable.apply(&mut player.status);
        let used = player.inventory.remove(slot, 1)?;
        Ok(format!("Used {}", used.name))
    }

    /// Equip one unit from an inventory slot. Whatever the new item
    /// displaces goes back into the inventory.
    pub fn equip_item(&mut self, player_id: u64, slot: usize) -> Result<String, ActionError> {
        let player = self.player_for_action(player_id)?;
        let item = occupied(player, slot)?;
        if !item.is_equippable() || player.equipment.target_slot(item).is_none() {
            return Err(ActionError::NotEquippable);
        }

        // A whole stack leaves the slot free for the displaced item
        let frees_slot = item.quantity <= 1;
        if player.equipment.would_displace(item)
            && !frees_slot
            && player.inventory.first_empty().is_none()
        {
            return Err(ActionError::InventoryFull);
        }

        let item = player.inventory.remove(slot, 1)?;
        let name = item.name.clone();
        item.apply_bonuses(&mut player.status);

        let displaced = match player.equipment.equip(item) {
            Ok(displaced) => displaced,
            Err(item) => {
                // target_slot was checked above
                item.revert_bonuses(&mut player.status);
                let _ = player.inventory.add(item);
                return Err(ActionError::NotEquippable);
            }
        };

        if let Some(old) = displaced {
            old.revert_bonuses(&mut player.status);
            let old = match player.inventory.place(slot, old) {
                Ok(()) => return Ok(format!("Equipped {}", name)),
                Err(old) => old,
            };
            if let Err(old) = player.inventory.add(old) {
                // Room was checked above
                warn!("Player {} lost displaced item {}", player_id, old.id);
            }
        }
        Ok(format!("Equipped {}", name))
    }

    /// Move an equipped item into the first empty inventory slot
    pub fn unequip_item(&mut self, player_id: u64, slot_name: &str) -> Result<String, ActionError> {
        let player = self.player_for_action(player_id)?;
        let slot = EquipSlot::from_name(slot_name)
            .ok_or_else(|| ActionError::UnknownEquipmentSlot(slot_name.to_string()))?;
        if player.equipment.get(slot).is_none() {
            return Err(ActionError::NothingEquipped(slot_name.to_string()));
        }
        let target = player
            .inventory
            .first_empty()
            .ok_or(ActionError::InventoryFull)?;

        let item = player
            .equipment
            .unequip(slot)
            .ok_or_else(|| ActionError::NothingEquipped(slot_name.to_string()))?;
        item.revert_bonuses(&mut player.status);
        let name = item.name.clone();
        if let Err(item) = player.inventory.place(target, item) {
            warn!("Player {} lost unequipped item {}", player_id, item.id);
        }
        Ok(format!("Unequipped {}", name))
    }

    /// Remove `quantity` units from a slot. Dropped items leave the game.
    pub fn drop_item(&mut self, player_id: u64, slot: usize, quantity: u32) -> Result<Item, ActionError> {
        let player = self.player_for_action(player_id)?;
        player.inventory.remove(slot, quantity)
    }
}

fn occupied(player: &ServerPlayer, slot: usize) -> Result<&Item, ActionError> {
    if slot >= player.inventory.size() {
        return Err(ActionError::InvalidSlot(slot));
    }
    player.inventory.get(slot).ok_or(ActionError::EmptySlot(slot))
}
