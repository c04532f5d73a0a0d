//! Fixed-size slot inventory.

use log::warn;
use skirmish_shared::{ItemRecord, ItemSnapshot};

use super::item::Item;
use crate::error::ActionError;

/// Ordered array of optional item slots. Never resizes.
#[derive(Debug, Clone)]
pub struct Inventory {
    slots: Vec<Option<Item>>,
}

impl Inventory {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Option<Item>] {
        &self.slots
    }

    pub fn get(&self, slot: usize) -> Option<&Item> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }

    pub fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.is_none())
    }

    fn stack_target(&self, item: &Item) -> Option<usize> {
        if !item.is_stackable() {
            return None;
        }
        self.slots.iter().position(|s| {
            s.as_ref()
                .is_some_and(|existing| existing.id == item.id && existing.is_stackable())
        })
    }

    /// Whether `add` would accept this item
    pub fn can_add(&self, item: &Item) -> bool {
        self.stack_target(item).is_some() || self.first_empty().is_some()
    }

    /// Insert an item, stacking consumables onto an existing stack first.
    /// Returns the slot used, or gives the item back when there is no room.
    pub fn add(&mut self, item: Item) -> Result<usize, Item> {
        if let Some(idx) = self.stack_target(&item) {
            if let Some(existing) = self.slots[idx].as_mut() {
                existing.quantity += item.quantity;
                return Ok(idx);
            }
        }
        match self.first_empty() {
            Some(idx) => {
                self.slots[idx] = Some(item);
                Ok(idx)
            }
            None => Err(item),
        }
    }

    /// Put an item into a specific empty slot
    pub fn place(&mut self, slot: usize, item: Item) -> Result<(), Item> {
        match self.slots.get_mut(slot) {
            Some(entry) if entry.is_none() => {
                *entry = Some(item);
                Ok(())
            }
            _ => Err(item),
        }
    }

    /// Remove `quantity` units from a slot and return them.
    /// Removing the whole stack (or more) clears the slot.
    pub fn remove(&mut self, slot: usize, quantity: u32) -> Result<Item, ActionError> {
        if quantity == 0 {
            return Err(ActionError::InvalidQuantity);
        }
        let entry = self
            .slots
            .get_mut(slot)
            .ok_or(ActionError::InvalidSlot(slot))?;
        let item = entry.as_mut().ok_or(ActionError::EmptySlot(slot))?;

        if quantity >= item.quantity {
            return entry.take().ok_or(ActionError::EmptySlot(slot));
        }
        item.quantity -= quantity;
        let mut removed = item.clone();
        removed.quantity = quantity;
        Ok(removed)
    }

    /// Fill from persisted records, building each item with `factory`.
    /// Records keep their slot index when it fits; the rest are added in
    /// order. Unknown ids and overflow are logged and skipped.
    pub fn load_items<F>(&mut self, records: &[Option<ItemRecord>], factory: F)
    where
        F: Fn(&ItemRecord) -> Option<Item>,
    {
        let mut deferred = Vec::new();
        for (idx, record) in records.iter().enumerate() {
            let Some(record) = record else { continue };
            let Some(item) = factory(record) else {
                warn!("Skipping unknown item {} in inventory slot {}", record.id, idx);
                continue;
            };
            match self.slots.get_mut(idx) {
                Some(slot) if slot.is_none() => *slot = Some(item),
                _ => deferred.push(item),
            }
        }
        for item in deferred {
            if let Err(item) = self.add(item) {
                warn!("Inventory full, dropping item {} x{}", item.id, item.quantity);
            }
        }
    }

    pub fn to_records(&self) -> Vec<Option<ItemRecord>> {
        self.slots
            .iter()
            .map(|s| s.as_ref().map(Item::to_record))
            .collect()
    }

    pub fn snapshot(&self) -> Vec<Option<ItemSnapshot>> {
        self.slots
            .iter()
            .map(|s| s.as_ref().map(Item::snapshot))
            .collect()
    }
}
