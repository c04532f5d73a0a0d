//! Mob spawn points and respawn timers.
//!
//! Each spawn point keeps one mob of its creature type alive. When that mob
//! dies the point waits its respawn delay, plus a little random jitter, and
//! spawns a fresh one.

use std::collections::HashMap;

use log::{info, warn};
use rand::Rng;
use skirmish_shared::CreatureDef;

/// Extra random delay, as a fraction of the respawn delay
const RESPAWN_JITTER: f32 = 0.25;

/// Configured spawn location for one creature type
#[derive(Debug, Clone, PartialEq)]
pub struct MobSpawnPoint {
    pub creature_id: u32,
    pub x: f32,
    pub y: f32,
    /// Delay after death before the next mob appears
    pub respawn_secs: f32,
}

#[derive(Debug)]
struct SpawnSlot {
    point: MobSpawnPoint,
    mob_id: Option<u64>,
    /// Tick at which the next mob is due; `None` while one is alive
    respawn_at: Option<u64>,
}

/// Mob spawn to perform this tick
#[derive(Debug, Clone)]
pub struct PendingSpawn {
    pub point: usize,
    pub creature: CreatureDef,
    pub x: f32,
    pub y: f32,
}

/// Tracks spawn points and their respawn timers
#[derive(Debug, Default)]
pub struct MobSpawner {
    creatures: HashMap<u32, CreatureDef>,
    slots: Vec<SpawnSlot>,
}

impl MobSpawner {
    pub fn new(creatures: Vec<CreatureDef>, points: Vec<MobSpawnPoint>) -> Self {
        let creatures: HashMap<u32, CreatureDef> =
            creatures.into_iter().map(|c| (c.id, c)).collect();

        let mut slots = Vec::new();
        for point in points {
            if !creatures.contains_key(&point.creature_id) {
                warn!(
                    "Skipping spawn point at ({}, {}): unknown creature {}",
                    point.x, point.y, point.creature_id
                );
                continue;
            }
            slots.push(SpawnSlot {
                point,
                mob_id: None,
                respawn_at: Some(0),
            });
        }

        info!(
            "Loaded {} creature types and {} mob spawn points",
            creatures.len(),
            slots.len()
        );
        Self { creatures, slots }
    }

    /// Start the respawn timer of the point that owned a dead mob
    pub fn on_mob_removed(&mut self, point: usize, tick: u64, tick_rate: u32) {
        let Some(slot) = self.slots.get_mut(point) else {
            return;
        };
        let delay = (slot.point.respawn_secs.max(0.0) * tick_rate as f32) as u64;
        let jitter = (delay as f32 * RESPAWN_JITTER) as u64;
        let extra = if jitter > 0 {
            rand::thread_rng().gen_range(0..=jitter)
        } else {
            0
        };
        slot.mob_id = None;
        slot.respawn_at = Some(tick + delay + extra);
    }

    /// Spawn points whose timer has run out. Each is returned once; call
    /// `mark_spawned` with the new mob id afterwards.
    pub fn due(&mut self, tick: u64) -> Vec<PendingSpawn> {
        let mut pending = Vec::new();
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            match slot.respawn_at {
                Some(at) if at <= tick && slot.mob_id.is_none() => {}
                _ => continue,
            }
            let Some(creature) = self.creatures.get(&slot.point.creature_id) else {
                continue;
            };
            slot.respawn_at = None;
            pending.push(PendingSpawn {
                point: idx,
                creature: creature.clone(),
                x: slot.point.x,
                y: slot.point.y,
            });
        }
        pending
    }

    pub fn mark_spawned(&mut self, point: usize, mob_id: u64) {
        if let Some(slot) = self.slots.get_mut(point) {
            slot.mob_id = Some(mob_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_shared::StatBlock;

    fn spawner(respawn_secs: f32) -> MobSpawner {
        let creature = CreatureDef {
            id: 4,
            name: "bat".into(),
            width: 16.0,
            height: 16.0,
            texture: 80,
            stats: StatBlock::default(),
        };
        let points = vec![
            MobSpawnPoint { creature_id: 4, x: 10.0, y: 20.0, respawn_secs },
            MobSpawnPoint { creature_id: 99, x: 0.0, y: 0.0, respawn_secs },
        ];
        MobSpawner::new(vec![creature], points)
    }

    #[test]
    fn test_unknown_creature_points_are_skipped() {
        assert_eq!(spawner(1.0).slots.len(), 1);
    }

    #[test]
    fn test_initial_spawn_is_immediate_and_once() {
        let mut spawner = spawner(1.0);
        let due = spawner.due(0);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].creature.id, 4);
        spawner.mark_spawned(due[0].point, 100);
        assert!(spawner.due(1).is_empty());
    }

    #[test]
    fn test_respawn_waits_for_delay() {
        let mut spawner = spawner(2.0);
        let point = spawner.due(0)[0].point;
        spawner.mark_spawned(point, 100);

        spawner.on_mob_removed(point, 50, 60);
        // 2 s at 60 Hz, up to 25% jitter
        assert!(spawner.due(50 + 119).is_empty());
        assert_eq!(spawner.due(50 + 150).len(), 1);
    }
}
