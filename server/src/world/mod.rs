//! Game world management.
//!
//! `GameWorld` owns every live entity. It is mutated only by `tick` and by
//! inventory commands, both called from the game loop task.

pub mod actions;
pub mod combat;
pub mod input;
pub mod map;
pub mod movement;
pub mod snapshot;
pub mod spawner;

pub use map::{CollisionLayer, MapCollisionOracle, TileCollision, TileMap};
pub use spawner::{MobSpawnPoint, MobSpawner};

use std::collections::BTreeMap;

use log::info;
use skirmish_shared::{CreatureDef, PlayerInput, WorldSnapshot, SERVER_TICK_RATE};

use crate::entities::{EntityRef, ItemCatalog, Projectile, ServerMob, ServerPlayer};
use movement::try_move;

/// World-wide tuning
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSettings {
    pub tick_rate: u32,
    /// Where dead players reappear
    pub spawn_point: (f32, f32),
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            tick_rate: SERVER_TICK_RATE,
            spawn_point: (0.0, 0.0),
        }
    }
}

/// The game world containing all entities
pub struct GameWorld {
    players: BTreeMap<u64, ServerPlayer>,
    mobs: BTreeMap<u64, ServerMob>,
    projectiles: BTreeMap<u64, Projectile>,
    map: Box<dyn MapCollisionOracle>,
    /// Item definitions loaded from database
    items: ItemCatalog,
    spawner: MobSpawner,
    settings: WorldSettings,
    tick: u64,
    next_mob_id: u64,
    next_projectile_id: u64,
}

impl GameWorld {
    pub fn new(
        map: Box<dyn MapCollisionOracle>,
        items: ItemCatalog,
        spawner: MobSpawner,
        settings: WorldSettings,
    ) -> Self {
        Self {
            players: BTreeMap::new(),
            mobs: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            map,
            items,
            spawner,
            settings,
            tick: 0,
            next_mob_id: 0,
            next_projectile_id: 0,
        }
    }

    pub fn items(&self) -> &ItemCatalog {
        &self.items
    }

    /// Simulation clock derived from the tick counter
    pub fn now_ms(&self) -> u64 {
        self.tick * 1000 / self.settings.tick_rate.max(1) as u64
    }

    // =========================================================================
    // Registry
    // =========================================================================

    pub fn add_player(&mut self, player: ServerPlayer) {
        info!("Player {} ({}) entered the world", player.id, player.name);
        self.players.insert(player.id, player);
    }

    /// Remove a player. Projectiles it fired keep flying.
    pub fn remove_player(&mut self, id: u64) -> Option<ServerPlayer> {
        self.players.remove(&id)
    }

    /// Get a player by ID
    pub fn get_player(&self, id: u64) -> Option<&ServerPlayer> {
        self.players.get(&id)
    }

    /// Get a mutable reference to a player by ID
    pub fn get_player_mut(&mut self, id: u64) -> Option<&mut ServerPlayer> {
        self.players.get_mut(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &ServerPlayer> {
        self.players.values()
    }

    pub fn get_mob(&self, id: u64) -> Option<&ServerMob> {
        self.mobs.get(&id)
    }

    pub fn mob_count(&self) -> usize {
        self.mobs.len()
    }

    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.values()
    }

    /// Replace the buffered input of a player. Returns false if unknown.
    pub fn set_player_input(&mut self, id: u64, input: PlayerInput) -> bool {
        match self.players.get_mut(&id) {
            Some(player) => {
                player.input = input;
                true
            }
            None => false,
        }
    }

    pub fn spawn_mob(&mut self, creature: &CreatureDef, x: f32, y: f32) -> u64 {
        self.next_mob_id += 1;
        let id = self.next_mob_id;
        self.mobs.insert(id, ServerMob::new(id, creature, x, y));
        id
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance the world by one tick and return the resulting snapshot
    pub fn tick(&mut self) -> WorldSnapshot {
        self.tick += 1;
        let regen = self.tick % self.settings.tick_rate.max(1) as u64 == 0;

        self.update_players(regen);

        let mob_attacks = self.update_mobs(regen);
        for (player_id, damage) in mob_attacks {
            self.resolve_damage(EntityRef::Player(player_id), damage);
        }

        combat::advance_projectiles(&mut self.projectiles, &self.mobs, &self.players);
        let hits: Vec<(EntityRef, f32)> = self
            .projectiles
            .values()
            .filter_map(|p| p.collided.map(|target| (target, p.damage)))
            .collect();
        for (target, damage) in hits {
            self.resolve_damage(target, damage);
        }
        self.projectiles.retain(|_, p| !p.finished);

        self.run_spawner();
        self.snapshot()
    }

    /// Input, movement, attacks, effects, regeneration and animation
    fn update_players(&mut self, regen: bool) {
        let tick = self.tick;
        let tick_rate = self.settings.tick_rate;
        let now_ms = self.now_ms();
        let map = self.map.as_ref();

        for player in self.players.values_mut() {
            let intent = input::apply_input(player);
            try_move(&mut player.body, intent.dx, intent.dy, map);

            if player.attacking && tick >= player.attack_end_tick {
                player.attacking = false;
            }
            if let Some(target) = intent.attack_target {
                if let Some(projectile) = combat::player_attack(
                    player,
                    target,
                    tick,
                    now_ms,
                    tick_rate,
                    &mut self.next_projectile_id,
                ) {
                    self.projectiles.insert(projectile.id, projectile);
                }
            }

            player.status.update_effects();
            if regen {
                player.status.regenerate();
            }
            player.update_animation();
        }
    }

    /// Mob AI. Returns the attacks to resolve.
    fn update_mobs(&mut self, regen: bool) -> Vec<(u64, f32)> {
        let now_ms = self.now_ms();
        let map = self.map.as_ref();
        let positions: Vec<(u64, f32, f32)> = self
            .players
            .values()
            .map(|p| (p.id, p.body.x, p.body.y))
            .collect();

        let mut attacks = Vec::new();
        for mob in self.mobs.values_mut() {
            if let Some(attack) = mob.update(now_ms, &positions, map) {
                attacks.push(attack);
            }
            mob.status.update_effects();
            if regen {
                mob.status.regenerate();
            }
        }
        attacks
    }

    fn run_spawner(&mut self) {
        for spawn in self.spawner.due(self.tick) {
            let id = self.spawn_mob(&spawn.creature, spawn.x, spawn.y);
            if let Some(mob) = self.mobs.get_mut(&id) {
                mob.spawn_point = Some(spawn.point);
            }
            self.spawner.mark_spawned(spawn.point, id);
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use skirmish_shared::get_item_definitions;

    pub const SPAWN: (f32, f32) = (16.0, 16.0);

    /// Open 50x50 map with 32px tiles and the built-in items
    pub fn empty_world() -> GameWorld {
        GameWorld::new(
            Box::new(TileMap::open(50, 50, 32.0)),
            ItemCatalog::new(get_item_definitions()),
            MobSpawner::default(),
            WorldSettings {
                tick_rate: 60,
                spawn_point: SPAWN,
            },
        )
    }

    /// `empty_world` with one player (id 1) at (400, 400)
    pub fn world_with_player() -> (GameWorld, u64) {
        let mut world = empty_world();
        world.add_player(ServerPlayer::new(1, "hero".into(), 400.0, 400.0, 2));
        (world, 1)
    }
}
