//! Weapon attacks, projectile flight and damage resolution.

use std::collections::BTreeMap;

use log::{debug, info};

use super::GameWorld;
use crate::entities::{EntityRef, Projectile, ServerMob, ServerPlayer};

/// Length of the attack animation
pub const ATTACK_ANIMATION_MS: u64 = 300;

/// Cooldown between unarmed swings
pub const UNARMED_SWING_COOLDOWN_MS: u64 = 500;

/// Outcome of applying damage to an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Target no longer exists
    Missing,
    /// Target had zero hp and took nothing
    Ignored,
    Hit,
    /// Mob removed from the world
    Killed,
    /// Player sent back to the spawn point at full health
    Respawned,
}

/// Ticks covering `ms` milliseconds, rounded up
pub fn ms_to_ticks(ms: u64, tick_rate: u32) -> u64 {
    (ms * tick_rate as u64).div_ceil(1000)
}

/// Handle an attack request. Returns the projectile to spawn, if any.
///
/// With a weapon in `hand1` the weapon's own rate limits the shot. Without
/// one the player only plays the swing animation.
pub fn player_attack(
    player: &mut ServerPlayer,
    target: (f32, f32),
    tick: u64,
    now_ms: u64,
    tick_rate: u32,
    projectile_id: &mut u64,
) -> Option<Projectile> {
    let origin = (player.body.x, player.body.y);
    let owner = player.id;
    let animation_end = tick + ms_to_ticks(ATTACK_ANIMATION_MS, tick_rate);

    if let Some(weapon) = player.equipment.active_weapon_mut() {
        if !weapon.can_attack(now_ms) {
            return None;
        }
        *projectile_id += 1;
        let projectile = weapon.attack(now_ms, *projectile_id, owner, origin, target);
        player.attacking = true;
        player.attack_end_tick = animation_end;
        return Some(projectile);
    }

    let ready = player
        .last_swing_ms
        .map_or(true, |last| now_ms.saturating_sub(last) >= UNARMED_SWING_COOLDOWN_MS);
    if ready {
        player.last_swing_ms = Some(now_ms);
        player.attacking = true;
        player.attack_end_tick = animation_end;
    }
    None
}

/// Move every projectile one step and record the first entity each one
/// overlaps. Mobs are tested before players; owners are never hit.
pub fn advance_projectiles(
    projectiles: &mut BTreeMap<u64, Projectile>,
    mobs: &BTreeMap<u64, ServerMob>,
    players: &BTreeMap<u64, ServerPlayer>,
) {
    for projectile in projectiles.values_mut() {
        if projectile.collided.is_some() {
            continue;
        }
        projectile.advance();

        if let Some(mob) = mobs.values().find(|m| projectile.body.overlaps(&m.body)) {
            projectile.hit(EntityRef::Mob(mob.id));
            continue;
        }
        if let Some(player) = players
            .values()
            .find(|p| p.id != projectile.owner && projectile.body.overlaps(&p.body))
        {
            projectile.hit(EntityRef::Player(player.id));
        }
    }
}

impl GameWorld {
    /// Apply `damage` to an entity. Damage is skipped while hp is exactly
    /// zero. A mob at or below zero is removed; a player respawns.
    pub fn resolve_damage(&mut self, target: EntityRef, damage: f32) -> DamageOutcome {
        match target {
            EntityRef::Mob(id) => {
                let Some(mob) = self.mobs.get_mut(&id) else {
                    return DamageOutcome::Missing;
                };
                if mob.status.hp == 0.0 {
                    return DamageOutcome::Ignored;
                }
                mob.status.hp -= damage;
                if mob.status.hp > 0.0 {
                    debug!("Mob {} took {} damage, hp {}", id, damage, mob.status.hp);
                    return DamageOutcome::Hit;
                }
                if let Some(mob) = self.mobs.remove(&id) {
                    info!("Mob {} ({}) died", mob.id, mob.name);
                    if let Some(point) = mob.spawn_point {
                        self.spawner.on_mob_removed(point, self.tick, self.settings.tick_rate);
                    }
                }
                DamageOutcome::Killed
            }
            EntityRef::Player(id) => {
                let spawn = self.settings.spawn_point;
                let Some(player) = self.players.get_mut(&id) else {
                    return DamageOutcome::Missing;
                };
                if player.status.hp == 0.0 {
                    return DamageOutcome::Ignored;
                }
                player.status.hp -= damage;
                if player.status.hp > 0.0 {
                    debug!("Player {} took {} damage, hp {}", id, damage, player.status.hp);
                    return DamageOutcome::Hit;
                }
                player.respawn(spawn);
                info!("Player {} ({}) died and respawned", id, player.name);
                DamageOutcome::Respawned
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ItemCatalog;
    use skirmish_shared::{get_item_definitions, CreatureDef, ItemRecord, StatBlock};

    fn player_with_bow(id: u64) -> ServerPlayer {
        let catalog = ItemCatalog::new(get_item_definitions());
        let mut player = ServerPlayer::new(id, "archer".into(), 0.0, 0.0, 0);
        let bow = catalog.create(&ItemRecord { id: 20, quant: 1 }).unwrap();
        player.equipment.equip(bow).unwrap();
        player
    }

    #[test]
    fn test_ms_to_ticks() {
        assert_eq!(ms_to_ticks(300, 60), 18);
        assert_eq!(ms_to_ticks(500, 60), 30);
        assert_eq!(ms_to_ticks(10, 60), 1);
    }

    #[test]
    fn test_weapon_attack_spawns_projectile_and_animates() {
        let mut player = player_with_bow(3);
        let mut next_id = 0;
        let projectile = player_attack(&mut player, (100.0, 0.0), 10, 166, 60, &mut next_id)
            .unwrap();
        assert_eq!(projectile.id, 1);
        assert_eq!(projectile.owner, 3);
        assert!(player.attacking);
        assert_eq!(player.attack_end_tick, 28);

        // Bow fires once per second
        assert!(player_attack(&mut player, (100.0, 0.0), 11, 183, 60, &mut next_id).is_none());
        assert!(player_attack(&mut player, (100.0, 0.0), 70, 1166, 60, &mut next_id).is_some());
    }

    #[test]
    fn test_unarmed_swing_spawns_nothing() {
        let mut player = ServerPlayer::new(1, "p".into(), 0.0, 0.0, 0);
        let mut next_id = 0;
        assert!(player_attack(&mut player, (5.0, 5.0), 1, 16, 60, &mut next_id).is_none());
        assert!(player.attacking);
        assert_eq!(player.last_swing_ms, Some(16));
        assert_eq!(next_id, 0);

        // Within cooldown the swing timestamp does not move
        player_attack(&mut player, (5.0, 5.0), 2, 33, 60, &mut next_id);
        assert_eq!(player.last_swing_ms, Some(16));
    }

    #[test]
    fn test_projectile_skips_owner() {
        let mut players = BTreeMap::new();
        let shooter = ServerPlayer::new(1, "a".into(), 0.0, 0.0, 0);
        let other = ServerPlayer::new(2, "b".into(), 10.0, 0.0, 0);
        players.insert(1, shooter);
        players.insert(2, other);

        let mut projectiles = BTreeMap::new();
        projectiles.insert(1, Projectile::new(1, 1, (0.0, 0.0), (1.0, 0.0), 4.0, 100.0, 28));
        advance_projectiles(&mut projectiles, &BTreeMap::new(), &players);
        assert_eq!(projectiles[&1].collided, Some(EntityRef::Player(2)));
    }

    #[test]
    fn test_projectile_hits_mob_before_player() {
        let creature = CreatureDef {
            id: 1,
            name: "dummy".into(),
            width: 32.0,
            height: 32.0,
            texture: 70,
            stats: StatBlock::default(),
        };
        let mut mobs = BTreeMap::new();
        mobs.insert(5, ServerMob::new(5, &creature, 20.0, 0.0));
        let mut players = BTreeMap::new();
        players.insert(2, ServerPlayer::new(2, "b".into(), 20.0, 0.0, 0));

        let mut projectiles = BTreeMap::new();
        projectiles.insert(1, Projectile::new(1, 1, (0.0, 0.0), (1.0, 0.0), 4.0, 100.0, 28));
        advance_projectiles(&mut projectiles, &mobs, &players);
        assert_eq!(projectiles[&1].collided, Some(EntityRef::Mob(5)));
        assert!(projectiles[&1].finished);
    }
}
