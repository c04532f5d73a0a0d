//! Server-side mob entity with basic AI.

use skirmish_shared::{CreatureDef, MobSnapshot};

use super::body::Body;
use super::status::Status;
use crate::world::map::MapCollisionOracle;
use crate::world::movement::try_move;

/// Mob aggro range
pub const AGGRO_RANGE: f32 = 300.0;

/// Mob attack range
pub const ATTACK_RANGE: f32 = 50.0;

/// Mob attack cooldown in milliseconds
pub const ATTACK_COOLDOWN_MS: u64 = 1000;

/// Damage used when a creature template has none
const DEFAULT_MOB_DAMAGE: f32 = 5.0;

/// Server-side mob state
#[derive(Debug)]
pub struct ServerMob {
    pub id: u64,
    pub creature_id: u32,
    pub name: String,
    pub body: Body,
    pub status: Status,
    /// Spawn point that owns this mob, if any
    pub spawn_point: Option<usize>,
    pub target_id: Option<u64>,
    last_attack_ms: Option<u64>,
}

impl ServerMob {
    pub fn new(id: u64, creature: &CreatureDef, x: f32, y: f32) -> Self {
        Self {
            id,
            creature_id: creature.id,
            name: creature.name.clone(),
            body: Body::new(x, y, creature.width, creature.height, creature.texture),
            status: Status::from_block(&creature.stats),
            spawn_point: None,
            target_id: None,
            last_attack_ms: None,
        }
    }

    pub fn attack_damage(&self) -> f32 {
        if self.status.damage == 0.0 {
            DEFAULT_MOB_DAMAGE
        } else {
            self.status.damage
        }
    }

    fn attack_ready(&self, now_ms: u64) -> bool {
        match self.last_attack_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= ATTACK_COOLDOWN_MS,
        }
    }

    /// Update mob AI.
    /// Returns Some((target_player_id, damage)) if the mob attacks this tick.
    pub fn update(
        &mut self,
        now_ms: u64,
        player_positions: &[(u64, f32, f32)],
        map: &dyn MapCollisionOracle,
    ) -> Option<(u64, f32)> {
        // Find closest player
        let closest = player_positions
            .iter()
            .map(|(id, x, y)| (*id, *x, *y, self.body.distance_to_point(*x, *y)))
            .min_by(|a, b| a.3.total_cmp(&b.3));

        let Some((player_id, x, y, dist)) = closest else {
            self.target_id = None;
            return None;
        };

        if dist >= AGGRO_RANGE {
            self.target_id = None;
            return None;
        }
        self.target_id = Some(player_id);

        // Chase, even while close enough to attack
        if dist > 0.0 {
            let step = self.status.speed / dist;
            let dx = (x - self.body.x) * step;
            let dy = (y - self.body.y) * step;
            try_move(&mut self.body, dx, dy, map);
        }

        if dist < ATTACK_RANGE && self.attack_ready(now_ms) {
            self.last_attack_ms = Some(now_ms);
            return Some((player_id, self.attack_damage()));
        }
        None
    }

    pub fn snapshot(&self) -> MobSnapshot {
        MobSnapshot {
            id: self.id,
            x: self.body.x,
            y: self.body.y,
            texture_id: self.body.texture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::map::TileMap;
    use skirmish_shared::StatBlock;

    fn creature(damage: f32) -> CreatureDef {
        CreatureDef {
            id: 1,
            name: "slime".into(),
            width: 32.0,
            height: 32.0,
            texture: 70,
            stats: StatBlock {
                damage,
                speed: 2.0,
                ..StatBlock::default()
            },
        }
    }

    #[test]
    fn test_chases_player_in_aggro_range() {
        let map = TileMap::open(20, 20, 32.0);
        let mut mob = ServerMob::new(1, &creature(5.0), 100.0, 100.0);
        let result = mob.update(0, &[(9, 200.0, 100.0)], &map);
        assert!(result.is_none());
        assert_eq!(mob.target_id, Some(9));
        assert!((mob.body.x - 102.0).abs() < 0.001);
        assert!((mob.body.y - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_ignores_player_out_of_range() {
        let map = TileMap::open(40, 40, 32.0);
        let mut mob = ServerMob::new(1, &creature(5.0), 0.0, 0.0);
        assert!(mob.update(0, &[(9, 400.0, 400.0)], &map).is_none());
        assert_eq!(mob.target_id, None);
        assert!(mob.body.x.abs() < 0.001);
    }

    #[test]
    fn test_attacks_on_cooldown() {
        let map = TileMap::open(20, 20, 32.0);
        let mut mob = ServerMob::new(1, &creature(0.0), 100.0, 100.0);
        let players = [(9, 120.0, 100.0)];

        assert_eq!(mob.update(0, &players, &map), Some((9, DEFAULT_MOB_DAMAGE)));
        assert_eq!(mob.update(500, &players, &map), None);
        assert_eq!(mob.update(1000, &players, &map), Some((9, DEFAULT_MOB_DAMAGE)));
    }

    #[test]
    fn test_keeps_closing_in_while_attacking() {
        let map = TileMap::open(20, 20, 32.0);
        let mut mob = ServerMob::new(1, &creature(5.0), 100.0, 100.0);
        assert_eq!(mob.update(0, &[(9, 140.0, 100.0)], &map), Some((9, 5.0)));
        assert!((mob.body.x - 102.0).abs() < 0.001);

        // On cooldown it still moves
        assert_eq!(mob.update(16, &[(9, 140.0, 100.0)], &map), None);
        assert!((mob.body.x - 104.0).abs() < 0.001);
    }

    #[test]
    fn test_range_boundaries_are_exclusive() {
        let map = TileMap::open(40, 40, 32.0);
        let mut mob = ServerMob::new(1, &creature(5.0), 100.0, 100.0);
        assert!(mob.update(0, &[(9, 400.0, 100.0)], &map).is_none());
        assert_eq!(mob.target_id, None);
        assert!((mob.body.x - 100.0).abs() < 0.001);

        // Exactly at the attack radius: chase only
        assert!(mob.update(0, &[(9, 150.0, 100.0)], &map).is_none());
        assert!((mob.body.x - 102.0).abs() < 0.001);
    }

    #[test]
    fn test_picks_nearest_player() {
        let map = TileMap::open(20, 20, 32.0);
        let mut mob = ServerMob::new(1, &creature(3.0), 100.0, 100.0);
        let players = [(1, 140.0, 100.0), (2, 110.0, 100.0)];
        assert_eq!(mob.update(0, &players, &map), Some((2, 3.0)));
    }
}
