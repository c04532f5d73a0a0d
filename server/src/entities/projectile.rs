//! Projectiles fired by weapons.

use skirmish_shared::ProjectileSnapshot;

use super::body::{Body, EntityRef};

/// Distance a projectile travels per tick
pub const PROJECTILE_SPEED: f32 = 10.0;

/// Projectile bounding box edge
pub const PROJECTILE_SIZE: f32 = 16.0;

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u64,
    /// Player that fired it; never hit by its own projectile
    pub owner: u64,
    pub body: Body,
    /// Unit vector, or zero when fired at the shooter's own position
    pub direction: (f32, f32),
    pub damage: f32,
    pub speed: f32,
    pub range: f32,
    pub distance: f32,
    /// First entity hit this tick, resolved after all projectiles moved
    pub collided: Option<EntityRef>,
    pub finished: bool,
}

impl Projectile {
    pub fn new(
        id: u64,
        owner: u64,
        origin: (f32, f32),
        direction: (f32, f32),
        damage: f32,
        range: f32,
        texture: u32,
    ) -> Self {
        Self {
            id,
            owner,
            body: Body::new(origin.0, origin.1, PROJECTILE_SIZE, PROJECTILE_SIZE, texture),
            direction,
            damage,
            speed: PROJECTILE_SPEED,
            range,
            distance: 0.0,
            collided: None,
            finished: false,
        }
    }

    pub fn texture(&self) -> u32 {
        self.body.texture
    }

    /// Move one tick. Marks the projectile finished once it has covered its range.
    pub fn advance(&mut self) {
        self.body.x += self.direction.0 * self.speed;
        self.body.y += self.direction.1 * self.speed;
        self.distance += self.speed;
        if self.distance >= self.range {
            self.finished = true;
        }
    }

    /// Record the first hit; later hits in the same tick are ignored
    pub fn hit(&mut self, target: EntityRef) {
        if self.collided.is_none() {
            self.collided = Some(target);
            self.finished = true;
        }
    }

    pub fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
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

    fn ticks_until_finished(range: f32) -> u32 {
        let mut projectile = Projectile::new(1, 1, (0.0, 0.0), (1.0, 0.0), 1.0, range, 28);
        let mut ticks = 0;
        while !projectile.finished {
            projectile.advance();
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn test_lifetime_is_ceil_range_over_speed() {
        assert_eq!(ticks_until_finished(300.0), 30);
        assert_eq!(ticks_until_finished(305.0), 31);
        assert_eq!(ticks_until_finished(5.0), 1);
    }

    #[test]
    fn test_advance_moves_along_direction() {
        let mut projectile = Projectile::new(1, 1, (10.0, 10.0), (0.0, -1.0), 1.0, 100.0, 28);
        projectile.advance();
        assert!((projectile.body.x - 10.0).abs() < 0.001);
        assert!((projectile.body.y - 0.0).abs() < 0.001);
        assert!((projectile.distance - PROJECTILE_SPEED).abs() < 0.001);
    }

    #[test]
    fn test_first_hit_wins() {
        let mut projectile = Projectile::new(1, 1, (0.0, 0.0), (1.0, 0.0), 1.0, 100.0, 28);
        projectile.hit(EntityRef::Mob(3));
        projectile.hit(EntityRef::Player(2));
        assert_eq!(projectile.collided, Some(EntityRef::Mob(3)));
        assert!(projectile.finished);
    }
}
