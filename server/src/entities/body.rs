//! Geometry shared by every entity.

/// Position, bounding box and texture of an entity.
/// `(x, y)` is the top-left corner of the box.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub texture: u32,
    /// Reserved, nothing integrates it
    pub velocity: (f32, f32),
}

impl Body {
    pub fn new(x: f32, y: f32, width: f32, height: f32, texture: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            texture,
            velocity: (0.0, 0.0),
        }
    }

    /// Strict AABB overlap; touching edges do not count
    pub fn overlaps(&self, other: &Body) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    pub fn distance_to_point(&self, x: f32, y: f32) -> f32 {
        let dx = x - self.x;
        let dy = y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Key of a damageable entity in the world registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Player(u64),
    Mob(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_detected() {
        let a = Body::new(0.0, 0.0, 10.0, 10.0, 0);
        let b = Body::new(5.0, 5.0, 10.0, 10.0, 0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_adjacent_boxes_do_not_overlap() {
        let a = Body::new(0.0, 0.0, 10.0, 10.0, 0);
        let right = Body::new(10.0, 0.0, 10.0, 10.0, 0);
        let below = Body::new(0.0, 10.0, 10.0, 10.0, 0);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
    }

    #[test]
    fn test_distance() {
        let a = Body::new(0.0, 0.0, 1.0, 1.0, 0);
        assert!((a.distance_to_point(3.0, 4.0) - 5.0).abs() < 0.001);
    }
}
