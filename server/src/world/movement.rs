//! Tile-checked movement for players and mobs.

use super::map::{CollisionLayer, MapCollisionOracle, TileCollision};
use crate::entities::Body;

/// Whether a `width` x `height` box at `(x, y)` touches only clear tiles on
/// every collision layer. Out of bounds counts as blocked.
pub fn is_free(x: f32, y: f32, width: f32, height: f32, map: &dyn MapCollisionOracle) -> bool {
    let (tile_w, tile_h) = map.tile_size();
    if tile_w <= 0.0 || tile_h <= 0.0 {
        return false;
    }

    // The far edge is exclusive: a box ending exactly on a tile border
    // does not cover the next tile
    let first_tx = (x / tile_w).floor() as i64;
    let last_tx = (((x + width) / tile_w).ceil() as i64 - 1).max(first_tx);
    let first_ty = (y / tile_h).floor() as i64;
    let last_ty = (((y + height) / tile_h).ceil() as i64 - 1).max(first_ty);

    for ty in first_ty..=last_ty {
        for tx in first_tx..=last_tx {
            let cx = (tx as f32 + 0.5) * tile_w;
            let cy = (ty as f32 + 0.5) * tile_h;
            for layer in CollisionLayer::ALL {
                if map.check_collision(cx, cy, layer) != TileCollision::Clear {
                    return false;
                }
            }
        }
    }
    true
}

/// Move `body` by `(dx, dy)` unless the destination is blocked.
/// The move is all or nothing; there is no sliding along walls.
pub fn try_move(body: &mut Body, dx: f32, dy: f32, map: &dyn MapCollisionOracle) -> bool {
    if dx == 0.0 && dy == 0.0 {
        return true;
    }
    let nx = body.x + dx;
    let ny = body.y + dy;
    if !is_free(nx, ny, body.width, body.height, map) {
        return false;
    }
    body.x = nx;
    body.y = ny;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::map::TileMap;

    fn walled_map() -> TileMap {
        // 10x10 tiles of 32, one blocking tile at (3, 0) on the object layer
        let mut map = TileMap::open(10, 10, 32.0);
        map.add_blocking(7);
        map.set_tile(CollisionLayer::Object, 3, 0, 7);
        map
    }

    #[test]
    fn test_free_move() {
        let map = walled_map();
        let mut body = Body::new(0.0, 0.0, 32.0, 32.0, 0);
        assert!(try_move(&mut body, 10.0, 5.0, &map));
        assert!((body.x - 10.0).abs() < 0.001);
        assert!((body.y - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_blocked_move_is_rejected_whole() {
        let map = walled_map();
        let mut body = Body::new(60.0, 0.0, 32.0, 32.0, 0);
        // Right edge would reach tile 3
        assert!(!try_move(&mut body, 5.0, 5.0, &map));
        assert!((body.x - 60.0).abs() < 0.001);
        assert!(body.y.abs() < 0.001);
    }

    #[test]
    fn test_touching_blocked_tile_edge_is_allowed() {
        let map = walled_map();
        let mut body = Body::new(60.0, 0.0, 32.0, 32.0, 0);
        // Box spans 64..96 exclusive of 96, tile 3 starts at 96
        assert!(try_move(&mut body, 4.0, 0.0, &map));
    }

    #[test]
    fn test_fractional_position_overlapping_blocked_tile() {
        let map = walled_map();
        // Spans 64.5..96.5, half a unit into tile 3
        assert!(!is_free(64.5, 0.0, 32.0, 32.0, &map));
        assert!(is_free(63.5, 0.0, 32.0, 32.0, &map));

        let mut body = Body::new(60.0, 0.0, 32.0, 32.0, 0);
        assert!(!try_move(&mut body, 4.5, 0.0, &map));
        assert!((body.x - 60.0).abs() < 0.001);
    }

    #[test]
    fn test_out_of_bounds_is_blocked() {
        let map = walled_map();
        let mut body = Body::new(0.0, 100.0, 32.0, 32.0, 0);
        assert!(!try_move(&mut body, -1.0, 0.0, &map));
        let mut body = Body::new(288.0, 288.0, 32.0, 32.0, 0);
        assert!(!try_move(&mut body, 0.0, 1.0, &map));
    }

    #[test]
    fn test_ground_layer_blocks_too() {
        let mut map = TileMap::open(4, 4, 32.0);
        map.add_blocking(2);
        map.set_tile(CollisionLayer::Ground, 1, 1, 2);
        assert!(!is_free(40.0, 40.0, 8.0, 8.0, &map));
        assert!(is_free(0.0, 0.0, 32.0, 32.0, &map));
    }
}
