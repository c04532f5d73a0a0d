//! Turns a player's buffered input into movement and attack intents.

use skirmish_shared::{Direction, ATTACK_BUTTON};

use crate::entities::ServerPlayer;

/// What a player wants to do this tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Intent {
    /// Displacement already scaled by the player's speed
    pub dx: f32,
    pub dy: f32,
    /// World point the player is attacking toward
    pub attack_target: Option<(f32, f32)>,
}

/// Facing for a movement vector; ties go to the vertical axis
fn movement_direction(dx: f32, dy: f32) -> Direction {
    if dx.abs() > dy.abs() {
        if dx > 0.0 { Direction::Right } else { Direction::Left }
    } else if dy > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

/// Facing toward the mouse; ties go to the horizontal axis
fn aim_direction(dx: f32, dy: f32) -> Direction {
    if dx.abs() >= dy.abs() {
        if dx > 0.0 { Direction::Right } else { Direction::Left }
    } else if dy > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

/// Read the player's latest input. Updates `moving`, facing and the UI
/// toggle, and returns the movement/attack intent for the rest of the tick.
pub fn apply_input(player: &mut ServerPlayer) -> Intent {
    let keys = player.input.keys;
    let mouse = player.input.mouse;

    let mut dx = 0.0f32;
    let mut dy = 0.0f32;
    if keys.up {
        dy -= 1.0;
    }
    if keys.down {
        dy += 1.0;
    }
    if keys.left {
        dx -= 1.0;
    }
    if keys.right {
        dx += 1.0;
    }

    if dx == 0.0 && dy == 0.0 {
        player.moving = false;
    } else {
        player.moving = true;
        player.direction = movement_direction(dx, dy);
        let magnitude = (dx * dx + dy * dy).sqrt();
        dx = dx / magnitude * player.status.speed;
        dy = dy / magnitude * player.status.speed;
    }

    // Rising edge only
    if keys.inventory && !player.inventory_key_latch {
        player.ui_state = player.ui_state.toggled();
    }
    player.inventory_key_latch = keys.inventory;

    let attack_target = if mouse.button == ATTACK_BUTTON {
        player.direction = aim_direction(mouse.dx, mouse.dy);
        Some((player.body.x + mouse.dx, player.body.y + mouse.dy))
    } else {
        None
    };

    Intent {
        dx,
        dy,
        attack_target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_shared::{InputKeys, MouseInput, PlayerInput, UiState};

    fn player() -> ServerPlayer {
        ServerPlayer::new(1, "p".into(), 100.0, 100.0, 0)
    }

    fn keys(up: bool, down: bool, left: bool, right: bool) -> PlayerInput {
        PlayerInput {
            keys: InputKeys { up, down, left, right, inventory: false },
            mouse: MouseInput::default(),
        }
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let mut player = player();
        player.input = keys(true, false, false, true);
        let intent = apply_input(&mut player);
        let len = (intent.dx * intent.dx + intent.dy * intent.dy).sqrt();
        assert!((len - player.status.speed).abs() < 0.001);
        assert!(player.moving);
        // Tie goes vertical
        assert_eq!(player.direction, Direction::Up);
    }

    #[test]
    fn test_idle_keeps_facing() {
        let mut player = player();
        player.input = keys(false, false, true, false);
        apply_input(&mut player);
        assert_eq!(player.direction, Direction::Left);

        player.input = PlayerInput::default();
        let intent = apply_input(&mut player);
        assert!(!player.moving);
        assert_eq!(player.direction, Direction::Left);
        assert_eq!(intent, Intent::default());
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut player = player();
        player.input = keys(true, true, false, false);
        let intent = apply_input(&mut player);
        assert!(!player.moving);
        assert_eq!(intent.dy, 0.0);
    }

    #[test]
    fn test_inventory_toggle_is_edge_triggered() {
        let mut player = player();
        player.input.keys.inventory = true;
        for _ in 0..3 {
            apply_input(&mut player);
        }
        assert_eq!(player.ui_state, UiState::Inventory);

        player.input.keys.inventory = false;
        apply_input(&mut player);
        player.input.keys.inventory = true;
        apply_input(&mut player);
        assert_eq!(player.ui_state, UiState::Hud);
    }

    #[test]
    fn test_attack_aims_from_player_position() {
        let mut player = player();
        player.input.mouse = MouseInput { button: ATTACK_BUTTON, dx: -30.0, dy: 30.0 };
        let intent = apply_input(&mut player);
        assert_eq!(intent.attack_target, Some((70.0, 130.0)));
        // Mouse ties go horizontal
        assert_eq!(player.direction, Direction::Left);
    }

    #[test]
    fn test_other_buttons_do_not_attack() {
        let mut player = player();
        player.input.mouse = MouseInput { button: 2, dx: 5.0, dy: 0.0 };
        assert!(apply_input(&mut player).attack_target.is_none());
    }
}
