//! Per-tick world view sent to clients.

use skirmish_shared::{PlayerSnapshot, WeaponAnimation, WorldSnapshot};

use super::GameWorld;
use crate::entities::ServerPlayer;

/// Client view of one player. Cooldowns, latches and input are left out.
pub fn player_snapshot(player: &ServerPlayer) -> PlayerSnapshot {
    let weapon_animation = if player.attacking {
        player
            .equipment
            .active_weapon()
            .and_then(|weapon| weapon.action_texture)
            .map(|texture_id| WeaponAnimation {
                texture_id,
                direction: player.direction,
            })
    } else {
        None
    };

    PlayerSnapshot {
        id: player.id,
        x: player.body.x,
        y: player.body.y,
        texture_id: player.body.texture,
        anim_row: player.anim_row,
        status: player.status.snapshot(),
        inventory: player.inventory.snapshot(),
        equipment: player.equipment.snapshot(),
        ui_state: player.ui_state,
        weapon_animation,
    }
}

impl GameWorld {
    /// Current world state, entries ordered by id
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick,
            players: self.players.values().map(player_snapshot).collect(),
            mobs: self.mobs.values().map(|m| m.snapshot()).collect(),
            projectiles: self.projectiles.values().map(|p| p.snapshot()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_support::world_with_player;
    use skirmish_shared::{Direction, ItemRecord, MouseInput, PlayerInput, ATTACK_BUTTON};

    #[test]
    fn test_snapshot_lists_entities_by_id() {
        let (mut world, _) = world_with_player();
        world.add_player(ServerPlayer::new(0, "early".into(), 10.0, 10.0, 1));
        let snapshot = world.snapshot();
        let ids: Vec<u64> = snapshot.players.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(snapshot.players[1].inventory.len(), skirmish_shared::INVENTORY_SIZE);
    }

    #[test]
    fn test_weapon_animation_only_while_attacking() {
        let (mut world, id) = world_with_player();
        let bow = world.items().create(&ItemRecord { id: 20, quant: 1 }).unwrap();
        world.get_player_mut(id).unwrap().equipment.equip(bow).unwrap();

        let idle = world.tick();
        assert!(idle.players[0].weapon_animation.is_none());
        assert_eq!(idle.players[0].equipment.len(), 1);

        world.set_player_input(
            id,
            PlayerInput {
                mouse: MouseInput { button: ATTACK_BUTTON, dx: 50.0, dy: 0.0 },
                ..PlayerInput::default()
            },
        );
        let attacking = world.tick();
        let animation = attacking.players[0].weapon_animation.as_ref().unwrap();
        assert_eq!(animation.texture_id, 61);
        assert_eq!(animation.direction, Direction::Right);
        assert_eq!(attacking.players[0].anim_row, 12);
        assert_eq!(attacking.projectiles.len(), 1);
        assert_eq!(attacking.projectiles[0].texture_id, 28);
    }

    #[test]
    fn test_weapon_without_action_texture_has_no_animation() {
        let (mut world, id) = world_with_player();
        let wand = world.items().create(&ItemRecord { id: 21, quant: 1 }).unwrap();
        world.get_player_mut(id).unwrap().equipment.equip(wand).unwrap();
        world.set_player_input(
            id,
            PlayerInput {
                mouse: MouseInput { button: ATTACK_BUTTON, dx: 0.0, dy: 50.0 },
                ..PlayerInput::default()
            },
        );
        let snapshot = world.tick();
        assert!(world.get_player(id).unwrap().attacking);
        assert!(snapshot.players[0].weapon_animation.is_none());
        assert_eq!(snapshot.projectiles[0].texture_id, 29);
    }
}
