//! Terrain Tiles
//!
//! Blocks, moving platforms and spikes. Tiles never fall and never test
//! their own movement against other objects, but everything else collides
//! with them.

use crate::core::{Color, DeltaTimer, Vec2};
use crate::game::entity::{Entity, EntityKind};
use crate::game::collision;
use crate::game::physics;
use crate::game::registry::EntityId;
use crate::game::world::World;
use crate::TILE_SIZE;

/// Seconds a moving platform travels before reversing.
pub const PLATFORM_REVERSE_AFTER: f32 = 2.0;

/// Moving platform speed (units per second).
pub const PLATFORM_SPEED: f32 = 1.0;

/// Look of a static block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockStyle {
    /// Foreground stone, tinted with the level colour
    Stone,
    /// Grass top (untinted)
    Grass,
    /// Dirt fill (untinted)
    Dirt,
}

/// Moving platform travel state.
#[derive(Clone, Copy, Debug)]
pub struct PlatformState {
    /// Time since the last reversal
    pub leg: DeltaTimer,
    /// +1 moving right, -1 moving left
    pub direction: f32,
}

fn tile(kind: EntityKind, position: Vec2, tint: Color) -> Entity {
    Entity::new(kind, position, Vec2::new(TILE_SIZE, TILE_SIZE))
        .with_physics(true, false, true)
        .tinted(tint)
}

/// Static block tile.
pub fn block(position: Vec2, style: BlockStyle, tint: Color) -> Entity {
    let tint = match style {
        BlockStyle::Stone => tint,
        BlockStyle::Grass | BlockStyle::Dirt => Color::WHITE,
    };
    tile(EntityKind::Block(style), position, tint)
}

/// Platform that slides right then left, reversing every two seconds.
pub fn moving_platform(position: Vec2, tint: Color) -> Entity {
    tile(
        EntityKind::MovingPlatform(PlatformState {
            leg: DeltaTimer::new(PLATFORM_REVERSE_AFTER),
            direction: 1.0,
        }),
        position,
        tint,
    )
}

/// Spike hazard tile.
pub fn spikes(position: Vec2, tint: Color) -> Entity {
    tile(EntityKind::Spikes, position, tint)
}

/// Per-frame terrain behaviour.
pub fn update(world: &mut World, id: EntityId, entity: &mut Entity, delta: f32) {
    if let EntityKind::MovingPlatform(platform) = &mut entity.kind {
        entity.velocity = Vec2::new(platform.direction * PLATFORM_SPEED, 0.0);
        if platform.leg.update(delta) {
            platform.direction = -platform.direction;
            platform.leg.reset();
        }
    }

    if matches!(entity.kind, EntityKind::Spikes) {
        hurt_touching_player(world, entity);
    }

    physics::integrate(world, id, entity, delta);
}

fn hurt_touching_player(world: &mut World, spikes: &Entity) {
    let Some(player_id) = world.player_id() else {
        return;
    };
    let margin = world.config.touch_margin;
    let touching = world
        .registry
        .get(player_id)
        .is_some_and(|player| collision::touches(spikes, player, margin));

    if touching {
        world.deal_damage(player_id, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::player;

    #[test]
    fn test_grass_and_dirt_ignore_level_tint() {
        let tint = Color::rgb(10, 20, 30);
        assert_eq!(block(Vec2::ZERO, BlockStyle::Stone, tint).tint, tint);
        assert_eq!(block(Vec2::ZERO, BlockStyle::Grass, tint).tint, Color::WHITE);
        assert_eq!(block(Vec2::ZERO, BlockStyle::Dirt, tint).tint, Color::WHITE);
    }

    #[test]
    fn test_tiles_do_not_fall() {
        let mut world = World::sandbox();
        let id = world.add_object(block(Vec2::new(0.0, 0.0), BlockStyle::Stone, Color::WHITE));
        world.registry.post_update();

        for _ in 0..30 {
            world.update_object(id, 1.0 / 60.0);
        }
        assert_eq!(world.registry.get(id).unwrap().position(), Vec2::ZERO);
    }

    #[test]
    fn test_platform_reverses_every_two_seconds() {
        let mut world = World::sandbox();
        let id = world.add_object(moving_platform(Vec2::new(600.0, 600.0), Color::WHITE));
        world.registry.post_update();

        world.update_object(id, 0.5);
        let after_first = world.registry.get(id).unwrap().position().x;
        assert!((after_first - 650.0).abs() < 1e-3);

        // Finish the first leg and start heading back
        world.update_object(id, 0.5);
        world.update_object(id, 0.5);
        world.update_object(id, 0.5);
        world.update_object(id, 0.5);
        let platform = world.registry.get(id).unwrap();
        assert_eq!(platform.velocity.x, -PLATFORM_SPEED);
    }

    #[test]
    fn test_spikes_hurt_adjacent_player() {
        let mut world = World::sandbox();
        // Player standing directly on top of the spike, touching only its edge
        let spike = world.add_object(spikes(Vec2::new(300.0, 600.0), Color::WHITE));
        let pid = world.spawn_player(Vec2::new(290.0, 600.0 - player::PLAYER_SIZE.y));
        world.registry.post_update();

        world.update_object(spike, 1.0 / 60.0);

        let player = world.registry.get(pid).unwrap();
        // Player had one health, died and respawned with one
        assert_eq!(player.health(), 1);
        assert!(world
            .events()
            .iter()
            .any(|e| matches!(e.data, crate::game::events::GameEventData::PlayerRespawned { .. })));
    }
}
