//! Physics Integration
//!
//! Simplified axis-separated kinematics. Each frame an entity computes an
//! X-only and a Y-only candidate position from the same starting point and
//! commits each axis independently, depending on whether the candidate
//! collides with something that blocks it.

use crate::core::Vec2;
use crate::game::collision::{self, Blocker};
use crate::game::entity::Entity;
use crate::game::registry::EntityId;
use crate::game::world::World;

/// Candidate position after applying velocity on the chosen axes.
pub fn next_position(world: &World, entity: &Entity, delta: f32, x_axis: bool, y_axis: bool) -> Vec2 {
    let step = entity.velocity.scale(delta * world.config.unit_scale);
    let mut next = entity.position();
    if x_axis {
        next.x += step.x;
    }
    if y_axis {
        next.y += step.y;
    }
    next
}

/// Integrate one frame of motion for an entity.
///
/// Does nothing while the world is inactive (demo and ability selection) or
/// for entities without physics.
pub fn integrate(world: &mut World, id: EntityId, entity: &mut Entity, delta: f32) {
    if !world.is_active() || !entity.has_physics {
        return;
    }

    entity.velocity += entity.acceleration.scale(delta);
    if entity.uses_gravity {
        entity.velocity.y += world.config.gravity * delta;
    }
    entity.velocity = entity.velocity.clamp_axes(world.config.terminal_velocity);

    if entity.ignores_collisions {
        let next = next_position(world, entity, delta, true, true);
        entity.set_position(next);
        return;
    }

    let start = entity.position();
    let candidate_x = next_position(world, entity, delta, true, false);
    let candidate_y = next_position(world, entity, delta, false, true);
    let mut next = start;

    match collision::collision_at(world, id, entity, candidate_x) {
        None => next.x = candidate_x.x,
        Some(Blocker { velocity, .. }) => entity.velocity.x = velocity.x,
    }

    match collision::collision_at(world, id, entity, candidate_y) {
        None => next.y = candidate_y.y,
        Some(_) => {
            entity.velocity.y = 0.0;
            entity.acceleration.y = 0.0;
        }
    }

    // A collision handler teleported us (respawn); keep that position
    if entity.position() != start {
        return;
    }

    entity.set_position(next);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Color, Rect};
    use crate::game::entity::EntityKind;
    use crate::game::terrain::{self, BlockStyle};

    const FRAME: f32 = 1.0 / 60.0;

    fn crate_box(position: Vec2) -> Entity {
        Entity::new(EntityKind::Block(BlockStyle::Stone), position, Vec2::new(50.0, 50.0))
    }

    fn stone(world: &mut World, x: f32, y: f32) -> EntityId {
        world.add_object(terrain::block(Vec2::new(x, y), BlockStyle::Stone, Color::WHITE))
    }

    #[test]
    fn test_free_fall_accumulates_gravity() {
        let mut world = World::sandbox();
        let id = world.add_object(crate_box(Vec2::new(100.0, 100.0)));
        world.registry.post_update();

        world.update_object(id, 0.1);
        let e = world.registry.get(id).unwrap();
        assert!((e.velocity.y - 0.75).abs() < 1e-5);
        assert!((e.position().y - 107.5).abs() < 1e-3);
        assert_eq!(e.position().x, 100.0);
    }

    #[test]
    fn test_blocked_on_x_still_falls_on_y() {
        let mut world = World::sandbox();
        // Wall directly to the right, touching
        stone(&mut world, 150.0, 0.0);
        stone(&mut world, 150.0, 60.0);
        stone(&mut world, 150.0, 120.0);
        let mover = world.add_object(crate_box(Vec2::new(100.0, 60.0)).moving(Vec2::new(2.0, 0.0)));
        world.registry.post_update();

        world.update_object(mover, FRAME);
        let e = world.registry.get(mover).unwrap();

        assert_eq!(e.position().x, 100.0);
        assert!(e.position().y > 60.0);
        // Inherits the wall's (zero) horizontal velocity
        assert_eq!(e.velocity.x, 0.0);
    }

    #[test]
    fn test_landing_zeroes_vertical_motion() {
        let mut world = World::sandbox();
        stone(&mut world, 100.0, 150.0);
        let mover = world.add_object(crate_box(Vec2::new(100.0, 100.0)).moving(Vec2::new(0.0, 3.0)));
        world.registry.get_mut(mover).unwrap().acceleration = Vec2::new(0.0, 1.0);
        world.registry.post_update();

        world.update_object(mover, FRAME);
        let e = world.registry.get(mover).unwrap();
        assert_eq!(e.position().y, 100.0);
        assert_eq!(e.velocity.y, 0.0);
        assert_eq!(e.acceleration.y, 0.0);
    }

    #[test]
    fn test_terminal_velocity_clamps_each_axis() {
        let mut world = World::sandbox();
        let id = world.add_object(crate_box(Vec2::new(0.0, 0.0)).moving(Vec2::new(-500.0, 250.0)));
        world.registry.post_update();

        world.update_object(id, 0.001);
        let e = world.registry.get(id).unwrap();
        assert_eq!(e.velocity, Vec2::new(-100.0, 100.0));
    }

    #[test]
    fn test_rider_inherits_platform_velocity() {
        let mut world = World::sandbox();
        let platform = world.add_object(terrain::moving_platform(Vec2::new(200.0, 300.0), Color::WHITE));
        world.registry.get_mut(platform).unwrap().velocity = Vec2::new(1.0, 0.0);
        // Pressed against the platform's left side
        let rider = world.add_object(crate_box(Vec2::new(150.0, 280.0)).moving(Vec2::new(3.0, 0.0)));
        world.registry.post_update();

        world.update_object(rider, FRAME);
        assert_eq!(world.registry.get(rider).unwrap().velocity.x, 1.0);
    }

    #[test]
    fn test_ignores_collisions_moves_through() {
        let mut world = World::sandbox();
        stone(&mut world, 110.0, 100.0);
        let ghost = world.add_object(
            crate_box(Vec2::new(100.0, 100.0))
                .with_physics(true, false, true)
                .moving(Vec2::new(6.0, 0.0)),
        );
        world.registry.post_update();

        world.update_object(ghost, 0.1);
        assert!((world.registry.get(ghost).unwrap().position().x - 160.0).abs() < 1e-3);
    }

    #[test]
    fn test_inactive_world_freezes_physics() {
        let mut world = World::sandbox();
        world.set_active(false);
        let id = world.add_object(crate_box(Vec2::new(0.0, 0.0)).moving(Vec2::new(1.0, 1.0)));
        world.registry.post_update();

        world.update_object(id, 0.1);
        let e = world.registry.get(id).unwrap();
        assert_eq!(e.position(), Vec2::ZERO);
        assert_eq!(e.velocity, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_hitbox_offset_used_for_probe() {
        let mut world = World::sandbox();
        stone(&mut world, 0.0, 200.0);
        // Sprite overlaps the block but the inset hitbox does not
        let inset = crate_box(Vec2::new(0.0, 160.0))
            .with_hitbox(Some(Rect::new(10.0, 0.0, 30.0, 30.0)))
            .with_physics(true, false, false)
            .moving(Vec2::new(0.0, 0.05));
        let id = world.add_object(inset);
        world.registry.post_update();

        world.update_object(id, FRAME);
        assert!(world.registry.get(id).unwrap().position().y > 160.0);
    }
}
