//! Collision Detection
//!
//! Broad-phase rectangle tests against every live object, plus the per-pair
//! callback protocol.
//!
//! When a mover's probe rectangle overlaps another object, both sides get to
//! react: first the mover's handler sees the struck object, then the struck
//! object's handler sees the mover. Both handlers always run and their side
//! effects (damage, staged removal) stand regardless of the outcome. The pair
//! only blocks movement if *both* handlers return `true`.

use crate::core::Vec2;
use crate::game::entity::{Entity, EntityKind};
use crate::game::health;
use crate::game::registry::EntityId;
use crate::game::world::World;

/// The object that stopped a probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blocker {
    /// Handle of the blocking object
    pub id: EntityId,
    /// Its velocity at the time of the hit
    pub velocity: Vec2,
}

/// Test whether `mover` placed at `position` would be blocked by anything.
///
/// Runs both collision handlers for every overlapping pair until a blocking
/// pair is found. Objects staged for removal and objects without a hitbox are
/// skipped. A mover without a hitbox never collides.
pub fn collision_at(
    world: &mut World,
    mover_id: EntityId,
    mover: &mut Entity,
    position: Vec2,
) -> Option<Blocker> {
    let probe = mover.hitbox_at(position)?;

    // The live sequence is only mutated in post_update, so indices are stable
    let count = world.registry.live_ids().len();
    for i in 0..count {
        let other_id = world.registry.live_ids()[i];
        if other_id == mover_id || world.registry.marked_for_removal(other_id) {
            continue;
        }

        let overlaps = world
            .registry
            .get(other_id)
            .and_then(Entity::global_hitbox)
            .is_some_and(|other| probe.intersects(&other));
        if !overlaps {
            continue;
        }

        let Some(mut other) = world.registry.take(other_id) else {
            continue;
        };
        let mover_blocks = on_collision(world, mover_id, mover, other_id, &mut other);
        let other_blocks = on_collision(world, other_id, &mut other, mover_id, mover);
        let velocity = other.velocity;
        world.registry.restore(other_id, other);

        if mover_blocks && other_blocks {
            return Some(Blocker { id: other_id, velocity });
        }
    }

    None
}

/// Ground check: would moving down by the probe distance hit something?
pub fn is_on_ground(world: &mut World, id: EntityId, entity: &mut Entity) -> bool {
    let below = entity.position() + Vec2::new(0.0, world.config.ground_probe);
    collision_at(world, id, entity, below).is_some()
}

/// Contact test using `a`'s hitbox inflated by `margin` on every side.
pub fn touches(a: &Entity, b: &Entity, margin: f32) -> bool {
    match (a.expanded_hitbox(margin), b.global_hitbox()) {
        (Some(reach), Some(other)) => reach.intersects(&other),
        _ => false,
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// React to touching `other`. Returns whether this side counts the contact as
/// a physical (blocking) collision.
pub fn on_collision(
    world: &mut World,
    this_id: EntityId,
    this: &mut Entity,
    other_id: EntityId,
    other: &mut Entity,
) -> bool {
    match &this.kind {
        EntityKind::Enemy(enemy) if enemy.is_spit() => {
            if matches!(&other.kind, EntityKind::Enemy(e) if e.is_spit()) {
                return false;
            }
            if other.is_player() {
                health::deal_damage(world, other_id, other, 1);
            }
            world.remove_object(this_id);
            false
        }
        EntityKind::Enemy(_) => {
            if other.is_player() {
                health::deal_damage(world, other_id, other, 1);
                return false;
            }
            true
        }
        EntityKind::Arrow => {
            if matches!(other.kind, EntityKind::Arrow) || other.is_player() {
                return false;
            }
            if other.is_enemy() {
                health::set_health(world, other_id, other, 0);
                world.remove_object(other_id);
            }
            world.remove_object(this_id);
            true
        }
        EntityKind::Potion(_) => {
            if matches!(other.kind, EntityKind::Potion(_)) || other.is_player() {
                return false;
            }
            if other.is_enemy() {
                world.remove_object(other_id);
            }
            true
        }
        EntityKind::DashTrail(_) | EntityKind::DeathEffect(_) | EntityKind::AbilityEffect(_) => false,
        EntityKind::Block(_)
        | EntityKind::MovingPlatform(_)
        | EntityKind::Spikes
        | EntityKind::Player(_) => true,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Color;
    use crate::game::entity::EntityTag;
    use crate::game::{enemy, player, projectile, terrain};

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn test_enemy_hurts_player_without_blocking() {
        let mut world = World::sandbox();
        let goose = world.add_object(enemy::grunt(Vec2::new(200.0, 100.0), false));
        let pid = world.spawn_player(Vec2::new(500.0, 500.0));
        world.registry.post_update();

        let mut player = world.registry.take(pid).unwrap();
        // Put the probe squarely on the goose's hitbox
        let probe = Vec2::new(240.0, 140.0);
        let hit = collision_at(&mut world, pid, &mut player, probe);
        world.registry.restore(pid, player);

        assert!(hit.is_none());
        // Health dropped to zero and the player respawned at its spawn point
        let player = world.registry.get(pid).unwrap();
        assert_eq!(player.health(), 1);
        assert_eq!(player.position(), Vec2::new(500.0, 500.0));
        assert!(world.registry.contains(goose));
    }

    #[test]
    fn test_both_handlers_run_even_when_rejected() {
        let mut world = World::sandbox();
        // Spit never blocks, but the arrow still kills it
        let spit = world.add_object(projectile::spit(Vec2::new(100.0, 100.0), true));
        let arrow = world.add_object(projectile::arrow(Vec2::new(60.0, 100.0), false, 1.0));
        world.registry.post_update();

        let mut arrow_entity = world.registry.take(arrow).unwrap();
        let hit = collision_at(&mut world, arrow, &mut arrow_entity, Vec2::new(90.0, 100.0));
        world.registry.restore(arrow, arrow_entity);

        assert!(hit.is_none());
        assert!(world.registry.marked_for_removal(spit));
        assert!(world.registry.marked_for_removal(arrow));
        assert!(world.registry.get(spit).unwrap().is_dead());
    }

    #[test]
    fn test_struck_handler_runs_after_mover_rejects() {
        let mut world = World::sandbox();
        // Spit refuses every contact, yet the arrow it flies into still kills it
        let spit = world.add_object(projectile::spit(Vec2::new(100.0, 100.0), false));
        let arrow = world.add_object(projectile::arrow(Vec2::new(140.0, 100.0), true, 1.0));
        world.registry.post_update();

        let mut spit_entity = world.registry.take(spit).unwrap();
        let hit = collision_at(&mut world, spit, &mut spit_entity, Vec2::new(130.0, 100.0));
        world.registry.restore(spit, spit_entity);

        assert!(hit.is_none());
        assert!(world.registry.marked_for_removal(spit));
        assert!(world.registry.marked_for_removal(arrow));
        assert!(world.registry.get(spit).unwrap().is_dead());
    }

    #[test]
    fn test_staged_removal_is_skipped() {
        let mut world = World::sandbox();
        let wall = world.add_object(terrain::block(Vec2::new(100.0, 0.0), terrain::BlockStyle::Stone, Color::WHITE));
        let mut mover = terrain::block(Vec2::new(0.0, 0.0), terrain::BlockStyle::Stone, Color::WHITE);
        let mover_id = world.add_object(mover.clone());
        world.registry.post_update();

        assert!(collision_at(&mut world, mover_id, &mut mover, Vec2::new(50.0, 0.0)).is_some());
        world.remove_object(wall);
        assert!(collision_at(&mut world, mover_id, &mut mover, Vec2::new(50.0, 0.0)).is_none());
    }

    #[test]
    fn test_null_hitbox_never_collides() {
        let mut world = World::sandbox();
        world.add_object(terrain::block(Vec2::ZERO, terrain::BlockStyle::Stone, Color::WHITE));
        let mut ghost = terrain::block(Vec2::ZERO, terrain::BlockStyle::Stone, Color::WHITE).with_hitbox(None);
        let ghost_id = world.add_object(ghost.clone());
        world.registry.post_update();

        assert!(collision_at(&mut world, ghost_id, &mut ghost, Vec2::new(10.0, 10.0)).is_none());
    }

    #[test]
    fn test_ground_check() {
        let mut world = World::sandbox();
        world.add_object(terrain::block(Vec2::new(0.0, 200.0), terrain::BlockStyle::Grass, Color::WHITE));
        let pid = world.spawn_player(Vec2::new(0.0, 200.0 - player::PLAYER_SIZE.y));
        world.registry.post_update();

        let mut p = world.registry.take(pid).unwrap();
        assert!(is_on_ground(&mut world, pid, &mut p));
        p.set_position(Vec2::new(0.0, 50.0));
        assert!(!is_on_ground(&mut world, pid, &mut p));
        world.registry.restore(pid, p);
    }

    #[test]
    fn test_arrow_kills_and_removes_goose() {
        let mut world = World::sandbox();
        let goose = world.add_object(enemy::grunt(Vec2::new(300.0, 100.0), true));
        let arrow = world.add_object(projectile::arrow(Vec2::new(300.0, 160.0), false, 3.0));
        world.registry.post_update();

        world.update_object(arrow, FRAME);
        assert!(world.registry.marked_for_removal(goose));
        assert!(world.registry.marked_for_removal(arrow));

        world.registry.post_update();
        assert_eq!(world.registry.count_of(EntityTag::Grunt), 0);
        // Death effect staged by the kill
        assert_eq!(world.registry.count_of(EntityTag::DeathEffect), 1);
    }
}
