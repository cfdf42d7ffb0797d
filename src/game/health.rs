//! Health & Death Lifecycle
//!
//! Health is clamped at zero. Death is edge-triggered: crossing into zero
//! spawns exactly one death effect and records one `EntityDied` event, no
//! matter how much more damage the corpse takes afterwards.

use tracing::debug;

use crate::game::entity::{Entity, EntityKind};
use crate::game::events::GameEventData;
use crate::game::player;
use crate::game::projectile;
use crate::game::registry::EntityId;
use crate::game::world::World;

/// Set an entity's health, firing death and damage reactions.
///
/// The damage hook fires unless the entity was already dead and still is.
pub fn set_health(world: &mut World, id: EntityId, entity: &mut Entity, health: i32) {
    let was_dead = entity.dead;
    entity.health = health.max(0);
    entity.dead = entity.health == 0;

    debug!(%id, tag = ?entity.tag(), health = entity.health, dead = entity.dead, "health changed");

    if entity.dead && !was_dead {
        world.add_object(projectile::death_effect(entity.position()));
        world.push_event(GameEventData::EntityDied {
            id,
            tag: entity.tag(),
            position: entity.position(),
        });
    }

    if !was_dead || !entity.dead {
        on_damage(world, id, entity);
    }
}

/// Reduce health by `amount`, flooring at zero.
pub fn deal_damage(world: &mut World, id: EntityId, entity: &mut Entity, amount: i32) {
    let health = entity.health.saturating_sub(amount);
    set_health(world, id, entity, health);
}

/// Overwrite health without death or damage reactions.
pub(crate) fn pin_health(entity: &mut Entity, health: i32) {
    entity.health = health.max(0);
    entity.dead = entity.health == 0;
}

fn on_damage(world: &mut World, id: EntityId, entity: &mut Entity) {
    if let EntityKind::Player(_) = entity.kind {
        player::on_damage(world, id, entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Color, Vec2};
    use crate::game::entity::EntityTag;
    use crate::game::{enemy, terrain};
    use proptest::prelude::*;

    fn spawn_goose(world: &mut World) -> EntityId {
        let id = world.add_object(enemy::grunt(Vec2::new(100.0, 100.0), false));
        world.registry.post_update();
        id
    }

    #[test]
    fn test_death_spawns_exactly_one_effect() {
        let mut world = World::sandbox();
        let id = spawn_goose(&mut world);

        world.deal_damage(id, 1);
        assert!(world.registry.get(id).unwrap().is_dead());
        world.deal_damage(id, 1);
        world.registry.post_update();

        assert_eq!(world.registry.count_of(EntityTag::DeathEffect), 1);
        let deaths = world
            .events()
            .iter()
            .filter(|e| matches!(e.data, GameEventData::EntityDied { .. }))
            .count();
        assert_eq!(deaths, 1);
    }

    #[test]
    fn test_death_effect_spawns_at_entity_position() {
        let mut world = World::sandbox();
        let id = spawn_goose(&mut world);
        world.deal_damage(id, 5);

        let effect = world.registry.pending_additions()[0];
        assert_eq!(world.registry.get(effect).unwrap().position(), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_revive_then_die_again_spawns_again() {
        let mut world = World::sandbox();
        let id = spawn_goose(&mut world);

        world.set_health(id, 0);
        world.set_health(id, 3);
        assert!(!world.registry.get(id).unwrap().is_dead());
        world.deal_damage(id, 3);
        world.registry.post_update();

        assert_eq!(world.registry.count_of(EntityTag::DeathEffect), 2);
    }

    #[test]
    fn test_player_hook_skipped_for_corpse() {
        let mut world = World::sandbox();
        let pid = world.spawn_player(Vec2::new(10.0, 10.0));
        world.registry.post_update();
        let mut player = world.registry.take(pid).unwrap();

        // Mark dead without going through the hook
        player.health = 0;
        player.dead = true;
        world.take_events();

        set_health(&mut world, pid, &mut player, 0);
        assert!(world.take_events().is_empty());
        world.registry.restore(pid, player);
    }

    #[test]
    fn test_tiles_can_die_too() {
        let mut world = World::sandbox();
        let id = world.add_object(terrain::spikes(Vec2::ZERO, Color::WHITE));
        world.registry.post_update();
        world.deal_damage(id, 1);
        assert!(world.registry.get(id).unwrap().is_dead());
    }

    proptest! {
        #[test]
        fn prop_health_never_negative(
            start in 0i32..50,
            hits in prop::collection::vec(0i32..1000, 0..40),
        ) {
            let mut world = World::sandbox();
            let id = spawn_goose(&mut world);
            world.set_health(id, start);

            for amount in hits {
                world.deal_damage(id, amount);
                let e = world.registry.get(id).unwrap();
                prop_assert!(e.health() >= 0);
                prop_assert_eq!(e.is_dead(), e.health() == 0);
            }
        }
    }
}
