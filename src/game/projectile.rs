//! Projectiles & Effects
//!
//! Short-lived objects spawned during play: arrows and potions thrown by the
//! player, and purely visual effects (dash trails, death puffs, ability
//! bursts) that remove themselves once their animation has played.
//! Goose spit is built here too but behaves as an enemy.

use crate::core::{Color, DeltaTimer, Vec2};
use crate::game::collision;
use crate::game::enemy::{EnemyBehavior, EnemyState};
use crate::game::entity::{Entity, EntityKind};
use crate::game::physics;
use crate::game::registry::EntityId;
use crate::game::world::World;
use crate::SCREEN_WIDTH;

/// Arrow sprite size.
pub const ARROW_SIZE: Vec2 = Vec2::new(48.0, 12.0);
/// Spit sprite size.
pub const SPIT_SIZE: Vec2 = Vec2::new(24.0, 24.0);
/// Potion sprite size.
pub const POTION_SIZE: Vec2 = Vec2::new(32.0, 32.0);
/// Particle effect sprite size.
pub const EFFECT_SIZE: Vec2 = Vec2::new(64.0, 64.0);

/// Horizontal speed multiplier applied to the (clamped) bow draw time.
pub const ARROW_SPEED_PER_DRAW: f32 = 6.0;
/// Spit speed.
pub const SPIT_SPEED: f32 = 4.0;
/// Potion throw velocity (x mirrored when thrown left).
pub const POTION_THROW: Vec2 = Vec2::new(3.0, -5.0);
/// How long a potion lingers before disappearing.
pub const POTION_LIFETIME: f32 = 3.5;

/// Dash trail animation length.
pub const DASH_TRAIL_LIFETIME: f32 = 1.0;
/// Death puff animation length (8 frames at 0.15 s).
pub const DEATH_EFFECT_LIFETIME: f32 = 1.2;
/// Ability burst animation length (8 frames at 0.15 s).
pub const ABILITY_EFFECT_LIFETIME: f32 = 1.2;
/// Seconds per frame for the particle animations.
pub const EFFECT_FRAME_TIME: f32 = 0.15;

/// Animation clock for a self-removing visual effect.
#[derive(Clone, Copy, Debug)]
pub struct EffectState {
    /// Time until the effect removes itself
    pub life: DeltaTimer,
}

impl EffectState {
    fn new(lifetime: f32) -> Self {
        Self { life: DeltaTimer::new(lifetime) }
    }

    /// Current animation frame.
    pub fn frame(&self) -> u32 {
        (self.life.elapsed() / EFFECT_FRAME_TIME) as u32
    }
}

/// Potion flight state.
#[derive(Clone, Copy, Debug)]
pub struct PotionState {
    /// Time until the potion disappears
    pub leave: DeltaTimer,
    /// Landed and splashing
    pub splashing: bool,
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

/// Arrow released after drawing the bow for `draw` seconds.
///
/// Speed scales with draw time, clamped to [0.5, 3] seconds.
pub fn arrow(position: Vec2, facing_left: bool, draw: f32) -> Entity {
    let direction = if facing_left { -1.0 } else { 1.0 };
    let speed = draw.clamp(0.5, 3.0) * ARROW_SPEED_PER_DRAW;

    Entity::new(EntityKind::Arrow, position, ARROW_SIZE)
        .facing(facing_left)
        .with_physics(true, false, false)
        .moving(Vec2::new(direction * speed, 0.0))
}

/// Spit projectile fired by a spitter.
pub fn spit(position: Vec2, facing_left: bool) -> Entity {
    let direction = if facing_left { -1.0 } else { 1.0 };
    let state = EnemyState::new(EnemyBehavior::Spit);

    Entity::new(EntityKind::Enemy(state), position, SPIT_SIZE)
        .facing(facing_left)
        .with_physics(true, false, false)
        .moving(Vec2::new(direction * SPIT_SPEED, 0.0))
}

/// Poison potion thrown in an arc.
pub fn potion(position: Vec2, facing_left: bool) -> Entity {
    let direction = if facing_left { -1.0 } else { 1.0 };
    let state = PotionState {
        leave: DeltaTimer::new(POTION_LIFETIME),
        splashing: false,
    };

    Entity::new(EntityKind::Potion(state), position, POTION_SIZE)
        .facing(facing_left)
        .moving(Vec2::new(direction * POTION_THROW.x, POTION_THROW.y))
}

fn effect(kind: EntityKind, position: Vec2) -> Entity {
    Entity::new(kind, position, EFFECT_SIZE)
        .with_hitbox(None)
        .with_physics(false, false, true)
}

/// Afterimage left behind a dashing player.
pub fn dash_trail(position: Vec2, facing_left: bool) -> Entity {
    // Trail sits behind the player
    let position = if facing_left {
        position + Vec2::new(-100.0, 0.0)
    } else {
        position
    };
    effect(EntityKind::DashTrail(EffectState::new(DASH_TRAIL_LIFETIME)), position).facing(facing_left)
}

/// Puff shown where something died.
pub fn death_effect(position: Vec2) -> Entity {
    effect(EntityKind::DeathEffect(EffectState::new(DEATH_EFFECT_LIFETIME)), position)
}

/// Burst around the player, tinted with the ability's colour.
pub fn ability_effect(position: Vec2, color: Color) -> Entity {
    effect(EntityKind::AbilityEffect(EffectState::new(ABILITY_EFFECT_LIFETIME)), position).tinted(color)
}

// =============================================================================
// UPDATE
// =============================================================================

/// Per-frame behaviour for arrows, potions and visual effects.
pub fn update(world: &mut World, id: EntityId, entity: &mut Entity, delta: f32) {
    match entity.kind {
        EntityKind::Potion(_) => update_potion(world, id, entity, delta),
        EntityKind::Arrow => {
            let x = entity.position().x;
            if x < -ARROW_SIZE.x || x > SCREEN_WIDTH {
                world.remove_object(id);
                return;
            }
        }
        EntityKind::DashTrail(ref mut fx) | EntityKind::DeathEffect(ref mut fx) => {
            if fx.life.update(delta) {
                world.remove_object(id);
            }
        }
        EntityKind::AbilityEffect(ref mut fx) => {
            if fx.life.update(delta) {
                world.remove_object(id);
                return;
            }
            if let Some(player) = world.player_id().and_then(|pid| world.registry.get(pid)) {
                let anchor = player.position();
                entity.set_position(anchor);
            }
        }
        _ => {}
    }

    physics::integrate(world, id, entity, delta);
}

fn update_potion(world: &mut World, id: EntityId, entity: &mut Entity, delta: f32) {
    let grounded = collision::is_on_ground(world, id, entity);

    let EntityKind::Potion(potion) = &mut entity.kind else {
        return;
    };
    if grounded {
        potion.splashing = true;
    }
    let expired = potion.leave.update(delta);

    if grounded {
        entity.velocity = Vec2::ZERO;
    }
    if expired {
        world.remove_object(id);
    }
}
