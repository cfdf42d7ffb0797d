//! Enemy Behaviour
//!
//! Geese come in three flavours: ground patrollers (plain and spiked) that
//! walk until they bump into terrain, stationary spitters that turn towards
//! the player and spit on a fixed cycle, and the spit projectiles themselves.
//! All of them share a stun timer set by the roar ability.

use tracing::debug;

use crate::core::timer::tick_optional;
use crate::core::{DeltaTimer, Rect, Vec2};
use crate::game::collision;
use crate::game::entity::{Entity, EntityKind};
use crate::game::events::GameEventData;
use crate::game::physics;
use crate::game::projectile;
use crate::game::registry::EntityId;
use crate::game::world::World;

/// Goose sprite size.
pub const GOOSE_SIZE: Vec2 = Vec2::new(132.0, 128.0);

/// Goose hitbox, inset from the sprite.
pub const GOOSE_HITBOX: Rect = Rect::new(28.0, 28.0, 76.0, 100.0);

/// Patroller walking speed.
pub const PATROL_SPEED: f32 = 0.5;

/// Spitter cycle: idle until this many seconds...
pub const SPITTER_WIND_UP_AT: f32 = 2.0;
/// ...winding up until this many, then spit.
pub const SPITTER_FIRE_AT: f32 = 3.0;
/// Pause after spitting before the cycle restarts.
pub const SPITTER_COOLDOWN: f32 = 1.0;

/// Spawn offset of spit when facing left.
pub const SPIT_OFFSET_LEFT: Vec2 = Vec2::new(-45.0, 35.0);
/// Spawn offset of spit when facing right.
pub const SPIT_OFFSET_RIGHT: Vec2 = Vec2::new(120.0, 35.0);

/// Seconds per frame of the patroller idle animation.
const PATROL_FRAME_TIME: f32 = 1.0;

// =============================================================================
// STATE
// =============================================================================

/// Shared enemy state.
#[derive(Clone, Debug)]
pub struct EnemyState {
    /// Remaining stun, if stunned
    pub stun: Option<DeltaTimer>,
    /// Variant behaviour
    pub behavior: EnemyBehavior,
}

/// What kind of goose this is.
#[derive(Clone, Debug)]
pub enum EnemyBehavior {
    /// Walks back and forth, turning at terrain
    Patroller {
        /// Spiked variant (same behaviour, different look)
        spiked: bool,
        /// Idle animation clock
        anim: f32,
    },
    /// Stands still and spits at the player
    Spitter(SpitterState),
    /// Spit in flight
    Spit,
}

/// Spitter attack cycle.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpitterState {
    /// Seconds into the current idle/wind-up phase
    pub timer: f32,
    /// Post-spit pause
    pub cooldown: Option<DeltaTimer>,
}

/// Visible stage of the spitter cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpitterPose {
    /// Waiting
    Idle,
    /// About to spit
    WindUp,
    /// Just spat
    Spitting,
}

impl SpitterState {
    /// Current pose for rendering.
    pub fn pose(&self) -> SpitterPose {
        if self.cooldown.is_some() {
            SpitterPose::Spitting
        } else if self.timer > SPITTER_WIND_UP_AT {
            SpitterPose::WindUp
        } else {
            SpitterPose::Idle
        }
    }
}

impl EnemyState {
    /// Fresh, unstunned state.
    pub fn new(behavior: EnemyBehavior) -> Self {
        Self { stun: None, behavior }
    }

    /// Whether this is a spit projectile rather than a goose.
    pub fn is_spit(&self) -> bool {
        matches!(self.behavior, EnemyBehavior::Spit)
    }

    /// Whether movement and attacks are suppressed.
    pub fn is_stunned(&self) -> bool {
        self.stun.is_some_and(|t| !t.is_complete())
    }

    /// Stun for `seconds`, replacing any running stun.
    pub fn stun(&mut self, seconds: f32) {
        self.stun = Some(DeltaTimer::new(seconds));
    }

    /// Idle animation frame of a patroller.
    pub fn idle_frame(&self) -> u32 {
        match self.behavior {
            EnemyBehavior::Patroller { anim, .. } => (anim / PATROL_FRAME_TIME) as u32 % 2,
            _ => 0,
        }
    }
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

fn goose(behavior: EnemyBehavior, position: Vec2, facing_left: bool) -> Entity {
    Entity::new(EntityKind::Enemy(EnemyState::new(behavior)), position, GOOSE_SIZE)
        .with_hitbox(Some(GOOSE_HITBOX))
        .facing(facing_left)
}

/// Plain walking goose.
pub fn grunt(position: Vec2, facing_left: bool) -> Entity {
    goose(EnemyBehavior::Patroller { spiked: false, anim: 0.0 }, position, facing_left)
}

/// Walking goose wearing spikes.
pub fn spiked_goose(position: Vec2, facing_left: bool) -> Entity {
    goose(EnemyBehavior::Patroller { spiked: true, anim: 0.0 }, position, facing_left)
}

/// Stationary spitting goose.
pub fn spitter(position: Vec2, facing_left: bool) -> Entity {
    goose(EnemyBehavior::Spitter(SpitterState::default()), position, facing_left)
}

// =============================================================================
// UPDATE
// =============================================================================

/// Per-frame enemy behaviour.
pub fn update(world: &mut World, id: EntityId, entity: &mut Entity, delta: f32) {
    let EntityKind::Enemy(enemy) = &entity.kind else {
        return;
    };
    let stunned = enemy.is_stunned();

    match enemy.behavior {
        EnemyBehavior::Patroller { .. } => patrol(world, id, entity, stunned, delta),
        EnemyBehavior::Spitter(_) => {
            // Spitters stand perfectly still during the demo
            if !world.is_active() {
                return;
            }
            if !stunned {
                spitter_cycle(world, entity, delta);
            }
        }
        EnemyBehavior::Spit => {}
    }

    if let EntityKind::Enemy(enemy) = &mut entity.kind {
        if !tick_optional(&mut enemy.stun, delta) && stunned {
            debug!(%id, "stun wore off");
        }
    }

    physics::integrate(world, id, entity, delta);
}

fn patrol(world: &mut World, id: EntityId, entity: &mut Entity, stunned: bool, delta: f32) {
    if stunned {
        entity.velocity.x = 0.0;
        return;
    }

    entity.velocity.x = if entity.facing_left { -PATROL_SPEED } else { PATROL_SPEED };

    let probe = physics::next_position(world, entity, delta, true, false);
    let bumped = collision::collision_at(world, id, entity, probe)
        .and_then(|blocker| world.registry.tag_of(blocker.id))
        .is_some_and(|tag| tag.is_terrain());
    if bumped {
        entity.facing_left = !entity.facing_left;
    }

    if let EntityKind::Enemy(EnemyState {
        behavior: EnemyBehavior::Patroller { anim, .. },
        ..
    }) = &mut entity.kind
    {
        *anim += delta;
    }
}

fn spitter_cycle(world: &mut World, entity: &mut Entity, delta: f32) {
    let player_x = world
        .player_id()
        .and_then(|pid| world.registry.get(pid))
        .map(|player| player.position().x);
    if let Some(x) = player_x {
        entity.facing_left = x < entity.position().x;
    }

    let facing_left = entity.facing_left;
    let position = entity.position();
    let EntityKind::Enemy(EnemyState {
        behavior: EnemyBehavior::Spitter(state),
        ..
    }) = &mut entity.kind
    else {
        return;
    };

    if state.cooldown.is_some() {
        tick_optional(&mut state.cooldown, delta);
        return;
    }

    state.timer += delta;
    if state.timer > SPITTER_FIRE_AT {
        state.timer = 0.0;
        state.cooldown = Some(DeltaTimer::new(SPITTER_COOLDOWN));

        let offset = if facing_left { SPIT_OFFSET_LEFT } else { SPIT_OFFSET_RIGHT };
        let spit = projectile::spit(position + offset, facing_left);
        let tag = spit.tag();
        let spit_id = world.add_object(spit);
        world.push_event(GameEventData::ProjectileFired { id: spit_id, tag });
    }
}
