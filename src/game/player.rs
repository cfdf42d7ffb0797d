//! Player
//!
//! Keyboard-driven movement plus the per-ability player effects: drawing the
//! bow, gliding, double jumping, dashing, the damage shield, the roar and
//! throwing potions. Dying is never final; the player is put back at its
//! spawn point and flashes red for a few seconds.

use tracing::debug;

use crate::core::{Color, DeltaTimer, Vec2};
use crate::game::collision;
use crate::game::entity::{Entity, EntityKind};
use crate::game::events::{GameEventData, SoundCue};
use crate::game::health;
use crate::game::input::InputEdge;
use crate::game::physics;
use crate::game::projectile;
use crate::game::registry::EntityId;
use crate::game::world::World;
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Player sprite size.
pub const PLAYER_SIZE: Vec2 = Vec2::new(64.0, 128.0);

/// Horizontal acceleration per 60th of a second while a direction is held.
pub const RUN_ACCELERATION: f32 = 0.1;
/// Velocity multiplier per frame while no direction is held.
pub const FRICTION: f32 = 0.95;
/// Horizontal speed cap.
pub const MAX_RUN_SPEED: f32 = 4.0;
/// Horizontal speed cap while dashing.
pub const MAX_DASH_SPEED: f32 = 10.0;

/// Upward impulse of a jump from the ground.
pub const JUMP_IMPULSE: f32 = 5.5;
/// Upward impulse of a mid-air double jump.
pub const DOUBLE_JUMP_IMPULSE: f32 = 3.5;
/// Vertical velocity held while gliding.
pub const GLIDE_VELOCITY: f32 = -0.0005;

/// Dash length in seconds.
pub const DASH_DURATION: f32 = 0.5;
/// Shield length in seconds.
pub const SHIELD_DURATION: f32 = 3.0;
/// Roar pose length in seconds.
pub const ROAR_DURATION: f32 = 1.0;
/// How long enemies stay stunned after a roar.
pub const ROAR_STUN: f32 = 5.0;

/// Damage flash length in seconds.
pub const FLASH_DURATION: f32 = 3.5;
/// Seconds between flash colour toggles.
pub const FLASH_TOGGLE: f32 = 0.1;

const RUN_FRAME_TIME: f32 = 0.8;
const BOW_FRAMES: u32 = 4;
const BOW_FRAMES_PER_SECOND: f32 = 2.5;

// =============================================================================
// STATE
// =============================================================================

/// What the player sprite is doing this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayerPose {
    /// Standing still
    #[default]
    Idle,
    /// Running, alternating between two frames
    Run(u32),
    /// In the air
    Jump,
    /// Drawing the bow (frame grows with draw time)
    Bow(u32),
    /// Dashing
    Dash,
    /// Gliding
    Glide,
    /// Used the double jump
    DoubleJump,
    /// Roaring
    Roar,
}

/// Red/white blink after a respawn.
#[derive(Clone, Copy, Debug)]
pub struct DamageFlash {
    total: DeltaTimer,
    since_toggle: f32,
}

impl DamageFlash {
    fn new() -> Self {
        Self {
            total: DeltaTimer::new(FLASH_DURATION),
            since_toggle: 0.0,
        }
    }
}

/// Player-only state.
#[derive(Clone, Debug, Default)]
pub struct PlayerState {
    /// Where the player reappears after dying
    pub spawn: Vec2,
    /// Left held
    pub left: bool,
    /// Right held
    pub right: bool,
    /// Jump held (only set when pressed on the ground)
    pub jump: bool,
    /// Cartmel glide held
    pub gliding: bool,
    /// Furness double jump held
    pub double_jumping: bool,
    /// Double jump still available for the current jump
    pub can_double_jump: bool,
    /// Remaining shield time
    pub shield: Option<DeltaTimer>,
    /// Remaining dash time
    pub dash: Option<DeltaTimer>,
    /// Bow being drawn
    pub drawing_bow: bool,
    /// Seconds the bow has been drawn
    pub bow_draw: f32,
    /// Remaining roar pose time
    pub roar: Option<DeltaTimer>,
    /// Post-respawn blink
    pub flash: Option<DamageFlash>,
    /// Current pose
    pub pose: PlayerPose,
    run_clock: f32,
}

impl PlayerState {
    /// Fresh state spawning at `spawn`.
    pub fn new(spawn: Vec2) -> Self {
        Self { spawn, ..Self::default() }
    }

    /// Whether a dash is in progress.
    pub fn is_dashing(&self) -> bool {
        self.dash.is_some()
    }

    /// Whether the damage shield is up.
    pub fn has_shield(&self) -> bool {
        self.shield.is_some()
    }
}

fn state(entity: &Entity) -> Option<&PlayerState> {
    match &entity.kind {
        EntityKind::Player(state) => Some(state),
        _ => None,
    }
}

fn state_mut(entity: &mut Entity) -> Option<&mut PlayerState> {
    match &mut entity.kind {
        EntityKind::Player(state) => Some(state),
        _ => None,
    }
}

/// The player entity.
pub fn player(position: Vec2) -> Entity {
    Entity::new(EntityKind::Player(Box::new(PlayerState::new(position))), position, PLAYER_SIZE)
}

/// Move the respawn point.
pub fn set_spawn(entity: &mut Entity, spawn: Vec2) {
    if let Some(state) = state_mut(entity) {
        state.spawn = spawn;
    }
}

// =============================================================================
// UPDATE
// =============================================================================

/// Per-frame player behaviour.
pub fn update(world: &mut World, id: EntityId, entity: &mut Entity, delta: f32) {
    if state(entity).is_none() {
        return;
    }

    update_shield(world, id, entity, delta);
    update_dash(world, entity, delta);
    apply_run_input(entity, delta);

    let grounded = collision::is_on_ground(world, id, entity);
    apply_jump(world, entity, grounded);
    update_pose(world, entity, grounded, delta);
    update_flash(entity, delta);

    let position = entity.position();
    if position.x >= SCREEN_WIDTH {
        world.request_screen_advance();
    } else if position.x <= 0.0 {
        entity.set_position(position.with_x(0.0));
    }
    if position.y >= SCREEN_HEIGHT {
        health::set_health(world, id, entity, 0);
    }

    physics::integrate(world, id, entity, delta);
}

fn update_shield(world: &mut World, id: EntityId, entity: &mut Entity, delta: f32) {
    let Some(state) = state_mut(entity) else {
        return;
    };
    let Some(shield) = &mut state.shield else {
        return;
    };
    let expired = shield.update(delta);
    if expired {
        state.shield = None;
    }

    health::pin_health(entity, i32::MAX);
    if expired {
        debug!(%id, "shield expired");
        health::set_health(world, id, entity, 1);
    }
}

fn update_dash(world: &mut World, entity: &mut Entity, delta: f32) {
    let facing_left = entity.facing_left;
    let Some(state) = state_mut(entity) else {
        return;
    };
    let Some(dash) = &mut state.dash else {
        return;
    };

    if dash.update(delta) {
        state.dash = None;
        entity.uses_gravity = true;
        return;
    }

    let direction = if facing_left { -1.0 } else { 1.0 };
    entity.velocity.x = direction * MAX_DASH_SPEED;
    world.add_object(projectile::dash_trail(entity.position(), facing_left));
}

fn apply_run_input(entity: &mut Entity, delta: f32) {
    let Some(state) = state(entity) else {
        return;
    };
    let (left, right, dashing) = (state.left, state.right, state.is_dashing());
    let step = RUN_ACCELERATION * delta * 60.0;

    if left && !right {
        entity.velocity.x -= step;
        entity.facing_left = true;
    } else if right && !left {
        entity.velocity.x += step;
        entity.facing_left = false;
    } else {
        entity.velocity.x *= FRICTION;
    }

    let cap = if dashing { MAX_DASH_SPEED } else { MAX_RUN_SPEED };
    if entity.velocity.x.abs() > cap {
        entity.velocity.x = cap.copysign(entity.velocity.x);
    }
}

fn apply_jump(world: &mut World, entity: &mut Entity, grounded: bool) {
    let Some(state) = state_mut(entity) else {
        return;
    };

    let impulse = if grounded && state.jump {
        state.can_double_jump = true;
        JUMP_IMPULSE
    } else if !grounded && state.double_jumping && state.can_double_jump {
        state.can_double_jump = false;
        DOUBLE_JUMP_IMPULSE
    } else {
        return;
    };

    entity.velocity.y -= impulse;
    world.play(SoundCue::Jump);
}

fn update_pose(world: &mut World, entity: &mut Entity, grounded: bool, delta: f32) {
    let speed = entity.velocity.x.abs();
    let Some(state) = state_mut(entity) else {
        return;
    };

    if let Some(roar) = &mut state.roar {
        state.pose = PlayerPose::Roar;
        if roar.update(delta) {
            state.roar = None;
        }
    } else if state.is_dashing() {
        state.pose = PlayerPose::Dash;
    } else if state.drawing_bow {
        state.bow_draw += delta;
        let frame = ((state.bow_draw * BOW_FRAMES_PER_SECOND) as u32).min(BOW_FRAMES - 1);
        state.pose = PlayerPose::Bow(frame);
    } else if state.double_jumping && !state.can_double_jump {
        state.pose = PlayerPose::DoubleJump;
    } else if !grounded {
        if state.gliding {
            state.pose = PlayerPose::Glide;
            entity.velocity.y = GLIDE_VELOCITY;
        } else {
            state.pose = PlayerPose::Jump;
        }
    } else if speed < 0.05 {
        state.pose = PlayerPose::Idle;
    } else {
        let previous = run_frame(state.run_clock);
        state.run_clock += delta * speed;
        let frame = run_frame(state.run_clock);
        state.pose = PlayerPose::Run(frame);
        if frame != previous {
            world.play(SoundCue::Step);
        }
    }
}

fn run_frame(clock: f32) -> u32 {
    (clock / RUN_FRAME_TIME) as u32 % 2
}

fn update_flash(entity: &mut Entity, delta: f32) {
    let tint = entity.tint;
    let Some(state) = state_mut(entity) else {
        return;
    };
    let Some(flash) = &mut state.flash else {
        return;
    };

    let mut next = tint;
    flash.since_toggle += delta;
    if flash.since_toggle > FLASH_TOGGLE {
        flash.since_toggle = 0.0;
        next = if tint == Color::RED { Color::WHITE } else { Color::RED };
    }
    if flash.total.update(delta) {
        state.flash = None;
        next = Color::WHITE;
    }
    entity.tint = next;
}

// =============================================================================
// INPUT
// =============================================================================

/// React to a movement key edge.
pub fn handle_key(world: &mut World, id: EntityId, entity: &mut Entity, edge: InputEdge) {
    let key = edge.key();
    let grounded = edge.is_press() && key.is_jump() && collision::is_on_ground(world, id, entity);
    let Some(state) = state_mut(entity) else {
        return;
    };

    match edge {
        InputEdge::Pressed(key) if key.is_left() => state.left = true,
        InputEdge::Pressed(key) if key.is_right() => state.right = true,
        InputEdge::Pressed(key) if key.is_jump() => {
            if grounded {
                state.jump = true;
            }
        }
        InputEdge::Released(key) if key.is_left() => state.left = false,
        InputEdge::Released(key) if key.is_right() => state.right = false,
        InputEdge::Released(key) if key.is_jump() => state.jump = false,
        _ => {}
    }
}

// =============================================================================
// DAMAGE
// =============================================================================

/// Damage reaction: grunt, and on death respawn at the spawn point.
pub fn on_damage(world: &mut World, id: EntityId, entity: &mut Entity) {
    world.play(SoundCue::Grunt);

    if !entity.is_dead() {
        return;
    }
    let Some(state) = state_mut(entity) else {
        return;
    };
    let spawn = state.spawn;
    state.flash = Some(DamageFlash::new());

    entity.tint = Color::RED;
    entity.set_position(spawn);
    health::pin_health(entity, 1);

    debug!(%id, ?spawn, "player respawned");
    world.push_event(GameEventData::PlayerRespawned { id, spawn });
}

// =============================================================================
// ABILITY EFFECTS
// =============================================================================

/// Start drawing the bow. Ignored if already drawing.
pub fn start_drawing_bow(entity: &mut Entity) {
    if let Some(state) = state_mut(entity) {
        if state.drawing_bow {
            return;
        }
        state.drawing_bow = true;
        state.bow_draw = 0.0;
    }
}

/// Release the bow, firing an arrow if it was drawn.
pub fn stop_drawing_bow(world: &mut World, entity: &mut Entity) {
    let Some(state) = state_mut(entity) else {
        return;
    };
    let was_drawing = std::mem::take(&mut state.drawing_bow);
    let draw = std::mem::take(&mut state.bow_draw);
    if !was_drawing {
        return;
    }

    let origin = entity.center();
    let arrow = projectile::arrow(origin, entity.facing_left, draw);
    let tag = arrow.tag();
    let arrow_id = world.add_object(arrow);
    world.push_event(GameEventData::ProjectileFired { id: arrow_id, tag });
    world.play(SoundCue::ShootArrow);
}

/// Throw a potion from the player's position.
pub fn throw_potion(world: &mut World, entity: &Entity) {
    let potion = projectile::potion(entity.position(), entity.facing_left);
    let tag = potion.tag();
    let potion_id = world.add_object(potion);
    world.push_event(GameEventData::ProjectileFired { id: potion_id, tag });
    world.play(SoundCue::Throw);
}

/// Start (or restart) a dash.
pub fn dash(world: &mut World, entity: &mut Entity) {
    if let Some(state) = state_mut(entity) {
        state.dash = Some(DeltaTimer::new(DASH_DURATION));
        entity.uses_gravity = false;
        world.play(SoundCue::Dash);
    }
}

/// Toggle gliding.
pub fn set_gliding(entity: &mut Entity, gliding: bool) {
    if let Some(state) = state_mut(entity) {
        state.gliding = gliding;
    }
}

/// Toggle double jumping. Turning it on is refused once the double jump
/// has been spent.
pub fn set_double_jumping(entity: &mut Entity, double_jumping: bool) {
    if let Some(state) = state_mut(entity) {
        if double_jumping && !state.can_double_jump {
            return;
        }
        state.double_jumping = double_jumping;
    }
}

/// Whether the double jump toggle is on.
pub fn is_double_jumping(entity: &Entity) -> bool {
    state(entity).is_some_and(|s| s.double_jumping)
}

/// Raise the damage shield.
pub fn use_shield(entity: &mut Entity) {
    if let Some(state) = state_mut(entity) {
        state.shield = Some(DeltaTimer::new(SHIELD_DURATION));
    }
}

/// Roar, stunning every enemy on screen.
pub fn roar(world: &mut World, entity: &mut Entity) {
    if let Some(state) = state_mut(entity) {
        state.roar = Some(DeltaTimer::new(ROAR_DURATION));
    }
    world.play(SoundCue::LionRoar);
    world.stun_all_enemies(ROAR_STUN);
}
