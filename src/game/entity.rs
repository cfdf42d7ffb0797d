//! Entity Model
//!
//! Every simulated object is one [`Entity`]: a kinematic body with a hitbox,
//! health and physics flags, plus an [`EntityKind`] carrying the per-variant
//! state. Behaviour is dispatched on the kind by the `update`, `collision`
//! and `health` modules.

use serde::{Serialize, Deserialize};

use crate::core::{Color, Rect, Vec2};
use crate::game::enemy::{EnemyBehavior, EnemyState};
use crate::game::player::PlayerState;
use crate::game::projectile::{EffectState, PotionState};
use crate::game::terrain::{BlockStyle, PlatformState};

// =============================================================================
// KIND
// =============================================================================

/// Per-variant state of an entity.
#[derive(Clone, Debug)]
pub enum EntityKind {
    /// Static terrain tile
    Block(BlockStyle),
    /// Tile sliding back and forth horizontally
    MovingPlatform(PlatformState),
    /// Hazard tile that hurts the player on contact
    Spikes,
    /// The player character
    Player(Box<PlayerState>),
    /// Any goose (including spit projectiles)
    Enemy(EnemyState),
    /// Arrow fired from the bow
    Arrow,
    /// Thrown poison potion
    Potion(PotionState),
    /// Afterimage left behind while dashing
    DashTrail(EffectState),
    /// Puff left behind when something dies
    DeathEffect(EffectState),
    /// Burst shown around the player when an ability fires
    AbilityEffect(EffectState),
}

/// Flat kind tag, used for kind queries and bulk removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// Static terrain tile
    Block,
    /// Moving platform tile
    MovingPlatform,
    /// Hazard tile
    Spikes,
    /// Player
    Player,
    /// Walking goose
    Grunt,
    /// Walking goose with spikes
    SpikedGoose,
    /// Stationary spitting goose
    Spitter,
    /// Spit projectile
    Spit,
    /// Arrow projectile
    Arrow,
    /// Potion projectile
    Potion,
    /// Dash afterimage
    DashTrail,
    /// Death puff
    DeathEffect,
    /// Ability burst
    AbilityEffect,
}

impl EntityTag {
    /// Geese and their spit.
    pub fn is_enemy(self) -> bool {
        matches!(
            self,
            EntityTag::Grunt | EntityTag::SpikedGoose | EntityTag::Spitter | EntityTag::Spit
        )
    }

    /// Tiles a patroller turns around at.
    pub fn is_terrain(self) -> bool {
        matches!(self, EntityTag::Block | EntityTag::MovingPlatform | EntityTag::Spikes)
    }
}

// =============================================================================
// ENTITY
// =============================================================================

/// A simulated object.
///
/// `position` is the top-left corner of the sprite in world pixels. The world
/// hitbox is derived from it and is recomputed on every position or hitbox
/// change, so it is never stale.
#[derive(Clone, Debug)]
pub struct Entity {
    /// Variant state
    pub kind: EntityKind,
    position: Vec2,
    /// Velocity in units per second (see `SimConfig::unit_scale`)
    pub velocity: Vec2,
    /// Acceleration added to velocity each second
    pub acceleration: Vec2,
    size: Vec2,
    hitbox: Option<Rect>,
    global_hitbox: Option<Rect>,
    pub(crate) health: i32,
    pub(crate) dead: bool,
    /// Sprite is mirrored horizontally
    pub facing_left: bool,
    /// Moves under the physics engine
    pub has_physics: bool,
    /// Gravity applies
    pub uses_gravity: bool,
    /// Moves without collision tests
    pub ignores_collisions: bool,
    /// Render tint
    pub tint: Color,
}

impl Entity {
    /// Create an entity whose hitbox covers the whole sprite.
    pub fn new(kind: EntityKind, position: Vec2, size: Vec2) -> Self {
        let hitbox = Some(Rect::from_size(size));
        Self {
            kind,
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            size,
            hitbox,
            global_hitbox: hitbox.map(|h| h.offset(position)),
            health: 1,
            dead: false,
            facing_left: false,
            has_physics: true,
            uses_gravity: true,
            ignores_collisions: false,
            tint: Color::WHITE,
        }
    }

    /// Replace the local hitbox.
    pub fn with_hitbox(mut self, hitbox: Option<Rect>) -> Self {
        self.set_hitbox(hitbox);
        self
    }

    /// Set the facing direction.
    pub fn facing(mut self, left: bool) -> Self {
        self.facing_left = left;
        self
    }

    /// Set the render tint.
    pub fn tinted(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    /// Set the physics flags.
    pub fn with_physics(mut self, has_physics: bool, uses_gravity: bool, ignores_collisions: bool) -> Self {
        self.has_physics = has_physics;
        self.uses_gravity = uses_gravity;
        self.ignores_collisions = ignores_collisions;
        self
    }

    /// Set the initial velocity.
    pub fn moving(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Flat kind tag.
    pub fn tag(&self) -> EntityTag {
        match &self.kind {
            EntityKind::Block(_) => EntityTag::Block,
            EntityKind::MovingPlatform(_) => EntityTag::MovingPlatform,
            EntityKind::Spikes => EntityTag::Spikes,
            EntityKind::Player(_) => EntityTag::Player,
            EntityKind::Enemy(enemy) => match enemy.behavior {
                EnemyBehavior::Patroller { spiked: false, .. } => EntityTag::Grunt,
                EnemyBehavior::Patroller { spiked: true, .. } => EntityTag::SpikedGoose,
                EnemyBehavior::Spitter(_) => EntityTag::Spitter,
                EnemyBehavior::Spit => EntityTag::Spit,
            },
            EntityKind::Arrow => EntityTag::Arrow,
            EntityKind::Potion(_) => EntityTag::Potion,
            EntityKind::DashTrail(_) => EntityTag::DashTrail,
            EntityKind::DeathEffect(_) => EntityTag::DeathEffect,
            EntityKind::AbilityEffect(_) => EntityTag::AbilityEffect,
        }
    }

    /// Whether this is a goose or goose spit.
    pub fn is_enemy(&self) -> bool {
        matches!(self.kind, EntityKind::Enemy(_))
    }

    /// Whether this is the player.
    pub fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Player(_))
    }

    // =========================================================================
    // BODY
    // =========================================================================

    /// Top-left corner in world pixels.
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Move the entity, recomputing its world hitbox.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.recalculate_hitbox();
    }

    /// Sprite size in pixels.
    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Sprite centre in world pixels.
    pub fn center(&self) -> Vec2 {
        self.position + self.size.scale(0.5)
    }

    /// Hitbox relative to the sprite origin.
    #[inline]
    pub fn hitbox(&self) -> Option<Rect> {
        self.hitbox
    }

    /// Replace the local hitbox, recomputing the world hitbox.
    pub fn set_hitbox(&mut self, hitbox: Option<Rect>) {
        self.hitbox = hitbox;
        self.recalculate_hitbox();
    }

    /// Hitbox in world space.
    #[inline]
    pub fn global_hitbox(&self) -> Option<Rect> {
        self.global_hitbox
    }

    /// World hitbox grown by `margin` on every side.
    pub fn expanded_hitbox(&self, margin: f32) -> Option<Rect> {
        self.global_hitbox.map(|h| h.inflate(margin))
    }

    /// Hitbox this entity would have at `position`.
    pub fn hitbox_at(&self, position: Vec2) -> Option<Rect> {
        self.hitbox.map(|h| h.offset(position))
    }

    fn recalculate_hitbox(&mut self) {
        self.global_hitbox = self.hitbox.map(|h| h.offset(self.position));
    }

    // =========================================================================
    // HEALTH (mutated through `game::health`)
    // =========================================================================

    /// Current health (never negative).
    #[inline]
    pub fn health(&self) -> i32 {
        self.health
    }

    /// Whether health has reached zero.
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.dead
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn goose_like(position: Vec2) -> Entity {
        Entity::new(EntityKind::Arrow, position, Vec2::new(132.0, 128.0))
            .with_hitbox(Some(Rect::new(28.0, 28.0, 76.0, 100.0)))
    }

    #[test]
    fn test_full_size_hitbox_by_default() {
        let e = Entity::new(EntityKind::Spikes, Vec2::new(60.0, 120.0), Vec2::new(60.0, 60.0));
        assert_eq!(e.hitbox(), Some(Rect::new(0.0, 0.0, 60.0, 60.0)));
        assert_eq!(e.global_hitbox(), Some(Rect::new(60.0, 120.0, 60.0, 60.0)));
    }

    #[test]
    fn test_global_hitbox_keeps_local_height() {
        let e = goose_like(Vec2::new(100.0, 50.0));
        let global = e.global_hitbox().unwrap();
        assert_eq!(global, Rect::new(128.0, 78.0, 76.0, 100.0));
    }

    #[test]
    fn test_null_hitbox_has_no_global() {
        let mut e = goose_like(Vec2::ZERO).with_hitbox(None);
        assert!(e.global_hitbox().is_none());
        e.set_position(Vec2::new(5.0, 5.0));
        assert!(e.global_hitbox().is_none());
        assert!(e.expanded_hitbox(0.2).is_none());
    }

    #[test]
    fn test_expanded_hitbox_is_symmetric() {
        let e = Entity::new(EntityKind::Spikes, Vec2::new(10.0, 10.0), Vec2::new(60.0, 60.0));
        let expanded = e.expanded_hitbox(0.5).unwrap();
        assert_eq!(expanded, Rect::new(9.5, 9.5, 61.0, 61.0));
    }

    proptest! {
        #[test]
        fn prop_global_hitbox_follows_position(
            moves in prop::collection::vec((-5000.0f32..5000.0, -5000.0f32..5000.0), 1..20)
        ) {
            let mut e = goose_like(Vec2::ZERO);
            for (x, y) in moves {
                let pos = Vec2::new(x, y);
                e.set_position(pos);
                let local = e.hitbox().unwrap();
                prop_assert_eq!(e.global_hitbox(), Some(local.offset(pos)));
            }
        }
    }
}
