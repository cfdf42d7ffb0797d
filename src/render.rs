//! Render Seam
//!
//! The simulation never touches textures or windows. Each object is handed
//! to a [`RenderTarget`] as a [`SpriteView`], a plain snapshot of what should
//! be on screen, right after it updates.

use crate::core::{Color, Vec2};
use crate::game::enemy::{EnemyBehavior, SpitterPose};
use crate::game::entity::{Entity, EntityKind, EntityTag};
use crate::game::player::PlayerPose;
use crate::game::registry::EntityId;
use crate::game::terrain::BlockStyle;

/// Which animation an object shows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpritePose {
    /// Single still image
    Still,
    /// Terrain block texture
    Block(BlockStyle),
    /// Player animation
    Player(PlayerPose),
    /// Walking goose animation frame
    Goose {
        /// Idle animation frame
        frame: u32,
        /// Stars over the head
        stunned: bool,
    },
    /// Spitting goose
    Spitter {
        /// Wind-up progress
        pose: SpitterPose,
        /// Stars over the head
        stunned: bool,
    },
    /// Splashing potion
    Splash,
    /// Frame of a particle animation
    Effect(u32),
}

/// Snapshot of one object for drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteView {
    /// Object handle
    pub id: EntityId,
    /// Object kind
    pub tag: EntityTag,
    /// Top-left corner in screen pixels
    pub position: Vec2,
    /// Sprite size in pixels
    pub size: Vec2,
    /// Mirror horizontally
    pub facing_left: bool,
    /// Colour multiplier
    pub tint: Color,
    /// Animation to show
    pub pose: SpritePose,
}

/// Build the drawable view of an entity.
pub fn sprite_for(id: EntityId, entity: &Entity) -> SpriteView {
    let pose = match &entity.kind {
        EntityKind::Block(style) => SpritePose::Block(*style),
        EntityKind::MovingPlatform(_) => SpritePose::Block(BlockStyle::Stone),
        EntityKind::Player(state) => SpritePose::Player(state.pose),
        EntityKind::Enemy(enemy) => match &enemy.behavior {
            EnemyBehavior::Patroller { .. } => SpritePose::Goose {
                frame: enemy.idle_frame(),
                stunned: enemy.is_stunned(),
            },
            EnemyBehavior::Spitter(spitter) => SpritePose::Spitter {
                pose: spitter.pose(),
                stunned: enemy.is_stunned(),
            },
            EnemyBehavior::Spit => SpritePose::Still,
        },
        EntityKind::Potion(potion) if potion.splashing => SpritePose::Splash,
        EntityKind::DashTrail(fx) | EntityKind::DeathEffect(fx) | EntityKind::AbilityEffect(fx) => {
            SpritePose::Effect(fx.frame())
        }
        EntityKind::Spikes | EntityKind::Arrow | EntityKind::Potion(_) => SpritePose::Still,
    };

    SpriteView {
        id,
        tag: entity.tag(),
        position: entity.position(),
        size: entity.size(),
        facing_left: entity.facing_left,
        tint: entity.tint,
        pose,
    }
}

/// Receives one [`SpriteView`] per object per frame, in update order.
pub trait RenderTarget {
    /// Draw one object.
    fn draw(&mut self, sprite: &SpriteView);
}

/// Target that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullTarget;

impl RenderTarget for NullTarget {
    fn draw(&mut self, _sprite: &SpriteView) {}
}

/// Target that keeps the last frame's sprites.
#[derive(Clone, Debug, Default)]
pub struct FrameRecorder {
    /// Sprites drawn since the last [`clear`](Self::clear)
    pub sprites: Vec<SpriteView>,
}

impl FrameRecorder {
    /// Forget recorded sprites.
    pub fn clear(&mut self) {
        self.sprites.clear();
    }

    /// Number of sprites of one kind.
    pub fn count_of(&self, tag: EntityTag) -> usize {
        self.sprites.iter().filter(|s| s.tag == tag).count()
    }
}

impl RenderTarget for FrameRecorder {
    fn draw(&mut self, sprite: &SpriteView) {
        self.sprites.push(*sprite);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::World;
    use crate::game::{enemy, projectile, terrain};

    #[test]
    fn test_sprite_poses_by_kind() {
        let mut world = World::sandbox();
        let block = world.add_object(terrain::block(Vec2::ZERO, BlockStyle::Dirt, Color::RED));
        let goose = world.add_object(enemy::grunt(Vec2::ZERO, true));
        let fx = world.add_object(projectile::death_effect(Vec2::ZERO));

        let view = sprite_for(block, world.registry.get(block).unwrap());
        assert_eq!(view.pose, SpritePose::Block(BlockStyle::Dirt));
        // Dirt ignores the level tint
        assert_eq!(view.tint, Color::WHITE);

        let view = sprite_for(goose, world.registry.get(goose).unwrap());
        assert!(view.facing_left);
        assert_eq!(view.pose, SpritePose::Goose { frame: 0, stunned: false });

        let view = sprite_for(fx, world.registry.get(fx).unwrap());
        assert_eq!(view.pose, SpritePose::Effect(0));
    }

    #[test]
    fn test_recorder_counts() {
        let mut world = World::sandbox();
        let id = world.add_object(enemy::spitter(Vec2::ZERO, false));
        let mut recorder = FrameRecorder::default();
        recorder.draw(&sprite_for(id, world.registry.get(id).unwrap()));
        assert_eq!(recorder.count_of(EntityTag::Spitter), 1);
        recorder.clear();
        assert!(recorder.sprites.is_empty());
    }
}
