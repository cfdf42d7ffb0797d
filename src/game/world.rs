//! Simulation World
//!
//! The explicit context every behaviour runs against. A `World` is one level
//! screen: it owns the object registry, the shared ability book, the level
//! progress, the slow-motion window and the frame's event log.
//!
//! Entities are checked out of the registry while their own code runs and
//! are handed the world alongside, so an entity can stage objects, damage
//! others and emit events without aliasing itself.

use tracing::{debug, info};

use crate::config::SimConfig;
use crate::core::timer::tick_optional;
use crate::core::{DeltaTimer, Vec2};
use crate::game::ability::AbilityBook;
use crate::game::entity::{Entity, EntityKind};
use crate::game::events::{GameEvent, GameEventData, SoundCue};
use crate::game::level::{self, LevelSchema, LevelSession};
use crate::game::registry::{EntityId, ObjectRegistry};
use crate::game::{enemy, health, player, projectile, terrain};
use crate::render::{sprite_for, RenderTarget};
use crate::save::SaveState;

/// One level screen and everything on it.
#[derive(Debug)]
pub struct World {
    /// Physics and timing tunables
    pub config: SimConfig,
    /// Every object on the screen
    pub registry: ObjectRegistry,
    /// Shared cooldown and activity state per ability
    pub abilities: AbilityBook,
    /// Level progress, absent in a bare sandbox
    pub(crate) level: Option<LevelSession>,
    events: Vec<GameEvent>,
    frame: u64,
    clock: f32,
    active: bool,
    player_id: Option<EntityId>,
    advance_requested: bool,
    slow_motion: Option<DeltaTimer>,
}

impl World {
    /// Empty, inactive world.
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            registry: ObjectRegistry::new(),
            abilities: AbilityBook::new(),
            level: None,
            events: Vec::new(),
            frame: 0,
            clock: 0.0,
            active: false,
            player_id: None,
            advance_requested: false,
            slow_motion: None,
        }
    }

    /// Empty world with default tunables that is already in play.
    pub fn sandbox() -> Self {
        let mut world = Self::new(SimConfig::default());
        world.active = true;
        world
    }

    /// World showing the level demo for `schema`.
    ///
    /// `save` decides which abilities are unlocked and whether the level's
    /// own ability is forced into the first slot.
    pub fn with_level(config: SimConfig, schema: LevelSchema, save: &SaveState) -> Self {
        let mut world = Self::new(config);
        info!(title = %schema.meta.title, screens = schema.screens.len(), "loading level");
        level::start(&mut world, schema, save);
        world
    }

    // =========================================================================
    // STATE
    // =========================================================================

    /// Whether the player is in control (demo over and abilities chosen).
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Freeze or unfreeze physics.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Handle of the player, once spawned.
    pub fn player_id(&self) -> Option<EntityId> {
        self.player_id
    }

    /// Frames simulated so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Seconds of simulated time so far.
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Level progress, when a level is loaded.
    pub fn level(&self) -> Option<&LevelSession> {
        self.level.as_ref()
    }

    pub(crate) fn advance_clock(&mut self, delta: f32) {
        self.frame += 1;
        self.clock += delta;
    }

    // =========================================================================
    // OBJECTS
    // =========================================================================

    /// Stage an object for insertion at the end of the frame.
    pub fn add_object(&mut self, entity: Entity) -> EntityId {
        self.registry.add(entity)
    }

    /// Stage an object for removal at the end of the frame.
    pub fn remove_object(&mut self, id: EntityId) {
        self.registry.remove(id);
    }

    /// Stage the player character and remember its handle.
    pub fn spawn_player(&mut self, position: Vec2) -> EntityId {
        let id = self.add_object(player::player(position));
        debug!(%id, %position, "player spawned");
        self.player_id = Some(id);
        id
    }

    /// Run `f` with an entity checked out of the registry.
    ///
    /// Returns `None` if the handle is stale or the entity is already checked
    /// out further up the stack.
    pub fn with_entity<R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut World, EntityId, &mut Entity) -> R,
    ) -> Option<R> {
        let mut entity = self.registry.take(id)?;
        let result = f(self, id, &mut entity);
        self.registry.restore(id, entity);
        Some(result)
    }

    /// Run `f` with the player checked out.
    pub fn with_player<R>(&mut self, f: impl FnOnce(&mut World, EntityId, &mut Entity) -> R) -> Option<R> {
        let id = self.player_id?;
        self.with_entity(id, f)
    }

    /// Reduce an object's health.
    pub fn deal_damage(&mut self, id: EntityId, amount: i32) {
        self.with_entity(id, |world, id, entity| health::deal_damage(world, id, entity, amount));
    }

    /// Overwrite an object's health.
    pub fn set_health(&mut self, id: EntityId, value: i32) {
        self.with_entity(id, |world, id, entity| health::set_health(world, id, entity, value));
    }

    /// Run one object's per-frame behaviour.
    pub fn update_object(&mut self, id: EntityId, delta: f32) {
        self.with_entity(id, |world, id, entity| match entity.kind {
            EntityKind::Block(_) | EntityKind::MovingPlatform(_) | EntityKind::Spikes => {
                terrain::update(world, id, entity, delta)
            }
            EntityKind::Player(_) => player::update(world, id, entity, delta),
            EntityKind::Enemy(_) => enemy::update(world, id, entity, delta),
            EntityKind::Arrow
            | EntityKind::Potion(_)
            | EntityKind::DashTrail(_)
            | EntityKind::DeathEffect(_)
            | EntityKind::AbilityEffect(_) => projectile::update(world, id, entity, delta),
        });
    }

    /// Update then draw every live object, in list order.
    ///
    /// Enemies run at the slow-motion factor while a slow-motion window is
    /// open. Objects staged during the pass wait for the next frame.
    pub fn update(&mut self, delta: f32, target: &mut dyn RenderTarget) {
        let slow_motion = tick_optional(&mut self.slow_motion, delta);

        let count = self.registry.live_ids().len();
        for i in 0..count {
            let id = self.registry.live_ids()[i];
            let slowed = slow_motion && self.registry.tag_of(id).is_some_and(|tag| tag.is_enemy());
            let step = if slowed { delta * self.config.slow_motion_factor } else { delta };

            self.update_object(id, step);
            if let Some(entity) = self.registry.get(id) {
                target.draw(&sprite_for(id, entity));
            }
        }
    }

    // =========================================================================
    // EFFECTS
    // =========================================================================

    /// Ask for the next level screen once the update pass finishes.
    pub fn request_screen_advance(&mut self) {
        self.advance_requested = true;
    }

    /// Whether the player left the screen this frame.
    pub fn screen_advance_requested(&self) -> bool {
        self.advance_requested
    }

    pub(crate) fn take_screen_advance(&mut self) -> bool {
        std::mem::take(&mut self.advance_requested)
    }

    /// Slow enemies down for `seconds`, replacing any running window.
    pub fn start_slow_motion(&mut self, seconds: f32) {
        self.slow_motion = Some(DeltaTimer::new(seconds));
        self.push_event(GameEventData::SlowMotionStarted { seconds });
    }

    /// Whether enemies are currently slowed.
    pub fn slow_motion_active(&self) -> bool {
        self.slow_motion.is_some_and(|t| !t.is_complete())
    }

    /// Stun every goose and spit on the screen. Returns how many were hit.
    pub fn stun_all_enemies(&mut self, seconds: f32) -> usize {
        let targets: Vec<EntityId> = self
            .registry
            .live_ids()
            .iter()
            .chain(self.registry.pending_additions())
            .copied()
            .filter(|id| self.registry.tag_of(*id).is_some_and(|tag| tag.is_enemy()))
            .collect();

        let mut count = 0;
        for id in targets {
            if let Some(EntityKind::Enemy(enemy)) = self.registry.get_mut(id).map(|e| &mut e.kind) {
                enemy.stun(seconds);
                count += 1;
            }
        }

        self.push_event(GameEventData::EnemiesStunned { count, seconds });
        count
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Record an event for the current frame.
    pub fn push_event(&mut self, data: GameEventData) {
        self.events.push(GameEvent::new(self.frame, data));
    }

    /// Queue a sound cue.
    pub fn play(&mut self, cue: SoundCue) {
        self.events.push(GameEvent::sound(self.frame, cue));
    }

    /// Events recorded since the last drain.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Drain recorded events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Color;
    use crate::game::entity::EntityTag;
    use crate::render::{FrameRecorder, NullTarget};

    #[test]
    fn test_staged_objects_are_reachable_but_not_live() {
        let mut world = World::sandbox();
        let id = world.add_object(enemy::grunt(Vec2::ZERO, false));
        assert!(world.registry.get(id).is_some());
        assert!(world.registry.live_ids().is_empty());

        let mut recorder = FrameRecorder::default();
        world.update(0.016, &mut recorder);
        assert!(recorder.sprites.is_empty());

        world.registry.post_update();
        world.update(0.016, &mut recorder);
        assert_eq!(recorder.count_of(EntityTag::Grunt), 1);
    }

    #[test]
    fn test_with_entity_on_checked_out_returns_none() {
        let mut world = World::sandbox();
        let id = world.add_object(enemy::grunt(Vec2::ZERO, false));
        let nested = world.with_entity(id, |world, id, _| world.with_entity(id, |_, _, _| ()));
        assert_eq!(nested, Some(None));
        assert!(world.registry.get(id).is_some());
    }

    #[test]
    fn test_stun_counts_enemies_only() {
        let mut world = World::sandbox();
        world.add_object(enemy::grunt(Vec2::ZERO, false));
        world.add_object(enemy::spitter(Vec2::new(300.0, 0.0), false));
        world.add_object(terrain::spikes(Vec2::new(600.0, 0.0), Color::WHITE));
        world.registry.post_update();

        assert_eq!(world.stun_all_enemies(2.0), 2);
        assert!(matches!(
            world.events().last().map(|e| &e.data),
            Some(GameEventData::EnemiesStunned { count: 2, .. })
        ));
    }

    #[test]
    fn test_slow_motion_scales_enemies() {
        let mut world = World::sandbox();
        let goose = world.add_object(enemy::grunt(Vec2::new(500.0, 0.0), false));
        world.registry.post_update();

        world.start_slow_motion(3.0);
        assert!(world.slow_motion_active());
        world.update(0.1, &mut NullTarget);
        let slowed = world.registry.get(goose).unwrap().position();

        // Same distance at full speed takes a quarter of the time
        let mut fast = World::sandbox();
        let twin = fast.add_object(enemy::grunt(Vec2::new(500.0, 0.0), false));
        fast.registry.post_update();
        fast.update(0.025, &mut NullTarget);
        let expected = fast.registry.get(twin).unwrap().position();

        assert!((slowed.x - expected.x).abs() < 1e-3);
        assert!((slowed.y - expected.y).abs() < 1e-3);
    }

    #[test]
    fn test_slow_motion_expires() {
        let mut world = World::sandbox();
        world.start_slow_motion(0.2);
        world.update(0.1, &mut NullTarget);
        assert!(world.slow_motion_active());
        world.update(0.1, &mut NullTarget);
        assert!(!world.slow_motion_active());
    }

    #[test]
    fn test_events_stamped_with_frame() {
        let mut world = World::sandbox();
        world.advance_clock(0.5);
        world.advance_clock(0.5);
        world.play(SoundCue::Jump);
        let events = world.take_events();
        assert_eq!(events[0].frame, 2);
        assert_eq!(world.clock(), 1.0);
        assert!(world.events().is_empty());
    }

    #[test]
    fn test_screen_advance_flag() {
        let mut world = World::sandbox();
        world.request_screen_advance();
        assert!(world.screen_advance_requested());
        assert!(world.take_screen_advance());
        assert!(!world.screen_advance_requested());
    }
}
