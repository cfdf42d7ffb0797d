//! Frame Loop
//!
//! One bounded-delta iteration of the simulation. Everything a frame does
//! happens here, in a fixed order, against the explicit [`World`].

use tracing::trace;

use crate::game::events::GameEvent;
use crate::game::input::InputFrame;
use crate::game::level;
use crate::game::player;
use crate::game::world::World;
use crate::render::RenderTarget;

/// Result of a frame.
#[derive(Debug)]
#[derive(Default)]
pub struct TickResult {
    /// Events generated this frame
    pub events: Vec<GameEvent>,
    /// Completion time in milliseconds, if the level ended this frame
    pub level_completed: Option<u64>,
    /// Frame counter after this frame
    pub frame: u64,
}

/// Run one frame.
///
/// `delta` is the wall-clock time since the previous frame in seconds. It is
/// clamped to the configured maximum so a stall never teleports objects
/// through each other.
pub fn tick(
    world: &mut World,
    input: &InputFrame,
    delta: f32,
    target: &mut dyn RenderTarget,
) -> TickResult {
    let mut result = TickResult::default();

    // 0. Bound the step and advance the clock
    let delta = delta.clamp(0.0, world.config.max_frame_delta);
    world.advance_clock(delta);

    // 1. Level demo
    level::advance_demo(world, delta);

    // 2. Key edges: selector, then abilities, then the player
    apply_input(world, input);

    // 3. Ability cooldowns
    if let Some(manager) = world.level().and_then(|l| l.manager()) {
        manager.advance_cooldowns(world, delta);
    }

    // 4. Update and draw every live object
    world.update(delta, target);

    // 5. Screen transition requested during the update pass
    if world.take_screen_advance() {
        result.level_completed = level::next_screen(world);
    }

    // 6. Apply staged additions and removals
    world.registry.post_update();

    trace!(frame = world.frame(), objects = world.registry.len(), "frame done");

    // Collect events
    result.frame = world.frame();
    result.events = world.take_events();

    result
}

/// Route key edges, in arrival order.
fn apply_input(world: &mut World, input: &InputFrame) {
    for &edge in &input.edges {
        if !edge.is_press() && level::handle_selector_release(world, edge.key()) {
            continue;
        }

        if world.is_active() {
            if let Some(manager) = world.level().and_then(|l| l.manager()) {
                manager.handle_edge(world, edge);
            }
        }

        world.with_player(|world, id, entity| player::handle_key(world, id, entity, edge));
    }
}

// =============================================================================
// TESTS
// =============================================================================
