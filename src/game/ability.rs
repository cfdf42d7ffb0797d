//! Abilities
//!
//! Eight abilities, one per college. Each has a press effect, an optional
//! release effect and an optional cooldown. Activation state lives in the
//! world's [`AbilityBook`]; the three equipped abilities are driven by the
//! [`AbilityManager`] from the `1/2/3` (`J/K/L`) key edges.
//!
//! Per ability the state machine is:
//!
//! ```text
//!   Inactive ──press (no running cooldown)──▶ Active
//!   Active   ──release──▶ Inactive (+ cooldown, if the release starts one)
//! ```
//!
//! Presses while active or cooling down, and releases while inactive, are
//! ignored. Effects run with the world but never with the book borrowed, and
//! hand back the cooldown they want, so an effect cannot re-enter the
//! machine.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::{Color, DeltaTimer};
use crate::game::events::GameEventData;
use crate::game::input::InputEdge;
use crate::game::player;
use crate::game::projectile;
use crate::game::world::World;

// =============================================================================
// CATALOGUE
// =============================================================================

/// Cooldown after releasing the bow.
pub const BOWLAND_COOLDOWN: f32 = 3.0;
/// Cooldown after releasing the double jump (if it was on).
pub const FURNESS_COOLDOWN: f32 = 3.0;
/// Slow motion length.
pub const COUNTY_SLOW_MOTION: f32 = 3.0;
/// Cooldown after slow motion starts.
pub const COUNTY_COOLDOWN: f32 = 5.0;
/// Cooldown after releasing the dash key.
pub const FYLDE_COOLDOWN: f32 = 3.0;
/// Cooldown after raising the shield.
pub const GRIZEDALE_COOLDOWN: f32 = 10.0;
/// Cooldown after roaring.
pub const LONSDALE_COOLDOWN: f32 = 20.0;
/// Cooldown after releasing the potion key.
pub const PENDLE_COOLDOWN: f32 = 3.0;

/// Ability identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityId {
    /// Bow of Bowland
    Bowland,
    /// Wings of Cartmel
    Cartmel,
    /// Furness Footwear
    Furness,
    /// Calm of County
    County,
    /// Fylde Windwalk
    Fylde,
    /// Grizedale Concoction
    Grizedale,
    /// Lonsdale Roar
    Lonsdale,
    /// Pendle Potion
    Pendle,
}

/// Immutable presentation data of an ability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AbilityInfo {
    /// Name shown in the selector
    pub display_name: &'static str,
    /// Selector description
    pub description: &'static str,
    /// Save-file and level key
    pub internal_name: &'static str,
    /// Particle tint
    pub color: Color,
    /// Icon asset path
    pub icon: &'static str,
}

const CATALOGUE: [AbilityInfo; 8] = [
    AbilityInfo {
        display_name: "Bow of Bowland",
        description: "Fires a barbed projectile that deals damage to anything in its path",
        internal_name: "bowland",
        color: Color::RED,
        icon: "misc/ability_icons/bowland_icon.png",
    },
    AbilityInfo {
        display_name: "Wings of Cartmel",
        description: "When activated slows your fall speed, allowing you to glide through the air",
        internal_name: "cartmel",
        color: Color::rgb(255, 31, 131),
        icon: "misc/ability_icons/cartmel_icon.png",
    },
    AbilityInfo {
        display_name: "Furness Footwear",
        description: "Gives you the ability to jump in mid air, allowing you to reach greater heights",
        internal_name: "furness",
        color: Color::rgb(221, 0, 255),
        icon: "misc/ability_icons/furness_icon.png",
    },
    AbilityInfo {
        display_name: "Calm of County",
        description: "Slows down the speed of everything, other than yourself in the world",
        internal_name: "county",
        color: Color::rgb(255, 183, 0),
        icon: "misc/ability_icons/county_icon.png",
    },
    AbilityInfo {
        display_name: "Fylde Windwalk",
        description: "Gives you the speed of the wind, allowing you to dash small distances",
        internal_name: "fylde",
        color: Color::rgb(255, 145, 0),
        icon: "misc/ability_icons/fylde_icon.png",
    },
    AbilityInfo {
        display_name: "Grizedale Concoction",
        description: "Drink the hardy beverage of the Grizedale guild to give you an extra pick-me-up when damaged",
        internal_name: "grizedale",
        color: Color::rgb(0, 106, 255),
        icon: "misc/ability_icons/grizedale_icon.png",
    },
    AbilityInfo {
        display_name: "Lonsdale Roar",
        description: "Gives the player the roar of a lion, freezing enemies with fear",
        internal_name: "lonsdale",
        color: Color::rgb(0, 187, 255),
        icon: "misc/ability_icons/lonsdale_icon.png",
    },
    AbilityInfo {
        display_name: "Pendle Potion",
        description: "Vile poisonous projectile that explodes on impact, disabling anything it comes into contact with",
        internal_name: "pendle",
        color: Color::rgb(149, 255, 0),
        icon: "misc/ability_icons/pendle_icon.png",
    },
];

impl AbilityId {
    /// Every ability, in catalogue order.
    pub const ALL: [AbilityId; 8] = [
        AbilityId::Bowland,
        AbilityId::Cartmel,
        AbilityId::Furness,
        AbilityId::County,
        AbilityId::Fylde,
        AbilityId::Grizedale,
        AbilityId::Lonsdale,
        AbilityId::Pendle,
    ];

    /// Presentation data.
    pub fn info(self) -> &'static AbilityInfo {
        &CATALOGUE[self as usize]
    }

    /// Save-file and level key (e.g. `"bowland"`).
    pub fn internal_name(self) -> &'static str {
        self.info().internal_name
    }

    /// Particle tint.
    pub fn color(self) -> Color {
        self.info().color
    }

    /// Look up an ability by internal name, case-insensitively.
    pub fn from_internal_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.internal_name().eq_ignore_ascii_case(name))
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Mutable per-ability state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AbilityState {
    /// Cooldown started by the last use, if any
    pub cooldown: Option<DeltaTimer>,
    /// Key currently held with the ability engaged
    pub active: bool,
}

impl AbilityState {
    /// No cooldown, or the cooldown has run out.
    pub fn is_ready(&self) -> bool {
        self.cooldown.map_or(true, |t| t.is_complete())
    }

    /// Seconds of cooldown left.
    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown.map_or(0.0, |t| t.remaining())
    }
}

/// Activation state of every ability for one world.
#[derive(Clone, Debug, Default)]
pub struct AbilityBook {
    states: [AbilityState; 8],
}

impl AbilityBook {
    /// All abilities inactive and ready.
    pub fn new() -> Self {
        Self::default()
    }

    /// State of one ability.
    pub fn state(&self, ability: AbilityId) -> &AbilityState {
        &self.states[ability as usize]
    }

    fn state_mut(&mut self, ability: AbilityId) -> &mut AbilityState {
        &mut self.states[ability as usize]
    }

    /// Whether the ability is engaged.
    pub fn is_active(&self, ability: AbilityId) -> bool {
        self.state(ability).active
    }

    /// Whether the ability may be pressed.
    pub fn is_ready(&self, ability: AbilityId) -> bool {
        self.state(ability).is_ready()
    }

    /// Advance the cooldowns of the given abilities.
    pub fn advance<I>(&mut self, abilities: I, delta: f32)
    where
        I: IntoIterator<Item = AbilityId>,
    {
        for ability in abilities {
            if let Some(timer) = &mut self.state_mut(ability).cooldown {
                timer.update(delta);
            }
        }
    }

    /// Drop every cooldown (a new selection starts fresh).
    pub fn clear_cooldowns(&mut self) {
        for state in &mut self.states {
            state.cooldown = None;
        }
    }
}

// =============================================================================
// TRANSITIONS
// =============================================================================

/// Rising edge on an ability key. Returns whether the ability activated.
pub fn press(world: &mut World, ability: AbilityId) -> bool {
    {
        let state = world.abilities.state_mut(ability);
        if !state.is_ready() || state.active {
            return false;
        }
        state.active = true;
    }

    if let Some(cooldown) = on_press(world, ability) {
        world.abilities.state_mut(ability).cooldown = Some(DeltaTimer::new(cooldown));
    }

    if let Some(anchor) = world.player_id().and_then(|id| world.registry.get(id)).map(|p| p.position()) {
        world.add_object(projectile::ability_effect(anchor, ability.color()));
    }

    debug!(?ability, "ability activated");
    world.push_event(GameEventData::AbilityActivated { ability });
    true
}

/// Falling edge on an ability key. Returns whether an active ability was
/// released.
pub fn release(world: &mut World, ability: AbilityId) -> bool {
    {
        let state = world.abilities.state_mut(ability);
        if !state.active {
            return false;
        }
        state.active = false;
    }

    let cooldown = on_release(world, ability);
    if let Some(seconds) = cooldown {
        world.abilities.state_mut(ability).cooldown = Some(DeltaTimer::new(seconds));
    }

    debug!(?ability, ?cooldown, "ability released");
    world.push_event(GameEventData::AbilityReleased { ability, cooldown });
    true
}

fn on_press(world: &mut World, ability: AbilityId) -> Option<f32> {
    match ability {
        AbilityId::Bowland => {
            world.with_player(|_, _, p| player::start_drawing_bow(p));
            None
        }
        AbilityId::Cartmel => {
            world.with_player(|_, _, p| player::set_gliding(p, true));
            None
        }
        AbilityId::Furness => {
            world.with_player(|_, _, p| player::set_double_jumping(p, true));
            None
        }
        AbilityId::County => {
            world.start_slow_motion(COUNTY_SLOW_MOTION);
            Some(COUNTY_COOLDOWN)
        }
        AbilityId::Fylde => {
            world.with_player(|w, _, p| player::dash(w, p));
            None
        }
        AbilityId::Grizedale => {
            world.with_player(|_, _, p| player::use_shield(p));
            Some(GRIZEDALE_COOLDOWN)
        }
        AbilityId::Lonsdale => {
            world.with_player(|w, _, p| player::roar(w, p));
            Some(LONSDALE_COOLDOWN)
        }
        AbilityId::Pendle => {
            world.with_player(|w, _, p| player::throw_potion(w, p));
            None
        }
    }
}

fn on_release(world: &mut World, ability: AbilityId) -> Option<f32> {
    match ability {
        AbilityId::Bowland => {
            world.with_player(|w, _, p| player::stop_drawing_bow(w, p));
            Some(BOWLAND_COOLDOWN)
        }
        AbilityId::Cartmel => {
            world.with_player(|_, _, p| player::set_gliding(p, false));
            None
        }
        AbilityId::Furness => {
            let was_on = world
                .with_player(|_, _, p| {
                    let on = player::is_double_jumping(p);
                    player::set_double_jumping(p, false);
                    on
                })
                .unwrap_or(false);
            was_on.then_some(FURNESS_COOLDOWN)
        }
        AbilityId::Fylde => Some(FYLDE_COOLDOWN),
        AbilityId::Pendle => Some(PENDLE_COOLDOWN),
        AbilityId::County | AbilityId::Grizedale | AbilityId::Lonsdale => None,
    }
}

// =============================================================================
// MANAGER
// =============================================================================

/// Routes ability key edges to the three equipped abilities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AbilityManager {
    /// Equipped abilities, by key slot
    pub slots: [Option<AbilityId>; 3],
}

impl AbilityManager {
    /// Manager for the confirmed selection.
    pub fn new(slots: [Option<AbilityId>; 3]) -> Self {
        Self { slots }
    }

    /// Ability bound to a key slot.
    pub fn ability_in(&self, slot: usize) -> Option<AbilityId> {
        self.slots.get(slot).copied().flatten()
    }

    /// Feed a key edge. Returns whether an ability changed state.
    pub fn handle_edge(&self, world: &mut World, edge: InputEdge) -> bool {
        let Some(ability) = edge.key().ability_slot().and_then(|slot| self.ability_in(slot)) else {
            return false;
        };
        if edge.is_press() {
            press(world, ability)
        } else {
            release(world, ability)
        }
    }

    /// Advance the cooldowns of the equipped abilities.
    pub fn advance_cooldowns(&self, world: &mut World, delta: f32) {
        world.abilities.advance(self.slots.iter().flatten().copied(), delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Vec2;
    use crate::game::entity::EntityTag;
    use crate::game::input::Key;
    use crate::game::enemy;

    fn world_with_player() -> World {
        let mut world = World::sandbox();
        world.spawn_player(Vec2::new(100.0, 100.0));
        world.registry.post_update();
        world
    }

    #[test]
    fn test_internal_names_round_trip() {
        for ability in AbilityId::ALL {
            assert_eq!(AbilityId::from_internal_name(ability.internal_name()), Some(ability));
        }
        assert_eq!(AbilityId::from_internal_name("Pendle"), Some(AbilityId::Pendle));
        assert_eq!(AbilityId::from_internal_name("morecambe"), None);
        assert_eq!(serde_json::to_string(&AbilityId::Fylde).unwrap(), "\"fylde\"");
    }

    #[test]
    fn test_cooldown_gates_reactivation() {
        let mut world = world_with_player();
        let manager = AbilityManager::new([Some(AbilityId::Bowland), None, None]);

        // t = 0: fire and release
        assert!(manager.handle_edge(&mut world, InputEdge::Pressed(Key::Num1)));
        assert!(manager.handle_edge(&mut world, InputEdge::Released(Key::Num1)));

        manager.advance_cooldowns(&mut world, 0.1);
        assert!(!manager.handle_edge(&mut world, InputEdge::Pressed(Key::J)));
        manager.handle_edge(&mut world, InputEdge::Released(Key::J));

        manager.advance_cooldowns(&mut world, 0.9);
        assert!(!manager.handle_edge(&mut world, InputEdge::Pressed(Key::J)));
        manager.handle_edge(&mut world, InputEdge::Released(Key::J));

        manager.advance_cooldowns(&mut world, 2.1);
        assert!(manager.handle_edge(&mut world, InputEdge::Pressed(Key::J)));
    }

    #[test]
    fn test_press_while_active_is_noop() {
        let mut world = world_with_player();
        assert!(press(&mut world, AbilityId::Cartmel));
        assert!(!press(&mut world, AbilityId::Cartmel));
        assert!(world.abilities.is_active(AbilityId::Cartmel));

        world.registry.post_update();
        assert_eq!(world.registry.count_of(EntityTag::AbilityEffect), 1);
    }

    #[test]
    fn test_release_when_inactive_is_noop() {
        let mut world = world_with_player();
        assert!(!release(&mut world, AbilityId::Pendle));
        assert!(world.abilities.is_ready(AbilityId::Pendle));
        assert!(world.events().is_empty());
    }

    #[test]
    fn test_press_cooldown_does_not_trap_ability_active() {
        let mut world = world_with_player();
        assert!(press(&mut world, AbilityId::County));
        assert!(!world.abilities.is_ready(AbilityId::County));
        assert!(world.slow_motion_active());

        assert!(release(&mut world, AbilityId::County));
        assert!(!world.abilities.is_active(AbilityId::County));

        world.abilities.advance([AbilityId::County], COUNTY_COOLDOWN);
        assert!(press(&mut world, AbilityId::County));
    }

    #[test]
    fn test_furness_cooldown_only_if_it_was_on() {
        let mut world = world_with_player();
        // No jump yet: the toggle is refused, so release starts no cooldown
        press(&mut world, AbilityId::Furness);
        release(&mut world, AbilityId::Furness);
        assert!(world.abilities.is_ready(AbilityId::Furness));
        assert!(world.events().iter().any(|e| e.data
            == GameEventData::AbilityReleased { ability: AbilityId::Furness, cooldown: None }));
    }

    #[test]
    fn test_lonsdale_stuns_and_sets_long_cooldown() {
        let mut world = world_with_player();
        world.add_object(enemy::grunt(Vec2::new(600.0, 100.0), true));
        world.add_object(enemy::spitter(Vec2::new(900.0, 100.0), true));
        world.registry.post_update();

        assert!(press(&mut world, AbilityId::Lonsdale));
        assert!(world.events().iter().any(|e| e.data
            == GameEventData::EnemiesStunned { count: 2, seconds: player::ROAR_STUN }));
        let remaining = world.abilities.state(AbilityId::Lonsdale).cooldown_remaining();
        assert!((remaining - LONSDALE_COOLDOWN).abs() < 1e-4);
    }

    #[test]
    fn test_effect_tinted_with_ability_colour() {
        let mut world = world_with_player();
        press(&mut world, AbilityId::Grizedale);
        let fx = world
            .registry
            .pending_additions()
            .iter()
            .copied()
            .find(|id| world.registry.tag_of(*id) == Some(EntityTag::AbilityEffect))
            .unwrap();
        assert_eq!(world.registry.get(fx).unwrap().tint, AbilityId::Grizedale.color());
    }

    #[test]
    fn test_unbound_slot_ignored() {
        let mut world = world_with_player();
        let manager = AbilityManager::new([None, Some(AbilityId::Fylde), None]);
        assert!(!manager.handle_edge(&mut world, InputEdge::Pressed(Key::Num1)));
        assert!(!manager.handle_edge(&mut world, InputEdge::Pressed(Key::Space)));
        assert!(manager.handle_edge(&mut world, InputEdge::Pressed(Key::K)));
    }
}
