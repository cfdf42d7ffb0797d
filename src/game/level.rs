//! Level Schema & Progress
//!
//! A level is a list of 32x18 tile screens. Loading one first plays a demo
//! that shows every screen with physics frozen, then returns to the first
//! screen, spawns the player and opens the ability selector. Play starts
//! once the selection is confirmed; walking off the right edge of the last
//! screen completes the level.

use std::path::Path;

use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};

use crate::core::{Color, DeltaTimer, Vec2};
use crate::error::LevelError;
use crate::game::ability::{AbilityId, AbilityManager};
use crate::game::events::GameEventData;
use crate::game::input::Key;
use crate::game::registry::EntityId;
use crate::game::slots::AbilitySelector;
use crate::game::terrain::BlockStyle;
use crate::game::world::World;
use crate::game::{enemy, player, terrain};
use crate::save::SaveState;
use crate::{TILES_X, TILES_Y, TILE_SIZE};

// =============================================================================
// SCHEMA
// =============================================================================

/// Level metadata shown by the level selector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelMeta {
    /// Display title, also the save key once lower-cased
    pub title: String,
    /// Raw file name
    #[serde(default)]
    pub filename: String,
    /// Position on the level map
    #[serde(default)]
    pub map_x: i32,
    /// Position on the level map
    #[serde(default)]
    pub map_y: i32,
    /// Tint for stone blocks, platforms and spikes
    #[serde(default = "default_foreground")]
    pub foreground: Color,
}

fn default_foreground() -> Color {
    Color::DEFAULT_FOREGROUND
}

/// One screen of tiles. Each string is a row; each character a tile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenData {
    /// Rows of tile codes, top to bottom
    pub tile_map: Vec<String>,
}

/// A line of pre-level dialogue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DialogueEntry {
    /// Who is speaking
    pub from: String,
    /// What they say
    pub text: String,
}

/// Everything needed to play a level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelSchema {
    /// Title and presentation
    pub meta: LevelMeta,
    /// Screens in play order
    pub screens: Vec<ScreenData>,
    /// Dialogue shown before the level
    #[serde(default)]
    pub dialogue: Vec<DialogueEntry>,
}

impl LevelSchema {
    /// Parse a level from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, LevelError> {
        let mut schema: LevelSchema = serde_json::from_str(json)?;
        if schema.screens.is_empty() {
            return Err(LevelError::NoScreens(schema.meta.title));
        }
        if schema.meta.filename.is_empty() {
            schema.meta.filename = schema.meta.title.to_lowercase();
        }
        Ok(schema)
    }

    /// Load a level file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Small two-screen level bundled with the crate.
    pub fn demo() -> Self {
        let mut first = blank_screen();
        ground(&mut first, 16);
        put(&mut first, 11, 10, "111");
        put(&mut first, 16, 16, "333");
        put(&mut first, 13, 2, "P");
        put(&mut first, 13, 16, "G");
        put(&mut first, 13, 26, "S");

        let mut second = blank_screen();
        ground(&mut second, 16);
        put(&mut second, 12, 12, "2");
        put(&mut second, 13, 8, "V");
        put(&mut second, 13, 23, "G");

        Self {
            meta: LevelMeta {
                title: "Pendle".to_string(),
                filename: "pendle".to_string(),
                map_x: 0,
                map_y: 0,
                foreground: Color::DEFAULT_FOREGROUND,
            },
            screens: vec![first, second],
            dialogue: vec![DialogueEntry {
                from: "Goose".to_string(),
                text: "Honk.".to_string(),
            }],
        }
    }
}

fn blank_screen() -> ScreenData {
    ScreenData {
        tile_map: vec![" ".repeat(TILES_X); TILES_Y],
    }
}

fn ground(screen: &mut ScreenData, top: usize) {
    for (y, row) in screen.tile_map.iter_mut().enumerate().skip(top) {
        let code = if y == top { "g" } else { "d" };
        *row = code.repeat(TILES_X);
    }
}

fn put(screen: &mut ScreenData, row: usize, col: usize, codes: &str) {
    if let Some(line) = screen.tile_map.get_mut(row) {
        line.replace_range(col..col + codes.len(), codes);
    }
}

/// Meaning of one tile-map character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileCode {
    /// Nothing (`' '` or `'0'`)
    Empty,
    /// Tinted stone block (`1`)
    Block,
    /// Moving platform (`2`)
    MovingPlatform,
    /// Spikes (`3`)
    Spikes,
    /// Grass block (`g`)
    Grass,
    /// Dirt block (`d`)
    Dirt,
    /// Walking goose (`G`)
    Grunt,
    /// Spitting goose (`S`)
    Spitter,
    /// Spiked goose (`V`)
    SpikedGoose,
    /// Player spawn (`P`)
    Player,
}

impl TileCode {
    /// Decode a tile character.
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            ' ' | '0' => TileCode::Empty,
            '1' => TileCode::Block,
            '2' => TileCode::MovingPlatform,
            '3' => TileCode::Spikes,
            'g' => TileCode::Grass,
            'd' => TileCode::Dirt,
            'G' => TileCode::Grunt,
            'S' => TileCode::Spitter,
            'V' => TileCode::SpikedGoose,
            'P' => TileCode::Player,
            _ => return None,
        })
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Progress through a loaded level.
#[derive(Debug)]
pub struct LevelSession {
    schema: LevelSchema,
    screen: usize,
    demo: Option<DeltaTimer>,
    selector: Option<AbilitySelector>,
    manager: Option<AbilityManager>,
    unlocked: Vec<AbilityId>,
    forced: Option<AbilityId>,
    started_at: f32,
    completed: Option<u64>,
}

impl LevelSession {
    /// The level being played.
    pub fn schema(&self) -> &LevelSchema {
        &self.schema
    }

    /// Index of the screen on display.
    pub fn screen(&self) -> usize {
        self.screen
    }

    /// Whether the demo is still running.
    pub fn in_demo(&self) -> bool {
        self.demo.is_some()
    }

    /// The ability picker, once the demo has finished.
    pub fn selector(&self) -> Option<&AbilitySelector> {
        self.selector.as_ref()
    }

    /// Key bindings for the chosen abilities, once play has started.
    pub fn manager(&self) -> Option<AbilityManager> {
        self.manager
    }

    /// Ability forced into the first slot.
    pub fn forced(&self) -> Option<AbilityId> {
        self.forced
    }

    /// Completion time in milliseconds, once the level is done.
    pub fn completed(&self) -> Option<u64> {
        self.completed
    }
}

/// Load `schema` into `world` and start the demo.
pub(crate) fn start(world: &mut World, schema: LevelSchema, save: &SaveState) {
    let forced = if save.has_completed(&schema.meta.title) {
        None
    } else {
        AbilityId::from_internal_name(&schema.meta.title)
    };
    let unlocked = save
        .unlocked_abilities()
        .into_iter()
        .filter(|ability| Some(*ability) != forced)
        .collect();

    world.set_active(false);
    display_screen(world, &schema, 0, true);

    world.level = Some(LevelSession {
        demo: Some(DeltaTimer::new(world.config.demo_first_screen)),
        schema,
        screen: 0,
        selector: None,
        manager: None,
        unlocked,
        forced,
        started_at: 0.0,
        completed: None,
    });
}

/// Step the demo: show each screen in turn, then open the selector.
pub fn advance_demo(world: &mut World, delta: f32) {
    let Some(mut session) = world.level.take() else {
        return;
    };

    if let Some(timer) = session.demo.as_mut() {
        if timer.update(delta) {
            session.screen += 1;
            if session.screen >= session.schema.screens.len() {
                session.screen = 0;
                session.demo = None;
                display_screen(world, &session.schema, 0, false);

                info!(forced = ?session.forced, unlocked = session.unlocked.len(), "demo finished, choosing abilities");
                session.selector = Some(AbilitySelector::new(&session.unlocked, session.forced));
                world.push_event(GameEventData::SelectionStarted { forced: session.forced });
            } else {
                session.demo = Some(DeltaTimer::new(world.config.demo_screen));
                display_screen(world, &session.schema, session.screen, true);
            }
        }
    }

    world.level = Some(session);
}

/// Offer a released key to the ability selector.
///
/// Returns true if the selector was open and took the key.
pub fn handle_selector_release(world: &mut World, key: Key) -> bool {
    let Some(mut session) = world.level.take() else {
        return false;
    };

    let mut consumed = false;
    if let Some(selector) = session.selector.as_mut().filter(|s| s.is_open()) {
        consumed = true;
        if let Some(slots) = selector.handle_release(key) {
            info!(?slots, "abilities confirmed, play started");
            session.manager = Some(AbilityManager::new(slots));
            session.started_at = world.clock();
            world.abilities.clear_cooldowns();
            world.set_active(true);
            world.push_event(GameEventData::SelectionConfirmed { slots });
        }
    }

    world.level = Some(session);
    consumed
}

/// Move on to the next screen, or complete the level after the last one.
///
/// Returns the completion time in milliseconds when the level is done.
pub fn next_screen(world: &mut World) -> Option<u64> {
    let mut session = world.level.take()?;
    if session.completed.is_some() {
        world.level = Some(session);
        return None;
    }

    session.screen += 1;
    let result = if session.screen >= session.schema.screens.len() {
        let millis = ((world.clock() - session.started_at).max(0.0) * 1000.0) as u64;
        info!(level = %session.schema.meta.title, millis, "level completed");
        session.completed = Some(millis);
        world.set_active(false);
        world.push_event(GameEventData::LevelCompleted {
            level: session.schema.meta.title.clone(),
            millis,
        });
        Some(millis)
    } else {
        display_screen(world, &session.schema, session.screen, false);
        None
    };

    world.level = Some(session);
    result
}

/// Replace the screen's contents with screen `index` of `schema`.
///
/// The player survives the switch: it is moved to the left edge at its
/// current height and that spot becomes its respawn point. Everything else
/// live on the old screen is staged for removal.
pub fn display_screen(world: &mut World, schema: &LevelSchema, index: usize, demo: bool) {
    let Some(screen) = schema.screens.get(index) else {
        return;
    };

    let player_id = world.player_id();
    let stale: Vec<EntityId> = world
        .registry
        .live_ids()
        .iter()
        .copied()
        .filter(|id| Some(*id) != player_id)
        .collect();

    world.with_player(|_, _, entity| {
        let position = Vec2::new(0.0, entity.position().y - 0.5);
        entity.set_position(position);
        player::set_spawn(entity, position);
    });

    let tint = schema.meta.foreground;
    let mut added = 0usize;
    for (y, row) in screen.tile_map.iter().enumerate() {
        for (x, c) in row.chars().enumerate() {
            let position = Vec2::new(x as f32 * TILE_SIZE, y as f32 * TILE_SIZE);
            let Some(code) = TileCode::from_char(c) else {
                warn!(code = %c, x, y, screen = index, "unknown tile code, skipped");
                continue;
            };

            let entity = match code {
                TileCode::Empty => continue,
                TileCode::Block => terrain::block(position, BlockStyle::Stone, tint),
                TileCode::MovingPlatform => terrain::moving_platform(position, tint),
                TileCode::Spikes => terrain::spikes(position, tint),
                TileCode::Grass => terrain::block(position, BlockStyle::Grass, tint),
                TileCode::Dirt => terrain::block(position, BlockStyle::Dirt, tint),
                TileCode::Grunt => enemy::grunt(position, true),
                TileCode::Spitter => enemy::spitter(position, true),
                TileCode::SpikedGoose => enemy::spiked_goose(position, true),
                TileCode::Player => {
                    if !demo && world.player_id().is_none() {
                        world.spawn_player(position);
                        added += 1;
                    }
                    continue;
                }
            };
            world.add_object(entity);
            added += 1;
        }
    }

    for id in stale {
        world.remove_object(id);
    }

    debug!(screen = index, added, demo, "screen populated");
    world.push_event(GameEventData::ScreenChanged { screen: index, demo });
}
