//! Goosefall Headless Runner
//!
//! Loads a level, plays it with scripted input and logs what happens.
//!
//! ```text
//! goosefall [LEVEL.json] [--config SIM.json] [--save SAVE.json]
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use goosefall::{
    FRAME_RATE, VERSION,
    game::{tick, GameEventData, InputFrame, Key, LevelSchema, World},
    render::NullTarget,
    save::{JsonFileStore, MemoryStore, SaveStore},
    SimConfig,
};

/// Give up after this many simulated seconds.
const MAX_SECONDS: u32 = 120;

/// Play a level headlessly with scripted input.
#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Level JSON file; the built-in demo level when omitted
    level: Option<PathBuf>,
    /// Simulation tunables JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Save file to read unlocks from and record best times into
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Goosefall v{}", VERSION);

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimConfig::from_path(path).with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    };
    let schema = match &args.level {
        Some(path) => LevelSchema::from_path(path).with_context(|| format!("loading level {}", path.display()))?,
        None => LevelSchema::demo(),
    };
    let mut store: Box<dyn SaveStore> = match &args.save {
        Some(path) => Box::new(JsonFileStore::new(path.clone())),
        None => Box::new(MemoryStore::new()),
    };
    let mut save = store.load().context("loading save")?;

    let title = schema.meta.title.clone();
    let mut world = World::with_level(config, schema, &save);
    let completed = play(&mut world);

    match completed {
        Some(millis) => {
            info!("Completed {} in {:.2}s", title, millis as f64 / 1000.0);
            if save.record_completion(&title, millis) {
                store.save(&save).context("writing save")?;
            }
        }
        None => info!("Gave up on {} after {}s", title, MAX_SECONDS),
    }

    Ok(())
}

/// Confirm the default selection, then run right, jumping and throwing
/// whatever is in slot 1 at regular intervals.
fn play(world: &mut World) -> Option<u64> {
    let frame_time = 1.0 / FRAME_RATE as f32;
    let mut total_events = 0;
    let mut playing_since = None;

    for frame in 0..MAX_SECONDS * FRAME_RATE {
        let selecting = world
            .level()
            .and_then(|l| l.selector())
            .is_some_and(|s| s.is_open());
        if world.is_active() && playing_since.is_none() {
            playing_since = Some(frame);
        }

        let input = if selecting {
            InputFrame::empty().tap(Key::Return).tap(Key::Space)
        } else if let Some(start) = playing_since {
            match frame - start {
                0 => InputFrame::empty().press(Key::Right),
                t if t % 90 == 0 => InputFrame::empty().tap(Key::Num1),
                t if t % 45 == 0 => InputFrame::empty().tap(Key::Space),
                _ => InputFrame::empty(),
            }
        } else {
            InputFrame::empty()
        };

        let result = tick(world, &input, frame_time, &mut NullTarget);
        total_events += result.events.len();

        for event in &result.events {
            match &event.data {
                GameEventData::ScreenChanged { screen, demo } => {
                    info!("Frame {}: screen {} ({})", event.frame, screen, if *demo { "demo" } else { "play" });
                }
                GameEventData::SelectionConfirmed { slots } => {
                    info!("Frame {}: abilities {:?}", event.frame, slots);
                }
                GameEventData::EntityDied { tag, position, .. } => {
                    info!("Frame {}: {:?} died at {}", event.frame, tag, position);
                }
                GameEventData::PlayerRespawned { spawn, .. } => {
                    info!("Frame {}: player respawned at {}", event.frame, spawn);
                }
                GameEventData::AbilityActivated { ability } => {
                    info!("Frame {}: {} activated", event.frame, ability.info().display_name);
                }
                _ => {}
            }
        }

        if let Some(millis) = result.level_completed {
            info!("Total events: {}", total_events);
            return Some(millis);
        }
    }

    info!("Total events: {}", total_events);
    None
}
