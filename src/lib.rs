//! # Goosefall
//!
//! Simulation core of a side-scrolling platformer: geese, terrain, a
//! player with eight swappable abilities, and the frame loop that drives
//! them. Rendering, audio and windowing stay outside; the core hands out
//! sprite snapshots and sound cues.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        GOOSEFALL                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Value types                               │
//! │  ├── vec2.rs     - f32 2D vector                             │
//! │  ├── rect.rs     - Axis-aligned rectangle                    │
//! │  ├── timer.rs    - Delta-time countdown                      │
//! │  └── color.rs    - RGBA tint                                 │
//! │                                                              │
//! │  game/           - Simulation                                │
//! │  ├── registry.rs - Staged generational object store          │
//! │  ├── physics.rs  - Axis-separated integration                │
//! │  ├── collision.rs- Pairwise handlers (both must block)       │
//! │  ├── health.rs   - Damage and edge-triggered death           │
//! │  ├── ability.rs  - Activation / cooldown state machine       │
//! │  ├── level.rs    - Tile screens, demo and progress           │
//! │  ├── world.rs    - Explicit simulation context               │
//! │  └── tick.rs     - One frame                                 │
//! │                                                              │
//! │  render.rs       - Sprite snapshots for a renderer           │
//! │  save.rs         - Best times and ability unlocks            │
//! │  config.rs       - Physics and timing tunables               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Frame Order
//!
//! Key edges, then ability cooldowns, then every live object updates and
//! draws in insertion order, then a pending screen change is applied, then
//! staged additions and removals land. Objects created during a frame first
//! move in the next one.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod error;
pub mod game;
pub mod render;
pub mod save;

// Re-export commonly used types
pub use config::SimConfig;
pub use core::{Color, DeltaTimer, Rect, Vec2};
pub use error::{ConfigError, LevelError, SaveError};
pub use game::{tick, GameEvent, InputFrame, Key, LevelSchema, TickResult, World};
pub use render::{NullTarget, RenderTarget, SpriteView};
pub use save::{SaveState, SaveStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Width and height of one tile in pixels
pub const TILE_SIZE: f32 = 60.0;

/// Screen width in pixels
pub const SCREEN_WIDTH: f32 = 1920.0;

/// Screen height in pixels
pub const SCREEN_HEIGHT: f32 = 1080.0;

/// Tiles per screen row
pub const TILES_X: usize = 32;

/// Tile rows per screen
pub const TILES_Y: usize = 18;

/// Nominal frame rate (Hz)
pub const FRAME_RATE: u32 = 60;
