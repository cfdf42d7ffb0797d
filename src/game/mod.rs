//! Game Logic Module
//!
//! All gameplay simulation code.
//!
//! ## Module Structure
//!
//! - `registry`: Staged generational object store
//! - `entity`: The entity body and its per-kind state
//! - `physics`: Velocity integration with axis-separated blocking
//! - `collision`: Overlap probes and the per-pair handler protocol
//! - `health`: Damage, death and respawn reactions
//! - `terrain`, `player`, `enemy`, `projectile`: Per-kind behaviour
//! - `ability`: Ability activation and cooldown state machine
//! - `slots`: Ability slots and the pre-play selector
//! - `level`: Level schema, screen population and level progress
//! - `world`: The simulation context passed to every behaviour
//! - `tick`: One frame of the simulation
//! - `input`: Key edges
//! - `events`: Game events and sound cues

pub mod registry;
pub mod entity;
pub mod physics;
pub mod collision;
pub mod health;
pub mod terrain;
pub mod player;
pub mod enemy;
pub mod projectile;
pub mod ability;
pub mod slots;
pub mod level;
pub mod world;
pub mod tick;
pub mod input;
pub mod events;

// Re-export key types
pub use ability::{AbilityId, AbilityManager};
pub use entity::{Entity, EntityKind, EntityTag};
pub use events::{GameEvent, GameEventData, SoundCue};
pub use input::{InputEdge, InputFrame, Key};
pub use level::LevelSchema;
pub use registry::{EntityId, ObjectRegistry};
pub use tick::{tick, TickResult};
pub use world::World;
