//! Game Events
//!
//! Everything noteworthy that happens during a frame is recorded as an event
//! and drained into the frame result. Sounds are events too: the core never
//! plays audio, it only says which cue should be heard.

use serde::{Serialize, Deserialize};

use crate::core::Vec2;
use crate::game::ability::AbilityId;
use crate::game::entity::EntityTag;
use crate::game::registry::EntityId;

/// Fire-and-forget sound cues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Footstep while running
    Step,
    /// Jump or double jump
    Jump,
    /// Bow released
    ShootArrow,
    /// Potion thrown
    Throw,
    /// Dash started
    Dash,
    /// Player took damage
    Grunt,
    /// Lonsdale roar
    LionRoar,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Something's health crossed into zero
    EntityDied {
        id: EntityId,
        tag: EntityTag,
        position: Vec2,
    },

    /// The player died and was put back at its spawn point
    PlayerRespawned {
        id: EntityId,
        spawn: Vec2,
    },

    /// An ability went active
    AbilityActivated {
        ability: AbilityId,
    },

    /// An active ability was released
    AbilityReleased {
        ability: AbilityId,
        /// Cooldown started by the release, if any
        cooldown: Option<f32>,
    },

    /// A projectile entered the world
    ProjectileFired {
        id: EntityId,
        tag: EntityTag,
    },

    /// Every enemy was stunned
    EnemiesStunned {
        count: usize,
        seconds: f32,
    },

    /// Enemies run in slow motion
    SlowMotionStarted {
        seconds: f32,
    },

    /// A new level screen is displayed
    ScreenChanged {
        screen: usize,
        demo: bool,
    },

    /// The ability selector opened
    SelectionStarted {
        forced: Option<AbilityId>,
    },

    /// Abilities were confirmed and play started
    SelectionConfirmed {
        slots: [Option<AbilityId>; 3],
    },

    /// The player walked off the last screen
    LevelCompleted {
        level: String,
        millis: u64,
    },

    /// Play a sound
    Sound(SoundCue),
}

/// A game event stamped with the frame it happened in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Frame counter when the event occurred
    pub frame: u64,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(frame: u64, data: GameEventData) -> Self {
        Self { frame, data }
    }

    /// Create a sound event.
    pub fn sound(frame: u64, cue: SoundCue) -> Self {
        Self::new(frame, GameEventData::Sound(cue))
    }

    /// Create level completed event.
    pub fn level_completed(frame: u64, level: impl Into<String>, millis: u64) -> Self {
        Self::new(
            frame,
            GameEventData::LevelCompleted {
                level: level.into(),
                millis,
            },
        )
    }

    /// Sound cue carried by this event, if it is one.
    pub fn as_sound(&self) -> Option<SoundCue> {
        match self.data {
            GameEventData::Sound(cue) => Some(cue),
            _ => None,
        }
    }
}
