//! Core primitives.
//!
//! Small value types shared by every simulation module.

pub mod vec2;
pub mod rect;
pub mod timer;
pub mod color;

// Re-export core types
pub use vec2::Vec2;
pub use rect::Rect;
pub use timer::DeltaTimer;
pub use color::Color;
