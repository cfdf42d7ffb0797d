//! Axis-Aligned Rectangles
//!
//! Hitboxes are stored as `Rect`s, either local to an entity's origin or
//! offset into world space.

use serde::{Serialize, Deserialize};

use super::vec2::Vec2;

/// Axis-aligned rectangle (left, top, width, height).
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Width (extends to the right)
    pub width: f32,
    /// Height (extends downwards)
    pub height: f32,
}

impl Rect {
    /// Create a rectangle from its left/top corner and size.
    #[inline]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    /// Rectangle at the origin covering `size`.
    #[inline]
    pub const fn from_size(size: Vec2) -> Self {
        Self::new(0.0, 0.0, size.x, size.y)
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Top-left corner.
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    /// Same size, moved by `offset`.
    #[inline]
    pub fn offset(&self, offset: Vec2) -> Self {
        Self::new(self.left + offset.x, self.top + offset.y, self.width, self.height)
    }

    /// Same size, top-left corner placed at `position`.
    #[inline]
    pub fn moved_to(&self, position: Vec2) -> Self {
        Self::new(position.x, position.y, self.width, self.height)
    }

    /// Grow the rectangle by `margin` on every side.
    #[inline]
    pub fn inflate(&self, margin: f32) -> Self {
        Self::new(
            self.left - margin,
            self.top - margin,
            self.width + margin * 2.0,
            self.height + margin * 2.0,
        )
    }

    /// Strict overlap test: rectangles that only share an edge do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        left < right && top < bottom
    }
}
