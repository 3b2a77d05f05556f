//! Axis-aligned screen-space rectangle

use crate::core::types::Vec2;

/// Half-open rectangle `[min, max)` in screen pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl ScreenRect {
    /// Create rect from min and max corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rect covering a screen of the given size, anchored at the origin
    pub fn from_size(size: Vec2) -> Self {
        Self { min: Vec2::ZERO, max: size }
    }

    /// Get center point
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Check if point is inside the rect (max edges excluded)
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x < self.max.x &&
        p.y >= self.min.y && p.y < self.max.y
    }

    /// Check if two rects share any area. Touching edges do not count.
    pub fn intersects(&self, other: &ScreenRect) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x &&
        self.min.y < other.max.y && self.max.y > other.min.y
    }

    /// Whether the rect has no area
    pub fn is_empty(&self) -> bool {
        !(self.max.x > self.min.x && self.max.y > self.min.y)
    }
}
