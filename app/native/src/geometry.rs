//! Geometry primitives shared by the view tree, toplevels and the tiling engine.
//!
//! All coordinates are screen (or superview) coordinates with the origin in the
//! top-left corner and the y-axis pointing down.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A point in screen or view coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }

    /// Returns this point shifted by the given offsets.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self { Self::new(self.x + dx, self.y + dy) }
}

/// A rectangle with position and size.
///
/// The zero rectangle is the canonical "no geometry" sentinel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Create a zero-sized rectangle at origin.
    #[must_use]
    pub const fn zero() -> Self { Self::new(0.0, 0.0, 0.0, 0.0) }

    /// Returns true for the zero rectangle.
    #[must_use]
    pub fn is_zero(&self) -> bool { *self == Self::zero() }

    /// The top-left corner.
    #[must_use]
    pub const fn origin(&self) -> Point { Point::new(self.x, self.y) }

    /// Check if this rectangle contains a point.
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    /// Check if this rectangle intersects with another.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Returns this rectangle moved by the given offsets.
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Snaps the rectangle to whole pixels.
    ///
    /// Edges are rounded rather than sizes, so rectangles that share an edge keep
    /// sharing it after rounding. Returns `(x, y, width, height)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_pixels(&self) -> (i32, i32, i32, i32) {
        let left = self.x.round() as i32;
        let top = self.y.round() as i32;
        let right = (self.x + self.width).round() as i32;
        let bottom = (self.y + self.height).round() as i32;
        (left, top, right.saturating_sub(left), bottom.saturating_sub(top))
    }
}
