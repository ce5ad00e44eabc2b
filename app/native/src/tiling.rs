//! Drag-to-snap tiling.
//!
//! Two pure functions: [`zone_at_position`] maps a pointer position to the
//! screen-edge region it is in, and [`frame_for_zone`] maps that region to the
//! geometry a dropped window snaps to. Neither performs I/O; the screen size is
//! supplied by the caller from its display-geometry provider.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Default distance from a screen edge, in pixels, that counts as "at the edge".
pub const EDGE_THRESHOLD: f64 = 10.0;

/// A named screen-edge region that snaps a dropped window to a predefined frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TilingZone {
    /// Not near any edge.
    #[default]
    None,
    /// Left half of the screen.
    Left,
    /// Right half of the screen.
    Right,
    /// Top-left quarter.
    TopLeft,
    /// Top-right quarter.
    TopRight,
    /// Bottom-left quarter.
    BottomLeft,
    /// Bottom-right quarter.
    BottomRight,
    /// The whole screen.
    Maximize,
}

impl TilingZone {
    /// Returns the zone name as a static kebab-case string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Left => "left",
            Self::Right => "right",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
            Self::Maximize => "maximize",
        }
    }

    /// Returns true for the four quarter zones.
    #[must_use]
    pub const fn is_corner(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight | Self::BottomLeft | Self::BottomRight)
    }
}

impl std::fmt::Display for TilingZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

/// Returns the zone under `(x, y)` using the default [`EDGE_THRESHOLD`].
#[must_use]
pub fn zone_at_position(x: f64, y: f64, screen_width: f64, screen_height: f64) -> TilingZone {
    zone_at_position_with_threshold(x, y, screen_width, screen_height, EDGE_THRESHOLD)
}

/// Returns the zone under `(x, y)` for an explicit edge threshold.
///
/// Corners win over edges and side edges win over the top edge, so a point
/// near both the top and left edges always resolves to [`TilingZone::TopLeft`].
#[must_use]
pub fn zone_at_position_with_threshold(
    x: f64,
    y: f64,
    screen_width: f64,
    screen_height: f64,
    threshold: f64,
) -> TilingZone {
    let at_left = x < threshold;
    let at_right = x > screen_width - threshold;
    let at_top = y < threshold;
    let at_bottom = y > screen_height - threshold;

    match (at_top, at_bottom, at_left, at_right) {
        (true, _, true, _) => TilingZone::TopLeft,
        (true, _, _, true) => TilingZone::TopRight,
        (_, true, true, _) => TilingZone::BottomLeft,
        (_, true, _, true) => TilingZone::BottomRight,
        (_, _, true, _) => TilingZone::Left,
        (_, _, _, true) => TilingZone::Right,
        (true, _, _, _) => TilingZone::Maximize,
        _ => TilingZone::None,
    }
}

/// Returns the frame a window dropped in `zone` snaps to.
///
/// [`TilingZone::None`] maps to the zero rectangle.
#[must_use]
pub fn frame_for_zone(zone: TilingZone, screen_width: f64, screen_height: f64) -> Rect {
    let half_w = screen_width / 2.0;
    let half_h = screen_height / 2.0;

    match zone {
        TilingZone::None => Rect::zero(),
        TilingZone::Left => Rect::new(0.0, 0.0, half_w, screen_height),
        TilingZone::Right => Rect::new(half_w, 0.0, half_w, screen_height),
        TilingZone::TopLeft => Rect::new(0.0, 0.0, half_w, half_h),
        TilingZone::TopRight => Rect::new(half_w, 0.0, half_w, half_h),
        TilingZone::BottomLeft => Rect::new(0.0, half_h, half_w, half_h),
        TilingZone::BottomRight => Rect::new(half_w, half_h, half_w, half_h),
        TilingZone::Maximize => Rect::new(0.0, 0.0, screen_width, screen_height),
    }
}
