//! Interactive move and resize grabs.
//!
//! A grab starts when the client asks for one and lasts until the pointer is
//! released, the toplevel is unmapped, or its mode changes. While it lasts,
//! pointer motion drives the geometry directly: a move offsets the origin by
//! the pointer delta, a resize moves the grabbed edges. Moves also track the
//! tiling zone under the pointer so the release can snap the toplevel.

use crate::geometry::{Point, Rect};
use crate::tiling::{self, TilingZone};
use crate::transport::ResizeEdges;

/// Integer geometry of a toplevel in screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Geometry {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self { Self { x, y, width, height } }

    #[must_use]
    pub fn to_rect(self) -> Rect {
        Rect::new(f64::from(self.x), f64::from(self.y), f64::from(self.width), f64::from(self.height))
    }
}

/// What the pointer drives during a grab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabKind {
    Move,
    Resize(ResizeEdges),
}

/// State of an ongoing grab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grab {
    pub kind: GrabKind,
    /// Pointer position when the grab started.
    pub anchor: Point,
    /// Geometry when the grab started.
    pub origin: Geometry,
    /// Zone under the pointer at the last motion tick. Always `None` for resizes.
    pub zone: TilingZone,
}

impl Grab {
    #[must_use]
    pub const fn new(kind: GrabKind, anchor: Point, origin: Geometry) -> Self {
        Self {
            kind,
            anchor,
            origin,
            zone: TilingZone::None,
        }
    }

    /// Geometry for the pointer at `pointer`, never smaller than `min`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn track(&self, pointer: Point, min: (i32, i32)) -> Geometry {
        let dx = (pointer.x - self.anchor.x).round() as i32;
        let dy = (pointer.y - self.anchor.y).round() as i32;
        let origin = self.origin;

        match self.kind {
            GrabKind::Move => Geometry {
                x: origin.x.saturating_add(dx),
                y: origin.y.saturating_add(dy),
                ..origin
            },
            GrabKind::Resize(edges) => {
                let (x, width) = resize_axis(origin.x, origin.width, dx, edges.left, edges.right, min.0);
                let (y, height) = resize_axis(origin.y, origin.height, dy, edges.top, edges.bottom, min.1);
                Geometry { x, y, width, height }
            }
        }
    }

    /// Recomputes the zone under the pointer. `threshold` is `None` when
    /// snapping is disabled.
    pub fn update_zone(&mut self, pointer: Point, screen: (f64, f64), threshold: Option<f64>) {
        self.zone = match (self.kind, threshold) {
            (GrabKind::Move, Some(threshold)) => tiling::zone_at_position_with_threshold(
                pointer.x, pointer.y, screen.0, screen.1, threshold,
            ),
            _ => TilingZone::None,
        };
    }
}

/// Applies a pointer delta to one axis. The far edge stays put when the near
/// edge is dragged, and the size never drops below `min`. Saturates at the
/// `i32` range.
fn resize_axis(start: i32, size: i32, delta: i32, near: bool, far: bool, min: i32) -> (i32, i32) {
    if near {
        let resized = size.saturating_sub(delta).max(min);
        (start.saturating_add(size).saturating_sub(resized), resized)
    } else if far {
        (start, size.saturating_add(delta).max(min))
    } else {
        (start, size)
    }
}
