//! Input events as delivered by the input boundary.
//!
//! The responder chain only reads and sets the consumed flag and the position;
//! the rest of the payload is for the responders themselves.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Kinds of input the responder chain routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    PointerDown,
    PointerUp,
    PointerMove,
    PointerDrag,
    PointerEnter,
    PointerExit,
    Scroll,
    KeyDown,
    KeyUp,
}

impl InputKind {
    /// Returns true for events that carry a meaningful pointer position.
    #[must_use]
    pub const fn is_pointer(self) -> bool { !self.is_key() }

    /// Returns true for keyboard events.
    #[must_use]
    pub const fn is_key(self) -> bool { matches!(self, Self::KeyDown | Self::KeyUp) }
}

/// Modifier key state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Whether any shift key is pressed.
    pub shift: bool,
    /// Whether any control key is pressed.
    pub control: bool,
    /// Whether any alt/option key is pressed.
    pub alt: bool,
    /// Whether any logo/command key is pressed.
    pub logo: bool,
}

/// Key payload of a keyboard event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPayload {
    /// Transport-defined key code.
    pub code: u32,
    #[serde(default)]
    pub modifiers: Modifiers,
}

/// An input event travelling along the responder chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub kind: InputKind,
    /// Pointer position. Screen coordinates at the input boundary; window-local
    /// once routed into a window.
    #[serde(default)]
    pub position: Point,
    /// Scroll delta for [`InputKind::Scroll`].
    #[serde(default)]
    pub scroll: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyPayload>,
    #[serde(default)]
    consumed: bool,
}

impl InputEvent {
    /// Creates a pointer event at the given position.
    #[must_use]
    pub fn pointer(kind: InputKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            position: Point::new(x, y),
            scroll: Point::default(),
            key: None,
            consumed: false,
        }
    }

    /// Creates a scroll event.
    #[must_use]
    pub fn scroll(x: f64, y: f64, dx: f64, dy: f64) -> Self {
        Self {
            scroll: Point::new(dx, dy),
            ..Self::pointer(InputKind::Scroll, x, y)
        }
    }

    /// Creates a keyboard event.
    #[must_use]
    pub fn key(kind: InputKind, code: u32, modifiers: Modifiers) -> Self {
        Self {
            kind,
            position: Point::default(),
            scroll: Point::default(),
            key: Some(KeyPayload { code, modifiers }),
            consumed: false,
        }
    }

    /// Returns a copy of this event retargeted to `kind`, not yet consumed.
    #[must_use]
    pub fn retarget(&self, kind: InputKind) -> Self {
        Self {
            kind,
            consumed: false,
            ..self.clone()
        }
    }

    /// Whether a responder has consumed this event.
    #[must_use]
    pub const fn is_consumed(&self) -> bool { self.consumed }

    /// Marks the event as consumed, stopping further propagation.
    pub const fn consume(&mut self) { self.consumed = true; }
}
