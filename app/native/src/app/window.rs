//! Windows and the built-in responders.

use serde::Serialize;

use crate::geometry::Rect;
use crate::responder::{InputEvent, Outcome, Responder, ResponderId};
use crate::view::ViewId;

/// Identifier of a window owned by an [`Application`](super::Application).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WindowId(pub(super) u64);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "w{}", self.0) }
}

/// A top-level window: a title, a screen frame and a root content view.
///
/// The content view's frame always starts at the window origin and matches
/// the window's size; its subviews are laid out in window-local coordinates.
#[derive(Debug, Clone)]
pub struct Window {
    pub(super) id: WindowId,
    pub(super) title: String,
    pub(super) frame: Rect,
    pub(super) visible: bool,
    pub(super) content_view: ViewId,
    pub(super) responder: ResponderId,
}

impl Window {
    #[must_use]
    pub const fn id(&self) -> WindowId { self.id }

    #[must_use]
    pub fn title(&self) -> &str { &self.title }

    /// Frame in screen coordinates.
    #[must_use]
    pub const fn frame(&self) -> Rect { self.frame }

    #[must_use]
    pub const fn is_visible(&self) -> bool { self.visible }

    /// The root of this window's view tree.
    #[must_use]
    pub const fn content_view(&self) -> ViewId { self.content_view }

    /// The window's own responder. It accepts first-responder status and
    /// forwards everything else to the application.
    #[must_use]
    pub const fn responder(&self) -> ResponderId { self.responder }
}

/// Forwards every event. Backs views created without a custom responder.
#[derive(Debug, Default)]
pub struct PassThrough;

impl Responder for PassThrough {}

/// Responder of a window.
#[derive(Debug)]
pub struct WindowResponder {
    window: WindowId,
}

impl WindowResponder {
    #[must_use]
    pub const fn new(window: WindowId) -> Self { Self { window } }
}

impl Responder for WindowResponder {
    fn accepts_first_responder(&self) -> bool { true }

    fn did_become_first_responder(&mut self) {
        tracing::debug!(window = %self.window, "window became key");
    }

    fn did_resign_first_responder(&mut self) {
        tracing::debug!(window = %self.window, "window resigned key");
    }
}

/// End of every chain. Drops whatever reaches it.
#[derive(Debug, Default)]
pub struct ApplicationResponder;

impl Responder for ApplicationResponder {
    fn key_down(&mut self, event: &mut InputEvent) -> Outcome {
        tracing::trace!(key = ?event.key, "unhandled key press");
        Outcome::Unhandled
    }
}
