//! The application: views, windows and the responder chain they feed.
//!
//! [`Application`] keeps the [`ViewTree`] and the [`ResponderChain`] in step.
//! Every view is backed by one responder whose `next` link mirrors the view's
//! superview, so an event that a view ignores travels up through its ancestors,
//! then to its window's responder, then to the application responder where the
//! chain ends.

mod window;

use std::collections::HashMap;

use crate::geometry::Rect;
use crate::responder::{
    InputEvent, InputKind, Outcome, Responder, ResponderChain, ResponderError, ResponderId,
};
use crate::view::{Painter, ViewError, ViewId, ViewTree};
pub use window::{ApplicationResponder, PassThrough, Window, WindowId, WindowResponder};

/// Errors from application-level view and window operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AppError {
    #[error(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    Responder(#[from] ResponderError),

    #[error("unknown window {0}")]
    UnknownWindow(WindowId),
}

/// Owns every view, window and responder of the process.
#[derive(Debug)]
pub struct Application {
    responders: ResponderChain,
    views: ViewTree,
    windows: HashMap<WindowId, Window>,
    app_responder: ResponderId,
    hovered: Option<ViewId>,
    next_window: u64,
}

impl Default for Application {
    fn default() -> Self { Self::new() }
}

impl Application {
    /// Creates an application with only the terminal application responder.
    #[must_use]
    pub fn new() -> Self {
        let mut responders = ResponderChain::new();
        let app_responder = responders.insert_terminal(Box::new(ApplicationResponder));

        Self {
            responders,
            views: ViewTree::new(),
            windows: HashMap::new(),
            app_responder,
            hovered: None,
            next_window: 0,
        }
    }

    /// The responder every chain ends at.
    #[must_use]
    pub const fn app_responder(&self) -> ResponderId { self.app_responder }

    #[must_use]
    pub const fn views(&self) -> &ViewTree { &self.views }

    #[must_use]
    pub const fn responders(&self) -> &ResponderChain { &self.responders }

    // ========================================================================
    // Views
    // ========================================================================

    /// Creates a detached view backed by `responder`.
    ///
    /// Until the view is added to a superview its events go straight to the
    /// application responder.
    ///
    /// # Errors
    ///
    /// Propagates [`ResponderError`] from the chain.
    pub fn create_view(
        &mut self,
        frame: Rect,
        responder: Box<dyn Responder>,
    ) -> Result<ViewId, AppError> {
        let responder = self.responders.insert(responder, Some(self.app_responder))?;
        Ok(self.views.create(frame, responder))
    }

    /// Creates a detached view that forwards all input.
    ///
    /// # Errors
    ///
    /// Propagates [`ResponderError`] from the chain.
    pub fn create_plain_view(&mut self, frame: Rect) -> Result<ViewId, AppError> {
        self.create_view(frame, Box::new(PassThrough))
    }

    /// Adds `child` to `parent` and relinks the child's responder to the
    /// parent's.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::View`] for unknown views or cycles; nothing changes
    /// in that case.
    pub fn add_subview(&mut self, parent: ViewId, child: ViewId) -> Result<(), AppError> {
        self.views.add_subview(parent, child)?;

        if let (Some(child_responder), Some(parent_responder)) =
            (self.views.responder(child), self.views.responder(parent))
            && let Err(err) = self.responders.set_next(child_responder, Some(parent_responder))
        {
            self.views.remove_from_superview(child);
            self.relink_detached(child);
            return Err(err.into());
        }
        Ok(())
    }

    /// Detaches `child` from its superview. Its responder then forwards to the
    /// application responder.
    pub fn remove_from_superview(&mut self, child: ViewId) -> Option<ViewId> {
        let parent = self.views.remove_from_superview(child)?;
        self.relink_detached(child);
        Some(parent)
    }

    fn relink_detached(&mut self, view: ViewId) {
        if let Some(responder) = self.views.responder(view)
            && let Err(err) = self.responders.set_next(responder, Some(self.app_responder))
        {
            tracing::error!(%view, error = %err, "failed to relink detached view");
        }
    }

    /// Destroys `view` with its whole subtree and releases their responders.
    ///
    /// Returns the destroyed ids.
    pub fn destroy_view(&mut self, view: ViewId) -> Vec<ViewId> {
        let removed = self.views.destroy(view);
        for (id, responder) in &removed {
            self.responders.remove(*responder);
            if self.hovered == Some(*id) {
                self.hovered = None;
            }
        }
        tracing::trace!(%view, count = removed.len(), "destroyed view subtree");
        removed.into_iter().map(|(id, _)| id).collect()
    }

    pub fn set_hidden(&mut self, view: ViewId, hidden: bool) { self.views.set_hidden(view, hidden); }

    // ========================================================================
    // Windows
    // ========================================================================

    /// Creates a hidden window with an empty content view.
    ///
    /// # Errors
    ///
    /// Propagates [`ResponderError`] from the chain.
    pub fn create_window(&mut self, title: &str, frame: Rect) -> Result<WindowId, AppError> {
        let id = WindowId(self.next_window);
        self.next_window += 1;

        let responder =
            self.responders.insert(Box::new(WindowResponder::new(id)), Some(self.app_responder))?;
        let content_responder = match self.responders.insert(Box::new(PassThrough), Some(responder)) {
            Ok(content) => content,
            Err(err) => {
                self.responders.remove(responder);
                return Err(err.into());
            }
        };
        let content_view = self
            .views
            .create(Rect::new(0.0, 0.0, frame.width, frame.height), content_responder);

        self.windows.insert(
            id,
            Window {
                id,
                title: title.to_string(),
                frame,
                visible: false,
                content_view,
                responder,
            },
        );
        tracing::debug!(window = %id, title, "created window");
        Ok(id)
    }

    #[must_use]
    pub fn window(&self, id: WindowId) -> Option<&Window> { self.windows.get(&id) }

    pub fn windows(&self) -> impl Iterator<Item = &Window> { self.windows.values() }

    fn window_mut(&mut self, id: WindowId) -> Result<&mut Window, AppError> {
        self.windows.get_mut(&id).ok_or(AppError::UnknownWindow(id))
    }

    /// Moves and resizes a window. The content view follows the new size.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnknownWindow`].
    pub fn set_window_frame(&mut self, id: WindowId, frame: Rect) -> Result<(), AppError> {
        let window = self.window_mut(id)?;
        window.frame = frame;
        let content = window.content_view;
        self.views.set_frame(content, Rect::new(0.0, 0.0, frame.width, frame.height));
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`AppError::UnknownWindow`].
    pub fn set_window_title(&mut self, id: WindowId, title: &str) -> Result<(), AppError> {
        title.clone_into(&mut self.window_mut(id)?.title);
        Ok(())
    }

    /// Shows or hides a window together with its view tree. Hiding the window
    /// under the pointer sends an exit to the hovered view.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnknownWindow`].
    pub fn set_window_visible(&mut self, id: WindowId, visible: bool) -> Result<(), AppError> {
        let window = self.window_mut(id)?;
        window.visible = visible;
        let content = window.content_view;
        self.views.set_hidden(content, !visible);
        if !visible && self.hovered.is_some_and(|view| self.views.is_descendant_of(view, content)) {
            self.update_hover(None, &InputEvent::pointer(InputKind::PointerExit, 0.0, 0.0));
        }
        Ok(())
    }

    /// Destroys a window, its views and its responders.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnknownWindow`].
    pub fn close_window(&mut self, id: WindowId) -> Result<(), AppError> {
        let window = self.windows.remove(&id).ok_or(AppError::UnknownWindow(id))?;
        self.destroy_view(window.content_view);
        self.responders.remove(window.responder);
        tracing::debug!(window = %id, "closed window");
        Ok(())
    }

    // ========================================================================
    // Focus
    // ========================================================================

    /// See [`ResponderChain::make_first_responder`].
    pub fn make_first_responder(&mut self, candidate: Option<ResponderId>) -> bool {
        self.responders.make_first_responder(candidate)
    }

    #[must_use]
    pub const fn first_responder(&self) -> Option<ResponderId> { self.responders.first_responder() }

    /// Makes `id` the key window by giving its responder first-responder
    /// status. Returns false for unknown windows.
    ///
    /// A window that is already key keeps its first responder, so a view
    /// focused inside it stays focused.
    pub fn make_key_window(&mut self, id: WindowId) -> bool {
        let Some(responder) = self.windows.get(&id).map(|window| window.responder) else {
            return false;
        };
        if self.key_window() == Some(id) {
            return true;
        }
        self.make_first_responder(Some(responder))
    }

    /// The window whose chain contains the first responder.
    #[must_use]
    pub fn key_window(&self) -> Option<WindowId> {
        let chain = self.responders.chain_from(self.first_responder()?);
        self.windows
            .values()
            .find(|window| chain.contains(&window.responder))
            .map(|window| window.id)
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Routes a pointer event into `window`.
    ///
    /// `event.position` must already be window-local. The event goes to the
    /// deepest visible view under the pointer, or to the window's responder if
    /// the pointer is outside every view. Moves and drags also generate
    /// exit/enter events when the hovered view changes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnknownWindow`].
    pub fn send_pointer_event(
        &mut self,
        window: WindowId,
        event: &mut InputEvent,
    ) -> Result<Outcome, AppError> {
        let (content, fallback) = self
            .windows
            .get(&window)
            .map(|win| (win.content_view, win.responder))
            .ok_or(AppError::UnknownWindow(window))?;

        let hit = self.views.hit_test(content, event.position);
        if matches!(event.kind, InputKind::PointerMove | InputKind::PointerDrag) {
            self.update_hover(hit, event);
        }

        let target = hit.and_then(|view| self.views.responder(view)).unwrap_or(fallback);
        Ok(self.responders.dispatch(target, event))
    }

    /// Routes a keyboard event from the first responder, or to the
    /// application responder when nothing has focus.
    pub fn send_key_event(&mut self, event: &mut InputEvent) -> Outcome {
        let target = self.first_responder().unwrap_or(self.app_responder);
        self.responders.dispatch(target, event)
    }

    /// The pointer left every window; the hovered view gets an exit event.
    pub fn pointer_left(&mut self, event: &InputEvent) { self.update_hover(None, event); }

    /// The view currently under the pointer.
    #[must_use]
    pub const fn hovered_view(&self) -> Option<ViewId> { self.hovered }

    fn update_hover(&mut self, hit: Option<ViewId>, event: &InputEvent) {
        if self.hovered == hit {
            return;
        }

        if let Some(responder) = self.hovered.and_then(|view| self.views.responder(view)) {
            let mut exit = event.retarget(InputKind::PointerExit);
            self.responders.dispatch(responder, &mut exit);
        }
        if let Some(responder) = hit.and_then(|view| self.views.responder(view)) {
            let mut enter = event.retarget(InputKind::PointerEnter);
            self.responders.dispatch(responder, &mut enter);
        }
        self.hovered = hit;
    }

    /// Draws the visible part of a window's view tree.
    pub fn draw_window(&self, id: WindowId, painter: &mut dyn Painter) {
        if let Some(window) = self.windows.get(&id)
            && window.visible
        {
            self.views.draw(window.content_view, painter);
        }
    }
}
