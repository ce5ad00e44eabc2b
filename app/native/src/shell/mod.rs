//! The window manager.
//!
//! [`WindowManager`] is the single context that ties the other modules
//! together. It owns the [`Application`], every [`Toplevel`], the stacking
//! order, the scene and the display, and turns transport callbacks and raw
//! input into toplevel transitions, focus changes and notifications.
//!
//! It is not thread-safe on purpose: every call is expected to come from a
//! task running on the run loop.

mod notify;

use std::collections::HashMap;

pub use notify::{NotificationCenter, Observer, ObserverId, ShellEvent};
use serde::Serialize;

use crate::app::{AppError, Application};
use crate::config::{PerchConfig, TilingConfig, WindowsConfig};
use crate::geometry::{Point, Rect};
use crate::responder::{InputEvent, InputKind, Outcome};
use crate::scene::Scene;
use crate::tiling::TilingZone;
use crate::toplevel::{Geometry, Lifecycle, Toplevel, ToplevelError, WindowMode};
use crate::transport::{DisplayGeometry, ResizeEdges, SurfaceHandle, TransportEvent};

/// Errors from window-manager operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ShellError {
    #[error("unknown surface {0}")]
    UnknownSurface(SurfaceHandle),

    #[error("surface {0} already has a toplevel")]
    DuplicateSurface(SurfaceHandle),

    #[error(transparent)]
    Toplevel(#[from] ToplevelError),

    #[error(transparent)]
    App(#[from] AppError),
}

/// Serializable view of one toplevel, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToplevelSnapshot {
    pub surface: SurfaceHandle,
    pub title: String,
    pub lifecycle: Lifecycle,
    pub mode: WindowMode,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub focused: bool,
}

/// Owns and coordinates all window-manager state.
pub struct WindowManager {
    app: Application,
    toplevels: HashMap<SurfaceHandle, Toplevel>,
    /// Bottom to top.
    stacking: Vec<SurfaceHandle>,
    focused: Option<SurfaceHandle>,
    grabbed: Option<SurfaceHandle>,
    pointer: Point,
    scene: Box<dyn Scene>,
    display: Box<dyn DisplayGeometry>,
    notifications: NotificationCenter,
    tiling: TilingConfig,
    windows: WindowsConfig,
}

impl WindowManager {
    #[must_use]
    pub fn new(
        config: &PerchConfig,
        scene: Box<dyn Scene>,
        display: Box<dyn DisplayGeometry>,
    ) -> Self {
        Self {
            app: Application::new(),
            toplevels: HashMap::new(),
            stacking: Vec::new(),
            focused: None,
            grabbed: None,
            pointer: Point::default(),
            scene,
            display,
            notifications: NotificationCenter::new(),
            tiling: config.tiling,
            windows: config.windows,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub const fn application(&self) -> &Application { &self.app }

    pub const fn application_mut(&mut self) -> &mut Application { &mut self.app }

    pub const fn notifications_mut(&mut self) -> &mut NotificationCenter { &mut self.notifications }

    #[must_use]
    pub fn toplevel(&self, surface: SurfaceHandle) -> Option<&Toplevel> { self.toplevels.get(&surface) }

    /// Toplevels from bottom to top.
    pub fn toplevels(&self) -> impl Iterator<Item = &Toplevel> {
        self.stacking.iter().filter_map(|surface| self.toplevels.get(surface))
    }

    /// Surfaces from bottom to top.
    #[must_use]
    pub fn stacking(&self) -> &[SurfaceHandle] { &self.stacking }

    #[must_use]
    pub const fn focused(&self) -> Option<SurfaceHandle> { self.focused }

    /// The toplevel with a running grab, if any.
    #[must_use]
    pub const fn grabbed(&self) -> Option<SurfaceHandle> { self.grabbed }

    /// Last known pointer position in screen coordinates.
    #[must_use]
    pub const fn pointer(&self) -> Point { self.pointer }

    #[must_use]
    pub fn screen(&self) -> Rect {
        let (width, height) = self.display.screen_size();
        Rect::new(0.0, 0.0, width, height)
    }

    /// Snapshot of every toplevel from bottom to top.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ToplevelSnapshot> {
        self.toplevels()
            .map(|toplevel| {
                let Geometry { x, y, width, height } = toplevel.geometry();
                ToplevelSnapshot {
                    surface: toplevel.surface(),
                    title: toplevel.title().to_string(),
                    lifecycle: toplevel.lifecycle(),
                    mode: toplevel.mode(),
                    x,
                    y,
                    width,
                    height,
                    focused: self.focused == Some(toplevel.surface()),
                }
            })
            .collect()
    }

    /// The topmost visible toplevel containing `point`.
    #[must_use]
    pub fn toplevel_at(&self, point: Point) -> Option<SurfaceHandle> {
        self.stacking.iter().rev().copied().find(|surface| {
            self.toplevels
                .get(surface)
                .is_some_and(|toplevel| toplevel.is_visible() && toplevel.frame().contains_point(point))
        })
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Applies one transport callback.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::UnknownSurface`] for surfaces without a toplevel
    /// (including destroyed ones), [`ShellError::DuplicateSurface`] for a second
    /// `NewToplevel` with the same handle, and the toplevel's own errors.
    pub fn handle_transport(&mut self, event: TransportEvent) -> Result<(), ShellError> {
        tracing::debug!(event = event.name(), surface = %event.surface(), "transport event");

        match event {
            TransportEvent::NewToplevel { surface, title, width, height } => {
                self.create_toplevel(surface, &title, width, height)
            }
            TransportEvent::Map { surface } => self.map(surface),
            TransportEvent::Unmap { surface } => self.unmap(surface),
            TransportEvent::Destroy { surface } => self.destroy(surface),
            TransportEvent::RequestMove { surface } => self.begin_move(surface),
            TransportEvent::RequestResize { surface, edges } => self.begin_resize(surface, edges),
            TransportEvent::RequestMaximize { surface, enabled } => {
                let screen = self.screen();
                self.change_mode(surface, |toplevel, scene| toplevel.set_maximized(enabled, screen, scene))
            }
            TransportEvent::RequestMinimize { surface, enabled } => {
                self.change_mode(surface, |toplevel, scene| toplevel.set_minimized(enabled, scene))
            }
            TransportEvent::RequestFullscreen { surface, enabled } => {
                let screen = self.screen();
                self.change_mode(surface, |toplevel, scene| toplevel.set_fullscreen(enabled, screen, scene))
            }
            TransportEvent::SetTitle { surface, title } => self.set_title(surface, &title),
        }
    }

    fn toplevel_mut(&mut self, surface: SurfaceHandle) -> Result<&mut Toplevel, ShellError> {
        self.toplevels.get_mut(&surface).ok_or(ShellError::UnknownSurface(surface))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn create_toplevel(
        &mut self,
        surface: SurfaceHandle,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<(), ShellError> {
        if self.toplevels.contains_key(&surface) {
            tracing::warn!(%surface, "duplicate toplevel");
            return Err(ShellError::DuplicateSurface(surface));
        }

        let windows = self.windows;
        let pick = |requested: u32, default: u32, min: u32| {
            let size = if requested == 0 { default } else { requested };
            i32::try_from(size.max(min)).unwrap_or(i32::MAX)
        };
        let width = pick(width, windows.default_width, windows.min_width);
        let height = pick(height, windows.default_height, windows.min_height);
        let min_size = (
            i32::try_from(windows.min_width).unwrap_or(i32::MAX),
            i32::try_from(windows.min_height).unwrap_or(i32::MAX),
        );

        let (x, y) = if windows.center_new_windows {
            let (screen_width, screen_height) = self.display.screen_size();
            (
                (screen_width.round() as i32).saturating_sub(width) / 2,
                (screen_height.round() as i32).saturating_sub(height) / 2,
            )
        } else {
            (0, 0)
        };

        let geometry = Geometry::new(x, y, width, height);
        let window = self.app.create_window(title, geometry.to_rect())?;
        let toplevel = Toplevel::new(surface, window, title, geometry, min_size);

        self.toplevels.insert(surface, toplevel);
        self.stacking.push(surface);
        tracing::info!(%surface, title, x, y, width, height, "toplevel created");
        self.notify(ShellEvent::ToplevelCreated {
            surface,
            title: title.to_string(),
        });
        Ok(())
    }

    fn map(&mut self, surface: SurfaceHandle) -> Result<(), ShellError> {
        let toplevel = self.toplevels.get_mut(&surface).ok_or(ShellError::UnknownSurface(surface))?;
        let mode = toplevel.mode();
        toplevel.map(self.scene.as_mut())?;

        self.raise(surface);
        self.sync_window(surface, mode)?;
        self.notify(ShellEvent::ToplevelMapped { surface });
        self.focus(surface)?;
        Ok(())
    }

    fn unmap(&mut self, surface: SurfaceHandle) -> Result<(), ShellError> {
        let toplevel = self.toplevels.get_mut(&surface).ok_or(ShellError::UnknownSurface(surface))?;
        let was_mapped = toplevel.is_mapped();
        let mode = toplevel.mode();
        toplevel.unmap(self.scene.as_mut())?;

        if was_mapped {
            self.notify(ShellEvent::ToplevelUnmapped { surface });
        }
        self.sync_window(surface, mode)
    }

    fn destroy(&mut self, surface: SurfaceHandle) -> Result<(), ShellError> {
        let mut toplevel = self.toplevels.remove(&surface).ok_or(ShellError::UnknownSurface(surface))?;
        toplevel.destroy(self.scene.as_mut())?;

        self.stacking.retain(|other| *other != surface);
        if self.grabbed == Some(surface) {
            self.grabbed = None;
        }
        self.app.close_window(toplevel.window())?;
        tracing::info!(%surface, "toplevel destroyed");
        self.notify(ShellEvent::ToplevelDestroyed { surface });

        if self.focused == Some(surface) {
            self.focus_next();
        }
        Ok(())
    }

    fn begin_move(&mut self, surface: SurfaceHandle) -> Result<(), ShellError> {
        let pointer = self.pointer;
        let toplevel = self.toplevels.get_mut(&surface).ok_or(ShellError::UnknownSurface(surface))?;
        let mode = toplevel.mode();
        if toplevel.begin_move(pointer, self.scene.as_mut())? {
            self.grabbed = Some(surface);
        }
        self.sync_window(surface, mode)
    }

    fn begin_resize(&mut self, surface: SurfaceHandle, edges: ResizeEdges) -> Result<(), ShellError> {
        let pointer = self.pointer;
        if self.toplevel_mut(surface)?.begin_resize(edges, pointer)? {
            self.grabbed = Some(surface);
        }
        Ok(())
    }

    fn change_mode<F>(&mut self, surface: SurfaceHandle, change: F) -> Result<(), ShellError>
    where
        F: FnOnce(&mut Toplevel, &mut dyn Scene) -> Result<bool, ToplevelError>,
    {
        let toplevel = self.toplevels.get_mut(&surface).ok_or(ShellError::UnknownSurface(surface))?;
        let mode = toplevel.mode();
        change(toplevel, self.scene.as_mut())?;
        self.sync_window(surface, mode)
    }

    fn set_title(&mut self, surface: SurfaceHandle, title: &str) -> Result<(), ShellError> {
        let toplevel = self.toplevel_mut(surface)?;
        toplevel.set_title(title)?;
        let window = toplevel.window();
        self.app.set_window_title(window, title)?;
        self.notify(ShellEvent::TitleChanged {
            surface,
            title: title.to_string(),
        });
        Ok(())
    }

    /// Brings the window, grab and focus bookkeeping in line with the toplevel
    /// after a transition. `previous_mode` is the mode before it.
    fn sync_window(&mut self, surface: SurfaceHandle, previous_mode: WindowMode) -> Result<(), ShellError> {
        let toplevel = self.toplevels.get(&surface).ok_or(ShellError::UnknownSurface(surface))?;
        let (window, frame, visible, mode) =
            (toplevel.window(), toplevel.frame(), toplevel.is_visible(), toplevel.mode());
        let (has_grab, can_focus) = (toplevel.grab().is_some(), toplevel.can_focus());

        self.app.set_window_frame(window, frame)?;
        self.app.set_window_visible(window, visible)?;

        if self.grabbed == Some(surface) && !has_grab {
            self.grabbed = None;
        }
        if mode != previous_mode {
            self.notify(ShellEvent::ModeChanged { surface, mode });
        }
        if self.focused == Some(surface) && !can_focus {
            self.focus_next();
        }
        Ok(())
    }

    // ========================================================================
    // Stacking and focus
    // ========================================================================

    /// Moves `surface` to the top of the stacking order.
    pub fn raise(&mut self, surface: SurfaceHandle) {
        let Some(toplevel) = self.toplevels.get(&surface) else { return };
        self.stacking.retain(|other| *other != surface);
        self.stacking.push(surface);
        if let Some(node) = toplevel.scene_node() {
            self.scene.raise(node);
        }
    }

    /// Gives keyboard focus to `surface`. Returns false if it cannot take it.
    ///
    /// # Errors
    ///
    /// [`ShellError::UnknownSurface`].
    pub fn focus(&mut self, surface: SurfaceHandle) -> Result<bool, ShellError> {
        let toplevel = self.toplevels.get(&surface).ok_or(ShellError::UnknownSurface(surface))?;
        let focused = toplevel.focus(&mut self.app)?;
        if focused && self.focused != Some(surface) {
            self.focused = Some(surface);
            tracing::debug!(%surface, "focus changed");
            self.notify(ShellEvent::FocusChanged { surface: Some(surface) });
        }
        Ok(focused)
    }

    /// Focuses the topmost focusable toplevel, or clears focus.
    pub fn focus_next(&mut self) {
        let next = self
            .stacking
            .iter()
            .rev()
            .copied()
            .find(|surface| self.toplevels.get(surface).is_some_and(Toplevel::can_focus));

        if let Some(surface) = next
            && let Ok(true) = self.focus(surface)
        {
            return;
        }

        self.app.make_first_responder(None);
        if self.focused.take().is_some() {
            tracing::debug!("focus cleared");
            self.notify(ShellEvent::FocusChanged { surface: None });
        }
    }

    fn notify(&mut self, event: ShellEvent) { self.notifications.post(&event); }

    // ========================================================================
    // Input
    // ========================================================================

    /// Routes one input event.
    ///
    /// Keys go to the first responder. While a grab runs, pointer events drive
    /// it and are consumed. Otherwise a press raises and focuses the toplevel
    /// under the pointer, and every pointer event is delivered to that
    /// toplevel's window in window-local coordinates.
    ///
    /// # Errors
    ///
    /// Propagates toplevel and application errors.
    pub fn handle_input(&mut self, mut event: InputEvent) -> Result<Outcome, ShellError> {
        if event.kind.is_key() {
            return Ok(self.app.send_key_event(&mut event));
        }

        self.pointer = event.position;
        if let Some(surface) = self.grabbed {
            return self.drive_grab(surface, &event);
        }

        let Some(surface) = self.toplevel_at(event.position) else {
            self.app.pointer_left(&event);
            return Ok(Outcome::Unhandled);
        };

        if event.kind == InputKind::PointerDown {
            self.raise(surface);
            self.focus(surface)?;
        }

        let toplevel = self.toplevels.get(&surface).ok_or(ShellError::UnknownSurface(surface))?;
        let (window, frame) = (toplevel.window(), toplevel.frame());
        event.position = event.position.offset(-frame.x, -frame.y);
        Ok(self.app.send_pointer_event(window, &mut event)?)
    }

    fn drive_grab(&mut self, surface: SurfaceHandle, event: &InputEvent) -> Result<Outcome, ShellError> {
        let screen = self.display.screen_size();
        let threshold = self.tiling.snap_threshold();
        let Some(toplevel) = self.toplevels.get_mut(&surface) else {
            self.grabbed = None;
            return Err(ShellError::UnknownSurface(surface));
        };
        let mode = toplevel.mode();

        match event.kind {
            InputKind::PointerMove | InputKind::PointerDrag => {
                toplevel.pointer_motion(event.position, screen, threshold, self.scene.as_mut())?;
            }
            InputKind::PointerUp => {
                let zone = toplevel.pointer_release(screen, self.scene.as_mut())?;
                self.grabbed = None;
                if zone != TilingZone::None {
                    tracing::info!(%surface, %zone, "toplevel snapped");
                    self.notify(ShellEvent::Snapped { surface, zone });
                }
            }
            _ => return Ok(Outcome::Handled),
        }

        self.sync_window(surface, mode)?;
        Ok(Outcome::Handled)
    }
}

impl std::fmt::Debug for WindowManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowManager")
            .field("toplevels", &self.toplevels.len())
            .field("stacking", &self.stacking)
            .field("focused", &self.focused)
            .field("grabbed", &self.grabbed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::responder::{Modifiers, Responder};
    use crate::scene::HeadlessScene;
    use crate::transport::FixedDisplay;

    struct Fixture {
        wm: WindowManager,
        scene: HeadlessScene,
        events: Arc<Mutex<Vec<ShellEvent>>>,
    }

    fn fixture() -> Fixture { fixture_with(&PerchConfig::default()) }

    fn fixture_with(config: &PerchConfig) -> Fixture {
        let scene = HeadlessScene::new();
        let mut wm = WindowManager::new(
            config,
            Box::new(scene.clone()),
            Box::new(FixedDisplay::new(1920.0, 1080.0)),
        );
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        wm.notifications_mut().subscribe(move |event| sink.lock().push(event.clone()));
        Fixture { wm, scene, events }
    }

    fn new_toplevel(wm: &mut WindowManager, id: u64) -> SurfaceHandle {
        let surface = SurfaceHandle(id);
        wm.handle_transport(TransportEvent::NewToplevel {
            surface,
            title: format!("window {id}"),
            width: 0,
            height: 0,
        })
        .unwrap();
        surface
    }

    fn mapped_toplevel(wm: &mut WindowManager, id: u64) -> SurfaceHandle {
        let surface = new_toplevel(wm, id);
        wm.handle_transport(TransportEvent::Map { surface }).unwrap();
        surface
    }

    fn pointer(wm: &mut WindowManager, kind: InputKind, x: f64, y: f64) -> Outcome {
        wm.handle_input(InputEvent::pointer(kind, x, y)).unwrap()
    }

    #[test]
    fn test_new_toplevel_is_centered_with_default_size() {
        let mut f = fixture();
        let surface = new_toplevel(&mut f.wm, 1);

        let toplevel = f.wm.toplevel(surface).unwrap();
        assert_eq!(toplevel.geometry(), Geometry::new(560, 240, 800, 600));
        assert_eq!(toplevel.lifecycle(), Lifecycle::Unmapped);
        assert_eq!(f.scene.node_count(), 0);
        assert_eq!(f.events.lock()[0].name(), "perch://toplevel/created");
    }

    #[test]
    fn test_placement_follows_config() {
        let mut config = PerchConfig::default();
        config.windows.center_new_windows = false;
        config.windows.min_width = 300;
        let mut f = fixture_with(&config);

        f.wm.handle_transport(TransportEvent::NewToplevel {
            surface: SurfaceHandle(1),
            title: String::new(),
            width: 100,
            height: 100,
        })
        .unwrap();

        assert_eq!(f.wm.toplevel(SurfaceHandle(1)).unwrap().geometry(), Geometry::new(0, 0, 300, 100));
    }

    #[test]
    fn test_duplicate_and_unknown_surfaces() {
        let mut f = fixture();
        let surface = new_toplevel(&mut f.wm, 1);

        let duplicate = TransportEvent::NewToplevel {
            surface,
            title: String::new(),
            width: 0,
            height: 0,
        };
        assert_eq!(f.wm.handle_transport(duplicate), Err(ShellError::DuplicateSurface(surface)));
        assert_eq!(
            f.wm.handle_transport(TransportEvent::Map { surface: SurfaceHandle(9) }),
            Err(ShellError::UnknownSurface(SurfaceHandle(9)))
        );
    }

    #[test]
    fn test_map_shows_raises_and_focuses() {
        let mut f = fixture();
        let first = mapped_toplevel(&mut f.wm, 1);
        let second = mapped_toplevel(&mut f.wm, 2);

        assert_eq!(f.wm.stacking(), &[first, second]);
        assert_eq!(f.wm.focused(), Some(second));
        let window = f.wm.toplevel(second).unwrap().window();
        assert_eq!(f.wm.application().key_window(), Some(window));
        assert!(f.wm.application().window(window).unwrap().is_visible());
        assert_eq!(f.scene.node_count(), 2);
    }

    #[test]
    fn test_press_in_focused_toplevel_keeps_focused_field() {
        struct Field(Arc<Mutex<Vec<u32>>>);
        impl Responder for Field {
            fn accepts_first_responder(&self) -> bool { true }

            fn key_down(&mut self, event: &mut InputEvent) -> Outcome {
                self.0.lock().extend(event.key.map(|key| key.code));
                Outcome::Handled
            }
        }

        let mut f = fixture();
        let surface = mapped_toplevel(&mut f.wm, 1);
        let keys = Arc::new(Mutex::new(Vec::new()));
        let window = f.wm.toplevel(surface).unwrap().window();
        let app = f.wm.application_mut();
        let content = app.window(window).unwrap().content_view();
        let field = app.create_view(Rect::new(0.0, 0.0, 200.0, 100.0), Box::new(Field(Arc::clone(&keys)))).unwrap();
        app.add_subview(content, field).unwrap();
        let field_responder = app.views().responder(field).unwrap();
        assert!(app.make_first_responder(Some(field_responder)));

        pointer(&mut f.wm, InputKind::PointerDown, 600.0, 300.0);
        assert_eq!(f.wm.application().first_responder(), Some(field_responder));

        let outcome = f.wm.handle_input(InputEvent::key(InputKind::KeyDown, 36, Modifiers::default())).unwrap();
        assert_eq!(outcome, Outcome::Handled);
        assert_eq!(*keys.lock(), vec![36]);
    }

    #[test]
    fn test_map_failure_leaves_toplevel_unmapped() {
        let mut f = fixture();
        let surface = new_toplevel(&mut f.wm, 1);
        f.scene.refuse_creates(true);

        let err = f.wm.handle_transport(TransportEvent::Map { surface }).unwrap_err();
        assert!(matches!(err, ShellError::Toplevel(ToplevelError::Scene(_))));
        assert_eq!(f.wm.toplevel(surface).unwrap().lifecycle(), Lifecycle::Unmapped);
        assert_eq!(f.wm.focused(), None);
    }

    #[test]
    fn test_unmapping_focused_toplevel_focuses_next() {
        let mut f = fixture();
        let first = mapped_toplevel(&mut f.wm, 1);
        let second = mapped_toplevel(&mut f.wm, 2);

        f.wm.handle_transport(TransportEvent::Unmap { surface: second }).unwrap();
        assert_eq!(f.wm.focused(), Some(first));

        f.wm.handle_transport(TransportEvent::Unmap { surface: first }).unwrap();
        assert_eq!(f.wm.focused(), None);
        assert_eq!(f.wm.application().first_responder(), None);
        assert_eq!(
            f.events.lock().last(),
            Some(&ShellEvent::FocusChanged { surface: None })
        );
    }

    #[test]
    fn test_destroy_releases_everything() {
        let mut f = fixture();
        let surface = mapped_toplevel(&mut f.wm, 1);

        f.wm.handle_transport(TransportEvent::Destroy { surface }).unwrap();

        assert!(f.wm.toplevel(surface).is_none());
        assert!(f.wm.stacking().is_empty());
        assert_eq!(f.scene.node_count(), 0);
        assert_eq!(f.wm.application().windows().count(), 0);
        assert_eq!(f.wm.focused(), None);
        assert_eq!(
            f.wm.handle_transport(TransportEvent::Map { surface }),
            Err(ShellError::UnknownSurface(surface))
        );
    }

    #[test]
    fn test_minimize_drops_focus_and_reports_mode() {
        let mut f = fixture();
        let first = mapped_toplevel(&mut f.wm, 1);
        let second = mapped_toplevel(&mut f.wm, 2);

        f.wm.handle_transport(TransportEvent::RequestMinimize { surface: second, enabled: true })
            .unwrap();

        assert_eq!(f.wm.focused(), Some(first));
        assert!(f.events.lock().contains(&ShellEvent::ModeChanged {
            surface: second,
            mode: WindowMode::Minimized
        }));
        let window = f.wm.toplevel(second).unwrap().window();
        assert!(!f.wm.application().window(window).unwrap().is_visible());
    }

    #[test]
    fn test_maximize_resizes_window() {
        let mut f = fixture();
        let surface = mapped_toplevel(&mut f.wm, 1);

        f.wm.handle_transport(TransportEvent::RequestMaximize { surface, enabled: true })
            .unwrap();

        let window = f.wm.toplevel(surface).unwrap().window();
        assert_eq!(
            f.wm.application().window(window).unwrap().frame(),
            Rect::new(0.0, 0.0, 1920.0, 1080.0)
        );
    }

    #[test]
    fn test_press_raises_and_focuses_topmost_under_pointer() {
        let mut f = fixture();
        let first = mapped_toplevel(&mut f.wm, 1);
        f.wm.handle_transport(TransportEvent::RequestMaximize { surface: first, enabled: true })
            .unwrap();
        let second = mapped_toplevel(&mut f.wm, 2);

        // Outside the centered second window, inside the maximized first one.
        pointer(&mut f.wm, InputKind::PointerDown, 10.0, 10.0);
        assert_eq!(f.wm.focused(), Some(first));
        assert_eq!(f.wm.stacking(), &[second, first]);

        let first_node = f.wm.toplevel(first).unwrap().scene_node().unwrap();
        assert_eq!(f.scene.stacking().last(), Some(&first_node));
    }

    #[test]
    fn test_press_on_empty_desktop_is_unhandled() {
        let mut f = fixture();
        mapped_toplevel(&mut f.wm, 1);
        assert_eq!(pointer(&mut f.wm, InputKind::PointerDown, 5.0, 5.0), Outcome::Unhandled);
    }

    #[test]
    fn test_drag_to_left_edge_snaps() {
        let mut f = fixture();
        let surface = mapped_toplevel(&mut f.wm, 1);

        pointer(&mut f.wm, InputKind::PointerDown, 900.0, 300.0);
        f.wm.handle_transport(TransportEvent::RequestMove { surface }).unwrap();
        assert_eq!(f.wm.grabbed(), Some(surface));

        assert_eq!(pointer(&mut f.wm, InputKind::PointerDrag, 500.0, 400.0), Outcome::Handled);
        assert_eq!(f.wm.toplevel(surface).unwrap().geometry(), Geometry::new(160, 340, 800, 600));

        pointer(&mut f.wm, InputKind::PointerDrag, 4.0, 500.0);
        pointer(&mut f.wm, InputKind::PointerUp, 4.0, 500.0);

        assert_eq!(f.wm.grabbed(), None);
        assert_eq!(f.wm.toplevel(surface).unwrap().geometry(), Geometry::new(0, 0, 960, 1080));
        assert!(f.events.lock().contains(&ShellEvent::Snapped {
            surface,
            zone: TilingZone::Left
        }));
    }

    #[test]
    fn test_drag_to_top_maximizes() {
        let mut f = fixture();
        let surface = mapped_toplevel(&mut f.wm, 1);

        pointer(&mut f.wm, InputKind::PointerDown, 900.0, 300.0);
        f.wm.handle_transport(TransportEvent::RequestMove { surface }).unwrap();
        pointer(&mut f.wm, InputKind::PointerDrag, 900.0, 3.0);
        pointer(&mut f.wm, InputKind::PointerUp, 900.0, 3.0);

        let toplevel = f.wm.toplevel(surface).unwrap();
        assert!(toplevel.is_maximized());
        assert!(f.events.lock().contains(&ShellEvent::ModeChanged {
            surface,
            mode: WindowMode::Maximized
        }));
    }

    #[test]
    fn test_disabled_tiling_never_snaps() {
        let mut config = PerchConfig::default();
        config.tiling.enabled = false;
        let mut f = fixture_with(&config);
        let surface = mapped_toplevel(&mut f.wm, 1);

        pointer(&mut f.wm, InputKind::PointerDown, 900.0, 300.0);
        f.wm.handle_transport(TransportEvent::RequestMove { surface }).unwrap();
        pointer(&mut f.wm, InputKind::PointerDrag, 4.0, 500.0);
        pointer(&mut f.wm, InputKind::PointerUp, 4.0, 500.0);

        assert_eq!(f.wm.toplevel(surface).unwrap().geometry(), Geometry::new(-336, 440, 800, 600));
        assert!(!f.events.lock().iter().any(|event| matches!(event, ShellEvent::Snapped { .. })));
    }

    #[test]
    fn test_unmap_during_grab_ends_it() {
        let mut f = fixture();
        let surface = mapped_toplevel(&mut f.wm, 1);
        f.wm.handle_transport(TransportEvent::RequestMove { surface }).unwrap();

        f.wm.handle_transport(TransportEvent::Unmap { surface }).unwrap();
        assert_eq!(f.wm.grabbed(), None);
    }

    #[test]
    fn test_resize_request_drives_size() {
        let mut f = fixture();
        let surface = mapped_toplevel(&mut f.wm, 1);

        pointer(&mut f.wm, InputKind::PointerDown, 1350.0, 830.0);
        f.wm.handle_transport(TransportEvent::RequestResize {
            surface,
            edges: ResizeEdges::BOTTOM_RIGHT,
        })
        .unwrap();
        pointer(&mut f.wm, InputKind::PointerDrag, 1400.0, 880.0);
        pointer(&mut f.wm, InputKind::PointerUp, 1400.0, 880.0);

        assert_eq!(f.wm.toplevel(surface).unwrap().geometry(), Geometry::new(560, 240, 850, 650));
    }

    #[test]
    fn test_set_title_updates_window() {
        let mut f = fixture();
        let surface = new_toplevel(&mut f.wm, 1);

        f.wm.handle_transport(TransportEvent::SetTitle {
            surface,
            title: "Editor".to_string(),
        })
        .unwrap();

        let toplevel = f.wm.toplevel(surface).unwrap();
        assert_eq!(toplevel.title(), "Editor");
        assert_eq!(f.wm.application().window(toplevel.window()).unwrap().title(), "Editor");
    }

    #[test]
    fn test_snapshot_reports_focus_and_order() {
        let mut f = fixture();
        mapped_toplevel(&mut f.wm, 1);
        mapped_toplevel(&mut f.wm, 2);

        let snapshot = f.wm.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(!snapshot[0].focused);
        assert!(snapshot[1].focused);
        assert_eq!(snapshot[1].surface, SurfaceHandle(2));
    }
}
