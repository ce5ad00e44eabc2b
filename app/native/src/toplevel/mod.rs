//! Per-window lifecycle of a transport toplevel.
//!
//! A [`Toplevel`] wraps a [`SurfaceHandle`] and moves through
//! `Unmapped -> Mapped -> Destroyed`. While alive it is in exactly one
//! [`WindowMode`]; leaving `Normal` remembers the geometry and returning to it
//! restores that geometry.
//!
//! The toplevel owns one scene node, created on the first map and released on
//! destroy. Every geometry or visibility change is pushed to that node right
//! away. The scene itself is owned by the caller and passed in, so a toplevel
//! never holds a reference to it.

mod interaction;

pub use interaction::{Geometry, Grab, GrabKind};
use serde::Serialize;

use crate::app::{Application, WindowId};
use crate::geometry::{Point, Rect};
use crate::scene::{Scene, SceneError, SceneNodeId};
use crate::tiling::{self, TilingZone};
use crate::transport::{ResizeEdges, SurfaceHandle};

/// Where a toplevel is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Lifecycle {
    Unmapped,
    Mapped,
    Destroyed,
}

/// Presentation mode. One value, so the modes are mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowMode {
    #[default]
    Normal,
    Maximized,
    Minimized,
    Fullscreen,
}

impl WindowMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Maximized => "maximized",
            Self::Minimized => "minimized",
            Self::Fullscreen => "fullscreen",
        }
    }
}

impl std::fmt::Display for WindowMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

/// Errors from toplevel operations.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ToplevelError {
    /// The toplevel was destroyed; no further calls are valid.
    #[error("toplevel {surface} has been destroyed")]
    Destroyed { surface: SurfaceHandle },

    /// The operation needs a mapped toplevel.
    #[error("toplevel {surface} is not mapped")]
    NotMapped { surface: SurfaceHandle },

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Result type for toplevel operations.
pub type Result<T> = std::result::Result<T, ToplevelError>;

/// A user-visible top-level window.
#[derive(Debug, Clone)]
pub struct Toplevel {
    surface: SurfaceHandle,
    window: WindowId,
    title: String,
    lifecycle: Lifecycle,
    mode: WindowMode,
    geometry: Geometry,
    saved: Option<Geometry>,
    min_size: (i32, i32),
    node: Option<SceneNodeId>,
    grab: Option<Grab>,
}

impl Toplevel {
    /// Creates an unmapped toplevel in `Normal` mode.
    #[must_use]
    pub fn new(
        surface: SurfaceHandle,
        window: WindowId,
        title: &str,
        geometry: Geometry,
        min_size: (i32, i32),
    ) -> Self {
        Self {
            surface,
            window,
            title: title.to_string(),
            lifecycle: Lifecycle::Unmapped,
            mode: WindowMode::Normal,
            geometry,
            saved: None,
            min_size,
            node: None,
            grab: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub const fn surface(&self) -> SurfaceHandle { self.surface }

    /// The application window backing this toplevel.
    #[must_use]
    pub const fn window(&self) -> WindowId { self.window }

    #[must_use]
    pub fn title(&self) -> &str { &self.title }

    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle { self.lifecycle }

    #[must_use]
    pub const fn mode(&self) -> WindowMode { self.mode }

    #[must_use]
    pub const fn geometry(&self) -> Geometry { self.geometry }

    /// Geometry to restore when returning to `Normal`.
    #[must_use]
    pub const fn saved_geometry(&self) -> Option<Geometry> { self.saved }

    /// Geometry as a floating-point rectangle.
    #[must_use]
    pub fn frame(&self) -> Rect { self.geometry.to_rect() }

    #[must_use]
    pub const fn scene_node(&self) -> Option<SceneNodeId> { self.node }

    #[must_use]
    pub const fn grab(&self) -> Option<Grab> { self.grab }

    #[must_use]
    pub const fn is_mapped(&self) -> bool { matches!(self.lifecycle, Lifecycle::Mapped) }

    #[must_use]
    pub const fn is_destroyed(&self) -> bool { matches!(self.lifecycle, Lifecycle::Destroyed) }

    #[must_use]
    pub const fn is_maximized(&self) -> bool { matches!(self.mode, WindowMode::Maximized) }

    #[must_use]
    pub const fn is_minimized(&self) -> bool { matches!(self.mode, WindowMode::Minimized) }

    #[must_use]
    pub const fn is_fullscreen(&self) -> bool { matches!(self.mode, WindowMode::Fullscreen) }

    /// Mapped and not minimized.
    #[must_use]
    pub const fn is_visible(&self) -> bool { self.is_mapped() && !self.is_minimized() }

    /// Whether the toplevel may take keyboard focus.
    #[must_use]
    pub const fn can_focus(&self) -> bool { self.is_visible() }

    fn ensure_alive(&self, operation: &'static str) -> Result<()> {
        if self.is_destroyed() {
            tracing::error!(surface = %self.surface, operation, "call on destroyed toplevel");
            return Err(ToplevelError::Destroyed { surface: self.surface });
        }
        Ok(())
    }

    fn ensure_mapped(&self, operation: &'static str) -> Result<()> {
        self.ensure_alive(operation)?;
        if !self.is_mapped() {
            tracing::warn!(surface = %self.surface, operation, "toplevel is not mapped");
            return Err(ToplevelError::NotMapped { surface: self.surface });
        }
        Ok(())
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Shows the toplevel, creating its scene node on first use.
    ///
    /// A minimized toplevel comes back in `Normal` mode. Mapping a mapped
    /// toplevel does nothing.
    ///
    /// # Errors
    ///
    /// [`ToplevelError::Destroyed`], or [`ToplevelError::Scene`] if the node
    /// cannot be created; the toplevel then stays unmapped.
    pub fn map(&mut self, scene: &mut dyn Scene) -> Result<()> {
        self.ensure_alive("map")?;
        if self.is_mapped() {
            return Ok(());
        }

        if self.node.is_none() {
            let node = scene.create_node(self.surface, self.frame()).map_err(|err| {
                tracing::error!(surface = %self.surface, error = %err, "failed to create scene node");
                err
            })?;
            self.node = Some(node);
        }

        self.lifecycle = Lifecycle::Mapped;
        if self.is_minimized() {
            self.enter_mode(WindowMode::Normal, Rect::zero(), scene);
        } else {
            self.sync_scene(scene);
        }

        tracing::debug!(surface = %self.surface, mode = %self.mode, "toplevel mapped");
        Ok(())
    }

    /// Hides the toplevel. Mode and geometry are kept; a running grab ends.
    ///
    /// # Errors
    ///
    /// [`ToplevelError::Destroyed`].
    pub fn unmap(&mut self, scene: &mut dyn Scene) -> Result<()> {
        self.ensure_alive("unmap")?;
        if !self.is_mapped() {
            return Ok(());
        }

        self.grab = None;
        self.lifecycle = Lifecycle::Unmapped;
        self.sync_scene(scene);
        tracing::debug!(surface = %self.surface, "toplevel unmapped");
        Ok(())
    }

    /// Releases the scene node. Every later call fails.
    ///
    /// # Errors
    ///
    /// [`ToplevelError::Destroyed`] if already destroyed.
    pub fn destroy(&mut self, scene: &mut dyn Scene) -> Result<()> {
        self.ensure_alive("destroy")?;

        if let Some(node) = self.node.take() {
            scene.destroy_node(node);
        }
        self.grab = None;
        self.lifecycle = Lifecycle::Destroyed;
        tracing::debug!(surface = %self.surface, "toplevel destroyed");
        Ok(())
    }

    /// # Errors
    ///
    /// [`ToplevelError::Destroyed`].
    pub fn set_title(&mut self, title: &str) -> Result<()> {
        self.ensure_alive("set_title")?;
        title.clone_into(&mut self.title);
        Ok(())
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Moves the toplevel and its scene node.
    ///
    /// # Errors
    ///
    /// [`ToplevelError::Destroyed`].
    pub fn set_position(&mut self, x: i32, y: i32, scene: &mut dyn Scene) -> Result<()> {
        self.ensure_alive("set_position")?;
        self.geometry.x = x;
        self.geometry.y = y;
        if let Some(node) = self.node {
            scene.set_position(node, x, y);
        }
        Ok(())
    }

    /// Resizes the toplevel and its scene node, never below the minimum size.
    ///
    /// # Errors
    ///
    /// [`ToplevelError::Destroyed`].
    pub fn set_size(&mut self, width: i32, height: i32, scene: &mut dyn Scene) -> Result<()> {
        self.ensure_alive("set_size")?;
        self.geometry.width = width.max(self.min_size.0);
        self.geometry.height = height.max(self.min_size.1);
        if let Some(node) = self.node {
            scene.set_size(node, self.geometry.width, self.geometry.height);
        }
        Ok(())
    }

    fn apply_geometry(&mut self, geometry: Geometry, scene: &mut dyn Scene) {
        self.geometry = geometry;
        if let Some(node) = self.node {
            scene.set_position(node, geometry.x, geometry.y);
            scene.set_size(node, geometry.width, geometry.height);
        }
    }

    fn sync_scene(&self, scene: &mut dyn Scene) {
        if let Some(node) = self.node {
            let Geometry { x, y, width, height } = self.geometry;
            scene.set_position(node, x, y);
            scene.set_size(node, width, height);
            scene.set_visible(node, self.is_visible());
        }
    }

    // ========================================================================
    // Modes
    // ========================================================================

    /// Switches to `mode`. Returns false if already there.
    fn enter_mode(&mut self, mode: WindowMode, screen: Rect, scene: &mut dyn Scene) -> bool {
        if self.mode == mode {
            return false;
        }

        let previous = self.mode;
        if previous == WindowMode::Normal {
            self.saved = Some(self.geometry);
        }
        self.grab = None;
        self.mode = mode;

        match mode {
            WindowMode::Normal => {
                if let Some(saved) = self.saved.take() {
                    self.geometry = saved;
                }
            }
            WindowMode::Maximized | WindowMode::Fullscreen => {
                let (x, y, width, height) = screen.to_pixels();
                self.geometry = Geometry::new(x, y, width, height);
            }
            WindowMode::Minimized => {}
        }

        self.sync_scene(scene);
        tracing::debug!(surface = %self.surface, from = %previous, to = %mode, "mode changed");
        true
    }

    fn toggle_mode(
        &mut self,
        mode: WindowMode,
        enabled: bool,
        screen: Rect,
        scene: &mut dyn Scene,
    ) -> bool {
        if enabled {
            self.enter_mode(mode, screen, scene)
        } else if self.mode == mode {
            self.enter_mode(WindowMode::Normal, screen, scene)
        } else {
            false
        }
    }

    /// Maximizes to `screen`, or returns to `Normal`. Returns whether the mode
    /// changed.
    ///
    /// # Errors
    ///
    /// [`ToplevelError::Destroyed`].
    pub fn set_maximized(&mut self, enabled: bool, screen: Rect, scene: &mut dyn Scene) -> Result<bool> {
        self.ensure_alive("set_maximized")?;
        Ok(self.toggle_mode(WindowMode::Maximized, enabled, screen, scene))
    }

    /// Minimizes (hides the scene node), or returns to `Normal`.
    ///
    /// # Errors
    ///
    /// [`ToplevelError::Destroyed`].
    pub fn set_minimized(&mut self, enabled: bool, scene: &mut dyn Scene) -> Result<bool> {
        self.ensure_alive("set_minimized")?;
        Ok(self.toggle_mode(WindowMode::Minimized, enabled, Rect::zero(), scene))
    }

    /// Covers `screen`, or returns to `Normal`.
    ///
    /// # Errors
    ///
    /// [`ToplevelError::Destroyed`].
    pub fn set_fullscreen(&mut self, enabled: bool, screen: Rect, scene: &mut dyn Scene) -> Result<bool> {
        self.ensure_alive("set_fullscreen")?;
        Ok(self.toggle_mode(WindowMode::Fullscreen, enabled, screen, scene))
    }

    // ========================================================================
    // Interactive grabs
    // ========================================================================

    /// Starts an interactive move with the pointer at `pointer`.
    ///
    /// A maximized toplevel first returns to its saved size, centered under
    /// the pointer. Minimized and fullscreen toplevels do not move; the call
    /// returns false for them.
    ///
    /// # Errors
    ///
    /// [`ToplevelError::Destroyed`] or [`ToplevelError::NotMapped`].
    #[allow(clippy::cast_possible_truncation)]
    pub fn begin_move(&mut self, pointer: Point, scene: &mut dyn Scene) -> Result<bool> {
        self.ensure_mapped("begin_move")?;

        match self.mode {
            WindowMode::Minimized | WindowMode::Fullscreen => return Ok(false),
            WindowMode::Maximized => {
                self.enter_mode(WindowMode::Normal, Rect::zero(), scene);
                let x = (pointer.x.round() as i32).saturating_sub(self.geometry.width / 2);
                let y = pointer.y.round() as i32;
                self.set_position(x, y, scene)?;
            }
            WindowMode::Normal => {}
        }

        self.grab = Some(Grab::new(GrabKind::Move, pointer, self.geometry));
        tracing::debug!(surface = %self.surface, "move grab started");
        Ok(true)
    }

    /// Starts an interactive resize of `edges`. Only `Normal` toplevels
    /// resize; returns false otherwise or when no edge is given.
    ///
    /// # Errors
    ///
    /// [`ToplevelError::Destroyed`] or [`ToplevelError::NotMapped`].
    pub fn begin_resize(&mut self, edges: ResizeEdges, pointer: Point) -> Result<bool> {
        self.ensure_mapped("begin_resize")?;
        if self.mode != WindowMode::Normal || edges.is_empty() {
            return Ok(false);
        }

        self.grab = Some(Grab::new(GrabKind::Resize(edges), pointer, self.geometry));
        tracing::debug!(surface = %self.surface, ?edges, "resize grab started");
        Ok(true)
    }

    /// Feeds a pointer motion tick into the running grab.
    ///
    /// Returns the tiling zone under the pointer, recomputed on every tick.
    /// `snap_threshold` is `None` when snapping is disabled. Without a grab
    /// nothing changes and `TilingZone::None` is returned.
    ///
    /// # Errors
    ///
    /// [`ToplevelError::Destroyed`].
    pub fn pointer_motion(
        &mut self,
        pointer: Point,
        screen: (f64, f64),
        snap_threshold: Option<f64>,
        scene: &mut dyn Scene,
    ) -> Result<TilingZone> {
        self.ensure_alive("pointer_motion")?;
        let Some(mut grab) = self.grab else {
            return Ok(TilingZone::None);
        };

        let geometry = grab.track(pointer, self.min_size);
        self.apply_geometry(geometry, scene);

        let previous = grab.zone;
        grab.update_zone(pointer, screen, snap_threshold);
        if grab.zone != previous {
            tracing::trace!(surface = %self.surface, zone = %grab.zone, "snap zone changed");
        }
        self.grab = Some(grab);
        Ok(grab.zone)
    }

    /// Ends the running grab.
    ///
    /// If the last motion tick left the pointer in a tiling zone, the zone's
    /// frame is applied; the `Maximize` zone also enters `Maximized` mode.
    /// Returns the zone that was applied.
    ///
    /// # Errors
    ///
    /// [`ToplevelError::Destroyed`].
    pub fn pointer_release(&mut self, screen: (f64, f64), scene: &mut dyn Scene) -> Result<TilingZone> {
        self.ensure_alive("pointer_release")?;
        let Some(grab) = self.grab.take() else {
            return Ok(TilingZone::None);
        };

        match grab.zone {
            TilingZone::None => {}
            TilingZone::Maximize => {
                self.enter_mode(WindowMode::Maximized, tiling::frame_for_zone(grab.zone, screen.0, screen.1), scene);
            }
            zone => {
                let (x, y, width, height) = tiling::frame_for_zone(zone, screen.0, screen.1).to_pixels();
                self.apply_geometry(Geometry::new(x, y, width, height), scene);
            }
        }

        tracing::debug!(surface = %self.surface, zone = %grab.zone, "grab released");
        Ok(grab.zone)
    }

    /// Drops a running grab without applying anything.
    pub fn cancel_grab(&mut self) { self.grab = None; }

    // ========================================================================
    // Focus
    // ========================================================================

    /// Asks `app` to make this toplevel's window the key window.
    ///
    /// Returns false when the toplevel is unmapped or minimized, or when the
    /// application refuses.
    ///
    /// # Errors
    ///
    /// [`ToplevelError::Destroyed`].
    pub fn focus(&self, app: &mut Application) -> Result<bool> {
        self.ensure_alive("focus")?;
        if !self.can_focus() {
            tracing::trace!(surface = %self.surface, "toplevel cannot take focus");
            return Ok(false);
        }
        Ok(app.make_key_window(self.window))
    }
}
