//! Transport boundary.
//!
//! A display-server transport (not implemented here) turns protocol traffic into
//! [`TransportEvent`]s keyed by an opaque [`SurfaceHandle`]. The window manager
//! translates each one into a toplevel state transition.
//!
//! The screen size comes from a [`DisplayGeometry`] provider.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Opaque transport-level surface identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SurfaceHandle(pub u64);

impl std::fmt::Display for SurfaceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "surface-{}", self.0) }
}

/// Edges grabbed by an interactive resize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ResizeEdges {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl ResizeEdges {
    /// The bottom-right corner, the usual resize grip.
    pub const BOTTOM_RIGHT: Self = Self {
        top: false,
        bottom: true,
        left: false,
        right: true,
    };

    /// The top-left corner.
    pub const TOP_LEFT: Self = Self {
        top: true,
        bottom: false,
        left: true,
        right: false,
    };

    /// Returns true if no edge is grabbed.
    #[must_use]
    pub const fn is_empty(self) -> bool { !(self.top || self.bottom || self.left || self.right) }
}

/// Lifecycle callbacks delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum TransportEvent {
    /// A client created a toplevel surface. It stays unmapped until `map`.
    NewToplevel {
        surface: SurfaceHandle,
        #[serde(default)]
        title: String,
        /// Requested size; `0` means "use the configured default".
        #[serde(default)]
        width: u32,
        #[serde(default)]
        height: u32,
    },
    /// The surface has content and should be shown.
    Map { surface: SurfaceHandle },
    /// The surface should be hidden but stays alive.
    Unmap { surface: SurfaceHandle },
    /// The surface is gone for good.
    Destroy { surface: SurfaceHandle },
    /// The client asked to start an interactive move.
    RequestMove { surface: SurfaceHandle },
    /// The client asked to start an interactive resize.
    RequestResize {
        surface: SurfaceHandle,
        #[serde(default)]
        edges: ResizeEdges,
    },
    RequestMaximize {
        surface: SurfaceHandle,
        #[serde(default = "enabled")]
        enabled: bool,
    },
    RequestMinimize {
        surface: SurfaceHandle,
        #[serde(default = "enabled")]
        enabled: bool,
    },
    RequestFullscreen {
        surface: SurfaceHandle,
        #[serde(default = "enabled")]
        enabled: bool,
    },
    SetTitle { surface: SurfaceHandle, title: String },
}

const fn enabled() -> bool { true }

impl TransportEvent {
    /// The surface this event is about.
    #[must_use]
    pub const fn surface(&self) -> SurfaceHandle {
        match self {
            Self::NewToplevel { surface, .. }
            | Self::Map { surface }
            | Self::Unmap { surface }
            | Self::Destroy { surface }
            | Self::RequestMove { surface }
            | Self::RequestResize { surface, .. }
            | Self::RequestMaximize { surface, .. }
            | Self::RequestMinimize { surface, .. }
            | Self::RequestFullscreen { surface, .. }
            | Self::SetTitle { surface, .. } => *surface,
        }
    }

    /// Short event name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NewToplevel { .. } => "new-toplevel",
            Self::Map { .. } => "map",
            Self::Unmap { .. } => "unmap",
            Self::Destroy { .. } => "destroy",
            Self::RequestMove { .. } => "request-move",
            Self::RequestResize { .. } => "request-resize",
            Self::RequestMaximize { .. } => "request-maximize",
            Self::RequestMinimize { .. } => "request-minimize",
            Self::RequestFullscreen { .. } => "request-fullscreen",
            Self::SetTitle { .. } => "set-title",
        }
    }
}

/// Supplies the current screen size.
pub trait DisplayGeometry: Send {
    /// Returns `(width, height)` in pixels.
    fn screen_size(&self) -> (f64, f64);
}

/// A display whose size never changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDisplay {
    pub width: f64,
    pub height: f64,
}

impl FixedDisplay {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self { Self { width, height } }
}

impl DisplayGeometry for FixedDisplay {
    fn screen_size(&self) -> (f64, f64) { (self.width, self.height) }
}
