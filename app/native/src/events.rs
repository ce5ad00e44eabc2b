//! Notification names.
//!
//! Every [`ShellEvent`](crate::shell::ShellEvent) has a stable name that
//! observers and the CLI output can match on.
//!
//! ## Naming Convention
//!
//! All names follow the pattern: `perch://<module>/<event-name>`
//!
//! - `perch://` - Prefix identifying this as a Perch notification
//! - `<module>` - The module that owns the event (e.g., `toplevel`, `focus`)
//! - `<event-name>` - Descriptive kebab-case name for the event
//!
//! ## Examples
//!
//! - `perch://toplevel/mapped` - A toplevel became visible
//! - `perch://tiling/snapped` - A dragged toplevel was dropped into a zone

/// Toplevel lifecycle events.
pub mod toplevel {
    /// A client created a toplevel surface.
    ///
    /// Payload: `{ surface, title }`
    pub const CREATED: &str = "perch://toplevel/created";

    /// Payload: `{ surface }`
    pub const MAPPED: &str = "perch://toplevel/mapped";

    /// Payload: `{ surface }`
    pub const UNMAPPED: &str = "perch://toplevel/unmapped";

    /// Payload: `{ surface }`
    pub const DESTROYED: &str = "perch://toplevel/destroyed";

    /// Emitted when a toplevel is maximized, minimized, made fullscreen or
    /// returned to normal.
    ///
    /// Payload: `{ surface, mode }`
    pub const MODE_CHANGED: &str = "perch://toplevel/mode-changed";

    /// Payload: `{ surface, title }`
    pub const TITLE_CHANGED: &str = "perch://toplevel/title-changed";
}

/// Keyboard focus events.
pub mod focus {
    /// Emitted when the focused toplevel changes.
    ///
    /// Payload: `{ surface }` - `null` when nothing has focus.
    pub const CHANGED: &str = "perch://focus/changed";
}

/// Drag-to-snap events.
pub mod tiling {
    /// Emitted when a released move grab applied a tiling zone.
    ///
    /// Payload: `{ surface, zone }`
    pub const SNAPPED: &str = "perch://tiling/snapped";
}
