//! Perch - the core of a desktop-shell window manager.
//!
//! The library is organized bottom-up:
//!
//! - [`runloop`] serializes all deferred work on one thread
//! - [`responder`] routes input events along a chain of responders
//! - [`view`] arranges rectangles in a tree for hit testing and drawing
//! - [`app`] ties views and responders into windows with focus and hover
//! - [`toplevel`] is the per-window lifecycle, mode and grab state machine
//! - [`tiling`] maps pointer positions to snap zones and zones to frames
//! - [`shell`] is the window manager that coordinates all of the above
//!
//! [`transport`] and [`scene`] are the boundaries to the display protocol and
//! the renderer; both come with headless implementations.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod responder;
pub mod runloop;
pub mod scene;
pub mod session;
pub mod shell;
pub mod tiling;
pub mod toplevel;
pub mod transport;
pub mod view;

use std::sync::OnceLock;

use runloop::RunLoop;

/// The process-wide run loop used by the CLI.
///
/// Library code takes a `&RunLoop` or a handle instead of calling this.
pub fn main_loop() -> &'static RunLoop {
    static MAIN_LOOP: OnceLock<RunLoop> = OnceLock::new();
    MAIN_LOOP.get_or_init(RunLoop::new)
}
