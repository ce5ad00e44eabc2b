//! Observer registry for window-manager notifications.

use serde::Serialize;

use crate::events;
use crate::tiling::TilingZone;
use crate::toplevel::WindowMode;
use crate::transport::SurfaceHandle;

/// Something observable happened in the window manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ShellEvent {
    ToplevelCreated { surface: SurfaceHandle, title: String },
    ToplevelMapped { surface: SurfaceHandle },
    ToplevelUnmapped { surface: SurfaceHandle },
    ToplevelDestroyed { surface: SurfaceHandle },
    FocusChanged { surface: Option<SurfaceHandle> },
    ModeChanged { surface: SurfaceHandle, mode: WindowMode },
    Snapped { surface: SurfaceHandle, zone: TilingZone },
    TitleChanged { surface: SurfaceHandle, title: String },
}

impl ShellEvent {
    /// The stable `perch://` name of this event.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ToplevelCreated { .. } => events::toplevel::CREATED,
            Self::ToplevelMapped { .. } => events::toplevel::MAPPED,
            Self::ToplevelUnmapped { .. } => events::toplevel::UNMAPPED,
            Self::ToplevelDestroyed { .. } => events::toplevel::DESTROYED,
            Self::FocusChanged { .. } => events::focus::CHANGED,
            Self::ModeChanged { .. } => events::toplevel::MODE_CHANGED,
            Self::Snapped { .. } => events::tiling::SNAPPED,
            Self::TitleChanged { .. } => events::toplevel::TITLE_CHANGED,
        }
    }
}

/// Callback registered with a [`NotificationCenter`].
pub type Observer = Box<dyn FnMut(&ShellEvent) + Send>;

/// Handle returned by [`NotificationCenter::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Delivers [`ShellEvent`]s to observers in subscription order.
#[derive(Default)]
pub struct NotificationCenter {
    observers: Vec<(ObserverId, Observer)>,
    next_id: u64,
}

impl NotificationCenter {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&ShellEvent) + Send + 'static,
    {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer, _)| *observer != id);
        self.observers.len() != before
    }

    #[must_use]
    pub fn observer_count(&self) -> usize { self.observers.len() }

    pub fn post(&mut self, event: &ShellEvent) {
        tracing::trace!(name = event.name(), "notification");
        for (_, observer) in &mut self.observers {
            observer(event);
        }
    }
}

impl std::fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCenter").field("observers", &self.observers.len()).finish()
    }
}
