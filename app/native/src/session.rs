//! Scripted sessions.
//!
//! A [`Script`] is a list of transport callbacks, input events and waits. A
//! [`Session`] feeds it to a [`WindowManager`] running against a
//! [`HeadlessScene`], one step per run-loop task, and reports the final state.
//!
//! Steps are chained: each task runs its step and posts the next one, so a
//! `wait` step delays everything after it without blocking the loop.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::PerchConfig;
use crate::responder::{InputEvent, Outcome};
use crate::runloop::{RunLoop, RunLoopHandle};
use crate::scene::HeadlessScene;
use crate::shell::{ShellError, ShellEvent, ToplevelSnapshot, WindowManager};
use crate::transport::{FixedDisplay, SurfaceHandle, TransportEvent};

/// One scripted step.
///
/// ```json
/// { "transport": { "event": "map", "surface": 1 } }
/// { "input": { "kind": "pointer-down", "position": { "x": 10, "y": 10 } } }
/// { "wait": { "ms": 50 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Transport(TransportEvent),
    Input(InputEvent),
    Wait { ms: u64 },
}

impl Step {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Transport(event) => event.name(),
            Self::Input(_) => "input",
            Self::Wait { .. } => "wait",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    /// Parses a script. Comments are allowed.
    ///
    /// # Errors
    ///
    /// Returns the parse error.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(json_comments::StripComments::new(json.as_bytes()))
    }
}

/// A step the window manager rejected. The session keeps going after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    pub index: usize,
    pub step: &'static str,
    pub error: String,
}

/// Final state of a replayed session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub toplevels: Vec<ToplevelSnapshot>,
    pub focused: Option<SurfaceHandle>,
    pub notifications: Vec<ShellEvent>,
    pub failures: Vec<StepFailure>,
    pub handled_inputs: usize,
    pub scene_nodes: usize,
}

#[derive(Default)]
struct Progress {
    failures: Vec<StepFailure>,
    handled_inputs: usize,
}

/// A window manager wired to a headless scene and a notification log.
pub struct Session {
    wm: Arc<Mutex<WindowManager>>,
    scene: HeadlessScene,
    notifications: Arc<Mutex<Vec<ShellEvent>>>,
    progress: Arc<Mutex<Progress>>,
}

impl Session {
    #[must_use]
    pub fn new(config: &PerchConfig) -> Self {
        let scene = HeadlessScene::new();
        let display = FixedDisplay::new(config.screen.width, config.screen.height);
        let mut wm = WindowManager::new(config, Box::new(scene.clone()), Box::new(display));

        let notifications = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&notifications);
        wm.notifications_mut().subscribe(move |event| sink.lock().push(event.clone()));

        Self {
            wm: Arc::new(Mutex::new(wm)),
            scene,
            notifications,
            progress: Arc::default(),
        }
    }

    #[must_use]
    pub fn window_manager(&self) -> Arc<Mutex<WindowManager>> { Arc::clone(&self.wm) }

    #[must_use]
    pub const fn scene(&self) -> &HeadlessScene { &self.scene }

    /// Chains the script's steps onto the loop behind `handle`. The last task
    /// stops the loop.
    pub fn post_script(&self, script: Script, handle: &RunLoopHandle) {
        let runner = StepRunner {
            wm: Arc::clone(&self.wm),
            progress: Arc::clone(&self.progress),
            handle: handle.clone(),
            steps: script.steps.into_iter().enumerate(),
        };
        handle.post_task(move || runner.advance());
    }

    /// Posts `script` to `run_loop`, drains the loop and reports.
    ///
    /// Blocks the calling thread, which becomes the loop thread.
    pub fn replay(&self, script: Script, run_loop: &RunLoop) -> ReplayReport {
        tracing::info!(steps = script.steps.len(), "replaying script");
        self.post_script(script, &run_loop.handle());
        run_loop.run();
        self.report()
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn report(&self) -> ReplayReport {
        let wm = self.wm.lock();
        let progress = self.progress.lock();
        ReplayReport {
            toplevels: wm.snapshot(),
            focused: wm.focused(),
            notifications: self.notifications.lock().clone(),
            failures: progress.failures.clone(),
            handled_inputs: progress.handled_inputs,
            scene_nodes: self.scene.node_count(),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("scene", &self.scene).finish_non_exhaustive()
    }
}

struct StepRunner {
    wm: Arc<Mutex<WindowManager>>,
    progress: Arc<Mutex<Progress>>,
    handle: RunLoopHandle,
    steps: std::iter::Enumerate<std::vec::IntoIter<Step>>,
}

impl StepRunner {
    fn advance(mut self) {
        let Some((index, step)) = self.steps.next() else {
            tracing::debug!("script finished");
            self.handle.stop();
            return;
        };

        let handle = self.handle.clone();
        if let Step::Wait { ms } = step {
            handle.post_after(Duration::from_millis(ms), move || self.advance());
            return;
        }

        let name = step.name();
        if let Err(err) = self.apply(step) {
            tracing::warn!(index, step = name, error = %err, "step failed");
            self.progress.lock().failures.push(StepFailure {
                index,
                step: name,
                error: err.to_string(),
            });
        }
        handle.post_task(move || self.advance());
    }

    fn apply(&self, step: Step) -> Result<(), ShellError> {
        let mut wm = self.wm.lock();
        match step {
            Step::Transport(event) => wm.handle_transport(event),
            Step::Input(event) => {
                if wm.handle_input(event)? == Outcome::Handled {
                    self.progress.lock().handled_inputs += 1;
                }
                Ok(())
            }
            Step::Wait { .. } => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toplevel::WindowMode;

    const SCRIPT: &str = r#"{
        // two windows, the second one maximized
        "steps": [
            { "transport": { "event": "new-toplevel", "surface": 1, "title": "One" } },
            { "transport": { "event": "map", "surface": 1 } },
            { "transport": { "event": "new-toplevel", "surface": 2, "title": "Two" } },
            { "transport": { "event": "map", "surface": 2 } },
            { "wait": { "ms": 5 } },
            { "transport": { "event": "request-maximize", "surface": 2 } },
            { "transport": { "event": "map", "surface": 7 } }
        ]
    }"#;

    #[test]
    fn test_script_parses_with_comments() {
        let script = Script::from_json(SCRIPT).unwrap();
        assert_eq!(script.steps.len(), 7);
        assert_eq!(script.steps[4], Step::Wait { ms: 5 });
        assert_eq!(script.steps[0].name(), "new-toplevel");
    }

    #[test]
    fn test_replay_runs_every_step_and_records_failures() {
        let session = Session::new(&PerchConfig::default());
        let run_loop = RunLoop::new();

        let report = session.replay(Script::from_json(SCRIPT).unwrap(), &run_loop);

        assert_eq!(report.toplevels.len(), 2);
        assert_eq!(report.toplevels[1].mode, WindowMode::Maximized);
        assert_eq!(report.focused, Some(SurfaceHandle(2)));
        assert_eq!(report.scene_nodes, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 6);
        assert!(report.failures[0].error.contains("surface-7"));
        assert!(!run_loop.is_running());
    }

    #[test]
    fn test_empty_script_stops_immediately() {
        let session = Session::new(&PerchConfig::default());
        let report = session.replay(Script::default(), &RunLoop::new());
        assert_eq!(report, ReplayReport::default());
    }
}
