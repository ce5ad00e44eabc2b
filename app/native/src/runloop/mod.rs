//! Cooperative single-consumer run loop.
//!
//! The run loop owns a FIFO queue of [`Task`]s. Any thread may post work through a
//! [`RunLoopHandle`]; exactly one thread drains the queue by calling
//! [`RunLoop::run`], which blocks until [`RunLoop::stop`] is observed.
//!
//! # Flow
//!
//! 1. Producers call `post_task` (never runs the task inline)
//! 2. `run` pops one task at a time and runs it with the queue unlocked, so a
//!    task may post follow-up work without deadlocking
//! 3. When the queue is empty, `run` sleeps on a condition variable until new
//!    work arrives or `stop` is called
//! 4. `stop` clears the running flag; queued tasks stay queued and are drained by
//!    the next call to `run`
//! 5. A `stop` that arrives while nothing is draining is held back and ends the
//!    next `run` before it takes any task
//!
//! A task that panics unwinds through `run`. Tasks are expected to handle their
//! own failures.

mod timer;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct QueueState {
    tasks: VecDeque<Task>,
    running: bool,
    draining: bool,
    /// A stop requested while no `run` was draining.
    stop_pending: bool,
}

#[derive(Default)]
struct Shared {
    state: Mutex<QueueState>,
    wake: Condvar,
}

impl Shared {
    fn post(&self, task: Task) {
        let mut state = self.state.lock();
        state.tasks.push_back(task);
        drop(state);
        self.wake.notify_one();
    }

    fn stop(&self) {
        let mut state = self.state.lock();
        state.running = false;
        if !state.draining {
            state.stop_pending = true;
        }
        drop(state);
        self.wake.notify_all();
    }
}

/// The run loop. Create one per process at the composition root.
#[derive(Default)]
pub struct RunLoop {
    shared: Arc<Shared>,
}

impl RunLoop {
    /// Creates an idle run loop with an empty queue.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Returns a cloneable handle for posting work from other threads.
    #[must_use]
    pub fn handle(&self) -> RunLoopHandle {
        RunLoopHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Enqueues a task. It runs on the thread that calls [`Self::run`].
    pub fn post_task<F>(&self, task: F)
    where F: FnOnce() + Send + 'static {
        self.shared.post(Box::new(task));
    }

    /// Stops the loop. Idempotent; wakes a waiting [`Self::run`].
    pub fn stop(&self) { self.shared.stop(); }

    /// Returns whether a call to [`Self::run`] is currently draining.
    #[must_use]
    pub fn is_running(&self) -> bool { self.shared.state.lock().running }

    /// Number of tasks waiting in the queue.
    #[must_use]
    pub fn pending(&self) -> usize { self.shared.state.lock().tasks.len() }

    /// Drains the queue until [`Self::stop`] is called.
    ///
    /// Blocks while the queue is empty. Calling `run` again after a stop resumes
    /// draining whatever is still queued. A stop requested before `run` starts
    /// makes it return at once, leaving the queue untouched.
    ///
    /// # Panics
    ///
    /// Panics in debug builds when called while another `run` is already
    /// draining, including from inside a task.
    pub fn run(&self) {
        {
            let mut state = self.shared.state.lock();
            debug_assert!(!state.draining, "run loop has a single consumer");
            if std::mem::take(&mut state.stop_pending) {
                tracing::debug!("run loop stopped before it started");
                return;
            }
            state.running = true;
            state.draining = true;
        }
        tracing::debug!("run loop started");

        let mut executed = 0usize;
        while let Some(task) = self.next_task() {
            task();
            executed += 1;
        }

        self.shared.state.lock().draining = false;
        tracing::debug!(executed, "run loop stopped");
    }

    /// Waits for the next task, or returns `None` once the loop is stopped.
    fn next_task(&self) -> Option<Task> {
        let mut state = self.shared.state.lock();
        loop {
            if !state.running {
                return None;
            }
            if let Some(task) = state.tasks.pop_front() {
                return Some(task);
            }
            self.shared.wake.wait(&mut state);
        }
    }
}

/// Cheap, cloneable, thread-safe handle to a [`RunLoop`].
#[derive(Clone)]
pub struct RunLoopHandle {
    shared: Arc<Shared>,
}

impl RunLoopHandle {
    /// Enqueues a task on the owning run loop.
    pub fn post_task<F>(&self, task: F)
    where F: FnOnce() + Send + 'static {
        self.shared.post(Box::new(task));
    }

    /// Stops the owning run loop.
    pub fn stop(&self) { self.shared.stop(); }

    /// Posts `task` once `delay` has elapsed.
    ///
    /// The delay is measured on a dedicated timer thread; the task itself still
    /// runs on the loop thread, after everything already queued at that time.
    pub fn post_after<F>(&self, delay: Duration, task: F)
    where F: FnOnce() + Send + 'static {
        let handle = self.clone();
        if let Err(post) = timer::spawn_timer(delay, move || handle.post_task(task)) {
            tracing::warn!(?delay, "no timer thread, posting without delay");
            post();
        }
    }
}

impl std::fmt::Debug for RunLoopHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLoopHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;

    #[test]
    fn test_tasks_run_in_fifo_order_until_stop() {
        let run_loop = RunLoop::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            let log = Arc::clone(&log);
            run_loop.post_task(move || log.lock().push(i));
        }
        let handle = run_loop.handle();
        run_loop.post_task(move || handle.stop());

        run_loop.run();

        assert_eq!(*log.lock(), vec![0, 1, 2, 3, 4]);
        assert_eq!(run_loop.pending(), 0);
        assert!(!run_loop.is_running());
    }

    #[test]
    fn test_post_task_never_runs_inline() {
        let run_loop = RunLoop::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);

        run_loop.post_task(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(run_loop.pending(), 1);
    }

    #[test]
    fn test_task_can_post_follow_up_work() {
        let run_loop = RunLoop::new();
        let handle = run_loop.handle();
        let log = Arc::new(Mutex::new(Vec::new()));

        let inner_log = Arc::clone(&log);
        run_loop.post_task(move || {
            inner_log.lock().push("first");
            let follow_log = Arc::clone(&inner_log);
            let stopper = handle.clone();
            handle.post_task(move || {
                follow_log.lock().push("second");
                stopper.stop();
            });
        });

        run_loop.run();
        assert_eq!(*log.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_stop_leaves_remaining_tasks_for_next_run() {
        let run_loop = RunLoop::new();
        let handle = run_loop.handle();
        let counter = Arc::new(AtomicUsize::new(0));

        let stopper = handle.clone();
        run_loop.post_task(move || stopper.stop());
        let c = Arc::clone(&counter);
        run_loop.post_task(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        run_loop.run();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(run_loop.pending(), 1);

        run_loop.post_task(move || handle.stop());
        run_loop.run();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let run_loop = RunLoop::new();
        run_loop.stop();
        run_loop.stop();
        assert!(!run_loop.is_running());
    }

    #[test]
    fn test_stop_before_run_is_not_lost() {
        let run_loop = RunLoop::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        run_loop.post_task(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let handle = run_loop.handle();
        thread::spawn(move || handle.stop()).join().unwrap();

        run_loop.run();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(run_loop.pending(), 1);

        let handle = run_loop.handle();
        run_loop.post_task(move || handle.stop());
        run_loop.run();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_post_from_other_thread_wakes_loop() {
        let run_loop = RunLoop::new();
        let handle = run_loop.handle();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&counter);
        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            for _ in 0..10 {
                let c = Arc::clone(&c);
                handle.post_task(move || {
                    c.fetch_add(1, Ordering::SeqCst);
                });
            }
            let stopper = handle.clone();
            handle.post_task(move || stopper.stop());
        });

        run_loop.run();
        producer.join().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_post_after_runs_delayed_task() {
        let run_loop = RunLoop::new();
        let handle = run_loop.handle();
        let fired = Arc::new(AtomicUsize::new(0));

        let f = Arc::clone(&fired);
        let stopper = handle.clone();
        handle.post_after(Duration::from_millis(10), move || {
            f.fetch_add(1, Ordering::SeqCst);
            stopper.stop();
        });

        run_loop.run();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
