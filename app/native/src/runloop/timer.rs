use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

/// Runs `fire` on a named background thread once `delay` has elapsed.
///
/// # Errors
///
/// Hands `fire` back when the timer thread cannot be spawned.
pub fn spawn_timer<F>(delay: Duration, fire: F) -> Result<(), F>
where F: FnOnce() + Send + 'static {
    spawn_timer_with(thread::Builder::new(), delay, fire)
}

fn spawn_timer_with<F>(builder: thread::Builder, delay: Duration, fire: F) -> Result<(), F>
where F: FnOnce() + Send + 'static {
    let slot = Arc::new(Mutex::new(Some(fire)));
    let pending = Arc::clone(&slot);
    let sleeper = move || {
        thread::sleep(delay);
        let fire = pending.lock().take();
        if let Some(fire) = fire {
            fire();
        }
    };

    match spawn_named_thread("timer", builder, sleeper) {
        Ok(()) => Ok(()),
        // `Builder::spawn` drops the closure on failure; the slot still holds `fire`.
        Err(()) => slot.lock().take().map_or(Ok(()), Err),
    }
}

fn spawn_named_thread<F>(name: &str, builder: thread::Builder, task: F) -> Result<(), ()>
where F: FnOnce() + Send + 'static {
    let thread_name = format!("perch-{name}");

    builder.name(thread_name.clone()).spawn(task).map(drop).map_err(|err| {
        tracing::error!(thread = %thread_name, error = %err, "failed to spawn thread");
    })
}
