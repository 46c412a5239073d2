//! Task handles: spawn a producer/consumer loop on the worker pool and track its completion.

use crossbeam_channel::{Receiver, RecvTimeoutError, bounded};
use log::error;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use super::cancel::CancelToken;
use crate::TaskExit;

/// Handle to one spawned task. Cancelling it fires the task's token; completion is
/// observable without joining (the pool owns the thread).
pub struct TaskHandle {
    label: String,
    cancel: CancelToken,
    exit: Arc<Mutex<Option<TaskExit>>>,
    /// Disconnected once the task has finished and recorded its exit.
    done: Receiver<()>,
}

impl TaskHandle {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Fire the task's cancellation token.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.exit().is_some()
    }

    /// How the task ended, or `None` while it is still running (or not yet scheduled).
    pub fn exit(&self) -> Option<TaskExit> {
        *self.exit.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Completion signal, for waiting outside the controller lock.
    pub fn done_signal(&self) -> Receiver<()> {
        self.done.clone()
    }
}

/// Wait until every signal in `signals` is disconnected or `deadline` passes.
/// Returns true if all tasks finished in time.
pub fn wait_all(signals: &[Receiver<()>], deadline: Instant) -> bool {
    signals.iter().all(|done| {
        matches!(
            done.recv_deadline(deadline),
            Err(RecvTimeoutError::Disconnected)
        )
    })
}

/// Spawn `body` on `pool`. Panics are caught and recorded as [`TaskExit::Panicked`].
pub fn spawn_task<F>(
    pool: &rayon::ThreadPool,
    label: String,
    cancel: CancelToken,
    body: F,
) -> TaskHandle
where
    F: FnOnce() -> TaskExit + Send + 'static,
{
    let exit = Arc::new(Mutex::new(None));
    let (done_tx, done) = bounded::<()>(0);

    let exit_w = Arc::clone(&exit);
    let label_w = label.clone();
    pool.spawn(move || {
        let result = catch_unwind(AssertUnwindSafe(body)).unwrap_or_else(|_| {
            error!("Task {} panicked", label_w);
            TaskExit::Panicked
        });
        *exit_w.lock().unwrap_or_else(PoisonError::into_inner) = Some(result);
        drop(done_tx);
    });

    TaskHandle {
        label,
        cancel,
        exit,
        done,
    }
}
