//! Execution contexts for observables and search pipelines.
//!
//! Two logical contexts are involved in a search-as-you-type flow. The *owner*
//! context is single threaded and owns everything the user can see; results must
//! be delivered there. The *worker* context runs blocking remote calls so they never
//! stall the owner. Both are expressed through the [`Scheduler`] trait.

use std::sync::Arc;

use tokio::{runtime::Handle, sync::mpsc};
use tracing::trace;

use crate::errors::PipelineError;

/// A unit of work posted to a scheduler.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Something that runs tasks on a particular execution context.
pub trait Scheduler: Send + Sync {
    /// Queues `task` for execution. Never blocks the caller on the task itself.
    fn schedule(&self, task: Task);
}

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
    fn schedule(&self, task: Task) {
        (**self).schedule(task);
    }
}

/// Runs every task inline, on the thread that schedules it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
    fn schedule(&self, task: Task) {
        task();
    }
}

/// Worker context backed by Tokio's blocking thread pool.
#[derive(Debug, Clone)]
pub struct WorkerScheduler {
    handle: Handle,
}

impl WorkerScheduler {
    pub fn new(handle: Handle) -> Self {
        WorkerScheduler { handle }
    }

    /// Uses the runtime the caller is running in.
    pub fn current() -> Result<Self, PipelineError> {
        Ok(Self::new(Handle::try_current()?))
    }
}

impl Scheduler for WorkerScheduler {
    fn schedule(&self, task: Task) {
        // Detached; completion is reported by the task itself.
        drop(self.handle.spawn_blocking(task));
    }
}

/// Creates the owner context: a scheduler that posts tasks and the loop that runs
/// them, one at a time, in posting order.
///
/// The loop can be driven by a dedicated task (`run`) or pumped by hand from a
/// thread that already owns the state (`run_pending`).
pub fn owner_context() -> (OwnerScheduler, OwnerLoop) {
    let (tx, rx) = mpsc::unbounded_channel();
    (OwnerScheduler { tx }, OwnerLoop { rx })
}

/// Posting side of the owner context.
#[derive(Debug, Clone)]
pub struct OwnerScheduler {
    tx: mpsc::UnboundedSender<Task>,
}

impl Scheduler for OwnerScheduler {
    fn schedule(&self, task: Task) {
        if self.tx.send(task).is_err() {
            trace!("owner loop has shut down, task dropped");
        }
    }
}

/// Running side of the owner context.
#[derive(Debug)]
pub struct OwnerLoop {
    rx: mpsc::UnboundedReceiver<Task>,
}

impl OwnerLoop {
    /// Runs posted tasks until every `OwnerScheduler` has been dropped.
    pub async fn run(mut self) {
        while let Some(task) = self.rx.recv().await {
            task();
        }
        trace!("owner loop finished");
    }

    /// Runs the tasks posted so far without waiting for new ones. Returns how many
    /// tasks ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }
}
