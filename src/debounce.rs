//! Quiescence-window debouncing with a single cancellable timer.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{runtime::Handle, task::JoinHandle};

use crate::sync::LockExt;

type ForwardFn<T> = Box<dyn Fn(T) + Send + Sync>;

/// Forwards a value only after `window` has elapsed without a newer one.
///
/// Each `push` aborts the outstanding timer, replaces the pending value and arms a
/// fresh timer, so at most one timer is alive at any time. A timer that already
/// woke up re-checks a generation counter before forwarding, which closes the race
/// with a concurrent `push` or `cancel`.
pub struct Debouncer<T> {
    window: Duration,
    handle: Handle,
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    forward: ForwardFn<T>,
}

struct Slot<T> {
    generation: u64,
    pending: Option<T>,
    timer: Option<JoinHandle<()>>,
    cancelled: bool,
}

impl<T: Send + 'static> Debouncer<T> {
    /// `forward` runs on a runtime worker thread each time a window elapses.
    pub fn new(window: Duration, handle: Handle, forward: impl Fn(T) + Send + Sync + 'static) -> Self {
        Debouncer {
            window,
            handle,
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    generation: 0,
                    pending: None,
                    timer: None,
                    cancelled: false,
                }),
                forward: Box::new(forward),
            }),
        }
    }

    /// Accepts a new value and restarts the window. Returns `false` once cancelled.
    pub fn push(&self, value: T) -> bool {
        let mut slot = self.shared.slot.locked();
        if slot.cancelled {
            return false;
        }
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.generation += 1;
        slot.pending = Some(value);

        let generation = slot.generation;
        let shared = Arc::clone(&self.shared);
        let window = self.window;
        slot.timer = Some(self.handle.spawn(async move {
            tokio::time::sleep(window).await;
            let value = {
                let mut slot = shared.slot.locked();
                if slot.cancelled || slot.generation != generation {
                    return;
                }
                slot.timer = None;
                slot.pending.take()
            };
            if let Some(value) = value {
                (shared.forward)(value);
            }
        }));
        true
    }

    /// Disarms the timer and hands back the pending value without forwarding it.
    pub fn flush(&self) -> Option<T> {
        let mut slot = self.shared.slot.locked();
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.generation += 1;
        slot.pending.take()
    }
}

impl<T> Debouncer<T> {
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns `true` while a value is waiting for its window to elapse.
    pub fn is_pending(&self) -> bool {
        self.shared.slot.locked().pending.is_some()
    }

    /// Permanently stops the debouncer. A pending value is discarded and later
    /// pushes are refused.
    pub fn cancel(&self) {
        let mut slot = self.shared.slot.locked();
        slot.cancelled = true;
        slot.pending = None;
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.slot.locked().cancelled
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(timer) = self.shared.slot.locked().timer.take() {
            timer.abort();
        }
    }
}
