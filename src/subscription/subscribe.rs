use std::{
    any::Any,
    error::Error,
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
};

use tokio::runtime;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::{observer::Observer, sync::LockExt};

/// Sources an observer can attach to: observables, subject receivers and
/// everything built from them with operators.
pub trait Subscribeable {
    type ObsType;

    /// Attaches `s` and returns the handle that detaches it again. The handle can
    /// also await the task driving the source, if there is one.
    fn subscribe(&mut self, s: Subscriber<Self::ObsType>) -> Subscription;
}

/// Handles that can be torn down for good.
pub trait Unsubscribeable {
    /// Consumes the handle and stops the flow it controls.
    fn unsubscribe(self);
}

type NextFn<T> = Box<dyn FnMut(T) + Send>;
type CompleteFn = Box<dyn FnMut() + Send>;
type ErrorFn = Box<dyn FnMut(Arc<dyn Error + Send + Sync>) + Send>;

/// Observer made of plain closures: one for values, and optionally one each for
/// the error and the completion.
///
/// After the first error or completion every further notification is ignored.
pub struct Subscriber<NextFnType> {
    next_fn: NextFn<NextFnType>,
    complete_fn: Option<CompleteFn>,
    error_fn: Option<ErrorFn>,
    completed: bool,
    errored: bool,
}

impl<NextFnType> Subscriber<NextFnType> {
    /// Builds a subscriber that reacts to all three kinds of notification.
    pub fn new(
        next_fn: impl FnMut(NextFnType) + 'static + Send,
        error_fn: impl FnMut(Arc<dyn Error + Send + Sync>) + 'static + Send,
        complete_fn: impl FnMut() + 'static + Send,
    ) -> Self {
        Subscriber {
            next_fn: Box::new(next_fn),
            complete_fn: Some(Box::new(complete_fn)),
            error_fn: Some(Box::new(error_fn)),
            completed: false,
            errored: false,
        }
    }

    /// Builds a subscriber that only cares about values. Errors and completion are
    /// swallowed unless handlers are added later.
    pub fn on_next(next_fn: impl FnMut(NextFnType) + 'static + Send) -> Self {
        Subscriber {
            next_fn: Box::new(next_fn),
            complete_fn: None,
            error_fn: None,
            completed: false,
            errored: false,
        }
    }

    /// Installs or replaces the completion handler.
    pub fn on_complete(&mut self, complete_fn: impl FnMut() + 'static + Send) {
        self.complete_fn = Some(Box::new(complete_fn));
    }

    /// Installs or replaces the error handler.
    pub fn on_error(&mut self, error_fn: impl FnMut(Arc<dyn Error + Send + Sync>) + 'static + Send) {
        self.error_fn = Some(Box::new(error_fn));
    }

    /// Returns `true` once the subscriber has seen an error or a completion.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.completed || self.errored
    }
}

impl<T> Observer for Subscriber<T> {
    type NextFnType = T;

    fn next(&mut self, v: Self::NextFnType) {
        if self.is_stopped() {
            return;
        }
        (self.next_fn)(v);
    }

    fn error(&mut self, observable_error: Arc<dyn Error + Send + Sync>) {
        if self.is_stopped() {
            return;
        }
        self.errored = true;
        if let Some(efn) = &mut self.error_fn {
            (efn)(observable_error);
        }
    }

    fn complete(&mut self) {
        if self.is_stopped() {
            return;
        }
        self.completed = true;
        if let Some(cfn) = &mut self.complete_fn {
            (cfn)();
        }
    }
}

/// Handles used by a `Subscription` to await the work driving an observable.
pub enum SubscriptionHandle {
    /// Nothing to await.
    Nil,

    /// The source runs on a Tokio task.
    JoinTask(JoinHandle<()>),
}

/// Represents a subscription to an observable, a subject or a search pipeline.
///
/// Releasing is idempotent: the unsubscribe logic runs the first time `release` is
/// called and every later call is a no-op. Dropping a `Subscription` does not
/// release it.
pub struct Subscription {
    unsubscribe_logic: Mutex<Option<UnsubscribeLogic>>,
    pub(crate) subscription_future: SubscriptionHandle,
    runtime_handle: Option<runtime::Handle>,
}

impl Subscription {
    /// Pairs teardown logic with the handle of whatever drives the source.
    ///
    /// The Tokio runtime current at construction time, if any, is captured and used
    /// to run `UnsubscribeLogic::Future`.
    #[must_use]
    pub fn new(
        unsubscribe_logic: UnsubscribeLogic,
        subscription_future: SubscriptionHandle,
    ) -> Self {
        Subscription {
            unsubscribe_logic: Mutex::new(Some(unsubscribe_logic)),
            subscription_future,
            runtime_handle: runtime::Handle::try_current().ok(),
        }
    }

    /// A subscription with nothing to release and nothing to await.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(UnsubscribeLogic::Nil, SubscriptionHandle::Nil)
    }

    /// Runs the unsubscribe logic once. Safe to call any number of times, from any
    /// thread, including from inside a callback the subscription drives.
    pub fn release(&self) {
        let logic = self.unsubscribe_logic.locked().take();
        if let Some(logic) = logic {
            logic.run(self.runtime_handle.as_ref());
        }
    }

    /// Returns `true` once `release` (or `unsubscribe`) has been called.
    pub fn is_unsubscribed(&self) -> bool {
        self.unsubscribe_logic.locked().is_none()
    }

    pub(crate) fn take_handle(&mut self) -> SubscriptionHandle {
        std::mem::replace(&mut self.subscription_future, SubscriptionHandle::Nil)
    }

    /// Awaits the completion of the Tokio task associated with this subscription.
    ///
    /// # Errors
    ///
    /// Returns an error if the awaited task panicked or was aborted.
    pub async fn join_concurrent(self) -> Result<(), Box<dyn Any + Send>> {
        match self.subscription_future {
            SubscriptionHandle::JoinTask(task_handle) => task_handle
                .await
                .map_err(|e| Box::new(e) as Box<dyn Any + Send>),
            SubscriptionHandle::Nil => Ok(()),
        }
    }
}

impl Unsubscribeable for Subscription {
    fn unsubscribe(self) {
        self.release();
    }
}

/// What releasing a `Subscription` does.
pub enum UnsubscribeLogic {
    Nil,

    /// Releases another subscription.
    Wrapped(Box<Subscription>),

    /// Runs a closure on the releasing thread.
    Logic(Box<dyn FnOnce() + Send>),

    /// Spawns a future on the runtime the subscription was created in.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

impl UnsubscribeLogic {
    fn run(self, runtime_handle: Option<&runtime::Handle>) {
        match self {
            UnsubscribeLogic::Nil => (),
            UnsubscribeLogic::Logic(fnc) => fnc(),
            UnsubscribeLogic::Wrapped(subscription) => subscription.release(),
            UnsubscribeLogic::Future(future) => match runtime_handle {
                Some(handle) => {
                    handle.spawn(future);
                }
                None => {
                    warn!("asynchronous unsubscribe logic dropped, subscription was created outside of a Tokio runtime");
                }
            },
        }
    }
}
