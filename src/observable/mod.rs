//! The `observable` module provides the building blocks for creating and chaining
//! observables: value sources, the operators the tutorial screens use, and the two
//! scheduler hops (`subscribe_on`, `observe_on`).

use std::{
    error::Error,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use tokio::runtime::Handle;

use crate::{
    debounce::Debouncer,
    errors::PipelineError,
    observer::Observer,
    scheduler::Scheduler,
    subscription::subscribe::{
        Subscribeable, Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic,
    },
    sync::LockExt,
};

type SubscribeFn<T> = Box<dyn FnMut(Subscriber<T>) -> Subscription + Send + Sync>;

/// A cold source of values.
///
/// Nothing happens until `subscribe` is called; every subscription runs the
/// subscribe function again.
///
/// # Example: list binding
///
/// ```no_run
/// use rxsearch::{subscribe::Subscriber, Observable, Subscribeable};
///
/// let colors = vec!["blue".to_string(), "green".to_string()];
/// Observable::just(colors).subscribe(Subscriber::on_next(|colors: Vec<String>| {
///     for c in colors {
///         println!("{c}");
///     }
/// }));
/// ```
///
/// # Example: fetch off the owner context
///
/// ```no_run
/// use rxsearch::{
///     scheduler::{owner_context, WorkerScheduler},
///     search::DemoRestClient,
///     subscribe::Subscriber,
///     Observable, ObservableExt, SearchError, Subscribeable,
/// };
///
/// #[tokio::main]
/// async fn main() {
///     let client = DemoRestClient::new(std::time::Duration::from_millis(300));
///     let (owner, owner_loop) = owner_context();
///
///     let subscription = Observable::from_callable(move || {
///         Ok::<_, SearchError>(client.favorite_tv_shows())
///     })
///     .subscribe_on(WorkerScheduler::current().unwrap())
///     .observe_on(owner)
///     .subscribe(Subscriber::on_next(|shows: Vec<String>| println!("{shows:?}")));
///
///     tokio::spawn(owner_loop.run());
///     tokio::time::sleep(std::time::Duration::from_millis(500)).await;
///     subscription.release();
/// }
/// ```
pub struct Observable<T> {
    subscribe_fn: SubscribeFn<T>,
}

impl<T: 'static> Observable<T> {
    /// Creates a new `Observable` from a subscribe function.
    ///
    /// The function is invoked with the `Subscriber` on each subscription and must
    /// return the `Subscription` that releases whatever it started.
    pub fn new(sf: impl FnMut(Subscriber<T>) -> Subscription + Send + Sync + 'static) -> Self {
        Observable {
            subscribe_fn: Box::new(sf),
        }
    }

    /// Emits `value` once and completes.
    pub fn just(value: T) -> Self
    where
        T: Clone + Send + Sync,
    {
        Observable::new(move |mut o| {
            o.next(value.clone());
            o.complete();
            Subscription::empty()
        })
    }

    /// Calls `producer` for every subscriber. Emits its value and completes, or
    /// forwards its error.
    pub fn from_callable<F, E>(producer: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        E: Error + Send + Sync + 'static,
    {
        Observable::new(move |mut o| {
            match producer() {
                Ok(v) => {
                    o.next(v);
                    o.complete();
                }
                Err(e) => o.error(Arc::new(e)),
            }
            Subscription::empty()
        })
    }
}

/// The `ObservableExt` trait provides the operators that can be chained on any
/// `Subscribeable`, observables and subject receivers alike.
pub trait ObservableExt<T: 'static>: Subscribeable<ObsType = T> {
    /// Transforms every item with `f`.
    fn map<U, F>(mut self, f: F) -> Observable<U>
    where
        Self: Sized + Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
        U: 'static,
    {
        let f = Arc::new(f);
        Observable::new(move |o| {
            let o_shared = Arc::new(Mutex::new(o));
            let o_cloned_e = Arc::clone(&o_shared);
            let o_cloned_c = Arc::clone(&o_shared);
            let f = Arc::clone(&f);

            let u = Subscriber::new(
                move |v| {
                    let t = f(v);
                    o_shared.locked().next(t);
                },
                move |observable_error| {
                    o_cloned_e.locked().error(observable_error);
                },
                move || {
                    o_cloned_c.locked().complete();
                },
            );
            self.subscribe(u)
        })
    }

    /// Lets through only the items for which `predicate` returns `true`.
    fn filter<P>(mut self, predicate: P) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        Observable::new(move |o| {
            let o_shared = Arc::new(Mutex::new(o));
            let o_cloned_e = Arc::clone(&o_shared);
            let o_cloned_c = Arc::clone(&o_shared);
            let predicate = Arc::clone(&predicate);

            let u = Subscriber::new(
                move |v| {
                    if predicate(&v) {
                        o_shared.locked().next(v);
                    }
                },
                move |observable_error| {
                    o_cloned_e.locked().error(observable_error);
                },
                move || {
                    o_cloned_c.locked().complete();
                },
            );
            self.subscribe(u)
        })
    }

    /// Emits an item only after `window` has passed without another one.
    ///
    /// When the source completes, a still pending item is emitted right away before
    /// the completion. An error discards the pending item. Must be subscribed inside
    /// a Tokio runtime; otherwise the subscriber receives `PipelineError::NoRuntime`.
    fn debounce(mut self, window: Duration) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
        T: Send,
    {
        Observable::new(move |o| {
            let o_shared = Arc::new(Mutex::new(o));

            let handle = match Handle::try_current() {
                Ok(handle) => handle,
                Err(e) => {
                    o_shared.locked().error(Arc::new(PipelineError::NoRuntime(e)));
                    return Subscription::empty();
                }
            };

            let forward_to = Arc::clone(&o_shared);
            let debouncer = Arc::new(Debouncer::new(window, handle, move |v| {
                forward_to.locked().next(v);
            }));
            let d_next = Arc::clone(&debouncer);
            let d_error = Arc::clone(&debouncer);
            let d_complete = Arc::clone(&debouncer);
            let o_cloned_e = Arc::clone(&o_shared);
            let o_cloned_c = Arc::clone(&o_shared);

            let u = Subscriber::new(
                move |v| {
                    d_next.push(v);
                },
                move |observable_error| {
                    d_error.cancel();
                    o_cloned_e.locked().error(observable_error);
                },
                move || {
                    let last = d_complete.flush();
                    d_complete.cancel();
                    let mut o = o_cloned_c.locked();
                    if let Some(last) = last {
                        o.next(last);
                    }
                    o.complete();
                },
            );

            let mut upstream = self.subscribe(u);
            let join_handle = upstream.take_handle();
            Subscription::new(
                UnsubscribeLogic::Logic(Box::new(move || {
                    debouncer.cancel();
                    upstream.release();
                })),
                join_handle,
            )
        })
    }

    /// Performs the subscription itself, and so any synchronous work the source does
    /// on subscribe, on `scheduler`.
    fn subscribe_on<S>(self, scheduler: S) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
        S: Scheduler + 'static,
    {
        let source = Arc::new(Mutex::new(self));
        let scheduler = Arc::new(scheduler);
        Observable::new(move |o| {
            let source = Arc::clone(&source);
            let upstream: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
            let released = Arc::new(AtomicBool::new(false));
            let up = Arc::clone(&upstream);
            let rel = Arc::clone(&released);

            scheduler.schedule(Box::new(move || {
                if rel.load(Ordering::SeqCst) {
                    return;
                }
                let subscription = source.locked().subscribe(o);
                let mut slot = up.locked();
                if rel.load(Ordering::SeqCst) {
                    drop(slot);
                    subscription.release();
                } else {
                    *slot = Some(subscription);
                }
            }));

            Subscription::new(
                UnsubscribeLogic::Logic(Box::new(move || {
                    released.store(true, Ordering::SeqCst);
                    let subscription = upstream.locked().take();
                    if let Some(subscription) = subscription {
                        subscription.release();
                    }
                })),
                SubscriptionHandle::Nil,
            )
        })
    }

    /// Re-delivers every notification on `scheduler`.
    ///
    /// Ordering is preserved when the scheduler runs tasks in posting order, as the
    /// owner context does. Notifications still queued when the subscription is
    /// released are dropped.
    fn observe_on<S>(mut self, scheduler: S) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
        S: Scheduler + 'static,
        T: Send,
    {
        let scheduler = Arc::new(scheduler);
        Observable::new(move |o| {
            let o_shared = Arc::new(Mutex::new(o));
            let released = Arc::new(AtomicBool::new(false));

            let (on, oe, oc) = (
                Arc::clone(&o_shared),
                Arc::clone(&o_shared),
                Arc::clone(&o_shared),
            );
            let (sn, se, sc) = (
                Arc::clone(&scheduler),
                Arc::clone(&scheduler),
                Arc::clone(&scheduler),
            );
            let (rn, re, rc) = (
                Arc::clone(&released),
                Arc::clone(&released),
                Arc::clone(&released),
            );

            let u = Subscriber::new(
                move |v| {
                    let o = Arc::clone(&on);
                    let released = Arc::clone(&rn);
                    sn.schedule(Box::new(move || {
                        if !released.load(Ordering::SeqCst) {
                            o.locked().next(v);
                        }
                    }));
                },
                move |observable_error| {
                    let o = Arc::clone(&oe);
                    let released = Arc::clone(&re);
                    se.schedule(Box::new(move || {
                        if !released.load(Ordering::SeqCst) {
                            o.locked().error(observable_error);
                        }
                    }));
                },
                move || {
                    let o = Arc::clone(&oc);
                    let released = Arc::clone(&rc);
                    sc.schedule(Box::new(move || {
                        if !released.load(Ordering::SeqCst) {
                            o.locked().complete();
                        }
                    }));
                },
            );

            let mut upstream = self.subscribe(u);
            let join_handle = upstream.take_handle();
            Subscription::new(
                UnsubscribeLogic::Logic(Box::new(move || {
                    released.store(true, Ordering::SeqCst);
                    upstream.release();
                })),
                join_handle,
            )
        })
    }
}

impl<T: 'static> Subscribeable for Observable<T> {
    type ObsType = T;

    fn subscribe(&mut self, v: Subscriber<Self::ObsType>) -> Subscription {
        (self.subscribe_fn)(v)
    }
}

impl<O, T: 'static> ObservableExt<T> for O where O: Subscribeable<ObsType = T> {}
