use std::{
    error::Error,
    mem,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use crate::{
    observer::Observer,
    subscription::subscribe::{
        Subscribeable, Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic,
        Unsubscribeable,
    },
    sync::LockExt,
    Observable,
};

/// A publish `Subject` multicasts every value pushed through its emitter to the
/// observers registered at that moment.
///
/// Nothing is replayed: an observer registered after a value was emitted never sees
/// that value. Once the subject completes or errors, observers registered later
/// receive only the terminal notification.
///
/// Observers are called without the subject lock held, so a callback may release any
/// subscription on the same subject, including its own.
///
/// Use `emitter_receiver` to obtain a [`SubjectEmitter`] for pushing values (for
/// example from an input field's change listener) and a [`SubjectReceiver`] to
/// subscribe to them.
///
/// # Examples
///
///```no_run
/// use rxsearch::{subjects::Subject, subscribe::Subscriber};
/// use rxsearch::{ObservableExt, Observer, Subscribeable};
///
/// let (mut input, changes) = Subject::emitter_receiver();
///
/// changes
///     .clone()
///     .map(|text: String| text.len())
///     .subscribe(Subscriber::on_next(|len| println!("length {len}")));
///
/// input.next("New".to_string());
/// input.next("New York".to_string());
/// input.complete();
///```
pub struct Subject<T> {
    observers: Vec<Registered<T>>,
    next_key: u64,
    completed: bool,
    closed: bool,
    error: Option<Arc<dyn Error + Send + Sync>>,
}

/// An observer attached to a subject. `active` is cleared on release, and an
/// emission already in progress skips observers whose flag is down.
struct Registered<T> {
    key: u64,
    active: Arc<AtomicBool>,
    subscriber: Arc<Mutex<Subscriber<T>>>,
}

impl<T> Registered<T> {
    fn share(&self) -> (Arc<AtomicBool>, Arc<Mutex<Subscriber<T>>>) {
        (Arc::clone(&self.active), Arc::clone(&self.subscriber))
    }
}

/// Calls `notify` on every observer that is still active.
fn notify_each<T>(
    targets: Vec<(Arc<AtomicBool>, Arc<Mutex<Subscriber<T>>>)>,
    mut notify: impl FnMut(&mut Subscriber<T>),
) {
    for (active, subscriber) in targets {
        if active.load(Ordering::Acquire) {
            notify(&mut *subscriber.locked());
        }
    }
}

impl<T: 'static> Subject<T> {
    /// Creates a subject and returns its two halves.
    pub fn emitter_receiver() -> (SubjectEmitter<T>, SubjectReceiver<T>) {
        let s = Arc::new(Mutex::new(Subject {
            observers: Vec::with_capacity(4),
            next_key: 0,
            completed: false,
            closed: false,
            error: None,
        }));

        (
            SubjectEmitter(Arc::clone(&s)),
            SubjectReceiver(Arc::clone(&s)),
        )
    }
}

/// Subscription side of a `Subject`.
///
/// Cloning is shallow; every clone registers observers on the same subject.
/// Calling `unsubscribe` closes the subject and drops all registered observers.
#[derive(Clone)]
pub struct SubjectReceiver<T>(Arc<Mutex<Subject<T>>>);

/// Emitting side of a `Subject`.
#[derive(Clone)]
pub struct SubjectEmitter<T>(Arc<Mutex<Subject<T>>>);

impl<T> SubjectReceiver<T> {
    /// Number of observers currently attached.
    pub fn len(&self) -> usize {
        self.0.locked().observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Send + 'static> Subscribeable for SubjectReceiver<T> {
    type ObsType = T;

    fn subscribe(&mut self, mut v: Subscriber<Self::ObsType>) -> Subscription {
        let (key, active) = {
            let mut src = self.0.locked();

            // A closed subject neither emits nor registers.
            if src.closed {
                return Subscription::empty();
            }
            if src.completed {
                let terminal = src.error.clone();
                drop(src);
                match terminal {
                    Some(err) => v.error(err),
                    None => v.complete(),
                }
                return Subscription::empty();
            }
            let key = src.next_key;
            src.next_key += 1;
            let active = Arc::new(AtomicBool::new(true));
            src.observers.push(Registered {
                key,
                active: Arc::clone(&active),
                subscriber: Arc::new(Mutex::new(v)),
            });
            (key, active)
        };

        let subject = Arc::clone(&self.0);

        Subscription::new(
            UnsubscribeLogic::Logic(Box::new(move || {
                active.store(false, Ordering::Release);
                subject.locked().observers.retain(|o| o.key != key);
            })),
            SubscriptionHandle::Nil,
        )
    }
}

impl<T> Unsubscribeable for SubjectReceiver<T> {
    fn unsubscribe(self) {
        let mut src = self.0.locked();
        src.closed = true;
        for o in src.observers.drain(..) {
            o.active.store(false, Ordering::Release);
        }
    }
}

impl<T: Clone> Observer for SubjectEmitter<T> {
    type NextFnType = T;

    fn next(&mut self, v: Self::NextFnType) {
        let targets: Vec<_> = {
            let src = self.0.locked();
            if src.completed || src.closed {
                return;
            }
            src.observers.iter().map(Registered::share).collect()
        };
        notify_each(targets, |o| o.next(v.clone()));
    }

    fn error(&mut self, e: Arc<dyn Error + Send + Sync>) {
        let observers = {
            let mut src = self.0.locked();
            if src.completed || src.closed {
                return;
            }
            src.completed = true;
            src.error = Some(Arc::clone(&e));
            mem::take(&mut src.observers)
        };
        let targets = observers.iter().map(Registered::share).collect();
        notify_each(targets, |o| o.error(Arc::clone(&e)));
    }

    fn complete(&mut self) {
        let observers = {
            let mut src = self.0.locked();
            if src.completed || src.closed {
                return;
            }
            src.completed = true;
            mem::take(&mut src.observers)
        };
        let targets = observers.iter().map(Registered::share).collect();
        notify_each(targets, |o| o.complete());
    }
}

impl<T: Clone + Send + 'static> From<SubjectEmitter<T>> for Subscriber<T> {
    fn from(value: SubjectEmitter<T>) -> Self {
        let mut on_value = value.clone();
        let mut on_error = value.clone();
        let mut on_complete = value;
        Subscriber::new(
            move |v| on_value.next(v),
            move |e| on_error.error(e),
            move || on_complete.complete(),
        )
    }
}

impl<T: Clone + Send + Sync + 'static> From<SubjectReceiver<T>> for Observable<T> {
    fn from(mut value: SubjectReceiver<T>) -> Self {
        Observable::new(move |subscriber| value.subscribe(subscriber))
    }
}
