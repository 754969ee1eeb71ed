mod generate_observable;
mod register_emissions;

use std::{
    sync::{Arc, Mutex},
    thread::ThreadId,
    time::Duration,
};

use generate_observable::typed_keystrokes;
use register_emissions::Emissions;
use rxsearch::{
    scheduler::{owner_context, WorkerScheduler},
    subjects::Subject,
    subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic},
    Observable, ObservableExt, Observer, SearchError, Subscribeable,
};
use tokio::time::sleep;

#[tokio::test(flavor = "multi_thread")]
async fn debounce_emits_values_followed_by_a_pause() {
    let emissions = Emissions::new();

    let subscription = typed_keystrokes(&[
        ("N", 10),
        ("Ne", 10),
        ("New", 10),
        ("New Y", 300),
        ("New Yo", 10),
    ])
    .debounce(Duration::from_millis(100))
    .subscribe(emissions.subscriber());

    subscription.join_concurrent().await.unwrap();

    // "New Yo" is still pending when typing stops and is flushed on completion.
    assert_eq!(emissions.values(), vec!["New".to_string(), "New Yo".to_string()]);
    assert_eq!(emissions.complete_count(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn released_debounce_drops_pending_value() {
    let emissions = Emissions::new();
    let (mut input, changes) = Subject::emitter_receiver();

    let subscription = changes
        .clone()
        .debounce(Duration::from_millis(100))
        .subscribe(emissions.subscriber());

    input.next("Ber".to_string());
    sleep(Duration::from_millis(20)).await;
    subscription.release();
    input.next("Berlin".to_string());
    sleep(Duration::from_millis(250)).await;

    assert_eq!(emissions.next_count(), 0);
    assert!(changes.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn filter_and_map_over_keystrokes() {
    let emissions = Emissions::new();

    let subscription = typed_keystrokes(&[("T", 5), ("To", 5), ("Tok", 5), ("Toky", 5)])
        .filter(|text| text.len() >= 3)
        .map(|text| text.to_uppercase())
        .subscribe(emissions.subscriber());

    subscription.join_concurrent().await.unwrap();

    assert_eq!(emissions.values(), vec!["TOK".to_string(), "TOKY".to_string()]);
    assert_eq!(emissions.complete_count(), 1);
}

#[test]
fn observe_on_delivers_in_order_on_the_owner_loop() {
    let emissions = Emissions::new();
    let (owner, mut owner_loop) = owner_context();

    let source = Observable::new(|mut o: Subscriber<u32>| {
        for i in 0..5 {
            o.next(i);
        }
        o.complete();
        Subscription::empty()
    });
    source.observe_on(owner).subscribe(emissions.subscriber());

    // Nothing is delivered until the owner loop runs.
    assert_eq!(emissions.next_count(), 0);
    assert_eq!(owner_loop.run_pending(), 6);

    assert_eq!(emissions.values(), vec![0, 1, 2, 3, 4]);
    assert_eq!(emissions.complete_count(), 1);
}

#[test]
fn observe_on_drops_notifications_queued_before_release() {
    let emissions = Emissions::new();
    let (owner, mut owner_loop) = owner_context();

    let subscription = Observable::just("Paris")
        .observe_on(owner)
        .subscribe(emissions.subscriber());
    subscription.release();

    assert_eq!(owner_loop.run_pending(), 2);
    assert_eq!(emissions.next_count(), 0);
    assert_eq!(emissions.complete_count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn subscribe_on_runs_the_source_on_the_worker() {
    let emissions = Emissions::new();
    let source_thread: Arc<Mutex<Option<ThreadId>>> = Arc::new(Mutex::new(None));
    let source_thread_c = Arc::clone(&source_thread);

    let (owner, owner_loop) = owner_context();
    tokio::spawn(owner_loop.run());

    let subscription = Observable::from_callable(move || {
        *source_thread_c.lock().unwrap() = Some(std::thread::current().id());
        Ok::<_, SearchError>(vec!["Twin Peaks".to_string()])
    })
    .subscribe_on(WorkerScheduler::current().unwrap())
    .observe_on(owner)
    .subscribe(emissions.subscriber());

    sleep(Duration::from_millis(200)).await;

    let source_thread = source_thread.lock().unwrap().expect("source never ran");
    assert_ne!(source_thread, std::thread::current().id());
    assert_eq!(emissions.values(), vec![vec!["Twin Peaks".to_string()]]);
    assert_eq!(emissions.complete_count(), 1);
    subscription.release();
}

#[tokio::test(flavor = "multi_thread")]
async fn worker_failure_reaches_the_owner_as_error() {
    let emissions: Emissions<Vec<String>> = Emissions::new();
    let (owner, owner_loop) = owner_context();
    tokio::spawn(owner_loop.run());

    Observable::from_callable(|| Err(SearchError::Unavailable("rate limited".into())))
        .subscribe_on(WorkerScheduler::current().unwrap())
        .observe_on(owner)
        .subscribe(emissions.subscriber());

    sleep(Duration::from_millis(200)).await;

    assert_eq!(emissions.next_count(), 0);
    assert_eq!(
        *emissions.errors.lock().unwrap(),
        vec!["search unavailable: rate limited"]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn unsubscribe_logic_variants_run_once() {
    let (tx, rx) = tokio::sync::oneshot::channel();
    let future_logic = Subscription::new(
        UnsubscribeLogic::Future(Box::pin(async move {
            tx.send(()).unwrap();
        })),
        SubscriptionHandle::Nil,
    );

    let hits = Arc::new(Mutex::new(0));
    let hits_c = Arc::clone(&hits);
    let inner = Subscription::new(
        UnsubscribeLogic::Logic(Box::new(move || *hits_c.lock().unwrap() += 1)),
        SubscriptionHandle::Nil,
    );
    let wrapped = Subscription::new(
        UnsubscribeLogic::Wrapped(Box::new(inner)),
        SubscriptionHandle::Nil,
    );

    future_logic.release();
    wrapped.release();
    wrapped.release();

    rx.await.unwrap();
    assert_eq!(*hits.lock().unwrap(), 1);
    assert!(future_logic.is_unsubscribed());
}
