//! A button that counts its clicks. Each click is pushed into a `Subject`, and a
//! `map` turns clicks into the running count shown to the user.
//!
//! To run this example, execute `cargo run --example counter_subject`.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use rxsearch::{
    subjects::Subject, subscribe::Subscriber, ObservableExt, Observer, Subscribeable,
};

fn main() {
    let (mut clicks, counter) = Subject::emitter_receiver();
    let count = Arc::new(AtomicU64::new(0));

    let mut label = Subscriber::on_next(|n: u64| println!("Count: {n}"));
    label.on_complete(|| println!("button removed"));

    let subscription = counter
        .clone()
        .map(move |_: ()| count.fetch_add(1, Ordering::SeqCst) + 1)
        .subscribe(label);

    for _ in 0..3 {
        clicks.next(());
    }

    clicks.complete();

    // A completed subject drops its observers and ignores further clicks.
    clicks.next(());
    println!("observers left: {}", counter.len());
    subscription.release();
}
