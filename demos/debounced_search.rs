//! Simulates someone typing "New York" into a search field, pausing, then typing
//! "NY". Only values that stay unchanged for the debounce window are searched, and
//! the results are rendered on the owner context.
//!
//! To run this example, execute `cargo run --example debounced_search`.

use std::{sync::Arc, time::Duration};

use rxsearch::{
    pipeline::{ListView, SearchPipeline},
    scheduler::owner_context,
    search::DemoRestClient,
    subjects::Subject,
    Observer, PipelineError,
};
use tokio::time::sleep;

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    // The owner context renders results; drive it from its own task.
    let (owner, owner_loop) = owner_context();
    tokio::spawn(owner_loop.run());

    let view = Arc::new(ListView::new());
    let backend = DemoRestClient::new(Duration::from_millis(150));
    let pipeline = SearchPipeline::builder(Arc::new(backend), view.clone(), owner)
        .debounce(Duration::from_millis(400))
        .build()?;

    // The emitter plays the role of the input field's change listener.
    let (mut input, mut changes) = Subject::emitter_receiver();
    let subscription = pipeline.subscribe_to(&mut changes);

    for text in ["N", "Ne", "New", "New ", "New Y", "New Yo", "New Yor", "New York"] {
        input.next(text.to_string());
        sleep(Duration::from_millis(60)).await;
    }
    sleep(Duration::from_millis(700)).await;
    println!("after \"New York\": {:?}", view.snapshot().items);

    input.next("N".to_string());
    input.next("NY".to_string());
    sleep(Duration::from_millis(700)).await;
    let state = view.snapshot();
    println!(
        "after \"NY\": items {:?}, empty indicator shown: {}",
        state.items, state.empty_indicator_visible
    );

    subscription.release();
    println!("{:?}", pipeline.stats());
    Ok(())
}
