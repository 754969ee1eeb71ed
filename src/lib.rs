//! `rxsearch` builds search-as-you-type flows out of small reactive pieces.
//!
//! The centrepiece is the [`SearchPipeline`](pipeline::SearchPipeline): raw input
//! values are debounced, searched with a blocking [`SearchService`](search::SearchService)
//! on a worker context, and the outcome is delivered on the owner context to a
//! [`ResultSink`](pipeline::ResultSink). The pipeline is released exactly once
//! through its [`Subscription`](subscribe::Subscription).
//!
//! Around it sits a compact reactive layer:
//! [`Observable`], the publish [`Subject`](subjects::Subject), [`Subscriber`](subscribe::Subscriber),
//! and the operators `map`, `filter`, `debounce`, `subscribe_on` and `observe_on`.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use rxsearch::{
//!     pipeline::{ListView, SearchPipeline},
//!     scheduler::owner_context,
//!     search::DemoRestClient,
//!     subjects::Subject,
//!     Observer,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), rxsearch::PipelineError> {
//!     let (owner, owner_loop) = owner_context();
//!     tokio::spawn(owner_loop.run());
//!
//!     let view = Arc::new(ListView::new());
//!     let pipeline = SearchPipeline::builder(Arc::new(DemoRestClient::default()), view.clone(), owner)
//!         .build()?;
//!
//!     let (mut input, mut changes) = Subject::emitter_receiver();
//!     let subscription = pipeline.subscribe_to(&mut changes);
//!
//!     input.next("New".to_string());
//!     input.next("New York".to_string());
//!     tokio::time::sleep(std::time::Duration::from_millis(600)).await;
//!
//!     println!("{:?}", view.snapshot().items);
//!     subscription.release();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod debounce;
mod errors;
pub mod observable;
pub mod observer;
pub mod pipeline;
pub mod scheduler;
pub mod search;
pub mod subjects;
mod subscription;
mod sync;

pub use errors::*;
pub use observable::{Observable, ObservableExt};
pub use observer::Observer;
pub use subjects::Subject;
pub use subscription::subscribe;
pub use subscription::subscribe::{Subscribeable, Unsubscribeable};
