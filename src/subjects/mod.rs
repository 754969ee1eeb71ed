//! The `subjects` module provides the publish `Subject`, the event source used to
//! feed raw input changes into observables and search pipelines.
//!
//! The subject is split into an emitter and a receiver with the
//! `emitter_receiver` function. The emitter behaves as an `Observer`, so it can be
//! handed to another observable's `subscribe`. The receiver behaves as an
//! `Observable`, so every operator can be applied to it.

mod subject;

pub use subject::*;
