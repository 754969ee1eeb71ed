//! Provides structures and traits related to subscription management.
//!
//! This module includes types such as `Subscriber` for handling observed values,
//! errors, and completions, as well as `Subscription` for releasing the connection
//! between a source and its observer.
pub mod subscribe;
