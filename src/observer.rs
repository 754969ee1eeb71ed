use std::{error::Error, sync::Arc};

/// Receives the notifications an `Observable` or a `Subject` emits.
///
/// A well behaved source calls `next` any number of times and then at most one of
/// `error` or `complete`.
pub trait Observer {
    /// The type of items delivered through `next`.
    type NextFnType;

    fn next(&mut self, _: Self::NextFnType);
    fn error(&mut self, _: Arc<dyn Error + Send + Sync>);
    fn complete(&mut self);
}
