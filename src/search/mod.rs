//! Remote search capabilities consumed by the query executor.
//!
//! A [`SearchService`] maps a query to a result set with a blocking call. The
//! pipeline always invokes it on the worker context.

mod demo;
mod github;
mod service_client;

pub use demo::*;
pub use github::*;
pub use service_client::*;

use crate::errors::SearchError;

/// A blocking function from query to ordered result set.
///
/// An empty result set is a valid answer and is reported separately from an error.
pub trait SearchService: Send + Sync {
    fn search(&self, query: &str) -> Result<Vec<String>, SearchError>;
}

impl<F> SearchService for F
where
    F: Fn(&str) -> Result<Vec<String>, SearchError> + Send + Sync,
{
    fn search(&self, query: &str) -> Result<Vec<String>, SearchError> {
        self(query)
    }
}
