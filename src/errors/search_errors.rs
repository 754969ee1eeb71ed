use thiserror::Error;

/// Failure of a single remote search.
///
/// A failed search is reported to the result sink as its own signal. It is never
/// folded into an empty result set, which is a valid answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("server responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded into the expected shape.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// The search backend refused to serve the query.
    #[error("search unavailable: {0}")]
    Unavailable(String),
}

impl SearchError {
    /// Returns `true` for failures that happened before any response arrived.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
