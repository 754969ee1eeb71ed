use thiserror::Error;

/// Raised by tests standing in for an input field that went away.
#[derive(Debug, Error)]
#[error("input field detached")]
pub struct DetachedInput;
