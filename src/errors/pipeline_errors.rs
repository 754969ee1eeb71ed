use thiserror::Error;

/// Errors raised while wiring up a search pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Timers and the worker pool need a Tokio runtime to spawn onto.
    #[error("search pipeline must be built inside a Tokio runtime")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}
