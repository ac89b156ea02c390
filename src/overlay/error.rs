use thiserror::Error;

pub type Result<T> = std::result::Result<T, OverlayError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    /// The overlay left the document before a button resolved its wait.
    #[error("overlay was removed before a button was activated")]
    Removed,

    /// A newer `wait()` on the same overlay took over the subscription.
    #[error("wait was superseded by a newer wait on the same overlay")]
    Superseded,

    /// The resolving side was dropped without settling.
    #[error("deferred result was dropped without being resolved")]
    Abandoned,

    #[error("no input named `{0}`")]
    UnknownInput(String),

    #[error("invalid input definition: {0}")]
    InvalidInput(String),

    /// Failure reported by an external input collector.
    #[error("input collector failed: {0}")]
    Collector(String),
}
