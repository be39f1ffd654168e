//! Error types shared by the countdown core and the persistence layer.

/// Failures talking to a key-value backend. Never fatal: callers log these and
/// fall back to defaults.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No backend at all (private browsing, storage disabled, no window).
    #[error("storage unavailable")]
    Unavailable,
    /// The backend rejected the operation (quota, security error, ...).
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("malformed stored record: {0}")]
    Json(#[from] serde_json::Error),
    /// A stored value decoded but holds nonsense.
    #[error("corrupt stored value: {0}")]
    Corrupt(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CountdownError {
    /// Target could not be parsed or is not a finite instant.
    #[error("invalid target date/time: {0:?}")]
    InvalidTarget(String),
    /// A countdown started from the form must end in the future.
    #[error("please select a future date and time")]
    TargetInPast,
    /// Pause / resume requested with no countdown running.
    #[error("no countdown is running")]
    NoCountdown,
}
