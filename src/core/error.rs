//! Error types for booking operations.

use std::time::Duration;

use thiserror::Error;

/// Errors produced by the booking session and its collaborators.
///
/// Capacity rejections are deliberately *not* represented here: an admission
/// rejection is an expected outcome surfaced to the operator through
/// [`crate::core::admission::Decision`], never an error.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Record store unreachable or an operation failed inside it.
    #[error("record store error: {0}")]
    Store(String),
    /// Transport-level failure in the remote backend.
    #[error("transport error: {0}")]
    Transport(String),
    /// A record violated the expected field contract.
    #[error("malformed record: {0}")]
    Record(String),
    /// Configuration document missing or unparseable.
    #[error("config error: {0}")]
    Config(String),
    /// An external call exceeded the configured deadline.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
    /// Submission or deletion requested while no edit is in progress.
    #[error("no edit in progress")]
    NoActiveEdit,
    /// Deletion requested without a persisted booking selected.
    #[error("no booking selected")]
    NoSelection,
    /// No record with the given id is known to the store or the session.
    #[error("record not found: {0}")]
    NotFound(String),
}

impl BookingError {
    /// Whether the failed operation is safe and sensible to retry.
    ///
    /// Timeouts and collaborator failures are transient; lifecycle misuse and
    /// malformed data are not.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Store(_) | Self::Transport(_) | Self::Timeout(_)
        )
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_terse_and_specific() {
        let err = BookingError::Store("connection refused".into());
        assert_eq!(format!("{err}"), "record store error: connection refused");

        let err = BookingError::NoSelection;
        assert_eq!(format!("{err}"), "no booking selected");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(BookingError::Timeout(Duration::from_secs(5)).is_retryable());
        assert!(BookingError::Store("down".into()).is_retryable());
        assert!(!BookingError::NoActiveEdit.is_retryable());
        assert!(!BookingError::Record("missing Date".into()).is_retryable());
    }
}
