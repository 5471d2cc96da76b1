use std::time::Duration;

use thiserror::Error;

/// Errors from [`crate::location::PositionProvider`] calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The user declined the permission prompt.
    #[error("location permission was denied")]
    PermissionDenied,
    /// The platform cannot ask for permission, e.g. after a permanent denial.
    #[error("location permission cannot be requested")]
    PermissionUnavailable,
    /// No fix arrived within the requested timeout.
    #[error("no position fix within {timeout:?}")]
    Timeout {
        /// Timeout that elapsed.
        timeout: Duration,
    },
    /// The platform could not determine a position.
    #[error("position unavailable: {message}")]
    PositionUnavailable {
        /// Platform-supplied explanation.
        message: String,
    },
}
