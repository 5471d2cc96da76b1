//! Position provider trait, request options and the observation guard.

use std::time::Duration;

use async_trait::async_trait;

use crate::Coordinate;

use super::error::LocationError;

/// Default timeout for a one-shot position request.
const DEFAULT_TIMEOUT_MS: u64 = 20_000;

/// Default age of a cached fix that may be reused.
const DEFAULT_MAX_CACHE_AGE_MS: u64 = 1_000;

/// Options for [`PositionProvider::current_position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    /// Ask the platform for a GPS-grade fix.
    pub high_accuracy: bool,
    /// Give up after this long.
    pub timeout: Duration,
    /// Accept a cached fix at most this old.
    pub max_cache_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: false,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_cache_age: Duration::from_millis(DEFAULT_MAX_CACHE_AGE_MS),
        }
    }
}

impl PositionOptions {
    /// Request a high-accuracy fix.
    #[must_use]
    pub const fn with_high_accuracy(mut self, high_accuracy: bool) -> Self {
        self.high_accuracy = high_accuracy;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Device location boundary.
///
/// Calling [`PositionProvider::request_authorization`] may show an OS
/// dialog; the platform decides whether it is shown more than once.
#[async_trait(?Send)]
pub trait PositionProvider {
    /// Ask the platform for location permission.
    async fn request_authorization(&self) -> Result<(), LocationError>;

    /// Return the best-effort current position.
    async fn current_position(&self, options: PositionOptions)
    -> Result<Coordinate, LocationError>;

    /// Start continuous observation of the device position.
    fn start_observing(&self) -> Result<(), LocationError>;

    /// Release every resource acquired by [`PositionProvider::start_observing`].
    ///
    /// Must be safe to call when observation is not active.
    fn stop_observing(&self);
}

/// Keeps position observation alive until dropped.
///
/// Dropping the guard stops observation on every exit path, including early
/// returns and unwinding.
#[must_use = "observation stops as soon as the guard is dropped"]
pub struct ObservationGuard<'a> {
    provider: &'a dyn PositionProvider,
}

impl std::fmt::Debug for ObservationGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservationGuard")
            .field("provider", &"<dyn PositionProvider>")
            .finish()
    }
}

impl Drop for ObservationGuard<'_> {
    fn drop(&mut self) {
        log::debug!("stopping position observation");
        self.provider.stop_observing();
    }
}

/// Start observing `provider`, returning a guard that stops it on drop.
///
/// # Errors
///
/// Propagates the provider's error when observation cannot start; nothing
/// needs releasing in that case.
pub fn observe(provider: &dyn PositionProvider) -> Result<ObservationGuard<'_>, LocationError> {
    provider.start_observing()?;
    Ok(ObservationGuard { provider })
}
