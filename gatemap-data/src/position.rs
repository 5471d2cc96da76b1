//! Position source for hosts without device location.

use std::cell::Cell;

use async_trait::async_trait;
use gatemap_core::{Coordinate, LocationError, PositionOptions, PositionProvider};
use log::debug;

/// A [`PositionProvider`] that always reports the same coordinate.
///
/// Built without a coordinate it behaves like a device with no location
/// hardware: authorisation fails with [`LocationError::PermissionUnavailable`].
///
/// # Examples
///
/// ```
/// use gatemap_core::{Coordinate, PositionOptions, PositionProvider};
/// use gatemap_data::FixedPositionProvider;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let here = Coordinate::new(32.07, 34.78).expect("valid");
/// let provider = FixedPositionProvider::new(Some(here));
/// let fix = provider
///     .current_position(PositionOptions::default())
///     .await
///     .expect("fixed position");
/// assert_eq!(fix, here);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct FixedPositionProvider {
    coordinate: Option<Coordinate>,
    observing: Cell<bool>,
}

impl FixedPositionProvider {
    /// Create a provider reporting `coordinate`.
    #[must_use]
    pub const fn new(coordinate: Option<Coordinate>) -> Self {
        Self {
            coordinate,
            observing: Cell::new(false),
        }
    }

    /// Whether observation is active.
    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.observing.get()
    }

    fn available(&self) -> Result<Coordinate, LocationError> {
        self.coordinate.ok_or(LocationError::PermissionUnavailable)
    }
}

#[async_trait(?Send)]
impl PositionProvider for FixedPositionProvider {
    async fn request_authorization(&self) -> Result<(), LocationError> {
        self.available().map(|_| ())
    }

    async fn current_position(
        &self,
        options: PositionOptions,
    ) -> Result<Coordinate, LocationError> {
        debug!("fixed position requested with {options:?}");
        self.available()
    }

    fn start_observing(&self) -> Result<(), LocationError> {
        self.available()?;
        self.observing.set(true);
        Ok(())
    }

    fn stop_observing(&self) {
        self.observing.set(false);
    }
}
