//! Places provider trait.

use async_trait::async_trait;

use crate::{PlaceCandidate, PlaceDetail};

use super::error::PlacesError;

/// Fetch autocomplete suggestions, details and photos for places.
///
/// Futures are not required to be `Send`: controllers drive them on a single
/// cooperative event loop.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use gatemap_core::{Coordinate, PlaceCandidate, PlaceDetail, PlacesError, PlacesProvider};
///
/// struct OnePlace;
///
/// #[async_trait(?Send)]
/// impl PlacesProvider for OnePlace {
///     async fn autocomplete(&self, query: &str) -> Result<Vec<PlaceCandidate>, PlacesError> {
///         Ok(vec![PlaceCandidate::new("p1", format!("{query}, Main St"))])
///     }
///
///     async fn details(&self, place_id: &str) -> Result<PlaceDetail, PlacesError> {
///         let coordinate = Coordinate::new(0.0, 0.0).map_err(|err| PlacesError::Parse {
///             message: err.to_string(),
///         })?;
///         Ok(PlaceDetail::new(place_id, "Cafe", "Main St", coordinate))
///     }
///
///     async fn resolve_photo_url(&self, _reference: &str) -> Result<String, PlacesError> {
///         Err(PlacesError::PhotoUnavailable)
///     }
/// }
/// ```
#[async_trait(?Send)]
pub trait PlacesProvider {
    /// Return suggestions for `query`, in provider ranking order.
    ///
    /// A query with no matches yields an empty vector rather than an error.
    async fn autocomplete(&self, query: &str) -> Result<Vec<PlaceCandidate>, PlacesError>;

    /// Resolve `place_id` to a full [`PlaceDetail`].
    ///
    /// Implementations must return [`PlacesError::NotFound`] when the
    /// provider has no record of the identifier.
    async fn details(&self, place_id: &str) -> Result<PlaceDetail, PlacesError>;

    /// Turn a photo reference into a fetchable URL.
    ///
    /// Implementations must return [`PlacesError::PhotoUnavailable`] when
    /// `reference` is empty.
    async fn resolve_photo_url(&self, reference: &str) -> Result<String, PlacesError>;
}
