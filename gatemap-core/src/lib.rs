//! Core domain types for the gatemap engine.
//!
//! These models provide basic validation to keep downstream
//! components honest. Constructors return `Result` to surface
//! invalid input early, and deserialisation applies the same checks.
//!
//! The crate also defines the seams to the outside world: the
//! [`PlacesProvider`] trait for the text-search provider, the
//! [`PositionProvider`] trait for device location, and the
//! [`RecencyStore`] trait for the persisted history of chosen places.

pub mod coordinate;
pub mod location;
pub mod place;
pub mod places;
pub mod recency;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use coordinate::{
    Coordinate, CoordinateError, DEFAULT_REGION_DELTA, MAX_REGION_DELTA, Region, RegionError,
};
pub use location::{LocationError, ObservationGuard, PositionOptions, PositionProvider, observe};
pub use place::{GateMarker, OpeningHours, PlaceCandidate, PlaceDetail};
pub use places::{PlacesError, PlacesProvider};
pub use recency::{RECENT_PLACES_KEY, RecencyError, RecencyStore};
