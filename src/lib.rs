//! Facade crate for the gatemap place-search engine.
//!
//! This crate re-exports the core domain types and the session controllers,
//! and exposes the HTTP places client and the `SQLite` recent-places store
//! behind feature flags.

#![forbid(unsafe_code)]

pub use gatemap_core::{
    Coordinate, CoordinateError, GateMarker, LocationError, ObservationGuard, OpeningHours,
    PlaceCandidate, PlaceDetail, PlacesError, PlacesProvider, PositionOptions, PositionProvider,
    RecencyError, RecencyStore, Region, RegionError,
};

pub use gatemap_session::{
    Camera, CameraAnimation, DetailView, Listing, Loadable, MapError, MapInteractionController,
    MapSettings, Overlay, PlaceChosen, QueryOutcome, RequestToken, Resolution,
    SearchSessionController, SearchStatus,
};

#[cfg(any(feature = "http", feature = "store-sqlite"))]
pub use gatemap_data::{FixedPositionProvider, GateConfigError, default_gates, load_gates};

#[cfg(feature = "http")]
pub use gatemap_data::{HttpPlacesClient, HttpPlacesClientConfig};

#[cfg(feature = "store-sqlite")]
pub use gatemap_data::{RecencyStoreOpenError, SqliteRecencyStore};
