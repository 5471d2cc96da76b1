//! Query an external text-search provider for places.
//!
//! The [`PlacesProvider`] trait abstracts autocomplete suggestions, place
//! details and photo URL resolution. Every call is a live round-trip: the
//! trait makes no promise of caching and callers must not expect retries.
//!
//! Callers are responsible for gating short queries; providers forward
//! whatever text they are given.

mod error;
mod provider;

pub use error::PlacesError;
pub use provider::PlacesProvider;
