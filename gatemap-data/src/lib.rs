//! Adapters connecting the gatemap core to the outside world.
//!
//! - [`places`] talks to the places provider over HTTP and ships a stub
//!   provider for tests.
//! - [`recency`] persists the recent-places history in `SQLite`.
//! - [`gates`] loads the static gate markers.
//! - [`position`] provides a fixed-coordinate position source for hosts
//!   without device location.
#![forbid(unsafe_code)]

pub mod gates;
pub mod places;
pub mod position;
#[cfg(feature = "store-sqlite")]
pub mod recency;

pub use gates::{GateConfigError, default_gates, load_gates};
#[cfg(feature = "http")]
pub use places::{ClientBuildError, HttpPlacesClient, HttpPlacesClientConfig};
pub use position::FixedPositionProvider;
#[cfg(feature = "store-sqlite")]
pub use recency::{RecencyStoreOpenError, SqliteRecencyStore};
