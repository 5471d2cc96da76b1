//! Persistent recent-places history.
//!
//! The history lives in a single-table `SQLite` key/value store. The list is
//! serialised to JSON under [`gatemap_core::RECENT_PLACES_KEY`], so other
//! readers of the same database see one self-describing blob.

mod sqlite;

pub use sqlite::{RecencyStoreOpenError, SqliteRecencyStore};
