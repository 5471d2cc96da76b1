//! Durable history of places the user has chosen.
//!
//! The [`RecencyStore`] trait exposes a deduplicated, insertion-ordered list
//! of [`PlaceCandidate`] values. Inserting a place whose identifier is already
//! present is a no-op: the existing entry keeps its position.
//!
//! Stores are synchronous. Every mutation is persisted before it returns,
//! and callers on the single event loop are serialised naturally.

use thiserror::Error;

use crate::PlaceCandidate;

/// Key under which the serialised history is stored.
pub const RECENT_PLACES_KEY: &str = "RECENT_PLACES";

/// Errors raised while reading or writing the history.
#[derive(Debug, Error)]
pub enum RecencyError {
    /// The backing storage rejected an operation.
    #[error("failed to {operation} recent places")]
    Storage {
        /// Description of the failed operation.
        operation: &'static str,
        /// Error reported by the storage backend.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The stored blob is not a valid list of places.
    #[error("stored recent places under {key} are corrupt")]
    Corrupt {
        /// Storage key that held the blob.
        key: &'static str,
        /// Decoder error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
}

/// Insertion-ordered, deduplicated store of previously chosen places.
pub trait RecencyStore {
    /// Add `candidate` unless an entry with the same place identifier exists.
    ///
    /// Returns `true` when the entry was added.
    fn insert(&self, candidate: &PlaceCandidate) -> Result<bool, RecencyError>;

    /// Return every entry in insertion order.
    fn list(&self) -> Result<Vec<PlaceCandidate>, RecencyError>;

    /// Remove every entry.
    fn clear(&self) -> Result<(), RecencyError>;
}

/// Append `candidate` to `entries` unless its identifier is already present.
///
/// When `capacity` is set and exceeded, the oldest entries are evicted. A
/// capacity of zero keeps nothing, so `entries` is left untouched.
/// Returns `true` when `entries` changed.
///
/// # Examples
///
/// ```
/// use gatemap_core::PlaceCandidate;
/// use gatemap_core::recency::push_unique;
///
/// let mut entries = vec![PlaceCandidate::new("p1", "Cafe")];
/// assert!(!push_unique(&mut entries, &PlaceCandidate::new("p1", "Cafe again"), None));
/// assert!(push_unique(&mut entries, &PlaceCandidate::new("p2", "Bakery"), Some(1)));
/// assert_eq!(entries.len(), 1);
/// assert_eq!(entries[0].place_id(), "p2");
/// ```
pub fn push_unique(
    entries: &mut Vec<PlaceCandidate>,
    candidate: &PlaceCandidate,
    capacity: Option<usize>,
) -> bool {
    if entries
        .iter()
        .any(|entry| entry.place_id() == candidate.place_id())
    {
        return false;
    }
    if capacity == Some(0) {
        return false;
    }
    entries.push(candidate.clone());
    if let Some(limit) = capacity {
        let excess = entries.len().saturating_sub(limit);
        entries.drain(..excess);
    }
    true
}
