//! Places returned by the search provider and the static gate markers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Coordinate;

/// An autocomplete suggestion that has not yet been resolved to details.
///
/// Provider fields other than the identifier and description are kept
/// verbatim so a persisted candidate round-trips the provider payload.
///
/// # Examples
///
/// ```
/// use gatemap_core::PlaceCandidate;
///
/// let candidate = PlaceCandidate::new("p1", "Starbucks, Main St");
/// assert_eq!(candidate.place_id(), "p1");
/// assert!(candidate.raw_fields().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    place_id: String,
    description: String,
    #[serde(flatten)]
    raw: Map<String, Value>,
}

impl PlaceCandidate {
    /// Build a candidate without any extra provider fields.
    pub fn new(place_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            place_id: place_id.into(),
            description: description.into(),
            raw: Map::new(),
        }
    }

    /// Attach the opaque provider fields that accompanied the suggestion.
    #[must_use]
    pub fn with_raw_fields(mut self, raw: Map<String, Value>) -> Self {
        self.raw = raw;
        self
    }

    /// Provider-assigned identifier, unique per place.
    #[must_use]
    pub fn place_id(&self) -> &str {
        &self.place_id
    }

    /// Human-readable suggestion text.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Untyped provider fields such as `types` or `matched_substrings`.
    #[must_use]
    pub const fn raw_fields(&self) -> &Map<String, Value> {
        &self.raw
    }
}

/// Opening-hours summary for a place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    /// Whether the place is open at the time of the request.
    pub open_now: bool,
    /// One line per weekday, formatted by the provider.
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

/// A fully resolved place record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceDetail {
    /// Provider-assigned identifier.
    pub place_id: String,
    /// Display name.
    pub name: String,
    /// Postal address as formatted by the provider.
    pub formatted_address: String,
    /// Position of the place.
    pub coordinate: Coordinate,
    /// Opening hours when the provider knows them.
    pub opening_hours: Option<OpeningHours>,
    /// Whether the entrance is wheelchair accessible, when known.
    pub wheelchair_accessible: Option<bool>,
    /// Reference to the first photo, resolvable to a URL.
    pub photo_reference: Option<String>,
    /// Average user rating.
    pub rating: Option<f32>,
    /// International phone number.
    pub phone_number: Option<String>,
    /// Website of the place.
    pub website: Option<String>,
}

impl PlaceDetail {
    /// Build a detail record carrying only the mandatory fields.
    pub fn new(
        place_id: impl Into<String>,
        name: impl Into<String>,
        formatted_address: impl Into<String>,
        coordinate: Coordinate,
    ) -> Self {
        Self {
            place_id: place_id.into(),
            name: name.into(),
            formatted_address: formatted_address.into(),
            coordinate,
            opening_hours: None,
            wheelchair_accessible: None,
            photo_reference: None,
            rating: None,
            phone_number: None,
            website: None,
        }
    }

    /// Set the photo reference.
    #[must_use]
    pub fn with_photo_reference(mut self, reference: impl Into<String>) -> Self {
        self.photo_reference = Some(reference.into());
        self
    }
}

/// A static point of interest rendered on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateMarker {
    /// Provider identifier used to fetch details on tap.
    pub place_id: String,
    /// Fixed position of the gate.
    #[serde(rename = "coords")]
    pub coordinate: Coordinate,
}

impl GateMarker {
    /// Construct a marker.
    pub fn new(place_id: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            place_id: place_id.into(),
            coordinate,
        }
    }
}
