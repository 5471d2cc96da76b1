//! Places web service response types.
//!
//! Deserialisation types for the autocomplete and details endpoints. Both
//! responses carry a `status` string alongside the payload; see
//! <https://developers.google.com/maps/documentation/places/web-service/details#PlacesDetailsStatus>.

use gatemap_core::{Coordinate, OpeningHours, PlaceCandidate, PlaceDetail, PlacesError};
use serde::Deserialize;

/// Status reported by successful calls.
pub const STATUS_OK: &str = "OK";
/// Status reported when a query matched nothing.
pub const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";
/// Status reported when a place identifier is unknown.
pub const STATUS_NOT_FOUND: &str = "NOT_FOUND";

/// Autocomplete endpoint response.
#[derive(Debug, Deserialize)]
pub struct AutocompleteResponse {
    /// Status code, e.g. `"OK"` or `"REQUEST_DENIED"`.
    pub status: String,
    /// Suggestions in ranking order.
    #[serde(default)]
    pub predictions: Vec<PlaceCandidate>,
    /// Explanation accompanying a failure status.
    pub error_message: Option<String>,
}

impl AutocompleteResponse {
    /// Map the response onto the provider-neutral result.
    pub fn into_candidates(self) -> Result<Vec<PlaceCandidate>, PlacesError> {
        match self.status.as_str() {
            STATUS_OK => Ok(self.predictions),
            STATUS_ZERO_RESULTS => Ok(Vec::new()),
            _ => Err(PlacesError::Provider {
                code: self.status,
                message: self.error_message.unwrap_or_default(),
            }),
        }
    }
}

/// Details endpoint response.
#[derive(Debug, Deserialize)]
pub struct DetailsResponse {
    /// Status code.
    pub status: String,
    /// Place record; absent on failure.
    pub result: Option<DetailsResult>,
    /// Explanation accompanying a failure status.
    pub error_message: Option<String>,
}

impl DetailsResponse {
    /// Map the response onto a [`PlaceDetail`] for `place_id`.
    pub fn into_detail(self, place_id: &str) -> Result<PlaceDetail, PlacesError> {
        match self.status.as_str() {
            STATUS_OK => self
                .result
                .ok_or_else(|| PlacesError::Parse {
                    message: "details response missing result".to_owned(),
                })?
                .into_detail(place_id),
            STATUS_NOT_FOUND | STATUS_ZERO_RESULTS => Err(PlacesError::NotFound {
                place_id: place_id.to_owned(),
            }),
            _ => Err(PlacesError::Provider {
                code: self.status,
                message: self.error_message.unwrap_or_default(),
            }),
        }
    }
}

/// The subset of the place record the engine reads.
#[derive(Debug, Deserialize)]
pub struct DetailsResult {
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub formatted_address: String,
    pub geometry: Option<Geometry>,
    pub opening_hours: Option<OpeningHoursPayload>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    pub wheelchair_accessible_entrance: Option<bool>,
    pub rating: Option<f32>,
    pub international_phone_number: Option<String>,
    pub website: Option<String>,
}

impl DetailsResult {
    fn into_detail(self, requested_id: &str) -> Result<PlaceDetail, PlacesError> {
        let location = self
            .geometry
            .ok_or_else(|| PlacesError::Parse {
                message: "details result missing geometry".to_owned(),
            })?
            .location;
        let coordinate =
            Coordinate::new(location.lat, location.lng).map_err(|err| PlacesError::Parse {
                message: err.to_string(),
            })?;
        let place_id = self.place_id.unwrap_or_else(|| requested_id.to_owned());

        let mut detail = PlaceDetail::new(place_id, self.name, self.formatted_address, coordinate);
        detail.opening_hours = self.opening_hours.and_then(|hours| {
            hours.open_now.map(|open_now| OpeningHours {
                open_now,
                weekday_text: hours.weekday_text,
            })
        });
        detail.photo_reference = self
            .photos
            .into_iter()
            .map(|photo| photo.photo_reference)
            .find(|reference| !reference.is_empty());
        detail.wheelchair_accessible = self.wheelchair_accessible_entrance;
        detail.rating = self.rating;
        detail.phone_number = self.international_phone_number;
        detail.website = self.website;
        Ok(detail)
    }
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct OpeningHoursPayload {
    pub open_now: Option<bool>,
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Photo {
    #[serde(default)]
    pub photo_reference: String,
}
