//! Geographic positions and map viewports.
//!
//! [`Coordinate`] is an immutable latitude/longitude pair and [`Region`] is a
//! viewport centred on a coordinate with a latitude and longitude span, in the
//! shape map widgets expect.

use geo::{Coord, Intersects, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Span used when centring the camera on a single place.
pub const DEFAULT_REGION_DELTA: f64 = 0.003;

/// Widest span accepted for either delta of a [`Region`].
pub const MAX_REGION_DELTA: f64 = 180.0;

/// A latitude/longitude pair in decimal degrees.
///
/// # Examples
///
/// ```
/// use gatemap_core::Coordinate;
///
/// # fn main() -> Result<(), gatemap_core::CoordinateError> {
/// let coordinate = Coordinate::new(32.0711, 34.7873)?;
/// assert_eq!(coordinate.latitude(), 32.0711);
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate", into = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

/// Errors returned by [`Coordinate::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude was not finite or outside `[-90, 90]`.
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    /// Longitude was not finite or outside `[-180, 180]`.
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

impl Coordinate {
    /// Validates and constructs a [`Coordinate`].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl From<Coordinate> for Coord {
    fn from(value: Coordinate) -> Self {
        Self {
            x: value.longitude,
            y: value.latitude,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(value: Coordinate) -> Self {
        Self {
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}

/// A map viewport: a centre plus the latitude and longitude it spans.
///
/// Deltas are full spans, so the viewport reaches half a delta either side of
/// the centre.
///
/// # Examples
///
/// ```
/// use gatemap_core::{Coordinate, DEFAULT_REGION_DELTA, Region};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let centre = Coordinate::new(32.1925, 34.8849)?;
/// let region = Region::centered_on(centre);
/// assert_eq!(region.latitude_delta(), DEFAULT_REGION_DELTA);
/// assert!(region.contains(centre));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Region {
    center: Coordinate,
    latitude_delta: f64,
    longitude_delta: f64,
}

/// Errors returned by [`Region::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RegionError {
    /// A delta was not finite, not positive, or wider than [`MAX_REGION_DELTA`].
    #[error("region delta {0} must be positive and at most {MAX_REGION_DELTA}")]
    InvalidDelta(f64),
}

impl Region {
    /// Validates and constructs a [`Region`].
    pub fn new(
        center: Coordinate,
        latitude_delta: f64,
        longitude_delta: f64,
    ) -> Result<Self, RegionError> {
        for delta in [latitude_delta, longitude_delta] {
            if !delta.is_finite() || delta <= 0.0 || delta > MAX_REGION_DELTA {
                return Err(RegionError::InvalidDelta(delta));
            }
        }
        Ok(Self {
            center,
            latitude_delta,
            longitude_delta,
        })
    }

    /// Centre `center` with [`DEFAULT_REGION_DELTA`] on both axes.
    #[must_use]
    pub const fn centered_on(center: Coordinate) -> Self {
        Self {
            center,
            latitude_delta: DEFAULT_REGION_DELTA,
            longitude_delta: DEFAULT_REGION_DELTA,
        }
    }

    /// The same span moved to `center`.
    #[must_use]
    pub const fn recentred(self, center: Coordinate) -> Self {
        Self { center, ..self }
    }

    /// Centre of the viewport.
    #[must_use]
    pub const fn center(&self) -> Coordinate {
        self.center
    }

    /// Latitude span in degrees.
    #[must_use]
    pub const fn latitude_delta(&self) -> f64 {
        self.latitude_delta
    }

    /// Longitude span in degrees.
    #[must_use]
    pub const fn longitude_delta(&self) -> f64 {
        self.longitude_delta
    }

    /// Bounding rectangle of the viewport, with `x` as longitude.
    #[must_use]
    pub fn bounds(&self) -> Rect<f64> {
        let half_lat = self.latitude_delta / 2.0;
        let half_lon = self.longitude_delta / 2.0;
        let centre = Coord::from(self.center);
        Rect::new(
            Coord {
                x: centre.x - half_lon,
                y: centre.y - half_lat,
            },
            Coord {
                x: centre.x + half_lon,
                y: centre.y + half_lat,
            },
        )
    }

    /// Whether `coordinate` falls inside the viewport.
    ///
    /// Points on the edge count as inside.
    #[must_use]
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        self.bounds().intersects(&Coord::from(coordinate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn centre() -> Coordinate {
        Coordinate::new(32.0, 34.0).expect("valid coordinate")
    }

    #[rstest]
    #[case(-90.0, -180.0)]
    #[case(90.0, 180.0)]
    #[case(0.0, 0.0)]
    fn coordinate_accepts_boundaries(#[case] lat: f64, #[case] lon: f64) {
        assert!(Coordinate::new(lat, lon).is_ok());
    }

    #[rstest]
    #[case(90.5, 0.0)]
    #[case(f64::NAN, 0.0)]
    fn coordinate_rejects_bad_latitude(#[case] lat: f64, #[case] lon: f64) {
        assert!(matches!(
            Coordinate::new(lat, lon),
            Err(CoordinateError::LatitudeOutOfRange(_))
        ));
    }

    #[rstest]
    #[case(0.0, -180.1)]
    #[case(0.0, f64::INFINITY)]
    fn coordinate_rejects_bad_longitude(#[case] lat: f64, #[case] lon: f64) {
        assert!(matches!(
            Coordinate::new(lat, lon),
            Err(CoordinateError::LongitudeOutOfRange(_))
        ));
    }

    #[rstest]
    fn coordinate_deserialisation_is_validated() {
        let ok: Coordinate =
            serde_json::from_str(r#"{"latitude": 32.5, "longitude": 34.9}"#).expect("valid json");
        assert_eq!(ok.longitude(), 34.9);

        let err = serde_json::from_str::<Coordinate>(r#"{"latitude": 132.5, "longitude": 34.9}"#);
        assert!(err.is_err());
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.1)]
    #[case(f64::NAN)]
    #[case(181.0)]
    fn region_rejects_invalid_delta(centre: Coordinate, #[case] delta: f64) {
        assert!(matches!(
            Region::new(centre, delta, 0.01),
            Err(RegionError::InvalidDelta(_))
        ));
        assert!(Region::new(centre, 0.01, delta).is_err());
    }

    #[rstest]
    fn centred_region_uses_default_delta(centre: Coordinate) {
        let region = Region::centered_on(centre);
        assert_eq!(region.center(), centre);
        assert_eq!(region.latitude_delta(), DEFAULT_REGION_DELTA);
        assert_eq!(region.longitude_delta(), DEFAULT_REGION_DELTA);
    }

    #[rstest]
    fn region_bounds_span_half_delta_each_side(centre: Coordinate) {
        let region = Region::new(centre, 2.0, 4.0).expect("valid region");
        let bounds = region.bounds();
        assert_eq!(bounds.min(), Coord { x: 32.0, y: 31.0 });
        assert_eq!(bounds.max(), Coord { x: 36.0, y: 33.0 });
    }

    #[rstest]
    fn region_contains_edges_but_not_outside(centre: Coordinate) {
        let region = Region::new(centre, 2.0, 2.0).expect("valid region");
        let edge = Coordinate::new(33.0, 35.0).expect("valid coordinate");
        let outside = Coordinate::new(33.5, 34.0).expect("valid coordinate");
        assert!(region.contains(edge));
        assert!(!region.contains(outside));
    }
}
