use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// WGS84 latitude/longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct GeodeticCoordinate {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

impl GeodeticCoordinate {
    /// Build a coordinate, rejecting non-finite or out-of-range degrees.
    pub fn new(lat: f64, lon: f64) -> Result<Self, ValidationError> {
        if !lat.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "lat" });
        }
        if !lon.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "lon" });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::LatitudeOutOfRange { value: lat });
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(ValidationError::LongitudeOutOfRange { value: lon });
        }
        Ok(Self { lat, lon })
    }

    /// Build a coordinate without range checks.
    ///
    /// Downstream math accepts such values without panicking but the results
    /// carry no geographic meaning.
    pub const fn new_unchecked(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub const fn lat(&self) -> f64 {
        self.lat
    }

    pub const fn lon(&self) -> f64 {
        self.lon
    }
}

impl Display for GeodeticCoordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.lat, self.lon)
    }
}

impl TryFrom<RawCoordinate> for GeodeticCoordinate {
    type Error = ValidationError;

    fn try_from(value: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(value.lat, value.lon)
    }
}

/// Easting/northing in whole meters on the fixed transverse-Mercator grid.
///
/// Only produced by [`crate::projection::Transformer`]. Values are rounded
/// half away from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ProjectedCoordinate {
    easting: i64,
    northing: i64,
}

impl ProjectedCoordinate {
    /// Round raw meter values to the nearest integer meter.
    ///
    /// Non-finite inputs saturate (NaN becomes 0) instead of panicking.
    pub(crate) fn from_meters(easting: f64, northing: f64) -> Self {
        Self {
            easting: easting.round() as i64,
            northing: northing.round() as i64,
        }
    }

    pub const fn easting(&self) -> i64 {
        self.easting
    }

    pub const fn northing(&self) -> i64 {
        self.northing
    }
}

impl Display for ProjectedCoordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.easting, self.northing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_range_limits() {
        assert!(GeodeticCoordinate::new(90.0, 180.0).is_ok());
        assert!(GeodeticCoordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        let err = GeodeticCoordinate::new(90.5, 11.0).expect_err("must fail");
        assert!(matches!(err, ValidationError::LatitudeOutOfRange { .. }));
    }

    #[test]
    fn rejects_nan_longitude() {
        let err = GeodeticCoordinate::new(48.0, f64::NAN).expect_err("must fail");
        assert_eq!(err, ValidationError::NonFiniteValue { field: "lon" });
    }

    #[test]
    fn deserialization_validates_ranges() {
        let parsed: Result<GeodeticCoordinate, _> =
            serde_json::from_str(r#"{"lat": 48.1, "lon": 200.0}"#);
        assert!(parsed.is_err());

        let parsed: GeodeticCoordinate =
            serde_json::from_str(r#"{"lat": 48.1, "lon": 11.5}"#).expect("valid json");
        assert_eq!(parsed, GeodeticCoordinate::new_unchecked(48.1, 11.5));
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        let projected = ProjectedCoordinate::from_meters(10.5, -10.5);
        assert_eq!(projected.easting(), 11);
        assert_eq!(projected.northing(), -11);
    }

    #[test]
    fn non_finite_meters_do_not_panic() {
        let projected = ProjectedCoordinate::from_meters(f64::NAN, f64::INFINITY);
        assert_eq!(projected.easting(), 0);
        assert_eq!(projected.northing(), i64::MAX);
    }
}
