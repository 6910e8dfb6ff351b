//! Coordinate value type, boundary validation, and the region gate.
//!
//! `GeoCoordinate` is a plain `Copy` value constructed fresh per call and
//! never mutated. Validation is explicit: every boundary operation calls
//! `validate()` before doing any work, so the rest of the engine can assume
//! finite, in-range coordinates.

use crate::error::ServiceError;
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check the coordinate is finite and in range.
    ///
    /// Latitude must be within [-90, 90], longitude within [-180, 180].
    pub fn validate(&self) -> Result<(), ServiceError> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(ServiceError::validation("coordinate is not finite"));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ServiceError::validation(format!(
                "latitude {} out of range -90..90",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ServiceError::validation(format!(
                "longitude {} out of range -180..180",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Privacy-redacted rendering, rounded to 2 decimal places (~1 km).
    ///
    /// Every log line that mentions a coordinate must go through this one
    /// formatter. Full-precision coordinates never reach the log output.
    pub fn redacted(&self) -> String {
        format!("{:.2}, {:.2}", self.latitude, self.longitude)
    }
}

impl std::fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// An axis-aligned bounding region.
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// UK + Ireland bounding box, matching the upstream burnt-area bundle job.
pub const UK_IRELAND: Region = Region {
    min_lat: 49.0,
    max_lat: 62.0,
    min_lon: -12.0,
    max_lon: 3.0,
};

impl Region {
    /// Inclusive containment test.
    pub fn contains(&self, coord: &GeoCoordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&coord.latitude)
            && (self.min_lon..=self.max_lon).contains(&coord.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_in_range() {
        assert!(GeoCoordinate::new(55.9533, -3.1883).validate().is_ok());
        assert!(GeoCoordinate::new(-90.0, 180.0).validate().is_ok());
        assert!(GeoCoordinate::new(90.0, -180.0).validate().is_ok());
        assert!(GeoCoordinate::new(0.0, 0.0).validate().is_ok());
    }

    #[test]
    fn test_validate_out_of_range() {
        assert!(GeoCoordinate::new(90.001, 0.0).validate().is_err());
        assert!(GeoCoordinate::new(-91.0, 0.0).validate().is_err());
        assert!(GeoCoordinate::new(0.0, 180.5).validate().is_err());
        assert!(GeoCoordinate::new(0.0, -200.0).validate().is_err());
    }

    #[test]
    fn test_validate_non_finite() {
        assert!(GeoCoordinate::new(f64::NAN, 0.0).validate().is_err());
        assert!(GeoCoordinate::new(0.0, f64::INFINITY).validate().is_err());
        assert!(GeoCoordinate::new(f64::NEG_INFINITY, 0.0).validate().is_err());
    }

    #[test]
    fn test_validation_error_category() {
        let err = GeoCoordinate::new(200.0, 0.0).validate().unwrap_err();
        assert_eq!(err.category, crate::error::ErrorCategory::Validation);
    }

    #[test]
    fn test_redacted_two_decimals() {
        let edinburgh = GeoCoordinate::new(55.9533, -3.1883);
        assert_eq!(edinburgh.redacted(), "55.95, -3.19");

        let zero = GeoCoordinate::new(0.0, 0.0);
        assert_eq!(zero.redacted(), "0.00, 0.00");
    }

    #[test]
    fn test_region_contains() {
        let edinburgh = GeoCoordinate::new(55.9533, -3.1883);
        let paris = GeoCoordinate::new(48.8566, 2.3522);
        let dublin = GeoCoordinate::new(53.3498, -6.2603);

        assert!(UK_IRELAND.contains(&edinburgh));
        assert!(UK_IRELAND.contains(&dublin));
        assert!(!UK_IRELAND.contains(&paris)); // south of the box
    }

    #[test]
    fn test_region_boundary_inclusive() {
        assert!(UK_IRELAND.contains(&GeoCoordinate::new(49.0, 3.0)));
        assert!(UK_IRELAND.contains(&GeoCoordinate::new(62.0, -12.0)));
        assert!(!UK_IRELAND.contains(&GeoCoordinate::new(48.999, 0.0)));
    }
}
