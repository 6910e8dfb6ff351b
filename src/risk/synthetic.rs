//! Seasonal risk estimate, the floor of the fallback chain.
//!
//! When every real source and the cache have failed, the chain still has to
//! produce an answer. The estimate is derived purely from the calendar month
//! and hemisphere, so it is deterministic and cannot fail. It deliberately
//! carries no index value: a fabricated FWI number would be indistinguishable
//! from a measured one downstream.

use super::types::{Freshness, ObservationSource, RiskLevel, RiskObservation};
use crate::geo::GeoCoordinate;
use chrono::{DateTime, Datelike, Utc};

/// Deterministic seasonal estimate for a coordinate at a given instant.
pub fn estimate_at(coord: &GeoCoordinate, now: DateTime<Utc>) -> RiskObservation {
    let mut month = now.month();
    // Southern hemisphere: fire season is offset by half a year.
    if coord.latitude < 0.0 {
        month = (month + 6 - 1) % 12 + 1;
    }

    let level = match month {
        6..=9 => RiskLevel::Moderate,
        4 | 5 | 10 => RiskLevel::Low,
        _ => RiskLevel::VeryLow,
    };

    RiskObservation {
        level,
        index_value: None,
        source: ObservationSource::Synthetic,
        freshness: Freshness::Synthetic,
        observed_at: now,
    }
}

/// Seasonal estimate at the current instant.
pub fn estimate(coord: &GeoCoordinate) -> RiskObservation {
    estimate_at(coord, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_northern_summer_is_moderate() {
        let edinburgh = GeoCoordinate::new(55.9533, -3.1883);
        let obs = estimate_at(&edinburgh, at(2025, 7));
        assert_eq!(obs.level, RiskLevel::Moderate);
    }

    #[test]
    fn test_northern_winter_is_very_low() {
        let edinburgh = GeoCoordinate::new(55.9533, -3.1883);
        let obs = estimate_at(&edinburgh, at(2025, 1));
        assert_eq!(obs.level, RiskLevel::VeryLow);
    }

    #[test]
    fn test_shoulder_season_is_low() {
        let edinburgh = GeoCoordinate::new(55.9533, -3.1883);
        assert_eq!(estimate_at(&edinburgh, at(2025, 4)).level, RiskLevel::Low);
        assert_eq!(estimate_at(&edinburgh, at(2025, 10)).level, RiskLevel::Low);
    }

    #[test]
    fn test_southern_hemisphere_offset() {
        // January in Australia is peak season.
        let sydney = GeoCoordinate::new(-33.8688, 151.2093);
        assert_eq!(estimate_at(&sydney, at(2025, 1)).level, RiskLevel::Moderate);
        assert_eq!(estimate_at(&sydney, at(2025, 7)).level, RiskLevel::VeryLow);
    }

    #[test]
    fn test_never_fabricates_index() {
        let coord = GeoCoordinate::new(40.0, -3.7);
        for month in 1..=12 {
            let obs = estimate_at(&coord, at(2025, month));
            assert!(obs.index_value.is_none());
            assert_eq!(obs.source, ObservationSource::Synthetic);
            assert_eq!(obs.freshness, Freshness::Synthetic);
        }
    }

    #[test]
    fn test_deterministic() {
        let coord = GeoCoordinate::new(55.9533, -3.1883);
        let now = at(2025, 8);
        assert_eq!(estimate_at(&coord, now), estimate_at(&coord, now));
    }
}
