//! Location resolver — ordered tiers under a bounded total time.
//!
//! Tier order: last known fix → live fix → manual entry (< 1 h old) →
//! persisted default. Each tier's failure is classified at its boundary and
//! the next tier is tried; only a caller who forbids the default can see an
//! error. Coordinates are always redacted to two decimal places before they
//! reach any log line.

use super::sensor::{IpGeoSensor, PositionSensor};
use super::store::PreferenceStore;
use super::types::{LocationSource, ResolvedLocation};
use crate::error::{catch_boundary, ServiceError};
use crate::geo::GeoCoordinate;
use chrono::Utc;
use std::time::Duration;

/// Budget for the fresh sensor reading.
const LIVE_FIX_BUDGET: Duration = Duration::from_secs(2);

/// A manual entry is usable strictly under this age.
const MANUAL_MAX_AGE_MS: i64 = 3600 * 1000;

/// Fallback coordinate when every tier comes up empty: central London.
pub const DEFAULT_COORDINATE: GeoCoordinate = GeoCoordinate {
    latitude: 51.5074,
    longitude: -0.1278,
};

/// Best-effort device location with graceful degradation.
pub struct LocationResolver {
    sensor: Box<dyn PositionSensor>,
    store: PreferenceStore,
}

impl LocationResolver {
    pub fn new() -> Self {
        Self {
            sensor: Box::new(IpGeoSensor::new()),
            store: PreferenceStore::load(),
        }
    }

    /// Assemble from explicit parts (for testing).
    pub fn with_parts(sensor: Box<dyn PositionSensor>, store: PreferenceStore) -> Self {
        Self { sensor, store }
    }

    /// Walk the tiers. With `allow_default` the call cannot fail; without
    /// it, exhausting every tier reports "unavailable" so the caller can
    /// tell a real fix from a fabricated one.
    pub fn resolve(&self, allow_default: bool) -> Result<ResolvedLocation, ServiceError> {
        self.resolve_at(allow_default, Utc::now().timestamp_millis())
    }

    /// Resolve against an explicit clock (for testing the manual-entry
    /// age window).
    pub fn resolve_at(
        &self,
        allow_default: bool,
        now_ms: i64,
    ) -> Result<ResolvedLocation, ServiceError> {
        // Tier 1: cheap non-blocking read of the last fix.
        if let Ok(Some(fix)) = catch_boundary(|| Ok(self.sensor.last_known())) {
            if fix.validate().is_ok() {
                tracing::debug!(fix = %fix.redacted(), "using last known fix");
                return Ok(ResolvedLocation {
                    coordinates: fix,
                    source: LocationSource::LastKnown,
                });
            }
        }

        // Tier 2: fresh reading. Inapplicable (not failed) without the
        // capability; every sensor fault is contained here.
        if self.sensor.supported() {
            match catch_boundary(|| {
                self.sensor
                    .current(LIVE_FIX_BUDGET)
                    .map_err(|e| ServiceError::general(e.to_string()))
            }) {
                Ok(fix) if fix.validate().is_ok() => {
                    tracing::debug!(fix = %fix.redacted(), "using live fix");
                    return Ok(ResolvedLocation {
                        coordinates: fix,
                        source: LocationSource::LiveFix,
                    });
                }
                Ok(fix) => {
                    tracing::warn!(fix = %fix.redacted(), "sensor returned out-of-range fix");
                }
                Err(e) => {
                    tracing::debug!(error = %e, "live fix unavailable");
                }
            }
        }

        // Tier 3: manual entry, usable only while fresh. A missing
        // timestamp reads as zero and can never pass the age window.
        if let Some(manual) = self.store.manual_location() {
            let age_ms = now_ms - manual.saved_at;
            let coord = GeoCoordinate::new(manual.latitude, manual.longitude);
            if manual.saved_at > 0 && (0..MANUAL_MAX_AGE_MS).contains(&age_ms) {
                if coord.validate().is_ok() {
                    tracing::debug!(
                        coord = %coord.redacted(),
                        place = %manual.place_name,
                        "using manual entry"
                    );
                    return Ok(ResolvedLocation {
                        coordinates: coord,
                        source: LocationSource::Manual,
                    });
                }
            } else {
                tracing::debug!(age_ms, "manual entry too old, ignoring");
            }
        }

        // Tier 4: the persisted default, only on request.
        if allow_default {
            tracing::debug!(coord = %DEFAULT_COORDINATE.redacted(), "using persisted default");
            return Ok(ResolvedLocation {
                coordinates: DEFAULT_COORDINATE,
                source: LocationSource::Default,
            });
        }

        Err(ServiceError::validation(
            "location unavailable: no fix, no usable manual entry, defaulting disallowed",
        ))
    }

    /// Persist a user-entered location for the manual tier. The single
    /// slot is fully overwritten.
    pub fn save_manual(
        &mut self,
        coord: GeoCoordinate,
        place_name: &str,
    ) -> Result<(), ServiceError> {
        coord.validate()?;
        let saved_at = Utc::now().timestamp_millis();
        self.store.save_manual(&coord, place_name, saved_at);
        tracing::info!(
            coord = %coord.redacted(),
            place = %place_name,
            "manual location saved"
        );
        Ok(())
    }
}

impl Default for LocationResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::location::types::SensorError;
    use tempfile::TempDir;

    struct StubSensor {
        supported: bool,
        last: Option<GeoCoordinate>,
        current: Result<GeoCoordinate, SensorError>,
    }

    impl PositionSensor for StubSensor {
        fn supported(&self) -> bool {
            self.supported
        }

        fn last_known(&self) -> Option<GeoCoordinate> {
            self.last
        }

        fn current(&self, _timeout: Duration) -> Result<GeoCoordinate, SensorError> {
            self.current.clone()
        }
    }

    struct PanicSensor;

    impl PositionSensor for PanicSensor {
        fn supported(&self) -> bool {
            true
        }

        fn last_known(&self) -> Option<GeoCoordinate> {
            None
        }

        fn current(&self, _timeout: Duration) -> Result<GeoCoordinate, SensorError> {
            panic!("sensor driver exploded")
        }
    }

    const EDINBURGH: GeoCoordinate = GeoCoordinate {
        latitude: 55.9533,
        longitude: -3.1883,
    };

    fn empty_store() -> (PreferenceStore, TempDir) {
        let dir = TempDir::new().unwrap();
        (
            PreferenceStore::load_from(dir.path().join("preferences.json")),
            dir,
        )
    }

    fn denied_sensor() -> Box<StubSensor> {
        Box::new(StubSensor {
            supported: true,
            last: None,
            current: Err(SensorError::PermissionDenied),
        })
    }

    #[test]
    fn test_last_known_short_circuits() {
        let (store, _dir) = empty_store();
        // A live fix would yield a different coordinate, so provenance
        // proves the tier that answered.
        let sensor = Box::new(StubSensor {
            supported: true,
            last: Some(EDINBURGH),
            current: Ok(GeoCoordinate::new(0.0, 0.0)),
        });
        let resolver = LocationResolver::with_parts(sensor, store);

        let loc = resolver.resolve(true).unwrap();
        assert_eq!(loc.source, LocationSource::LastKnown);
        assert_eq!(loc.coordinates, EDINBURGH);
    }

    #[test]
    fn test_live_fix_when_no_last_known() {
        let (store, _dir) = empty_store();
        let sensor = Box::new(StubSensor {
            supported: true,
            last: None,
            current: Ok(EDINBURGH),
        });
        let resolver = LocationResolver::with_parts(sensor, store);

        let loc = resolver.resolve(true).unwrap();
        assert_eq!(loc.source, LocationSource::LiveFix);
        assert_eq!(loc.coordinates, EDINBURGH);
    }

    #[test]
    fn test_unsupported_platform_skips_live_fix() {
        let (store, _dir) = empty_store();
        // current() would succeed if it were (wrongly) consulted.
        let sensor = Box::new(StubSensor {
            supported: false,
            last: None,
            current: Ok(EDINBURGH),
        });
        let resolver = LocationResolver::with_parts(sensor, store);

        let loc = resolver.resolve(true).unwrap();
        assert_eq!(loc.source, LocationSource::Default);
    }

    #[test]
    fn test_denied_fix_no_manual_allow_default() {
        let (store, _dir) = empty_store();
        let resolver = LocationResolver::with_parts(denied_sensor(), store);

        let loc = resolver.resolve(true).unwrap();
        assert_eq!(loc.source, LocationSource::Default);
        assert_eq!(loc.coordinates, DEFAULT_COORDINATE);
    }

    #[test]
    fn test_denied_fix_no_manual_disallow_default_fails() {
        let (store, _dir) = empty_store();
        let resolver = LocationResolver::with_parts(denied_sensor(), store);

        let err = resolver.resolve(false).unwrap_err();
        assert_eq!(err.category, ErrorCategory::Validation);
    }

    #[test]
    fn test_fresh_manual_entry_used() {
        let (mut store, _dir) = empty_store();
        store.save_manual(&EDINBURGH, "Edinburgh", 1_000_000);
        let resolver = LocationResolver::with_parts(denied_sensor(), store);

        // Thirty minutes after the save.
        let loc = resolver
            .resolve_at(true, 1_000_000 + 30 * 60 * 1000)
            .unwrap();
        assert_eq!(loc.source, LocationSource::Manual);
        assert_eq!(loc.coordinates, EDINBURGH);
    }

    #[test]
    fn test_manual_entry_at_exactly_one_hour_is_absent() {
        let (mut store, _dir) = empty_store();
        store.save_manual(&EDINBURGH, "Edinburgh", 1_000_000);
        let resolver = LocationResolver::with_parts(denied_sensor(), store);

        let loc = resolver
            .resolve_at(true, 1_000_000 + MANUAL_MAX_AGE_MS)
            .unwrap();
        assert_eq!(loc.source, LocationSource::Default);
    }

    #[test]
    fn test_manual_entry_just_under_one_hour_is_used() {
        let (mut store, _dir) = empty_store();
        store.save_manual(&EDINBURGH, "Edinburgh", 1_000_000);
        let resolver = LocationResolver::with_parts(denied_sensor(), store);

        let loc = resolver
            .resolve_at(true, 1_000_000 + MANUAL_MAX_AGE_MS - 1)
            .unwrap();
        assert_eq!(loc.source, LocationSource::Manual);
    }

    #[test]
    fn test_manual_entry_missing_timestamp_is_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(
            &path,
            r#"{"manual": {"latitude": 55.95, "longitude": -3.19, "place_name": "Edinburgh"}}"#,
        )
        .unwrap();
        let store = PreferenceStore::load_from(path);
        let resolver = LocationResolver::with_parts(denied_sensor(), store);

        let loc = resolver.resolve_at(true, 1000).unwrap();
        assert_eq!(loc.source, LocationSource::Default);
    }

    #[test]
    fn test_manual_entry_with_corrupt_coordinates_is_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(
            &path,
            r#"{"manual": {"latitude": 999.0, "longitude": 0.0, "place_name": "bogus", "saved_at": 1000}}"#,
        )
        .unwrap();
        let store = PreferenceStore::load_from(path);
        let resolver = LocationResolver::with_parts(denied_sensor(), store);

        let loc = resolver.resolve_at(true, 2000).unwrap();
        assert_eq!(loc.source, LocationSource::Default);
    }

    #[test]
    fn test_panicking_sensor_degrades_to_next_tier() {
        let (store, _dir) = empty_store();
        let resolver = LocationResolver::with_parts(Box::new(PanicSensor), store);

        let loc = resolver.resolve(true).unwrap();
        assert_eq!(loc.source, LocationSource::Default);
    }

    #[test]
    fn test_save_manual_validates_coordinate() {
        let (store, _dir) = empty_store();
        let mut resolver = LocationResolver::with_parts(denied_sensor(), store);

        let err = resolver
            .save_manual(GeoCoordinate::new(100.0, 0.0), "nowhere")
            .unwrap_err();
        assert_eq!(err.category, ErrorCategory::Validation);
    }

    #[test]
    fn test_save_manual_round_trips_through_resolver() {
        let (store, _dir) = empty_store();
        let mut resolver = LocationResolver::with_parts(denied_sensor(), store);

        resolver.save_manual(EDINBURGH, "Edinburgh").unwrap();
        let loc = resolver.resolve(true).unwrap();
        assert_eq!(loc.source, LocationSource::Manual);
        assert_eq!(loc.coordinates, EDINBURGH);
    }
}
