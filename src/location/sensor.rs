//! Platform position sensor abstraction.
//!
//! The resolver only knows the trait: a capability check, a cheap last-fix
//! read, and a budgeted fresh read. The shipped implementation geolocates
//! by IP, which is what "the sensor" means on a headless box; platforms
//! without any usable source plug in `UnsupportedSensor` and the live-fix
//! tier is skipped entirely.

use super::types::SensorError;
use crate::geo::GeoCoordinate;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::Duration;

const USER_AGENT: &str = "Wildguard/0.4 (wildfire-risk-engine)";

/// A device position source.
pub trait PositionSensor: Send {
    /// Capability gate: when false, the live-fix tier is inapplicable,
    /// not failed.
    fn supported(&self) -> bool;

    /// Non-blocking read of the last fix, if any.
    fn last_known(&self) -> Option<GeoCoordinate>;

    /// Fresh reading, bounded by `timeout`.
    fn current(&self, timeout: Duration) -> Result<GeoCoordinate, SensorError>;
}

// ─── IP geolocation sensor ──────────────────────────────────────

#[derive(Deserialize)]
struct IpApiResult {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// IP-based position source, remembering its last successful fix.
pub struct IpGeoSensor {
    last_fix: Mutex<Option<GeoCoordinate>>,
}

impl IpGeoSensor {
    pub fn new() -> Self {
        Self {
            last_fix: Mutex::new(None),
        }
    }
}

impl Default for IpGeoSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionSensor for IpGeoSensor {
    fn supported(&self) -> bool {
        true
    }

    fn last_known(&self) -> Option<GeoCoordinate> {
        *self.last_fix.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn current(&self, timeout: Duration) -> Result<GeoCoordinate, SensorError> {
        let response = ureq::get("https://ipapi.co/json/")
            .set("User-Agent", USER_AGENT)
            .timeout(timeout)
            .call()
            .map_err(|e| match e {
                ureq::Error::Transport(t) => SensorError::Hardware(t.to_string()),
                ureq::Error::Status(403, _) => SensorError::PermissionDenied,
                ureq::Error::Status(code, _) => {
                    SensorError::Hardware(format!("geolocation API returned {}", code))
                }
            })?;

        let r: IpApiResult = response
            .into_json()
            .map_err(|e| SensorError::Hardware(e.to_string()))?;

        let lat = r.latitude.ok_or(SensorError::Hardware(
            "no latitude in geolocation response".into(),
        ))?;
        let lon = r.longitude.ok_or(SensorError::Hardware(
            "no longitude in geolocation response".into(),
        ))?;

        let fix = GeoCoordinate::new(lat, lon);
        fix.validate()
            .map_err(|e| SensorError::Hardware(e.to_string()))?;

        tracing::debug!(fix = %fix.redacted(), "obtained live fix");
        *self.last_fix.lock().unwrap_or_else(|e| e.into_inner()) = Some(fix);
        Ok(fix)
    }
}

// ─── Capability-absent sensor ───────────────────────────────────

/// Stand-in for platforms with no position capability at all.
pub struct UnsupportedSensor;

impl PositionSensor for UnsupportedSensor {
    fn supported(&self) -> bool {
        false
    }

    fn last_known(&self) -> Option<GeoCoordinate> {
        None
    }

    fn current(&self, _timeout: Duration) -> Result<GeoCoordinate, SensorError> {
        Err(SensorError::ServiceDisabled)
    }
}
