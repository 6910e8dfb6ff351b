//! Core types for the location subsystem.

use crate::geo::GeoCoordinate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which tier produced the location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationSource {
    /// Cheap read of the sensor's last fix.
    LastKnown,
    /// Fresh sensor reading.
    LiveFix,
    /// User-entered coordinate younger than the manual-entry window.
    Manual,
    /// The persisted fallback coordinate.
    Default,
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastKnown => write!(f, "last known"),
            Self::LiveFix => write!(f, "live fix"),
            Self::Manual => write!(f, "manual"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// A best-effort device location with provenance.
///
/// Produced fresh by each resolver call; never cached by identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub coordinates: GeoCoordinate,
    pub source: LocationSource,
}

/// The single persisted manual-entry slot.
///
/// Fully overwritten on every save; there is no read-modify-write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub place_name: String,
    /// UTC epoch milliseconds at save time. Zero means the timestamp was
    /// missing, which makes the entry unusable regardless of its value.
    #[serde(default)]
    pub saved_at: i64,
}

/// Why a sensor reading failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    PermissionDenied,
    ServiceDisabled,
    Timeout,
    Hardware(String),
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "location permission denied"),
            Self::ServiceDisabled => write!(f, "location service disabled"),
            Self::Timeout => write!(f, "sensor timed out"),
            Self::Hardware(msg) => write!(f, "sensor hardware fault: {}", msg),
        }
    }
}

impl std::error::Error for SensorError {}
