//! Core types for the risk subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fire danger severity, ordered lowest to highest.
///
/// The six tiers and the index thresholds between them are the EFFIS fire
/// danger classes for the Fire Weather Index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl RiskLevel {
    /// Classify a Fire Weather Index value.
    pub fn from_index(fwi: f64) -> Self {
        if fwi < 5.2 {
            Self::VeryLow
        } else if fwi < 11.2 {
            Self::Low
        } else if fwi < 21.3 {
            Self::Moderate
        } else if fwi < 38.0 {
            Self::High
        } else if fwi < 50.0 {
            Self::VeryHigh
        } else {
            Self::Extreme
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very High",
            Self::Extreme => "Extreme",
        };
        write!(f, "{}", label)
    }
}

/// Where an observation originally came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObservationSource {
    /// EFFIS/GWIS Fire Weather Index, the global primary.
    Effis,
    /// Met Office Fire Severity Index, England/UK secondary.
    MetOfficeFsi,
    /// A cached record whose origin attribution has been lost.
    Cache,
    /// The built-in seasonal estimator.
    Synthetic,
}

impl fmt::Display for ObservationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Effis => write!(f, "EFFIS"),
            Self::MetOfficeFsi => write!(f, "Met Office FSI"),
            Self::Cache => write!(f, "Cache"),
            Self::Synthetic => write!(f, "Synthetic"),
        }
    }
}

/// How current the observation is.
///
/// `Cached` is only ever set by the cache layer on read; sources hand out
/// `Live` observations and the estimator hands out `Synthetic` ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Freshness {
    Live,
    Cached,
    Synthetic,
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Cached => write!(f, "cached"),
            Self::Synthetic => write!(f, "synthetic"),
        }
    }
}

/// A single resolved risk reading for one map cell.
///
/// Immutable once constructed; the only permitted derivation is
/// `with_freshness`, used by the cache layer on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskObservation {
    pub level: RiskLevel,
    /// Raw index value on the FWI scale, when the source reports one.
    /// Never negative; the synthetic stage never fabricates one.
    pub index_value: Option<f64>,
    pub source: ObservationSource,
    pub freshness: Freshness,
    /// Always UTC.
    pub observed_at: DateTime<Utc>,
}

impl RiskObservation {
    /// Copy with the freshness replaced. Everything else is preserved.
    pub fn with_freshness(mut self, freshness: Freshness) -> Self {
        self.freshness = freshness;
        self
    }
}

/// What a source adapter hands back before orchestration.
///
/// `index` stays empty for sources that report a severity class rather
/// than a number on the FWI scale.
#[derive(Debug, Clone, PartialEq)]
pub struct RawIndexReading {
    pub level: RiskLevel,
    pub index: Option<f64>,
}
