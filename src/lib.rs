//! Wildguard — wildfire risk resolution that never comes back empty.
//!
//! The engine answers two questions for a thin UI layer: "how dangerous is
//! it here right now?" and "where is here?". Both answers come from ranked
//! fallback chains over unreliable upstreams, bounded by per-stage time
//! budgets, so the caller always gets a value.
//!
//! Risk flow:     EFFIS (global) → Met Office FSI (UK gate) → geocache → seasonal estimate
//! Location flow: last known fix → live fix → manual entry (< 1 h) → persisted default

pub mod error;
pub mod fetch;
pub mod geo;
pub mod geohash;
pub mod location;
pub mod risk;
pub mod server;

pub use error::{ErrorCategory, ServiceError};
pub use geo::GeoCoordinate;
pub use location::{LocationResolver, ResolvedLocation};
pub use risk::{RiskObservation, RiskOrchestrator};
