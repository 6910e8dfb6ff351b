//! Wildfire risk subsystem.
//!
//! Ranked fallback: EFFIS (global) → Met Office FSI (UK gate) → geocache →
//! seasonal estimate. The orchestrator guarantees a result for every valid
//! coordinate.

pub mod cache;
pub mod orchestrator;
pub mod sources;
pub mod synthetic;
pub mod types;

pub use cache::{CacheMetadata, Geocache};
pub use orchestrator::{RiskOrchestrator, Stage, StageEvent, OVERALL_DEADLINE};
pub use sources::{EffisSource, MetOfficeFsiSource, RiskSource};
pub use types::{Freshness, ObservationSource, RawIndexReading, RiskLevel, RiskObservation};
