//! Risk orchestrator — the ranked fallback chain.
//!
//! Order: EFFIS (global) → Met Office FSI (UK gate) → geocache → seasonal
//! estimate. Every stage sits behind a catch-and-classify boundary, so a
//! failing, slow, or even panicking source degrades into that stage's
//! failure and the chain keeps going. Given a valid coordinate the chain
//! cannot fail; invalid input is the only error this module ever returns.

use super::cache::Geocache;
use super::sources::{EffisSource, MetOfficeFsiSource, RiskSource};
use super::synthetic;
use super::types::{Freshness, ObservationSource, RiskObservation};
use crate::error::{catch_boundary, ServiceError};
use crate::fetch::Fetcher;
use crate::geo::{GeoCoordinate, Region, UK_IRELAND};
use chrono::Utc;
use std::time::{Duration, Instant};

/// Advisory ceiling for one resolve call. Checked between network stages,
/// never a kill switch on a stage already running.
pub const OVERALL_DEADLINE: Duration = Duration::from_secs(8);

const PRIMARY_BUDGET: Duration = Duration::from_secs(3);
const SECONDARY_BUDGET: Duration = Duration::from_secs(2);

/// One link of the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Primary,
    Secondary,
    Cache,
    Synthetic,
}

/// Attempt trail entry, emitted in the order stages were tried.
///
/// Skipped stages (outside the region gate, offline mode) emit nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageEvent {
    Started(Stage),
    Succeeded(Stage),
    Failed(Stage, String),
}

impl StageEvent {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Started(s) | Self::Succeeded(s) => *s,
            Self::Failed(s, _) => *s,
        }
    }
}

/// Produces a risk observation for a coordinate, never failing on valid
/// input.
pub struct RiskOrchestrator {
    primary: Box<dyn RiskSource>,
    secondary: Box<dyn RiskSource>,
    cache: Geocache,
    fetcher: Fetcher,
    region: Region,
    offline: bool,
}

impl RiskOrchestrator {
    pub fn new() -> Self {
        Self {
            primary: Box::new(EffisSource),
            secondary: Box::new(MetOfficeFsiSource),
            cache: Geocache::load(),
            fetcher: Fetcher::new(),
            region: UK_IRELAND,
            offline: false,
        }
    }

    /// Assemble from explicit parts (for testing).
    pub fn with_parts(
        primary: Box<dyn RiskSource>,
        secondary: Box<dyn RiskSource>,
        cache: Geocache,
        fetcher: Fetcher,
    ) -> Self {
        Self {
            primary,
            secondary,
            cache,
            fetcher,
            region: UK_IRELAND,
            offline: false,
        }
    }

    /// Skip network stages entirely; cache and synthetic still run.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn cache(&self) -> &Geocache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut Geocache {
        &mut self.cache
    }

    /// Resolve under the default overall deadline.
    pub fn resolve(&mut self, coord: GeoCoordinate) -> Result<RiskObservation, ServiceError> {
        self.resolve_within(coord, OVERALL_DEADLINE)
    }

    pub fn resolve_within(
        &mut self,
        coord: GeoCoordinate,
        deadline: Duration,
    ) -> Result<RiskObservation, ServiceError> {
        self.resolve_traced(coord, deadline).0
    }

    /// Resolve and return the stage attempt trail alongside the result.
    pub fn resolve_traced(
        &mut self,
        coord: GeoCoordinate,
        deadline: Duration,
    ) -> (Result<RiskObservation, ServiceError>, Vec<StageEvent>) {
        let mut events = Vec::new();

        // Invalid input is the only error this call can surface; no source
        // is attempted for it.
        if let Err(e) = coord.validate() {
            return (Err(e), events);
        }

        let started = Instant::now();

        if !self.offline {
            if let Some(obs) =
                self.try_network_stage(Stage::Primary, &coord, PRIMARY_BUDGET, &mut events)
            {
                return (Ok(obs), events);
            }

            if self.region.contains(&coord) {
                if started.elapsed() < deadline {
                    if let Some(obs) =
                        self.try_network_stage(Stage::Secondary, &coord, SECONDARY_BUDGET, &mut events)
                    {
                        return (Ok(obs), events);
                    }
                } else {
                    tracing::warn!(
                        coord = %coord.redacted(),
                        "deadline headroom exhausted, skipping secondary source"
                    );
                }
            }
        }

        // Cache consult is local file I/O, comfortably inside its one
        // second budget.
        events.push(StageEvent::Started(Stage::Cache));
        let key = Geocache::key_for(&coord);
        match catch_boundary(|| Ok(self.cache.get(&key))) {
            Ok(Some(obs)) => {
                events.push(StageEvent::Succeeded(Stage::Cache));
                tracing::debug!(coord = %coord.redacted(), source = %obs.source, "serving cached observation");
                return (Ok(obs), events);
            }
            Ok(None) => events.push(StageEvent::Failed(Stage::Cache, "miss".to_string())),
            Err(e) => events.push(StageEvent::Failed(Stage::Cache, e.to_string())),
        }

        // The floor: deterministic, cannot fail.
        events.push(StageEvent::Started(Stage::Synthetic));
        let obs = synthetic::estimate(&coord);
        events.push(StageEvent::Succeeded(Stage::Synthetic));
        tracing::info!(
            coord = %coord.redacted(),
            level = %obs.level,
            "all sources failed, serving seasonal estimate"
        );
        (Ok(obs), events)
    }

    /// Run one network stage behind its boundary; `Some` means the chain
    /// stops here.
    fn try_network_stage(
        &mut self,
        stage: Stage,
        coord: &GeoCoordinate,
        budget: Duration,
        events: &mut Vec<StageEvent>,
    ) -> Option<RiskObservation> {
        events.push(StageEvent::Started(stage));

        let (source, tag) = match stage {
            Stage::Primary => (&self.primary, ObservationSource::Effis),
            Stage::Secondary => (&self.secondary, ObservationSource::MetOfficeFsi),
            _ => unreachable!("only network stages go through the fetcher"),
        };

        let fetcher = &self.fetcher;
        let outcome = catch_boundary(|| fetcher.fetch(|| source.query(coord, budget)));

        match outcome {
            Ok(reading) => {
                events.push(StageEvent::Succeeded(stage));
                let obs = RiskObservation {
                    level: reading.level,
                    index_value: reading.index,
                    source: tag,
                    freshness: Freshness::Live,
                    observed_at: Utc::now(),
                };
                // Write-back so later calls can degrade onto this reading.
                if let Err(e) = self.cache.set(coord, &obs) {
                    tracing::warn!(error = %e, "cache write-back failed");
                }
                Some(obs)
            }
            Err(e) => {
                tracing::warn!(
                    coord = %coord.redacted(),
                    stage = ?stage,
                    error = %e,
                    "stage failed, falling through"
                );
                events.push(StageEvent::Failed(stage, e.to_string()));
                None
            }
        }
    }
}

impl Default for RiskOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}
