//! Geospatially-keyed observation cache at ~/.wildguard/risk_cache.json.
//!
//! TTL: 6 hours, inclusive at exactly six hours. LRU over a fixed number of
//! map cells, tracked by an access-time index persisted next to the records.
//! Records carry a format version; unrecognized versions and undeserializable
//! payloads read as misses and are dropped, never surfaced as errors.

use super::types::{Freshness, RiskObservation};
use crate::error::ServiceError;
use crate::geo::GeoCoordinate;
use crate::geohash;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Inclusive freshness window: an entry aged exactly this is still a hit.
const CACHE_TTL_MS: i64 = 6 * 3600 * 1000;

/// Maximum number of map cells kept, regardless of geographic spread.
pub const DEFAULT_CAPACITY: usize = 64;

const FORMAT_VERSION: &str = "2";

#[derive(Serialize, Deserialize, Clone)]
struct CacheRecord {
    /// Serialized `RiskObservation`.
    payload: String,
    /// UTC epoch milliseconds at write time.
    stored_at: i64,
    #[serde(default)]
    format_version: String,
}

#[derive(Serialize, Deserialize, Default)]
struct CacheFile {
    records: HashMap<String, CacheRecord>,
    index: HashMap<String, i64>,
}

/// Introspection snapshot, served by the cache API endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CacheMetadata {
    pub total_entries: usize,
    /// geohash key → last access, UTC epoch milliseconds.
    pub access_log: HashMap<String, i64>,
    /// Next eviction victim. Absent when the cache is empty; cleanup logic
    /// iterating an empty index must not trip over this.
    pub lru_candidate: Option<String>,
}

/// TTL + LRU cache of the most recent observation per map cell.
pub struct Geocache {
    path: PathBuf,
    records: HashMap<String, CacheRecord>,
    index: HashMap<String, i64>,
    capacity: usize,
}

impl Geocache {
    /// Load from the default location (~/.wildguard/risk_cache.json).
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load from a specific path (for testing).
    pub fn load_from(path: PathBuf) -> Self {
        let file = Self::read_file(&path).unwrap_or_default();
        Self {
            path,
            records: file.records,
            index: file.index,
            capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".wildguard")
            .join("risk_cache.json")
    }

    fn read_file(path: &PathBuf) -> Option<CacheFile> {
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// Cache key for a coordinate.
    pub fn key_for(coord: &GeoCoordinate) -> String {
        geohash::encode(coord.latitude, coord.longitude, geohash::CACHE_PRECISION)
    }

    /// Look up a key. Returns the observation with `freshness` forced to
    /// `Cached` and the original source preserved, or `None` on a miss.
    pub fn get(&mut self, key: &str) -> Option<RiskObservation> {
        self.get_at(key, Utc::now().timestamp_millis())
    }

    /// Look up a key against an explicit clock (for testing the TTL
    /// boundary without racing wall time).
    pub fn get_at(&mut self, key: &str, now_ms: i64) -> Option<RiskObservation> {
        let record = self.records.get(key)?;

        // Unrecognized format: drop the record, treat as a miss.
        if record.format_version != FORMAT_VERSION {
            tracing::debug!(key, version = %record.format_version, "cache record version mismatch");
            self.drop_key(key);
            return None;
        }

        let observation: RiskObservation = match serde_json::from_str(&record.payload) {
            Ok(obs) => obs,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache record payload corrupt");
                self.drop_key(key);
                return None;
            }
        };

        // A negative index value means the record predates validation.
        if observation.index_value.is_some_and(|v| v < 0.0) {
            self.drop_key(key);
            return None;
        }

        let age_ms = now_ms - record.stored_at;
        if age_ms > CACHE_TTL_MS {
            tracing::debug!(key, age_ms, "cache record expired");
            self.drop_key(key);
            return None;
        }

        self.index.insert(key.to_string(), now_ms);
        self.persist();
        Some(observation.with_freshness(Freshness::Cached))
    }

    /// Store the observation for the coordinate's cell, evicting the least
    /// recently used cell first when at capacity.
    pub fn set(&mut self, coord: &GeoCoordinate, obs: &RiskObservation) -> Result<(), ServiceError> {
        self.set_at(coord, obs, Utc::now().timestamp_millis())
    }

    /// Store against an explicit clock (for testing).
    pub fn set_at(
        &mut self,
        coord: &GeoCoordinate,
        obs: &RiskObservation,
        now_ms: i64,
    ) -> Result<(), ServiceError> {
        let key = Self::key_for(coord);

        if !self.records.contains_key(&key) && self.index.len() >= self.capacity {
            if let Some(victim) = self.lru_candidate() {
                tracing::debug!(victim = %victim, "evicting least recently used cell");
                self.drop_key(&victim);
            }
        }

        let payload = serde_json::to_string(obs)
            .map_err(|e| ServiceError::general(format!("cannot serialize observation: {}", e)))?;

        self.records.insert(
            key.clone(),
            CacheRecord {
                payload,
                stored_at: now_ms,
                format_version: FORMAT_VERSION.to_string(),
            },
        );
        self.index.insert(key, now_ms);
        self.persist();
        Ok(())
    }

    /// Remove one key. Missing keys are a no-op.
    pub fn remove(&mut self, key: &str) {
        self.drop_key(key);
        self.persist();
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
        self.persist();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Introspection only; does not touch access times.
    pub fn metadata(&self) -> CacheMetadata {
        CacheMetadata {
            total_entries: self.records.len(),
            access_log: self.index.clone(),
            lru_candidate: self.lru_candidate(),
        }
    }

    /// The key with the oldest access time, if any. Ties break on the key
    /// so the choice is stable.
    fn lru_candidate(&self) -> Option<String> {
        self.index
            .iter()
            .min_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)))
            .map(|(k, _)| k.clone())
    }

    fn drop_key(&mut self, key: &str) {
        self.records.remove(key);
        self.index.remove(key);
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let file = CacheFile {
            records: self.records.clone(),
            index: self.index.clone(),
        };
        if let Ok(json) = serde_json::to_string_pretty(&file) {
            let _ = fs::write(&self.path, json);
        }
    }
}
