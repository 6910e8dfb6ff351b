//! Preference store at ~/.wildguard/preferences.json.
//!
//! Holds the single manual-location slot. Each save fully overwrites the
//! slot, so there is no read-modify-write race to defend against. An
//! unreadable or corrupt file loads as empty preferences.

use super::types::ManualLocation;
use crate::geo::GeoCoordinate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Default)]
struct Preferences {
    #[serde(default)]
    manual: Option<ManualLocation>,
}

/// File-backed preference store.
pub struct PreferenceStore {
    path: PathBuf,
    prefs: Preferences,
}

impl PreferenceStore {
    /// Load from the default location (~/.wildguard/preferences.json).
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load from a specific path (for testing).
    pub fn load_from(path: PathBuf) -> Self {
        let prefs = Self::read_file(&path).unwrap_or_default();
        Self { path, prefs }
    }

    fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".wildguard")
            .join("preferences.json")
    }

    fn read_file(path: &PathBuf) -> Option<Preferences> {
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// The stored manual entry, if one has ever been saved.
    pub fn manual_location(&self) -> Option<&ManualLocation> {
        self.prefs.manual.as_ref()
    }

    /// Overwrite the manual slot with a coordinate, place name, and save
    /// instant (UTC epoch milliseconds).
    pub fn save_manual(&mut self, coord: &GeoCoordinate, place_name: &str, saved_at: i64) {
        self.prefs.manual = Some(ManualLocation {
            latitude: coord.latitude,
            longitude: coord.longitude,
            place_name: place_name.to_string(),
            saved_at,
        });
        self.persist();
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(json) = serde_json::to_string_pretty(&self.prefs) {
            let _ = fs::write(&self.path, json);
        }
    }
}
