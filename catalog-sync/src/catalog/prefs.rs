//! Small persistent key-value record.
//!
//! Holds the last station the listener picked and the version of the
//! cached catalog, so startup can compare versions without decoding the
//! whole cache file.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::store::write_atomic;

/// The persisted preference values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceRecord {
    /// Id of the station the listener last played.
    #[serde(default)]
    pub last_selected_station_id: Option<String>,

    /// Version of the catalog held in the cache file.
    #[serde(default)]
    pub catalog_version: Option<String>,
}

/// JSON-file backed preferences.
///
/// Reads are served from memory; every change is written through to disk.
/// Write failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct Preferences {
    path: PathBuf,
    record: Mutex<PreferenceRecord>,
}

impl Preferences {
    /// Open preferences at `path`.
    ///
    /// A missing or unreadable file yields empty preferences.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let record = std::fs::read(&path)
            .ok()
            .and_then(|bytes| match serde_json::from_slice(&bytes) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring unreadable preferences file");
                    None
                }
            })
            .unwrap_or_default();

        Self {
            path,
            record: Mutex::new(record),
        }
    }

    /// Snapshot of the current values.
    pub fn record(&self) -> PreferenceRecord {
        self.lock().clone()
    }

    pub fn last_selected_station_id(&self) -> Option<String> {
        self.lock().last_selected_station_id.clone()
    }

    /// Remember the listener's station. Returns `false` if the write failed.
    pub fn set_last_selected_station_id(&self, id: impl Into<String>) -> bool {
        let id = id.into();
        self.update(|r| r.last_selected_station_id = Some(id))
    }

    pub fn catalog_version(&self) -> Option<String> {
        self.lock().catalog_version.clone()
    }

    /// Record (or forget) the cached catalog version.
    pub fn set_catalog_version(&self, version: Option<String>) -> bool {
        self.update(|r| r.catalog_version = version)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, PreferenceRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, change: impl FnOnce(&mut PreferenceRecord)) -> bool {
        let mut record = self.lock();
        let before = record.clone();
        change(&mut record);
        if *record == before {
            return true;
        }

        let result = serde_json::to_vec_pretty(&*record)
            .map_err(|e| e.to_string())
            .and_then(|json| write_atomic(&self.path, &json).map_err(|e| e.to_string()));

        match result {
            Ok(()) => {
                debug!(path = %self.path.display(), "Saved preferences");
                true
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to save preferences");
                false
            }
        }
    }
}
