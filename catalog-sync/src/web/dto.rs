//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogState, Selection, SelectionSource, SyncOutcome};
use crate::domain::StationRecord;

/// A station as returned by the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct StationResult {
    pub id: String,
    pub name: String,
    pub stream_url: String,

    /// Name of the bundled logo image
    pub logo: Option<String>,

    pub website_url: Option<String>,
    pub is_enabled: bool,
}

impl StationResult {
    pub fn from_station(station: &StationRecord) -> Self {
        Self {
            id: station.id.clone(),
            name: station.name.clone(),
            stream_url: station.stream_url.clone(),
            logo: station.logo_asset_name.clone(),
            website_url: station.website_url.clone(),
            is_enabled: station.is_enabled,
        }
    }
}

/// Response for `GET /catalog`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub version: String,
    pub last_updated: String,
    pub is_syncing: bool,
    pub last_remote_sync: Option<DateTime<Utc>>,
    pub last_changed: Option<DateTime<Utc>>,

    /// Every station, disabled ones included
    pub stations: Vec<StationResult>,
}

impl CatalogResponse {
    pub fn from_state(state: &CatalogState) -> Self {
        Self {
            version: state.catalog.version().to_string(),
            last_updated: state.catalog.last_updated().to_string(),
            is_syncing: state.is_syncing,
            last_remote_sync: state.last_remote_sync,
            last_changed: state.last_changed,
            stations: state
                .catalog
                .stations()
                .iter()
                .map(StationResult::from_station)
                .collect(),
        }
    }
}

/// Response for `GET /stations`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StationListResponse {
    pub version: String,
    pub stations: Vec<StationResult>,
}

/// Response for `GET /selection`.
#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub station: StationResult,
    pub source: SelectionSource,
}

impl From<Selection> for SelectionResponse {
    fn from(selection: Selection) -> Self {
        Self {
            station: StationResult::from_station(&selection.station),
            source: selection.source,
        }
    }
}

/// Request body for `POST /selection`.
#[derive(Debug, Deserialize)]
pub struct SelectStationRequest {
    pub station_id: String,
}

/// Response for `POST /sync`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SyncResponse {
    /// `updated`, `unchanged` or `already_running`
    pub outcome: String,

    /// Catalog version after the sync
    pub version: String,

    /// Version replaced by an update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,

    /// Whether the cache file had to be created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_seeded: Option<bool>,
}

impl SyncResponse {
    pub fn new(outcome: SyncOutcome, current_version: &str) -> Self {
        match outcome {
            SyncOutcome::Updated { previous, current } => Self {
                outcome: "updated".into(),
                version: current,
                previous: Some(previous),
                cache_seeded: None,
            },
            SyncOutcome::Unchanged {
                version,
                cache_seeded,
            } => Self {
                outcome: "unchanged".into(),
                version,
                previous: None,
                cache_seeded: Some(cache_seeded),
            },
            SyncOutcome::AlreadyRunning => Self {
                outcome: "already_running".into(),
                version: current_version.to_string(),
                previous: None,
                cache_seeded: None,
            },
        }
    }
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_result_renames_logo() {
        let station = StationRecord::new("rgl", "Radio Gutt Laun", "https://rgl")
            .with_logo("rgl_logo")
            .disabled();
        let json = serde_json::to_value(StationResult::from_station(&station)).unwrap();
        assert_eq!(json["logo"], "rgl_logo");
        assert_eq!(json["stream_url"], "https://rgl");
        assert_eq!(json["website_url"], serde_json::Value::Null);
        assert_eq!(json["is_enabled"], false);
    }

    #[test]
    fn sync_response_shapes() {
        let updated = SyncResponse::new(
            SyncOutcome::Updated {
                previous: "1.0".into(),
                current: "1.1".into(),
            },
            "1.1",
        );
        let json = serde_json::to_value(&updated).unwrap();
        assert_eq!(json["outcome"], "updated");
        assert_eq!(json["previous"], "1.0");
        assert!(json.get("cache_seeded").is_none());

        let busy = SyncResponse::new(SyncOutcome::AlreadyRunning, "1.0");
        assert_eq!(busy.version, "1.0");
        assert_eq!(busy.outcome, "already_running");
    }
}
