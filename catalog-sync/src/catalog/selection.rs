//! Station selection against the current catalog.
//!
//! The player remembers the last station the listener picked. After the
//! catalog changes that station may be gone or disabled, so the choice is
//! re-resolved with this precedence:
//!
//! 1. the last selected station, if enabled
//! 2. the configured default station, if enabled
//! 3. the first enabled station in canonical order
//!
//! A catalog with no enabled stations yields `NoStationsAvailable`.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::{Catalog, StationRecord};

use super::error::CatalogError;
use super::prefs::Preferences;
use super::sync::CatalogState;

/// Which rule picked the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    LastSelected,
    ConfiguredDefault,
    FirstEnabled,
}

/// A resolved station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub station: StationRecord,
    pub source: SelectionSource,
}

/// Resolve the station to play from `catalog`.
pub fn resolve_selection(
    catalog: &Catalog,
    last_selected: Option<&str>,
    default_station_id: Option<&str>,
) -> Result<Selection, CatalogError> {
    let pick = |id: Option<&str>, source| {
        id.and_then(|id| catalog.enabled_station(id))
            .map(|station| Selection {
                station: station.clone(),
                source,
            })
    };

    pick(last_selected, SelectionSource::LastSelected)
        .or_else(|| pick(default_station_id, SelectionSource::ConfiguredDefault))
        .or_else(|| {
            catalog.first_enabled().map(|station| Selection {
                station: station.clone(),
                source: SelectionSource::FirstEnabled,
            })
        })
        .ok_or_else(|| CatalogError::NoStationsAvailable {
            version: catalog.version().to_string(),
        })
}

/// Persistent station choice.
///
/// Wraps the preferences holding the last selected id and the configured
/// default station.
#[derive(Debug, Clone)]
pub struct StationSelector {
    prefs: Arc<Preferences>,
    default_station_id: Option<String>,
}

impl StationSelector {
    pub fn new(prefs: Arc<Preferences>, default_station_id: Option<String>) -> Self {
        Self {
            prefs,
            default_station_id,
        }
    }

    /// The configured default station id.
    pub fn default_station_id(&self) -> Option<&str> {
        self.default_station_id.as_deref()
    }

    /// The persisted last selected station id.
    pub fn last_selected(&self) -> Option<String> {
        self.prefs.last_selected_station_id()
    }

    /// Resolve the station to play without remembering it.
    pub fn current(&self, catalog: &Catalog) -> Result<Selection, CatalogError> {
        let last = self.prefs.last_selected_station_id();
        resolve_selection(catalog, last.as_deref(), self.default_station_id())
    }

    /// Resolve the station to play and remember it.
    pub fn resolve(&self, catalog: &Catalog) -> Result<Selection, CatalogError> {
        let last = self.prefs.last_selected_station_id();
        let selection = resolve_selection(catalog, last.as_deref(), self.default_station_id())
            .inspect_err(|e| warn!(error = %e, "No station to select"))?;

        match (&last, selection.source) {
            (_, SelectionSource::LastSelected) => {
                debug!(station = %selection.station.id, "Restored last station")
            }
            (Some(previous), source) => warn!(
                previous = %previous,
                station = %selection.station.id,
                ?source,
                "Last station no longer available, falling back"
            ),
            (None, source) => info!(station = %selection.station.id, ?source, "Selected station"),
        }

        self.prefs.set_last_selected_station_id(&selection.station.id);
        Ok(selection)
    }

    /// Record an explicit choice by the listener.
    pub fn select(&self, catalog: &Catalog, id: &str) -> Result<StationRecord, CatalogError> {
        let station = catalog
            .station(id)
            .ok_or_else(|| CatalogError::StationNotFound(id.to_string()))?;
        if !station.is_enabled {
            return Err(CatalogError::StationDisabled(id.to_string()));
        }

        self.prefs.set_last_selected_station_id(id);
        info!(station = %station.id, name = %station.name, "Station selected");
        Ok(station.clone())
    }

    /// Resolve the selection against the current catalog, then again after
    /// every successful remote sync.
    ///
    /// Runs until the synchronizer is dropped.
    pub async fn follow(&self, mut updates: watch::Receiver<CatalogState>) {
        // A sync may have landed between `subscribe` and the first poll.
        let (mut seen, catalog) = {
            let state = updates.borrow_and_update();
            (state.last_remote_sync, state.catalog.clone())
        };
        let _ = self.resolve(&catalog);

        while updates.changed().await.is_ok() {
            let (synced, catalog) = {
                let state = updates.borrow_and_update();
                (state.last_remote_sync, state.catalog.clone())
            };
            if synced == seen {
                continue;
            }
            seen = synced;
            // Errors are logged by `resolve`.
            let _ = self.resolve(&catalog);
        }
    }
}
