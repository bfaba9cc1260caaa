//! Application state for the web layer.

use std::sync::Arc;

use crate::catalog::{CatalogSynchronizer, StationSelector};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Owner of the current catalog
    pub catalog: Arc<CatalogSynchronizer>,

    /// Remembered station choice
    pub selector: Arc<StationSelector>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(catalog: Arc<CatalogSynchronizer>, selector: Arc<StationSelector>) -> Self {
        Self { catalog, selector }
    }
}
