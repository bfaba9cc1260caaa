//! Durable local storage for the station catalog.
//!
//! Two independent slots: the read-only catalog bundled with the build and
//! a writable cache holding the raw bytes of the last successful remote
//! fetch. The cached version is mirrored into [`Preferences`] so startup
//! can compare versions without decoding the cache file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::domain::{Catalog, CatalogIssue};

use super::error::CatalogError;
use super::prefs::Preferences;

/// Catalog compiled into the binary.
const EMBEDDED_CATALOG: &[u8] = include_bytes!("../../data/stations.json");

/// Default cache file name.
pub const DEFAULT_CACHE_FILE: &str = "stations_cache.json";

/// Where the bundled catalog comes from.
#[derive(Debug, Clone)]
pub enum BundledCatalog {
    /// Bytes shipped inside the binary.
    Embedded(&'static [u8]),
    /// A file installed next to the application.
    File(PathBuf),
}

impl BundledCatalog {
    fn location(&self) -> String {
        match self {
            BundledCatalog::Embedded(_) => "embedded".to_string(),
            BundledCatalog::File(path) => path.display().to_string(),
        }
    }
}

impl Default for BundledCatalog {
    fn default() -> Self {
        BundledCatalog::Embedded(EMBEDDED_CATALOG)
    }
}

/// Configuration for the catalog store.
#[derive(Debug, Clone)]
pub struct CatalogStoreConfig {
    /// Source of the bundled default catalog.
    pub bundled: BundledCatalog,
    /// Path to the writable cache file.
    pub cache_path: PathBuf,
}

impl CatalogStoreConfig {
    /// Create a config with the given cache path and the embedded bundle.
    pub fn new(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            bundled: BundledCatalog::default(),
            cache_path: cache_path.into(),
        }
    }

    /// Read the bundled catalog from a file instead of the embedded copy.
    pub fn with_bundled_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.bundled = BundledCatalog::File(path.into());
        self
    }

    /// Use the given bytes as the bundled catalog.
    pub fn with_bundled_bytes(mut self, bytes: &'static [u8]) -> Self {
        self.bundled = BundledCatalog::Embedded(bytes);
        self
    }
}

impl Default for CatalogStoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_FILE)
    }
}

/// Just enough of a catalog document to read its version.
#[derive(Deserialize)]
struct VersionOnly {
    version: String,
}

/// Local catalog persistence.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    config: CatalogStoreConfig,
    prefs: Arc<Preferences>,
}

impl CatalogStore {
    /// Create a store. `prefs` holds the cached version marker.
    pub fn new(config: CatalogStoreConfig, prefs: Arc<Preferences>) -> Self {
        Self { config, prefs }
    }

    /// Load the catalog shipped with the build.
    ///
    /// A missing or undecodable bundle means the build is broken.
    pub fn read_bundled(&self) -> Result<Catalog, CatalogError> {
        let location = self.config.bundled.location();
        let missing = |message: String| CatalogError::MissingBundledResource {
            location: location.clone(),
            message,
        };

        let catalog = match &self.config.bundled {
            BundledCatalog::Embedded(bytes) => Catalog::from_json(bytes),
            BundledCatalog::File(path) => {
                let bytes = std::fs::read(path).map_err(|e| missing(e.to_string()))?;
                Catalog::from_json(&bytes)
            }
        }
        .map_err(|e| missing(e.to_string()))?;

        report_issues(&catalog, &location);
        info!(
            version = catalog.version(),
            stations = catalog.len(),
            "Loaded bundled catalog"
        );
        Ok(catalog)
    }

    /// Load the previously cached remote catalog.
    ///
    /// Returns `None` if there is no cache file or it does not decode.
    pub fn read_cache(&self) -> Option<Catalog> {
        let path = &self.config.cache_path;
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No cached catalog");
                return None;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read cached catalog");
                return None;
            }
        };

        match Catalog::from_json(&bytes) {
            Ok(catalog) => {
                report_issues(&catalog, &path.display().to_string());
                Some(catalog)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring undecodable cached catalog");
                None
            }
        }
    }

    /// Version of the cached catalog, from the fast marker.
    pub fn cached_version(&self) -> Option<String> {
        self.prefs.catalog_version()
    }

    /// Whether a cache file is present.
    pub fn cache_exists(&self) -> bool {
        self.config.cache_path.is_file()
    }

    /// Persist the raw bytes of a fetched catalog and record its version.
    ///
    /// Failures are logged and reported as `false`; the in-memory catalog
    /// stays authoritative for this session either way.
    pub fn write_cache(&self, raw: &[u8]) -> bool {
        let path = &self.config.cache_path;

        let version = match serde_json::from_slice::<VersionOnly>(raw) {
            Ok(doc) => doc.version,
            Err(e) => {
                warn!(error = %e, "Refusing to cache a document without a version");
                return false;
            }
        };

        if let Err(e) = write_atomic(path, raw) {
            warn!(path = %path.display(), error = %e, "Failed to write catalog cache");
            return false;
        }

        self.prefs.set_catalog_version(Some(version.clone()));
        info!(path = %path.display(), version = %version, bytes = raw.len(), "Saved catalog cache");
        true
    }

    /// Delete the cache file and forget its version. Idempotent.
    pub fn clear(&self) {
        let path = &self.config.cache_path;
        match std::fs::remove_file(path) {
            Ok(()) => info!(path = %path.display(), "Cleared catalog cache"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Catalog cache already empty");
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to clear catalog cache"),
        }
        self.prefs.set_catalog_version(None);
    }

    /// Get the cache file path.
    pub fn cache_path(&self) -> &Path {
        &self.config.cache_path
    }

    /// The preferences holding the version marker.
    pub fn preferences(&self) -> &Arc<Preferences> {
        &self.prefs
    }
}

fn report_issues(catalog: &Catalog, location: &str) {
    for issue in catalog.validate() {
        match issue {
            CatalogIssue::Empty => error!(location, version = catalog.version(), "{issue}"),
            CatalogIssue::DuplicateId(_) => {
                warn!(location, version = catalog.version(), "{issue}")
            }
        }
    }
}

/// Write `bytes` to `path` via a sibling temp file and rename.
///
/// Creates parent directories if they don't exist.
pub(super) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CatalogError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| CatalogError::Cache {
            message: format!("failed to create directory {}: {}", parent.display(), e),
        })?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, bytes).map_err(|e| CatalogError::Cache {
        message: format!("failed to write {}: {}", tmp.display(), e),
    })?;

    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        CatalogError::Cache {
            message: format!("failed to replace {}: {}", path.display(), e),
        }
    })
}
