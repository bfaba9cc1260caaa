//! Application configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::{
    BundledCatalog, CatalogStoreConfig, DEFAULT_CACHE_FILE, DEFAULT_REMOTE_URL, DEFAULT_TIMEOUT,
    FetcherConfig,
};

/// Station played when nothing has been selected yet.
pub const DEFAULT_STATION_ID: &str = "rgl";

/// Preferences file name inside the data directory.
pub const PREFERENCES_FILE: &str = "preferences.json";

/// Errors from reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is not valid: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Configuration for the whole service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// URL of the remote catalog document.
    pub remote_url: String,

    /// Directory holding the cache and the preferences file.
    pub data_dir: PathBuf,

    /// Bundled catalog file. The embedded copy is used when unset.
    pub bundled_path: Option<PathBuf>,

    /// Remote request timeout.
    pub timeout: Duration,

    /// Station to fall back to when the last one is unavailable.
    /// Empty disables the fallback.
    pub default_station_id: Option<String>,

    /// Interval between background syncs. Only the startup sync runs
    /// when unset.
    pub refresh_interval: Option<Duration>,

    /// Address the HTTP server binds to.
    pub listen_addr: SocketAddr,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remote_url: DEFAULT_REMOTE_URL.to_string(),
            data_dir: PathBuf::from("data"),
            bundled_path: None,
            timeout: DEFAULT_TIMEOUT,
            default_station_id: Some(DEFAULT_STATION_ID.to_string()),
            refresh_interval: None,
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

impl AppConfig {
    /// Read the configuration from `CATALOG_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`. Unset and empty variables
    /// keep their defaults, except `CATALOG_DEFAULT_STATION` where empty
    /// means no default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string());
        let set = |name: &str| var(name).filter(|v| !v.is_empty());

        if let Some(url) = set("CATALOG_REMOTE_URL") {
            config.remote_url = url;
        }
        if let Some(dir) = set("CATALOG_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(path) = set("CATALOG_BUNDLED_PATH") {
            config.bundled_path = Some(PathBuf::from(path));
        }
        if let Some(secs) = set("CATALOG_TIMEOUT_SECS") {
            config.timeout = parse_secs("CATALOG_TIMEOUT_SECS", &secs)?;
        }
        if let Some(id) = var("CATALOG_DEFAULT_STATION") {
            config.default_station_id = Some(id).filter(|id| !id.is_empty());
        }
        if let Some(secs) = set("CATALOG_REFRESH_SECS") {
            config.refresh_interval = Some(parse_secs("CATALOG_REFRESH_SECS", &secs)?);
        }
        if let Some(addr) = set("CATALOG_LISTEN_ADDR") {
            config.listen_addr = addr.parse().map_err(|e| ConfigError::Invalid {
                name: "CATALOG_LISTEN_ADDR",
                message: format!("{addr:?}: {e}"),
            })?;
        }

        Ok(config)
    }

    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.remote_url = url.into();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the catalog cache file.
    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join(DEFAULT_CACHE_FILE)
    }

    /// Path of the preferences file.
    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join(PREFERENCES_FILE)
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig::new(&self.remote_url).with_timeout(self.timeout)
    }

    pub fn store_config(&self) -> CatalogStoreConfig {
        let config = CatalogStoreConfig::new(self.cache_path());
        match &self.bundled_path {
            Some(path) => config.with_bundled_file(path),
            None => config,
        }
    }

    /// Where the bundled catalog will be read from.
    pub fn bundled(&self) -> BundledCatalog {
        self.store_config().bundled
    }
}

/// Parse a positive number of seconds.
fn parse_secs(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            name,
            message: "must be at least 1 second".to_string(),
        }),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::Invalid {
            name,
            message: format!("{value:?}: {e}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.remote_url, DEFAULT_REMOTE_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.default_station_id.as_deref(), Some("rgl"));
        assert_eq!(config.refresh_interval, None);
        assert_eq!(config.bundled_path, None);
        assert_eq!(config.cache_path(), PathBuf::from("data/stations_cache.json"));
        assert_eq!(config.preferences_path(), PathBuf::from("data/preferences.json"));
        assert!(matches!(config.bundled(), BundledCatalog::Embedded(_)));
    }

    #[test]
    fn reads_every_variable() {
        let config = config_from(&[
            ("CATALOG_REMOTE_URL", "http://localhost:9000/stations.json"),
            ("CATALOG_DATA_DIR", "/var/lib/catalog"),
            ("CATALOG_BUNDLED_PATH", "/usr/share/catalog/stations.json"),
            ("CATALOG_TIMEOUT_SECS", "3"),
            ("CATALOG_DEFAULT_STATION", " rtl "),
            ("CATALOG_REFRESH_SECS", "3600"),
            ("CATALOG_LISTEN_ADDR", "0.0.0.0:8080"),
        ])
        .unwrap();

        assert_eq!(config.remote_url, "http://localhost:9000/stations.json");
        assert_eq!(
            config.cache_path(),
            PathBuf::from("/var/lib/catalog/stations_cache.json")
        );
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.default_station_id.as_deref(), Some("rtl"));
        assert_eq!(config.refresh_interval, Some(Duration::from_secs(3600)));
        assert_eq!(config.listen_addr.port(), 8080);

        let fetcher = config.fetcher_config();
        assert_eq!(fetcher.remote_url, config.remote_url);
        assert_eq!(fetcher.timeout, Duration::from_secs(3));
        match config.bundled() {
            BundledCatalog::File(path) => {
                assert_eq!(path, PathBuf::from("/usr/share/catalog/stations.json"))
            }
            other => panic!("unexpected bundle: {other:?}"),
        }
    }

    #[test]
    fn empty_default_station_disables_fallback() {
        let config = config_from(&[("CATALOG_DEFAULT_STATION", "")]).unwrap();
        assert_eq!(config.default_station_id, None);
    }

    #[test]
    fn empty_values_keep_defaults() {
        let config = config_from(&[("CATALOG_REMOTE_URL", "  "), ("CATALOG_TIMEOUT_SECS", "")])
            .unwrap();
        assert_eq!(config.remote_url, DEFAULT_REMOTE_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = config_from(&[("CATALOG_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().starts_with("CATALOG_TIMEOUT_SECS is not valid"));

        assert!(config_from(&[("CATALOG_REFRESH_SECS", "0")]).is_err());
        assert!(config_from(&[("CATALOG_LISTEN_ADDR", "localhost")]).is_err());
    }

    #[test]
    fn builders() {
        let config = AppConfig::default()
            .with_remote_url("http://example.test/s.json")
            .with_data_dir("/tmp/x")
            .with_timeout(Duration::from_secs(1));
        assert_eq!(config.fetcher_config().remote_url, "http://example.test/s.json");
        assert_eq!(config.preferences_path(), PathBuf::from("/tmp/x/preferences.json"));
    }
}
