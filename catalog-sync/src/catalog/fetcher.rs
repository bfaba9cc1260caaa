//! Remote catalog HTTP client.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};
use tracing::debug;

use crate::domain::Catalog;

use super::error::CatalogError;

/// Default location of the remote catalog document.
pub const DEFAULT_REMOTE_URL: &str =
    "https://raw.githubusercontent.com/arnoflorentin/letzlisten/main/stations.json";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A decoded remote catalog together with the bytes it was decoded from.
///
/// The raw bytes are what gets written to the cache, verbatim.
#[derive(Debug, Clone)]
pub struct FetchedCatalog {
    pub catalog: Catalog,
    pub raw: Vec<u8>,
}

/// Source of the remote catalog.
///
/// This abstraction allows the synchronizer to be tested with scripted
/// responses.
pub trait RemoteCatalogSource: Send + Sync {
    /// Fetch and decode the current remote catalog.
    fn fetch_remote(&self) -> impl Future<Output = Result<FetchedCatalog, CatalogError>> + Send;
}

/// Configuration for the catalog fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// URL of the catalog document, without query string
    pub remote_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl FetcherConfig {
    /// Create a config for the given URL with the default timeout.
    pub fn new(remote_url: impl Into<String>) -> Self {
        Self {
            remote_url: remote_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REMOTE_URL)
    }
}

/// HTTP client for the remote catalog.
///
/// Every request carries a `t=<unix seconds>` query parameter and no-cache
/// headers so intermediaries never answer from a stale copy.
#[derive(Debug, Clone)]
pub struct CatalogFetcher {
    http: reqwest::Client,
    remote_url: String,
    timeout: Duration,
}

impl CatalogFetcher {
    /// Create a new fetcher.
    pub fn new(config: FetcherConfig) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(CatalogError::NetworkUnavailable)?;

        Ok(Self {
            http,
            remote_url: config.remote_url,
            timeout: config.timeout,
        })
    }

    /// The configured catalog URL.
    pub fn remote_url(&self) -> &str {
        &self.remote_url
    }

    /// Fetch the remote catalog.
    pub async fn fetch_remote(&self) -> Result<FetchedCatalog, CatalogError> {
        let cache_buster = Utc::now().timestamp().to_string();
        debug!(url = %self.remote_url, t = %cache_buster, "Fetching remote catalog");

        let response = self
            .http
            .get(&self.remote_url)
            .query(&[("t", cache_buster)])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let response = response
            .error_for_status()
            .map_err(CatalogError::NetworkUnavailable)?;

        let raw = response.bytes().await.map_err(|e| self.classify(e))?.to_vec();

        let catalog = Catalog::from_json(&raw).map_err(|e| CatalogError::MalformedCatalog {
            message: e.to_string(),
        })?;

        debug!(
            version = catalog.version(),
            stations = catalog.len(),
            bytes = raw.len(),
            "Fetched remote catalog"
        );
        Ok(FetchedCatalog { catalog, raw })
    }

    fn classify(&self, err: reqwest::Error) -> CatalogError {
        if err.is_timeout() {
            CatalogError::NetworkTimeout(self.timeout)
        } else {
            CatalogError::NetworkUnavailable(err)
        }
    }
}

impl RemoteCatalogSource for CatalogFetcher {
    fn fetch_remote(&self) -> impl Future<Output = Result<FetchedCatalog, CatalogError>> + Send {
        CatalogFetcher::fetch_remote(self)
    }
}
