//! Catalog synchronizer.
//!
//! Produces a usable catalog at startup from local data only, then converges
//! to the remote catalog when the caller asks for a reconciliation.
//!
//! State is published through a `tokio::sync::watch` channel. Each update
//! replaces the whole [`CatalogState`], so a subscriber never observes a
//! half-applied station list.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::Catalog;

use super::error::CatalogError;
use super::fetcher::{CatalogFetcher, RemoteCatalogSource};
use super::store::CatalogStore;

/// Observable synchronizer state.
#[derive(Debug, Clone)]
pub struct CatalogState {
    /// The current catalog; at worst the bundled one.
    pub catalog: Arc<Catalog>,

    /// Whether a reconciliation is running.
    pub is_syncing: bool,

    /// When the remote last answered with a usable catalog, whether or not
    /// it changed anything.
    pub last_remote_sync: Option<DateTime<Utc>>,

    /// When a remote update last replaced the catalog.
    pub last_changed: Option<DateTime<Utc>>,
}

/// Result of a reconciliation that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The remote version differed and replaced the current catalog.
    Updated { previous: String, current: String },

    /// The remote version matched; the catalog was left alone.
    /// `cache_seeded` is set when the cache file had to be created.
    Unchanged { version: String, cache_seeded: bool },

    /// Another reconciliation was already in flight; nothing was fetched.
    AlreadyRunning,
}

/// Owner of the current catalog.
///
/// Share it behind an `Arc`. At most one reconciliation runs at a time;
/// concurrent calls to [`sync`](Self::sync) return
/// [`SyncOutcome::AlreadyRunning`] immediately.
pub struct CatalogSynchronizer<S = CatalogFetcher> {
    store: CatalogStore,
    source: S,
    state: watch::Sender<CatalogState>,
    in_flight: AtomicBool,
}

impl<S: RemoteCatalogSource> CatalogSynchronizer<S> {
    /// Build the startup catalog from the bundle and the local cache.
    ///
    /// Touches local storage only. Fails only if the bundled catalog is
    /// missing, which means the build is broken.
    pub fn start(store: CatalogStore, source: S) -> Result<Self, CatalogError> {
        let bundled = store.read_bundled()?;
        let catalog = Self::prefer_cache(&store, bundled);

        info!(
            version = catalog.version(),
            stations = catalog.len(),
            selectable = catalog.enabled_count(),
            "Catalog ready"
        );

        let (state, _) = watch::channel(CatalogState {
            catalog: Arc::new(catalog),
            is_syncing: false,
            last_remote_sync: None,
            last_changed: None,
        });

        Ok(Self {
            store,
            source,
            state,
            in_flight: AtomicBool::new(false),
        })
    }

    /// Replace the bundle with the cached catalog when their versions differ.
    ///
    /// The version marker lets a matching cache be skipped without decoding.
    fn prefer_cache(store: &CatalogStore, bundled: Catalog) -> Catalog {
        if store.cached_version().as_deref() == Some(bundled.version()) {
            debug!(version = bundled.version(), "Cached catalog matches bundle, skipping");
            return bundled;
        }

        match store.read_cache() {
            Some(cached) if cached.version() != bundled.version() => {
                info!(
                    bundled = bundled.version(),
                    cached = cached.version(),
                    "Using cached catalog"
                );
                cached
            }
            _ => bundled,
        }
    }

    /// Fetch the remote catalog and adopt it if its version differs.
    ///
    /// Failures leave the current catalog untouched. They are logged and
    /// returned for the caller to surface if it wants to.
    pub async fn sync(&self) -> Result<SyncOutcome, CatalogError> {
        let Some(_guard) = SyncGuard::acquire(&self.in_flight, &self.state) else {
            debug!("Catalog sync already in flight");
            return Ok(SyncOutcome::AlreadyRunning);
        };

        let fetched = match self.source.fetch_remote().await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!(error = %e, "Catalog sync failed, keeping current catalog");
                return Err(e);
            }
        };

        let now = Utc::now();
        let current = self.catalog();

        if fetched.catalog.version() == current.version() {
            let cache_seeded = !self.store.cache_exists() && self.store.write_cache(&fetched.raw);
            self.state.send_modify(|s| s.last_remote_sync = Some(now));
            info!(version = current.version(), cache_seeded, "Remote catalog unchanged");
            return Ok(SyncOutcome::Unchanged {
                version: current.version().to_string(),
                cache_seeded,
            });
        }

        let previous = current.version().to_string();
        let catalog = Arc::new(fetched.catalog);
        let version = catalog.version().to_string();
        info!(
            previous = %previous,
            current = %version,
            stations = catalog.len(),
            last_updated = catalog.last_updated(),
            "Updating catalog from remote"
        );

        self.state.send_modify(|s| {
            s.catalog = catalog;
            s.last_remote_sync = Some(now);
            s.last_changed = Some(now);
        });
        self.store.write_cache(&fetched.raw);

        Ok(SyncOutcome::Updated {
            previous,
            current: version,
        })
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.state.subscribe()
    }

    /// Current state.
    pub fn snapshot(&self) -> CatalogState {
        self.state.borrow().clone()
    }

    /// Current catalog.
    pub fn catalog(&self) -> Arc<Catalog> {
        self.state.borrow().catalog.clone()
    }

    pub fn is_syncing(&self) -> bool {
        self.state.borrow().is_syncing
    }

    pub fn last_remote_sync(&self) -> Option<DateTime<Utc>> {
        self.state.borrow().last_remote_sync
    }

    /// Delete the local cache. The in-memory catalog is kept.
    pub fn clear_cache(&self) {
        self.store.clear();
    }

    /// The underlying store.
    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// The remote source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: RemoteCatalogSource + 'static> CatalogSynchronizer<S> {
    /// Run a reconciliation on a background task.
    pub fn spawn_sync(self: &Arc<Self>) -> JoinHandle<Result<SyncOutcome, CatalogError>> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.sync().await })
    }
}

/// Single-flight guard.
///
/// Holding it means this task owns the reconciliation. Dropping it, on
/// completion or cancellation, clears both the flag and `is_syncing`.
struct SyncGuard<'a> {
    in_flight: &'a AtomicBool,
    state: &'a watch::Sender<CatalogState>,
}

impl<'a> SyncGuard<'a> {
    fn acquire(
        in_flight: &'a AtomicBool,
        state: &'a watch::Sender<CatalogState>,
    ) -> Option<Self> {
        in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        state.send_modify(|s| s.is_syncing = true);
        Some(Self { in_flight, state })
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.is_syncing = false);
        self.in_flight.store(false, Ordering::Release);
    }
}
