//! Station catalog storage, fetching and synchronization.
//!
//! Startup builds the current catalog from the bundled copy and the local
//! cache without touching the network. A caller-triggered reconciliation
//! then fetches the remote catalog and adopts it when its version differs.

mod error;
mod fetcher;
mod prefs;
mod selection;
mod store;
mod sync;


pub use error::CatalogError;
pub use fetcher::{
    CatalogFetcher, DEFAULT_REMOTE_URL, DEFAULT_TIMEOUT, FetchedCatalog, FetcherConfig,
    RemoteCatalogSource,
};
pub use prefs::{PreferenceRecord, Preferences};
pub use selection::{Selection, SelectionSource, StationSelector, resolve_selection};
pub use store::{BundledCatalog, CatalogStore, CatalogStoreConfig, DEFAULT_CACHE_FILE};
pub use sync::{CatalogState, CatalogSynchronizer, SyncOutcome};
