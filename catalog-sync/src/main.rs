use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use catalog_sync::catalog::{
    CatalogFetcher, CatalogStore, CatalogSynchronizer, Preferences, StationSelector,
};
use catalog_sync::config::AppConfig;
use catalog_sync::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    info!(
        remote = %config.remote_url,
        data_dir = %config.data_dir.display(),
        timeout_secs = config.timeout.as_secs(),
        "Starting catalog service"
    );

    let prefs = Arc::new(Preferences::open(config.preferences_path()));
    let store = CatalogStore::new(config.store_config(), prefs.clone());

    let fetcher = match CatalogFetcher::new(config.fetcher_config()) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!(error = %e, "Failed to create HTTP client");
            return ExitCode::FAILURE;
        }
    };

    // A missing bundle means a broken build.
    let catalog = match CatalogSynchronizer::start(store, fetcher) {
        Ok(sync) => Arc::new(sync),
        Err(e) => {
            error!(error = %e, "Cannot load bundled catalog");
            return ExitCode::FAILURE;
        }
    };

    let selector = Arc::new(StationSelector::new(prefs, config.default_station_id.clone()));
    // Resolve the selection now and again whenever a sync lands.
    {
        let selector = selector.clone();
        let updates = catalog.subscribe();
        tokio::spawn(async move { selector.follow(updates).await });
    }

    // Startup sync runs in the background; the catalog is already usable.
    catalog.spawn_sync();

    if let Some(every) = config.refresh_interval {
        let catalog = catalog.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await; // First tick is immediate, skip it
            loop {
                interval.tick().await;
                // Failures are already logged by the synchronizer.
                let _ = catalog.sync().await;
            }
        });
    }

    let app = create_router(AppState::new(catalog, selector));

    let listener = match tokio::net::TcpListener::bind(config.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.listen_addr, error = %e, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };
    info!(addr = %config.listen_addr, "Listening");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server stopped");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
