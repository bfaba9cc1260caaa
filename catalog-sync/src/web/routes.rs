//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{debug, error, warn};

use crate::catalog::CatalogError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/catalog", get(catalog))
        .route("/stations", get(list_stations))
        .route("/stations/:id", get(get_station))
        .route("/selection", get(current_selection).post(select_station))
        .route("/sync", post(run_sync))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Full catalog with sync status.
async fn catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    Json(CatalogResponse::from_state(&state.catalog.snapshot()))
}

/// Selectable stations in canonical order.
async fn list_stations(State(state): State<AppState>) -> Json<StationListResponse> {
    let catalog = state.catalog.catalog();
    Json(StationListResponse {
        version: catalog.version().to_string(),
        stations: catalog.selectable().map(StationResult::from_station).collect(),
    })
}

/// Any station by id, disabled or not.
async fn get_station(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StationResult>, AppError> {
    let catalog = state.catalog.catalog();
    let station = catalog
        .station(&id)
        .ok_or(CatalogError::StationNotFound(id))?;
    Ok(Json(StationResult::from_station(station)))
}

/// The station that would play now. Nothing is persisted.
async fn current_selection(
    State(state): State<AppState>,
) -> Result<Json<SelectionResponse>, AppError> {
    let selection = state.selector.current(&state.catalog.catalog())?;
    Ok(Json(selection.into()))
}

/// Remember an explicit choice.
async fn select_station(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StationResult>, AppError> {
    // Parse JSON manually so the body can be logged on failure
    let req: SelectStationRequest = serde_json::from_slice(&body).map_err(|e| {
        debug!(body = %String::from_utf8_lossy(&body), "Rejected selection body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;

    let station = state
        .selector
        .select(&state.catalog.catalog(), &req.station_id)?;
    Ok(Json(StationResult::from_station(&station)))
}

/// Run a reconciliation and report what it did.
async fn run_sync(State(state): State<AppState>) -> Result<Json<SyncResponse>, AppError> {
    let outcome = state.catalog.sync().await?;
    let version = state.catalog.catalog().version().to_string();
    Ok(Json(SyncResponse::new(outcome, &version)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    BadGateway { message: String },
    GatewayTimeout { message: String },
    Internal { message: String },
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        let message = e.to_string();
        match e {
            CatalogError::StationNotFound(_) => AppError::NotFound { message },
            CatalogError::StationDisabled(_) | CatalogError::NoStationsAvailable { .. } => {
                AppError::Conflict { message }
            }
            CatalogError::NetworkTimeout(_) => AppError::GatewayTimeout { message },
            CatalogError::NetworkUnavailable(_) | CatalogError::MalformedCatalog { .. } => {
                AppError::BadGateway { message }
            }
            CatalogError::MissingBundledResource { .. } | CatalogError::Cache { .. } => {
                AppError::Internal { message }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::GatewayTimeout { message } => (StatusCode::GATEWAY_TIMEOUT, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
