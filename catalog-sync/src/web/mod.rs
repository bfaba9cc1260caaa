//! Web layer for the station catalog.
//!
//! Exposes the current catalog, the station selection and a manual sync
//! trigger over HTTP.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
