//! API route handlers

pub mod admin;
pub mod health;
pub mod swap;

use axum::http::StatusCode;
use axum::{routing::get, Json, Router};

use viaduct_swap::SwapError;

use crate::dto::ApiError;
use crate::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(admin::router())
        .merge(swap::router())
        .with_state(state)
}

/// Map an engine error onto its HTTP status and wire shape
pub(crate) fn error_response(err: SwapError) -> (StatusCode, Json<ApiError>) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiError::new(err.error_code(), err.to_string())))
}
