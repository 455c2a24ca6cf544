//! Quote and execution routes

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

use crate::dto::{
    ApiError, NativeSwapRequest, QuoteRequest, QuoteResponse, SwapRequest, SwapResponse,
};
use crate::routes::error_response;
use crate::AppState;

/// Create swap routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quote", post(get_quote))
        .route("/swap", post(execute_swap))
        .route("/swap/native", post(swap_native))
}

/// POST /quote - Best-route quote; read-only
async fn get_quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, (StatusCode, Json<ApiError>)> {
    let registry = state.registry().await;
    let market = state.market().await;

    let quote = viaduct_swap::calculate_best_route(
        &registry,
        &market,
        &state.config().router,
        &request.token_in,
        &request.token_out,
        request.amount_in,
    )
    .map_err(error_response)?;

    Ok(Json(quote.into()))
}

/// POST /swap - Execute a quoted path atomically
async fn execute_swap(
    State(state): State<AppState>,
    Json(request): Json<SwapRequest>,
) -> Result<Json<SwapResponse>, (StatusCode, Json<ApiError>)> {
    let registry = state.registry().await;
    let mut market = state.market_mut().await;

    let result = viaduct_swap::execute_swap(
        &registry,
        &mut market,
        &request.account,
        &request.token_in,
        &request.path,
        request.amount_in,
        request.min_amount_out,
    )
    .map_err(error_response)?;

    Ok(Json(result.into()))
}

/// POST /swap/native - Swap the native asset into a token
async fn swap_native(
    State(state): State<AppState>,
    Json(request): Json<NativeSwapRequest>,
) -> Result<Json<SwapResponse>, (StatusCode, Json<ApiError>)> {
    let config = state.config();
    let registry = state.registry().await;
    let mut market = state.market_mut().await;

    let result = viaduct_swap::swap_native_to_token(
        &registry,
        &mut market,
        &config.router,
        &config.market.wrapped_native,
        &request.account,
        &request.token_out,
        request.amount_in,
        request.min_amount_out,
    )
    .map_err(error_response)?;

    Ok(Json(result.into()))
}
