//! Administrative routes: registration, market state, and ledger funding
//!
//! Every mutation takes the caller account in the request body and checks
//! it against the registry owner. Authentication proper sits outside the
//! engine; this is the ownership gate only.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use viaduct_core::AccountId;
use viaduct_swap::{Market, Pool};

use crate::dto::{
    AccountBalancesResponse, ApiError, CreditBalanceRequest, InstallMinterRequest,
    InstallMinterResponse, PoolsQuery, PoolsResponse, RegisterPoolRequest, RegisterPoolResponse,
    RegisterTokenRequest, RegisterTokenResponse, TokenBalanceDto, TokensResponse,
};
use crate::routes::error_response;
use crate::AppState;

/// Create admin routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tokens", get(list_tokens).post(register_token))
        .route("/pools", get(get_pools).post(register_pool))
        .route("/minters", post(install_minter))
        .route("/balances", post(credit_balance))
        .route("/balances/:account", get(get_balances))
}

/// GET /tokens - List supported tokens in registration order
async fn list_tokens(State(state): State<AppState>) -> Json<TokensResponse> {
    let registry = state.registry().await;
    let tokens = registry.supported_tokens().to_vec();
    let count = tokens.len();
    Json(TokensResponse { tokens, count })
}

/// POST /tokens - Register a token
async fn register_token(
    State(state): State<AppState>,
    Json(request): Json<RegisterTokenRequest>,
) -> Result<Json<RegisterTokenResponse>, (StatusCode, Json<ApiError>)> {
    let mut registry = state.registry_mut().await;
    registry
        .register_token(&request.caller, request.token.clone())
        .map_err(error_response)?;

    Ok(Json(RegisterTokenResponse {
        token: request.token,
        supported: registry.supported_tokens().len(),
    }))
}

/// GET /pools?token_a=..&token_b=.. - Pools registered for a pair
async fn get_pools(
    State(state): State<AppState>,
    Query(query): Query<PoolsQuery>,
) -> Json<PoolsResponse> {
    let registry = state.registry().await;
    let pools = registry.pools_for(&query.token_a, &query.token_b).to_vec();
    let count = pools.len();
    Json(PoolsResponse { pools, count })
}

/// POST /pools - Register a pool, optionally installing its live state
async fn register_pool(
    State(state): State<AppState>,
    Json(request): Json<RegisterPoolRequest>,
) -> Result<Json<RegisterPoolResponse>, (StatusCode, Json<ApiError>)> {
    let pool = Pool {
        pool_id: request.pool_id.clone(),
        token_a: request.token_a,
        token_b: request.token_b,
        protocol: request.protocol,
    };

    let mut registry = state.registry_mut().await;
    registry
        .register_pool(&request.caller, pool)
        .map_err(error_response)?;

    if let Some(pool_state) = request.state {
        let mut market = state.market_mut().await;
        market.install_pool_state(request.pool_id.clone(), pool_state);
    }

    Ok(Json(RegisterPoolResponse {
        pool_id: request.pool_id,
        pool_count: registry.pool_count(),
    }))
}

/// POST /minters - Install a shared minter's state
async fn install_minter(
    State(state): State<AppState>,
    Json(request): Json<InstallMinterRequest>,
) -> Result<Json<InstallMinterResponse>, (StatusCode, Json<ApiError>)> {
    let registry = state.registry().await;
    registry
        .ensure_owner(&request.caller)
        .map_err(error_response)?;

    let mut market = state.market_mut().await;
    market
        .install_minter(request.minter.clone(), request.state)
        .map_err(error_response)?;

    tracing::info!(minter = %request.minter, "minter state installed");

    Ok(Json(InstallMinterResponse {
        minter: request.minter,
        installed: true,
    }))
}

/// POST /balances - Credit an account's native or token balance
async fn credit_balance(
    State(state): State<AppState>,
    Json(request): Json<CreditBalanceRequest>,
) -> Result<Json<AccountBalancesResponse>, (StatusCode, Json<ApiError>)> {
    let registry = state.registry().await;
    registry
        .ensure_owner(&request.caller)
        .map_err(error_response)?;

    let mut market = state.market_mut().await;
    match &request.token {
        Some(token) => market
            .ledger_mut()
            .credit_token(&request.account, token, request.amount),
        None => market.ledger_mut().credit_native(&request.account, request.amount),
    }
    .map_err(error_response)?;

    tracing::info!(account = %request.account, amount = request.amount, "balance credited");

    Ok(Json(balances_of(&market, request.account)))
}

/// GET /balances/:account - Read an account's ledger row
async fn get_balances(
    State(state): State<AppState>,
    Path(account): Path<String>,
) -> Json<AccountBalancesResponse> {
    let market = state.market().await;
    Json(balances_of(&market, AccountId::new(account)))
}

fn balances_of(market: &Market, account: AccountId) -> AccountBalancesResponse {
    let ledger = market.ledger();
    let native = ledger.native_balance(&account);
    let tokens = ledger
        .token_balances(&account)
        .into_iter()
        .map(|(token, amount)| TokenBalanceDto { token, amount })
        .collect();
    AccountBalancesResponse {
        account,
        native,
        tokens,
    }
}
