//! Data Transfer Objects for API requests and responses

use serde::{Deserialize, Serialize};

use viaduct_core::{AccountId, Address, Amount, PoolId, TokenId};
use viaduct_swap::{
    suggest_min_output, ExecutionResult, MinterState, Path, Pool, PoolState, Protocol, Quote,
};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }
}

// =============================================================================
// Registry DTOs
// =============================================================================

/// Token registration request (owner only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterTokenRequest {
    pub caller: AccountId,
    pub token: TokenId,
}

/// Token registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterTokenResponse {
    pub token: TokenId,
    /// Supported-token count after this registration
    pub supported: usize,
}

/// Supported tokens, in registration order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokensResponse {
    pub tokens: Vec<TokenId>,
    pub count: usize,
}

/// Pool registration request (owner only).
///
/// The protocol tag and its parameters sit flattened at the top level,
/// so a constant-product registration reads
/// `{"protocol": "constant_product", "fee_num": 997, ...}`.
/// `state` optionally installs the pool's live market state in the same
/// call; minter-backed pools carry no per-pool state and install their
/// shared state through `/minters` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPoolRequest {
    pub caller: AccountId,
    pub pool_id: PoolId,
    pub token_a: TokenId,
    pub token_b: TokenId,
    #[serde(flatten)]
    pub protocol: Protocol,
    #[serde(default)]
    pub state: Option<PoolState>,
}

/// Pool registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPoolResponse {
    pub pool_id: PoolId,
    /// Registered-pool count after this registration
    pub pool_count: usize,
}

/// Pair query for pool listing
#[derive(Debug, Clone, Deserialize)]
pub struct PoolsQuery {
    pub token_a: TokenId,
    pub token_b: TokenId,
}

/// Pools registered for a pair, in registration order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolsResponse {
    pub pools: Vec<Pool>,
    pub count: usize,
}

// =============================================================================
// Market state DTOs
// =============================================================================

/// Minter state installation request (owner only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallMinterRequest {
    pub caller: AccountId,
    pub minter: Address,
    pub state: MinterState,
}

/// Minter state installation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallMinterResponse {
    pub minter: Address,
    pub installed: bool,
}

/// Ledger credit request (owner only).
///
/// A missing `token` credits the account's native column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditBalanceRequest {
    pub caller: AccountId,
    pub account: AccountId,
    #[serde(default)]
    pub token: Option<TokenId>,
    pub amount: Amount,
}

/// Balance of a single token in an account's ledger row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBalanceDto {
    pub token: TokenId,
    pub amount: Amount,
}

/// An account's full ledger row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalancesResponse {
    pub account: AccountId,
    pub native: Amount,
    /// Token balances sorted by token id
    pub tokens: Vec<TokenBalanceDto>,
}

// =============================================================================
// Quote and swap DTOs
// =============================================================================

/// Quote request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub token_in: TokenId,
    pub token_out: TokenId,
    pub amount_in: Amount,
}

/// Quote response: the winning path plus a suggested execution floor.
///
/// The path is handed back verbatim to `POST /swap`; against unchanged
/// market state, execution delivers exactly `amount_out`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub path: Path,
    pub amount_in: Amount,
    pub amount_out: Amount,
    pub min_output_suggested: Amount,
}

impl From<Quote> for QuoteResponse {
    fn from(quote: Quote) -> Self {
        let min_output_suggested = suggest_min_output(quote.amount_out);
        Self {
            path: quote.path,
            amount_in: quote.amount_in,
            amount_out: quote.amount_out,
            min_output_suggested,
        }
    }
}

/// Swap execution request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapRequest {
    pub account: AccountId,
    pub token_in: TokenId,
    pub amount_in: Amount,
    pub path: Path,
    pub min_amount_out: Amount,
}

/// Native swap request; the route is computed server-side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeSwapRequest {
    pub account: AccountId,
    pub token_out: TokenId,
    pub amount_in: Amount,
    pub min_amount_out: Amount,
}

/// Execution outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapResponse {
    pub path: Path,
    pub amount_in: Amount,
    pub amount_out: Amount,
}

impl From<ExecutionResult> for SwapResponse {
    fn from(result: ExecutionResult) -> Self {
        Self {
            path: result.path,
            amount_in: result.amount_in,
            amount_out: result.amount_out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_defaults() {
        let health = HealthResponse::default();
        assert_eq!(health.status, "ok");
        assert!(!health.version.is_empty());
    }

    #[test]
    fn test_register_pool_request_flattens_protocol() {
        let json = r#"{
            "caller": "admin",
            "pool_id": "univ2-weth-usdt",
            "token_a": "WETH",
            "token_b": "USDT",
            "protocol": "constant_product",
            "fee_num": 997,
            "fee_denom": 1000,
            "state": {"constant_product": {"reserve0": 5, "reserve1": 7}}
        }"#;
        let request: RegisterPoolRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            request.protocol,
            Protocol::ConstantProduct {
                fee_num: 997,
                fee_denom: 1000
            }
        );
        assert!(matches!(
            request.state,
            Some(PoolState::ConstantProduct {
                reserve0: 5,
                reserve1: 7
            })
        ));
    }

    #[test]
    fn test_register_pool_request_state_is_optional() {
        let json = r#"{
            "caller": "admin",
            "pool_id": "curve-3pool-dai-usdc",
            "token_a": "DAI",
            "token_b": "USDC",
            "protocol": "stable_swap",
            "minter": "0xbebc44782c7db0a1a60cb6fe97d0b483032ff1c7",
            "is_v2": false,
            "i": 0,
            "j": 1
        }"#;
        let request: RegisterPoolRequest = serde_json::from_str(json).unwrap();
        assert!(request.state.is_none());
        assert!(matches!(
            request.protocol,
            Protocol::StableSwap { is_v2: false, .. }
        ));
    }

    #[test]
    fn test_credit_request_defaults_to_native() {
        let json = r#"{"caller": "admin", "account": "alice", "amount": 100}"#;
        let request: CreditBalanceRequest = serde_json::from_str(json).unwrap();
        assert!(request.token.is_none());
        assert_eq!(request.amount, 100);
    }

    #[test]
    fn test_quote_response_carries_suggested_minimum() {
        let quote = Quote {
            path: Path::new(vec![]),
            amount_in: 1_000,
            amount_out: 10_000,
        };
        let response = QuoteResponse::from(quote);
        assert_eq!(response.min_output_suggested, suggest_min_output(10_000));
        assert!(response.min_output_suggested < response.amount_out);
    }

    #[test]
    fn test_amounts_round_trip_beyond_u64() {
        let request = SwapRequest {
            account: AccountId::new("alice"),
            token_in: TokenId::new("WETH"),
            amount_in: 20_000_000_000_000_000_000,
            path: Path::new(vec![]),
            min_amount_out: 0,
        };
        let json = serde_json::to_string(&request).unwrap();
        let back: SwapRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.amount_in, request.amount_in);
    }

    #[test]
    fn test_pool_state_keeps_full_precision_reserves() {
        let unit: Amount = 1_000_000_000_000_000_000;
        let request = RegisterPoolRequest {
            caller: AccountId::new("admin"),
            pool_id: PoolId::new("univ2-weth-usdt"),
            token_a: TokenId::new("WETH"),
            token_b: TokenId::new("USDT"),
            protocol: Protocol::ConstantProduct {
                fee_num: 997,
                fee_denom: 1000,
            },
            state: Some(PoolState::ConstantProduct {
                reserve0: 2_000_000 * unit,
                reserve1: 1_000 * unit,
            }),
        };
        let json = serde_json::to_string(&request).unwrap();
        let back: RegisterPoolRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.state, request.state);
    }
}
