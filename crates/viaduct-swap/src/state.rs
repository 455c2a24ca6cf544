//! Swap domain types
//!
//! Data structures for pools, hops, paths, and quotes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use viaduct_core::{Address, Amount, PoolId, TokenId};

/// Liquidity-pool family, carrying the protocol-specific registration
/// parameters for a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "snake_case")]
pub enum Protocol {
    /// V2-style pair with a fixed fee taken from the input
    /// (e.g. 997/1000 for the classic 0.30%)
    ConstantProduct { fee_num: u32, fee_denom: u32 },

    /// V3-style pool. The fee tier (hundredths of a basis point) is part
    /// of pool identity: the same pair may carry one pool per tier.
    ConcentratedLiquidity { fee_tier: u32 },

    /// Curve-style pair binding into a shared multi-coin minter.
    /// `i`/`j` are the pair's coin indices inside the minter; `is_v2`
    /// selects the crypto-pool variant over the classic stable variant.
    StableSwap {
        minter: Address,
        is_v2: bool,
        i: u8,
        j: u8,
    },
}

impl Protocol {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::ConstantProduct { .. } => "constant_product",
            Self::ConcentratedLiquidity { .. } => "concentrated_liquidity",
            Self::StableSwap { .. } => "stable_swap",
        }
    }
}

/// A registered pool: an unordered token pair plus protocol parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub pool_id: PoolId,
    pub token_a: TokenId,
    pub token_b: TokenId,
    pub protocol: Protocol,
}

impl Pool {
    /// Canonical unordered-pair key: the two token ids in sorted order
    pub fn pair_key(a: &TokenId, b: &TokenId) -> (TokenId, TokenId) {
        if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        }
    }

    pub fn pair(&self) -> (TokenId, TokenId) {
        Self::pair_key(&self.token_a, &self.token_b)
    }

    /// Canonical token0: the lexicographically smaller pair member.
    /// Concentrated-liquidity price state is quoted token1-per-token0.
    pub fn token0(&self) -> &TokenId {
        if self.token_a <= self.token_b {
            &self.token_a
        } else {
            &self.token_b
        }
    }

    pub fn token1(&self) -> &TokenId {
        if self.token_a <= self.token_b {
            &self.token_b
        } else {
            &self.token_a
        }
    }

    pub fn contains(&self, token: &TokenId) -> bool {
        self.token_a == *token || self.token_b == *token
    }

    /// The pair member opposite `token`, if `token` is a member
    pub fn other_side(&self, token: &TokenId) -> Option<&TokenId> {
        if self.token_a == *token {
            Some(&self.token_b)
        } else if self.token_b == *token {
            Some(&self.token_a)
        } else {
            None
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.protocol {
            Protocol::ConstantProduct { fee_num, fee_denom } => write!(
                f,
                "CP {} | {}/{} | fee {}/{}",
                self.pool_id, self.token_a, self.token_b, fee_num, fee_denom
            ),
            Protocol::ConcentratedLiquidity { fee_tier } => write!(
                f,
                "CL {} | {}/{} | tier {}",
                self.pool_id, self.token_a, self.token_b, fee_tier
            ),
            Protocol::StableSwap {
                minter, is_v2, i, j, ..
            } => write!(
                f,
                "{} {} | {}/{} | minter {} ({i},{j})",
                if *is_v2 { "Crypto" } else { "Stable" },
                self.pool_id,
                self.token_a,
                self.token_b,
                minter
            ),
        }
    }
}

/// One swap through a single pool from one token to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    pub pool_id: PoolId,
    pub token_in: TokenId,
    pub token_out: TokenId,
}

/// Ordered hop sequence connecting an input token to an output token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    pub hops: Vec<Hop>,
}

impl Path {
    pub fn new(hops: Vec<Hop>) -> Self {
        Self { hops }
    }

    pub fn input(&self) -> Option<&TokenId> {
        self.hops.first().map(|h| &h.token_in)
    }

    pub fn output(&self) -> Option<&TokenId> {
        self.hops.last().map(|h| &h.token_out)
    }

    /// Structural validation: non-empty, each hop swaps two distinct
    /// tokens, hops chain output-to-input, and no token repeats
    pub fn validate_shape(&self) -> Result<(), SwapError> {
        if self.hops.is_empty() {
            return Err(SwapError::InvalidPath("path has no hops".into()));
        }
        for (k, hop) in self.hops.iter().enumerate() {
            if hop.token_in == hop.token_out {
                return Err(SwapError::InvalidPath(format!(
                    "hop {k} swaps {} into itself",
                    hop.token_in
                )));
            }
            if k > 0 && self.hops[k - 1].token_out != hop.token_in {
                return Err(SwapError::InvalidPath(format!(
                    "hop {} output {} does not feed hop {k} input {}",
                    k - 1,
                    self.hops[k - 1].token_out,
                    hop.token_in
                )));
            }
        }
        let mut seen: Vec<&TokenId> = vec![&self.hops[0].token_in];
        for hop in &self.hops {
            if seen.contains(&&hop.token_out) {
                return Err(SwapError::InvalidPath(format!(
                    "token {} revisited",
                    hop.token_out
                )));
            }
            seen.push(&hop.token_out);
        }
        Ok(())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.input() {
            Some(input) => {
                write!(f, "{input}")?;
                for hop in &self.hops {
                    write!(f, " -> {}", hop.token_out)?;
                }
                Ok(())
            }
            None => write!(f, "(empty path)"),
        }
    }
}

/// Estimated outcome of a path, computed without mutating pool state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub path: Path,
    pub amount_in: Amount,
    pub amount_out: Amount,
}

/// Actual outcome of an executed path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub path: Path,
    pub amount_in: Amount,
    pub amount_out: Amount,
}

/// Swap engine errors
#[derive(Debug, Error)]
pub enum SwapError {
    #[error("Token not supported: {0}")]
    UnsupportedToken(String),

    #[error("No pool found for pair {0}/{1}")]
    PoolNotFound(String, String),

    #[error("Quote unavailable for pool {pool}: {reason}")]
    QuoteUnavailable { pool: String, reason: String },

    #[error("No route found from {from} to {to}")]
    NoRouteFound { from: String, to: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Output below minimum: got {got}, need {min}")]
    SlippageExceeded { got: Amount, min: Amount },

    #[error("Caller {0} is not the registry owner")]
    Unauthorized(String),

    #[error("Invalid pool registration: {0}")]
    InvalidPool(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient balance: need {required}, have {available}")]
    InsufficientBalance { required: Amount, available: Amount },

    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("Invariant iteration did not converge")]
    ConvergenceFailure,
}

impl SwapError {
    /// HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedToken(_) => "unsupported_token",
            Self::PoolNotFound(_, _) => "pool_not_found",
            Self::QuoteUnavailable { .. } => "quote_unavailable",
            Self::NoRouteFound { .. } => "no_route_found",
            Self::InvalidPath(_) => "invalid_path",
            Self::SlippageExceeded { .. } => "slippage_exceeded",
            Self::Unauthorized(_) => "unauthorized",
            Self::InvalidPool(_) => "invalid_pool",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::Overflow(_) => "overflow",
            Self::ConvergenceFailure => "convergence_failure",
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnsupportedToken(_)
            | Self::InvalidPath(_)
            | Self::InvalidPool(_)
            | Self::InvalidAmount(_) => 400,
            Self::Unauthorized(_) => 403,
            Self::PoolNotFound(_, _) | Self::NoRouteFound { .. } => 404,
            Self::SlippageExceeded { .. } | Self::InsufficientBalance { .. } => 409,
            Self::QuoteUnavailable { .. } => 422,
            Self::Overflow(_) | Self::ConvergenceFailure => 500,
        }
    }
}
