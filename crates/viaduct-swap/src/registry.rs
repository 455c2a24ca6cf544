//! Pool registry
//!
//! Supported tokens and the per-pair pool sets the router enumerates.
//! All mutation entry points check the caller against the owner before
//! touching state; lookups preserve registration order so route
//! enumeration stays deterministic.

use std::collections::{HashMap, HashSet};
use tracing::info;
use viaduct_core::constants::FEE_TIER_DENOM;
use viaduct_core::{AccountId, PoolId, TokenId};

use crate::state::{Pool, Protocol, SwapError};

#[derive(Debug, Clone)]
pub struct PoolRegistry {
    owner: AccountId,
    tokens: Vec<TokenId>,
    token_set: HashSet<TokenId>,
    pools: HashMap<(TokenId, TokenId), Vec<Pool>>,
}

impl PoolRegistry {
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            tokens: Vec::new(),
            token_set: HashSet::new(),
            pools: HashMap::new(),
        }
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Access-control check guarding every mutation
    pub fn ensure_owner(&self, caller: &AccountId) -> Result<(), SwapError> {
        if caller != &self.owner {
            return Err(SwapError::Unauthorized(caller.to_string()));
        }
        Ok(())
    }

    /// Add a token to the supported set. Re-registering is a no-op.
    pub fn register_token(&mut self, caller: &AccountId, token: TokenId) -> Result<(), SwapError> {
        self.ensure_owner(caller)?;
        if self.token_set.insert(token.clone()) {
            info!(token = %token, "token registered");
            self.tokens.push(token);
        }
        Ok(())
    }

    /// Register a pool for its pair. Duplicate pairs append; lookup keeps
    /// registration order.
    pub fn register_pool(&mut self, caller: &AccountId, pool: Pool) -> Result<(), SwapError> {
        self.ensure_owner(caller)?;
        if pool.token_a == pool.token_b {
            return Err(SwapError::InvalidPool(
                "pool pairs a token with itself".into(),
            ));
        }
        for token in [&pool.token_a, &pool.token_b] {
            if !self.token_set.contains(token) {
                return Err(SwapError::UnsupportedToken(token.to_string()));
            }
        }
        match &pool.protocol {
            Protocol::ConstantProduct { fee_num, fee_denom } => {
                if *fee_denom == 0 {
                    return Err(SwapError::InvalidPool("zero fee denominator".into()));
                }
                if fee_num > fee_denom {
                    return Err(SwapError::InvalidPool("fee above 100%".into()));
                }
            }
            Protocol::ConcentratedLiquidity { fee_tier } => {
                if u64::from(*fee_tier) >= FEE_TIER_DENOM {
                    return Err(SwapError::InvalidPool("fee tier above 100%".into()));
                }
            }
            Protocol::StableSwap { i, j, .. } => {
                if i == j {
                    return Err(SwapError::InvalidPool(
                        "minter coin indices must differ".into(),
                    ));
                }
            }
        }
        info!(pool = %pool.pool_id, protocol = pool.protocol.tag(), "pool registered");
        self.pools.entry(pool.pair()).or_default().push(pool);
        Ok(())
    }

    pub fn is_token_supported(&self, token: &TokenId) -> bool {
        self.token_set.contains(token)
    }

    /// Supported tokens in registration order. Any of these may serve as
    /// a bridge between a pair with no direct pool.
    pub fn supported_tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    /// Pools registered for a pair, in registration order. Lookup is
    /// insensitive to argument order.
    pub fn pools_for(&self, a: &TokenId, b: &TokenId) -> &[Pool] {
        self.pools
            .get(&Pool::pair_key(a, b))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolve a pool id within a pair, for path validation
    pub fn find_pool(&self, a: &TokenId, b: &TokenId, pool_id: &PoolId) -> Option<&Pool> {
        self.pools_for(a, b).iter().find(|p| &p.pool_id == pool_id)
    }

    pub fn pool_count(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }
}
