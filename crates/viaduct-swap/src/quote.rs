//! Quote engine
//!
//! Per-protocol hop pricing, run against a staged overlay of the live
//! market. Multi-hop simulation applies each hop's writes to the overlay
//! before pricing the next, so a path crossing the same venue twice
//! prices the second crossing against already-moved liquidity. Routing
//! and execution share this simulation, which keeps a quote and the
//! execution that follows it in agreement.

use std::collections::HashMap;
use viaduct_core::{Address, Amount, PoolId, TokenId};

use crate::calculator::calculate_output;
use crate::concentrated;
use crate::market::{Market, MinterState, PoolState, StagedEffects};
use crate::stable_swap;
use crate::state::{Pool, Protocol, SwapError};

fn unavailable(pool: &Pool, reason: impl Into<String>) -> SwapError {
    SwapError::QuoteUnavailable {
        pool: pool.pool_id.to_string(),
        reason: reason.into(),
    }
}

/// Copy-on-write view of the market used while walking a path
#[derive(Debug)]
pub struct StagedMarket<'a> {
    base: &'a Market,
    pools: HashMap<PoolId, PoolState>,
    minters: HashMap<Address, MinterState>,
}

impl<'a> StagedMarket<'a> {
    pub fn new(base: &'a Market) -> Self {
        Self {
            base,
            pools: HashMap::new(),
            minters: HashMap::new(),
        }
    }

    fn pool_state(&self, pool_id: &PoolId) -> Option<&PoolState> {
        self.pools
            .get(pool_id)
            .or_else(|| self.base.pool_state(pool_id))
    }

    fn minter_state(&self, minter: &Address) -> Option<&MinterState> {
        self.minters
            .get(minter)
            .or_else(|| self.base.minter(minter))
    }

    /// Writes staged so far, ready for `Market::commit`
    pub fn into_effects(self) -> StagedEffects {
        StagedEffects {
            pools: self.pools,
            minters: self.minters,
        }
    }

    /// Price one hop and stage its state writes
    pub fn apply_hop(
        &mut self,
        pool: &Pool,
        token_in: &TokenId,
        amount_in: Amount,
    ) -> Result<Amount, SwapError> {
        if !pool.contains(token_in) {
            return Err(SwapError::InvalidPath(format!(
                "token {token_in} is not a side of pool {}",
                pool.pool_id
            )));
        }
        match &pool.protocol {
            Protocol::ConstantProduct { fee_num, fee_denom } => {
                self.constant_product_hop(pool, token_in, amount_in, *fee_num, *fee_denom)
            }
            Protocol::ConcentratedLiquidity { fee_tier } => {
                self.concentrated_hop(pool, token_in, amount_in, *fee_tier)
            }
            Protocol::StableSwap { minter, is_v2, i, j } => {
                self.stable_swap_hop(pool, token_in, amount_in, minter, *is_v2, *i, *j)
            }
        }
    }

    fn constant_product_hop(
        &mut self,
        pool: &Pool,
        token_in: &TokenId,
        amount_in: Amount,
        fee_num: u32,
        fee_denom: u32,
    ) -> Result<Amount, SwapError> {
        let (reserve0, reserve1) = match self.pool_state(&pool.pool_id) {
            Some(PoolState::ConstantProduct { reserve0, reserve1 }) => (*reserve0, *reserve1),
            Some(_) => return Err(unavailable(pool, "live state does not match protocol")),
            None => return Err(unavailable(pool, "no live state installed")),
        };
        let zero_for_one = token_in == pool.token0();
        let (reserve_in, reserve_out) = if zero_for_one {
            (reserve0, reserve1)
        } else {
            (reserve1, reserve0)
        };
        let amount_out = calculate_output(reserve_in, reserve_out, amount_in, fee_num, fee_denom);
        if amount_out == 0 {
            return Err(unavailable(pool, "zero output for amount"));
        }
        let reserve_in = reserve_in
            .checked_add(amount_in)
            .ok_or(SwapError::Overflow("pool reserve"))?;
        // the formula keeps amount_out strictly below reserve_out
        let reserve_out = reserve_out - amount_out;
        let (reserve0, reserve1) = if zero_for_one {
            (reserve_in, reserve_out)
        } else {
            (reserve_out, reserve_in)
        };
        self.pools.insert(
            pool.pool_id.clone(),
            PoolState::ConstantProduct { reserve0, reserve1 },
        );
        Ok(amount_out)
    }

    fn concentrated_hop(
        &mut self,
        pool: &Pool,
        token_in: &TokenId,
        amount_in: Amount,
        fee_tier: u32,
    ) -> Result<Amount, SwapError> {
        let (sqrt_price_x96, liquidity) = match self.pool_state(&pool.pool_id) {
            Some(PoolState::Concentrated {
                sqrt_price_x96,
                liquidity,
            }) => (*sqrt_price_x96, *liquidity),
            Some(_) => return Err(unavailable(pool, "live state does not match protocol")),
            None => return Err(unavailable(pool, "no live state installed")),
        };
        let zero_for_one = token_in == pool.token0();
        let step =
            concentrated::swap_within_range(sqrt_price_x96, liquidity, amount_in, fee_tier, zero_for_one)
                .ok_or_else(|| unavailable(pool, "no liquidity at current price"))?;
        if step.amount_out == 0 {
            return Err(unavailable(pool, "zero output for amount"));
        }
        self.pools.insert(
            pool.pool_id.clone(),
            PoolState::Concentrated {
                sqrt_price_x96: step.sqrt_price_after,
                liquidity,
            },
        );
        Ok(step.amount_out)
    }

    fn stable_swap_hop(
        &mut self,
        pool: &Pool,
        token_in: &TokenId,
        amount_in: Amount,
        minter: &Address,
        is_v2: bool,
        i: u8,
        j: u8,
    ) -> Result<Amount, SwapError> {
        let mut state = match self.minter_state(minter) {
            Some(state) => state.clone(),
            None => return Err(unavailable(pool, format!("minter {minter} not installed"))),
        };
        // registered indices describe the token_a -> token_b direction
        let (i, j) = if token_in == &pool.token_a {
            (usize::from(i), usize::from(j))
        } else {
            (usize::from(j), usize::from(i))
        };
        let n = state.coin_count();
        if i >= n || j >= n {
            return Err(unavailable(
                pool,
                format!("coin index outside {n}-coin minter"),
            ));
        }
        let dy = match (&state, is_v2) {
            (
                MinterState::Stable {
                    balances,
                    amp,
                    fee_num,
                    fee_denom,
                },
                false,
            ) => stable_swap::get_dy(balances, *amp, *fee_num, *fee_denom, i, j, amount_in)?,
            (
                MinterState::Crypto {
                    balances,
                    price_scales,
                    amp,
                    fee_num,
                    fee_denom,
                },
                true,
            ) => stable_swap::get_dy_crypto(
                balances,
                price_scales,
                *amp,
                *fee_num,
                *fee_denom,
                i,
                j,
                amount_in,
            )?,
            _ => return Err(unavailable(pool, "registered variant does not match minter")),
        };
        if dy == 0 {
            return Err(unavailable(pool, "zero output for amount"));
        }
        let balances = match &mut state {
            MinterState::Stable { balances, .. } | MinterState::Crypto { balances, .. } => balances,
        };
        balances[i] = balances[i]
            .checked_add(amount_in)
            .ok_or(SwapError::Overflow("minter balance"))?;
        // dy is post-fee; the fee accrues in the output-side balance
        balances[j] = balances[j]
            .checked_sub(dy)
            .ok_or(SwapError::Overflow("minter balance"))?;
        self.minters.insert(minter.clone(), state);
        Ok(dy)
    }
}

/// Price one hop against the live market without staging
pub fn quote_hop(
    market: &Market,
    pool: &Pool,
    token_in: &TokenId,
    amount_in: Amount,
) -> Result<Amount, SwapError> {
    StagedMarket::new(market).apply_hop(pool, token_in, amount_in)
}

/// Walk an ordered list of (pool, entry token) legs against the market.
///
/// Returns the final output and the staged writes the walk produced.
pub fn simulate_legs(
    market: &Market,
    legs: &[(&Pool, &TokenId)],
    amount_in: Amount,
) -> Result<(Amount, StagedEffects), SwapError> {
    let mut staged = StagedMarket::new(market);
    let mut amount = amount_in;
    for (pool, token_in) in legs {
        amount = staged.apply_hop(pool, token_in, amount)?;
    }
    Ok((amount, staged.into_effects()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const M: Amount = 1_000_000;

    fn cp_pool(id: &str, a: &str, b: &str) -> Pool {
        Pool {
            pool_id: PoolId::new(id),
            token_a: TokenId::new(a),
            token_b: TokenId::new(b),
            protocol: Protocol::ConstantProduct {
                fee_num: 997,
                fee_denom: 1000,
            },
        }
    }

    fn curve_pool(id: &str, a: &str, b: &str, minter: &str, is_v2: bool, i: u8, j: u8) -> Pool {
        Pool {
            pool_id: PoolId::new(id),
            token_a: TokenId::new(a),
            token_b: TokenId::new(b),
            protocol: Protocol::StableSwap {
                minter: Address::new(minter),
                is_v2,
                i,
                j,
            },
        }
    }

    fn market_with_cp(pool_id: &str, reserve0: Amount, reserve1: Amount) -> Market {
        let mut market = Market::new();
        market.install_pool_state(
            PoolId::new(pool_id),
            PoolState::ConstantProduct { reserve0, reserve1 },
        );
        market
    }

    #[test]
    fn test_constant_product_hop_known_value() {
        let pool = cp_pool("univ2-weth-usdt", "WETH", "USDT");
        let market = market_with_cp("univ2-weth-usdt", M, M);

        // USDT is token0; 1e6*1000*997 / (1e6*1000 + 1000*997) = 996
        let out = quote_hop(&market, &pool, &TokenId::new("USDT"), 1_000).unwrap();
        assert_eq!(out, 996);
    }

    #[test]
    fn test_constant_product_stages_reserves() {
        let pool = cp_pool("univ2-weth-usdt", "WETH", "USDT");
        let market = market_with_cp("univ2-weth-usdt", M, M);

        let usdt = TokenId::new("USDT");
        let legs: Vec<(&Pool, &TokenId)> = vec![(&pool, &usdt)];
        let (_, effects) = simulate_legs(&market, &legs, 1_000).unwrap();

        assert_eq!(
            effects.pools.get(&PoolId::new("univ2-weth-usdt")),
            Some(&PoolState::ConstantProduct {
                reserve0: M + 1_000,
                reserve1: M - 996,
            })
        );
        // the live market itself is untouched until commit
        assert_eq!(
            market.pool_state(&PoolId::new("univ2-weth-usdt")),
            Some(&PoolState::ConstantProduct {
                reserve0: M,
                reserve1: M,
            })
        );
    }

    #[test]
    fn test_second_crossing_sees_moved_liquidity() {
        let pool = cp_pool("univ2-weth-usdt", "WETH", "USDT");
        let market = market_with_cp("univ2-weth-usdt", M, M);
        let usdt = TokenId::new("USDT");
        let weth = TokenId::new("WETH");

        let mut staged = StagedMarket::new(&market);
        let out = staged.apply_hop(&pool, &usdt, 10_000).unwrap();
        let back = staged.apply_hop(&pool, &weth, out).unwrap();

        // fees and price impact make the round trip strictly lossy
        assert!(back < 10_000);
    }

    #[test]
    fn test_missing_and_mismatched_state() {
        let pool = cp_pool("univ2-weth-usdt", "WETH", "USDT");
        let market = Market::new();
        assert!(matches!(
            quote_hop(&market, &pool, &TokenId::new("USDT"), 1_000),
            Err(SwapError::QuoteUnavailable { .. })
        ));

        let mut market = Market::new();
        market.install_pool_state(
            PoolId::new("univ2-weth-usdt"),
            PoolState::Concentrated {
                sqrt_price_x96: concentrated::Q96,
                liquidity: M,
            },
        );
        assert!(matches!(
            quote_hop(&market, &pool, &TokenId::new("USDT"), 1_000),
            Err(SwapError::QuoteUnavailable { .. })
        ));
    }

    #[test]
    fn test_token_outside_pool_is_invalid_path() {
        let pool = cp_pool("univ2-weth-usdt", "WETH", "USDT");
        let market = market_with_cp("univ2-weth-usdt", M, M);
        assert!(matches!(
            quote_hop(&market, &pool, &TokenId::new("DAI"), 1_000),
            Err(SwapError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_concentrated_price_moves_with_staging() {
        let pool = Pool {
            pool_id: PoolId::new("univ3-weth-usdt-500"),
            token_a: TokenId::new("WETH"),
            token_b: TokenId::new("USDT"),
            protocol: Protocol::ConcentratedLiquidity { fee_tier: 500 },
        };
        let mut market = Market::new();
        market.install_pool_state(
            PoolId::new("univ3-weth-usdt-500"),
            PoolState::Concentrated {
                sqrt_price_x96: concentrated::Q96,
                liquidity: 1_000_000_000_000,
            },
        );

        let usdt = TokenId::new("USDT");
        let mut staged = StagedMarket::new(&market);
        let first = staged.apply_hop(&pool, &usdt, M).unwrap();
        let second = staged.apply_hop(&pool, &usdt, M).unwrap();
        assert!(first > 0);
        // same-direction swaps walk the price away from the trader
        assert!(second < first);
    }

    #[test]
    fn test_shared_minter_staging_across_pools() {
        // one 3-coin minter bound by two registered pairs
        let minter = Address::new("0xbebc44782c7db0a1a60cb6fe97d0b483032ff1c7");
        let dai_usdc = curve_pool("curve-dai-usdc", "DAI", "USDC", minter.as_str(), false, 0, 1);
        let usdc_usdt = curve_pool("curve-usdc-usdt", "USDC", "USDT", minter.as_str(), false, 1, 2);

        let mut market = Market::new();
        market
            .install_minter(
                minter.clone(),
                MinterState::Stable {
                    balances: vec![M, M, M],
                    amp: 100,
                    fee_num: 4,
                    fee_denom: 10_000,
                },
            )
            .unwrap();

        let dai = TokenId::new("DAI");
        let usdc = TokenId::new("USDC");

        let mut staged = StagedMarket::new(&market);
        let mid = staged.apply_hop(&dai_usdc, &dai, 50_000).unwrap();
        let out = staged.apply_hop(&usdc_usdt, &usdc, mid).unwrap();
        assert!(out > 0);

        let effects = staged.into_effects();
        let updated = effects.minters.get(&minter).unwrap();
        // DAI leg deposited into coin 0; the USDC leg takes out what the
        // first leg put in, so coin 1 nets to its starting balance
        assert_eq!(updated.balances()[0], M + 50_000);
        assert_eq!(updated.balances()[1], M);
        assert_eq!(updated.balances()[2], M - out);
    }

    #[test]
    fn test_variant_mismatch_is_unavailable() {
        let minter = Address::new("0x7f86bf177dd4f3494b841a37e810a34dd56c829b");
        // registered as crypto but the installed minter is classic stable
        let pool = curve_pool("curve-usdc-weth", "USDC", "WETH", minter.as_str(), true, 0, 2);

        let mut market = Market::new();
        market
            .install_minter(
                minter,
                MinterState::Stable {
                    balances: vec![M, M, M],
                    amp: 100,
                    fee_num: 4,
                    fee_denom: 10_000,
                },
            )
            .unwrap();

        let err = quote_hop(&market, &pool, &TokenId::new("USDC"), 1_000).unwrap_err();
        assert!(matches!(err, SwapError::QuoteUnavailable { .. }));
    }

    #[test]
    fn test_minter_index_out_of_range() {
        let minter = Address::new("0xbebc44782c7db0a1a60cb6fe97d0b483032ff1c7");
        let pool = curve_pool("curve-dai-usdt", "DAI", "USDT", minter.as_str(), false, 0, 5);

        let mut market = Market::new();
        market
            .install_minter(
                minter,
                MinterState::Stable {
                    balances: vec![M, M, M],
                    amp: 100,
                    fee_num: 4,
                    fee_denom: 10_000,
                },
            )
            .unwrap();

        assert!(matches!(
            quote_hop(&market, &pool, &TokenId::new("DAI"), 1_000),
            Err(SwapError::QuoteUnavailable { .. })
        ));
    }

    #[test]
    fn test_curve_direction_reverses_indices() {
        let minter = Address::new("0xf5f5b97624542d72a9e06f04804bf81baa15e2b4");
        // registered USDT(0) -> WETH(2); routing WETH -> USDT must use (2, 0)
        let pool = curve_pool("curve-usdt-weth", "USDT", "WETH", minter.as_str(), false, 0, 2);

        let mut market = Market::new();
        market
            .install_minter(
                minter.clone(),
                MinterState::Stable {
                    balances: vec![M, M, M],
                    amp: 100,
                    fee_num: 0,
                    fee_denom: 10_000,
                },
            )
            .unwrap();

        let weth = TokenId::new("WETH");
        let legs: Vec<(&Pool, &TokenId)> = vec![(&pool, &weth)];
        let (out, effects) = simulate_legs(&market, &legs, 10_000).unwrap();
        assert!(out > 0);

        let updated = effects.minters.get(&minter).unwrap();
        assert_eq!(updated.balances()[2], M + 10_000);
        assert_eq!(updated.balances()[0], M - out);
    }
}
