//! Concentrated-liquidity quote math
//!
//! Single-active-range model of a V3-style pool: within the range the pool
//! behaves as a constant-product curve parameterised by sqrt-price and
//! liquidity. Prices are Q64.96 fixed point, quoted token1-per-token0 with
//! token0/token1 in canonical pair order.
//!
//! Step formulas (L = liquidity, sp = sqrt price):
//! token0 in:  sp' = L*sp*Q96 / (L*Q96 + in*sp),  out = L*(sp - sp') / Q96
//! token1 in:  sp' = sp + in*Q96 / L,             out = L*Q96*(sp' - sp) / (sp'*sp)

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use viaduct_core::constants::FEE_TIER_DENOM;
use viaduct_core::Amount;

/// Q64.96 fixed-point one
pub const Q96: u128 = 1 << 96;

/// Outcome of one swap step through the active range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeStep {
    pub amount_out: Amount,
    pub sqrt_price_after: u128,
}

/// Quote a swap against the active range.
///
/// `zero_for_one` means token0 enters and token1 leaves (price decreases).
/// The fee tier is deducted from the input before the price step. Returns
/// `None` when the pool has no usable liquidity for the request or the
/// resulting price leaves the representable range.
pub fn swap_within_range(
    sqrt_price_x96: u128,
    liquidity: u128,
    amount_in: Amount,
    fee_tier: u32,
    zero_for_one: bool,
) -> Option<RangeStep> {
    if sqrt_price_x96 == 0 || liquidity == 0 || amount_in == 0 {
        return None;
    }
    if u64::from(fee_tier) >= FEE_TIER_DENOM {
        return None;
    }

    let net_in = (BigUint::from(amount_in) * BigUint::from(FEE_TIER_DENOM - u64::from(fee_tier))
        / BigUint::from(FEE_TIER_DENOM))
    .to_u128()?;
    if net_in == 0 {
        return None;
    }

    let l = BigUint::from(liquidity);
    let sp = BigUint::from(sqrt_price_x96);
    let q96 = BigUint::from(Q96);

    if zero_for_one {
        let numerator = &l * &sp * &q96;
        let denominator = &l * &q96 + BigUint::from(net_in) * &sp;
        let sp_after = numerator / denominator;
        if sp_after > sp {
            return None;
        }
        let amount_out = (&l * (&sp - &sp_after) / &q96).to_u128()?;
        Some(RangeStep {
            amount_out,
            sqrt_price_after: sp_after.to_u128()?,
        })
    } else {
        let sp_after = &sp + BigUint::from(net_in) * &q96 / &l;
        let amount_out = (&l * &q96 * (&sp_after - &sp) / (&sp_after * &sp)).to_u128()?;
        Some(RangeStep {
            amount_out,
            sqrt_price_after: sp_after.to_u128()?,
        })
    }
}

/// Derive the Q96 sqrt price from spot reserves: sqrt(reserve1 / reserve0) * 2^96
pub fn sqrt_price_x96_from_reserves(reserve0: Amount, reserve1: Amount) -> Option<u128> {
    if reserve0 == 0 || reserve1 == 0 {
        return None;
    }
    let ratio = (BigUint::from(reserve1) << 192u32) / BigUint::from(reserve0);
    ratio.sqrt().to_u128()
}

/// Active-range liquidity implied by spot reserves: sqrt(reserve0 * reserve1)
pub fn liquidity_from_reserves(reserve0: Amount, reserve1: Amount) -> u128 {
    if reserve0 == 0 || reserve1 == 0 {
        return 0;
    }
    (BigUint::from(reserve0) * BigUint::from(reserve1))
        .sqrt()
        .to_u128()
        .unwrap_or(u128::MAX)
}
