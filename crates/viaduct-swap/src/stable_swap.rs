//! Stable/crypto invariant math (Curve-style)
//!
//! Newton-Raphson solutions for the StableSwap invariant over n coins:
//! `compute_d` finds the invariant D for the current balances, `compute_y`
//! finds the post-swap balance of the output coin with D held fixed.
//! Amplification interpolates between constant-sum (high amp) and
//! constant-product (amp 1) behavior.
//!
//! The crypto variant (`get_dy_crypto`) runs the same core over
//! price-scaled balances, so pairs of unlike-priced assets can share the
//! flat region of the curve around their current price.

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use viaduct_core::Amount;

use crate::state::SwapError;

/// Newton iteration cap; matches the reference contracts
pub const MAX_ITERATIONS: usize = 255;

/// Scale of crypto-pool price factors (1.0 == 1e18)
pub const PRICE_PRECISION: u128 = 1_000_000_000_000_000_000;

fn converged(a: &BigUint, b: &BigUint) -> bool {
    let diff = if a > b { a - b } else { b - a };
    diff <= BigUint::one()
}

/// Solve the invariant D for the given balances.
///
/// Iterates `D = (Ann*S + n*D_P) * D / ((Ann-1)*D + (n+1)*D_P)` with
/// `D_P = D^(n+1) / (n^n * prod(x))`, starting from `D = S`.
pub fn compute_d(balances: &[Amount], amp: u64) -> Result<BigUint, SwapError> {
    let n = balances.len() as u64;
    if n < 2 {
        return Err(SwapError::InvalidAmount(
            "invariant needs at least two coins".into(),
        ));
    }
    if amp == 0 {
        return Err(SwapError::InvalidAmount("zero amplification".into()));
    }
    if balances.iter().any(|&x| x == 0) {
        return Err(SwapError::InvalidAmount("zero minter balance".into()));
    }

    let s: BigUint = balances.iter().map(|&x| BigUint::from(x)).sum();
    let ann = BigUint::from(amp) * n;
    let mut d = s.clone();

    for _ in 0..MAX_ITERATIONS {
        let mut d_p = d.clone();
        for &x in balances {
            d_p = d_p * &d / (BigUint::from(x) * n);
        }
        let d_prev = d.clone();
        let numerator = (&ann * &s + &d_p * n) * &d;
        let denominator = (&ann - BigUint::one()) * &d + &d_p * (n + 1);
        d = numerator / denominator;
        if converged(&d, &d_prev) {
            return Ok(d);
        }
    }
    Err(SwapError::ConvergenceFailure)
}

/// Solve the output-coin balance `y` at index `j`, given that coin `i`
/// moves to `x_new` and D stays fixed.
///
/// Iterates `y = (y^2 + c) / (2y + b - D)` from `y = D`.
pub fn compute_y(
    balances: &[Amount],
    i: usize,
    j: usize,
    x_new: Amount,
    amp: u64,
) -> Result<BigUint, SwapError> {
    let n = balances.len();
    if i >= n || j >= n || i == j {
        return Err(SwapError::InvalidAmount("coin index out of range".into()));
    }
    if x_new == 0 {
        return Err(SwapError::InvalidAmount("zero post-swap balance".into()));
    }

    let d = compute_d(balances, amp)?;
    let ann = BigUint::from(amp) * n as u64;

    let mut c = d.clone();
    let mut s = BigUint::zero();
    for k in 0..n {
        if k == j {
            continue;
        }
        let x_k = if k == i { x_new } else { balances[k] };
        s += BigUint::from(x_k);
        c = c * &d / (BigUint::from(x_k) * n as u64);
    }
    c = c * &d / (&ann * n as u64);
    let b = &s + &d / &ann;

    let mut y = d.clone();
    for _ in 0..MAX_ITERATIONS {
        let y_prev = y.clone();
        let divisor = &y * 2u32 + &b;
        if divisor <= d {
            return Err(SwapError::ConvergenceFailure);
        }
        y = (&y * &y + &c) / (divisor - &d);
        if converged(&y, &y_prev) {
            return Ok(y);
        }
    }
    Err(SwapError::ConvergenceFailure)
}

fn take_fee(dy: u128, fee_num: u32, fee_denom: u32) -> u128 {
    if fee_denom == 0 || fee_num == 0 {
        return dy;
    }
    let fee = (BigUint::from(dy) * BigUint::from(fee_num) / BigUint::from(fee_denom))
        .to_u128()
        .unwrap_or(dy);
    dy.saturating_sub(fee)
}

/// Classic stable-pool quote: output of coin `j` for `dx` of coin `i`.
///
/// Returns 0 for empty pools or dust inputs; the caller treats a zero
/// quote as no liquidity.
pub fn get_dy(
    balances: &[Amount],
    amp: u64,
    fee_num: u32,
    fee_denom: u32,
    i: usize,
    j: usize,
    dx: Amount,
) -> Result<Amount, SwapError> {
    let n = balances.len();
    if i >= n || j >= n || i == j {
        return Err(SwapError::InvalidAmount("coin index out of range".into()));
    }
    if dx == 0 || balances.iter().any(|&x| x == 0) {
        return Ok(0);
    }

    let x_new = balances[i]
        .checked_add(dx)
        .ok_or(SwapError::Overflow("stable swap input"))?;
    let y_new = compute_y(balances, i, j, x_new, amp)?
        .to_u128()
        .ok_or(SwapError::Overflow("invariant result"))?;
    let dy = balances[j].saturating_sub(y_new).saturating_sub(1);
    Ok(take_fee(dy, fee_num, fee_denom))
}

/// Crypto-pool quote: the stable core over price-scaled balances.
///
/// `price_scales[k]` expresses coin k's price in `PRICE_PRECISION` units;
/// balances are transformed into a common scale, swapped there, and the
/// output is transformed back through coin j's scale.
pub fn get_dy_crypto(
    balances: &[Amount],
    price_scales: &[u128],
    amp: u64,
    fee_num: u32,
    fee_denom: u32,
    i: usize,
    j: usize,
    dx: Amount,
) -> Result<Amount, SwapError> {
    let n = balances.len();
    if price_scales.len() != n {
        return Err(SwapError::InvalidAmount(
            "price scale per coin required".into(),
        ));
    }
    if i >= n || j >= n || i == j {
        return Err(SwapError::InvalidAmount("coin index out of range".into()));
    }
    if dx == 0 || balances.iter().any(|&x| x == 0) || price_scales.iter().any(|&p| p == 0) {
        return Ok(0);
    }

    let precision = BigUint::from(PRICE_PRECISION);
    let mut xp = Vec::with_capacity(n);
    for k in 0..n {
        let scaled = (BigUint::from(balances[k]) * BigUint::from(price_scales[k]) / &precision)
            .to_u128()
            .ok_or(SwapError::Overflow("price-scaled balance"))?;
        if scaled == 0 {
            return Ok(0);
        }
        xp.push(scaled);
    }

    let dx_xp = (BigUint::from(dx) * BigUint::from(price_scales[i]) / &precision)
        .to_u128()
        .ok_or(SwapError::Overflow("price-scaled input"))?;
    if dx_xp == 0 {
        return Ok(0);
    }

    let x_new = xp[i]
        .checked_add(dx_xp)
        .ok_or(SwapError::Overflow("crypto swap input"))?;
    let y_new = compute_y(&xp, i, j, x_new, amp)?
        .to_u128()
        .ok_or(SwapError::Overflow("invariant result"))?;
    let dy_xp = xp[j].saturating_sub(y_new).saturating_sub(1);
    let dy = (BigUint::from(dy_xp) * &precision / BigUint::from(price_scales[j]))
        .to_u128()
        .ok_or(SwapError::Overflow("descaled output"))?;
    Ok(take_fee(dy, fee_num, fee_denom))
}
