//! Constant-product swap math (x * y = k)
//!
//! All intermediates run through BigUint; reserves at 1e18-scale token
//! units would overflow native multiplication.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use viaduct_core::Amount;

/// Calculate swap output using the constant product formula
///
/// Formula: output = (reserves_out * input * fee_num) / (reserves_in * fee_denom + input * fee_num)
pub fn calculate_output(
    reserves_in: Amount,
    reserves_out: Amount,
    input_amount: Amount,
    fee_num: u32,
    fee_denom: u32,
) -> Amount {
    if reserves_in == 0 || reserves_out == 0 || input_amount == 0 || fee_denom == 0 {
        return 0;
    }

    let numerator =
        BigUint::from(reserves_out) * BigUint::from(input_amount) * BigUint::from(fee_num);
    let denominator = BigUint::from(reserves_in) * BigUint::from(fee_denom)
        + BigUint::from(input_amount) * BigUint::from(fee_num);

    if denominator.is_zero() {
        return 0;
    }

    (numerator / denominator).to_u128().unwrap_or(0)
}

/// Apply a slippage tolerance to an output amount, rounding down
pub fn apply_slippage(output: Amount, slippage_percent: f64) -> Amount {
    if !(0.0..=100.0).contains(&slippage_percent) {
        return output;
    }
    let keep_bps = ((100.0 - slippage_percent) * 100.0).round() as u128;
    (BigUint::from(output) * BigUint::from(keep_bps) / BigUint::from(10_000u32))
        .to_u128()
        .unwrap_or(output)
}

/// Suggest minimum output with default slippage (0.5%)
pub fn suggest_min_output(output: Amount) -> Amount {
    apply_slippage(output, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_output_known_value() {
        // reserves 1000/1000, input 100, fee 997/1000:
        // 1000*100*997 / (1000*1000 + 100*997) = 99_700_000 / 1_099_700 = 90
        assert_eq!(calculate_output(1000, 1000, 100, 997, 1000), 90);
    }

    #[test]
    fn test_calculate_output_no_fee_matches_closed_form() {
        // out = r_out * x / (r_in + x) when fee_num == fee_denom
        assert_eq!(
            calculate_output(1_000_000, 2_000_000, 50_000, 1, 1),
            2_000_000u128 * 50_000 / 1_050_000
        );
    }

    #[test]
    fn test_calculate_output_zero_guards() {
        assert_eq!(calculate_output(0, 1000, 100, 997, 1000), 0);
        assert_eq!(calculate_output(1000, 0, 100, 997, 1000), 0);
        assert_eq!(calculate_output(1000, 1000, 0, 997, 1000), 0);
    }

    #[test]
    fn test_fee_reduces_output() {
        let with_fee = calculate_output(1_000_000, 1_000_000, 10_000, 997, 1000);
        let no_fee = calculate_output(1_000_000, 1_000_000, 10_000, 1000, 1000);
        assert!(with_fee < no_fee);
    }

    #[test]
    fn test_output_below_reserves() {
        // Even an absurd input cannot drain the out-side reserves
        let out = calculate_output(1000, 1000, u128::MAX / 2, 997, 1000);
        assert!(out < 1000);
    }

    #[test]
    fn test_large_reserves_no_overflow() {
        // 1e30-scale reserves stay exact through BigUint
        let out = calculate_output(
            1_000_000_000_000_000_000_000_000_000_000,
            1_000_000_000_000_000_000_000_000_000_000,
            1_000_000_000_000_000_000,
            997,
            1000,
        );
        assert!(out > 0);
        assert!(out < 1_000_000_000_000_000_000);
    }

    #[test]
    fn test_apply_slippage() {
        assert_eq!(apply_slippage(1000, 0.5), 995);
        assert_eq!(apply_slippage(1000, 0.0), 1000);
        assert_eq!(apply_slippage(1000, 200.0), 1000);
    }

    #[test]
    fn test_suggest_min_output() {
        assert_eq!(suggest_min_output(20_000), 19_900);
    }
}
