//! Swap executor
//!
//! Runs a path against the live market as one atomic unit. Hops are
//! staged against an overlay of pool and minter state; the ledger and
//! the market are only touched after the final output clears the
//! slippage floor. A failure at any point discards the staged writes,
//! leaving every balance exactly as before the call.
//!
//! Execution walks the same hop simulation the router quotes with, so
//! executing immediately after quoting against unchanged state delivers
//! exactly the quoted amount.

use tracing::{debug, info};
use viaduct_core::config::RouterConfig;
use viaduct_core::{AccountId, Amount, TokenId};

use crate::market::Market;
use crate::quote::simulate_legs;
use crate::registry::PoolRegistry;
use crate::router::calculate_best_route;
use crate::state::{ExecutionResult, Path, Pool, SwapError};

/// Resolve every hop of a path to a registered pool
fn resolve_legs<'r>(
    registry: &'r PoolRegistry,
    path: &'r Path,
) -> Result<Vec<(&'r Pool, &'r TokenId)>, SwapError> {
    let mut legs = Vec::with_capacity(path.hops.len());
    for hop in &path.hops {
        let pool = registry
            .find_pool(&hop.token_in, &hop.token_out, &hop.pool_id)
            .ok_or_else(|| {
                SwapError::InvalidPath(format!(
                    "pool {} is not registered for {}/{}",
                    hop.pool_id, hop.token_in, hop.token_out
                ))
            })?;
        legs.push((pool, &hop.token_in));
    }
    Ok(legs)
}

/// Execute a path, delivering at least `min_amount_out` of the path's
/// output token or changing nothing.
///
/// The caller funds the input side from their token balance. Hops run
/// strictly in order, each fed the actual output of the previous one.
pub fn execute_swap(
    registry: &PoolRegistry,
    market: &mut Market,
    caller: &AccountId,
    token_in: &TokenId,
    path: &Path,
    amount_in: Amount,
    min_amount_out: Amount,
) -> Result<ExecutionResult, SwapError> {
    if amount_in == 0 {
        return Err(SwapError::InvalidPath("zero input amount".into()));
    }
    path.validate_shape()?;
    if path.input() != Some(token_in) {
        return Err(SwapError::InvalidPath(format!(
            "path starts at {}, not {token_in}",
            path.input().map(TokenId::as_str).unwrap_or("nothing")
        )));
    }
    let legs = resolve_legs(registry, path)?;
    // validate_shape guarantees at least one hop
    let token_out = match path.output() {
        Some(token) => token.clone(),
        None => return Err(SwapError::InvalidPath("path has no hops".into())),
    };

    let available = market.ledger().token_balance(caller, token_in);
    if available < amount_in {
        return Err(SwapError::InsufficientBalance {
            required: amount_in,
            available,
        });
    }

    let (amount_out, effects) = simulate_legs(market, &legs, amount_in)?;
    if amount_out < min_amount_out {
        debug!(
            path = %path,
            got = amount_out,
            min = min_amount_out,
            "swap aborted below slippage floor"
        );
        return Err(SwapError::SlippageExceeded {
            got: amount_out,
            min: min_amount_out,
        });
    }

    let ledger = market.ledger_mut();
    ledger.debit_token(caller, token_in, amount_in)?;
    if let Err(err) = ledger.credit_token(caller, &token_out, amount_out) {
        // a failed credit leaves no net change
        let _ = ledger.credit_token(caller, token_in, amount_in);
        return Err(err);
    }
    market.commit(effects);

    info!(
        account = %caller,
        path = %path,
        amount_in,
        amount_out,
        "swap committed"
    );
    Ok(ExecutionResult {
        path: path.clone(),
        amount_in,
        amount_out,
    })
}

/// Swap the native asset into `token_out`.
///
/// Wraps the attached native amount into its canonical token as an
/// implicit first step, computes the best route from there itself, and
/// then behaves exactly like [`execute_swap`]. The wrapped token never
/// appears in the caller's ledger; only native leaves and `token_out`
/// arrives.
pub fn swap_native_to_token(
    registry: &PoolRegistry,
    market: &mut Market,
    router_config: &RouterConfig,
    wrapped_native: &TokenId,
    caller: &AccountId,
    token_out: &TokenId,
    amount_in: Amount,
    min_amount_out: Amount,
) -> Result<ExecutionResult, SwapError> {
    if amount_in == 0 {
        return Err(SwapError::InvalidPath("zero input amount".into()));
    }
    let available = market.ledger().native_balance(caller);
    if available < amount_in {
        return Err(SwapError::InsufficientBalance {
            required: amount_in,
            available,
        });
    }

    let quote = calculate_best_route(
        registry,
        market,
        router_config,
        wrapped_native,
        token_out,
        amount_in,
    )?;
    let legs = resolve_legs(registry, &quote.path)?;
    let (amount_out, effects) = simulate_legs(market, &legs, amount_in)?;
    if amount_out < min_amount_out {
        debug!(
            path = %quote.path,
            got = amount_out,
            min = min_amount_out,
            "native swap aborted below slippage floor"
        );
        return Err(SwapError::SlippageExceeded {
            got: amount_out,
            min: min_amount_out,
        });
    }

    let ledger = market.ledger_mut();
    ledger.debit_native(caller, amount_in)?;
    if let Err(err) = ledger.credit_token(caller, token_out, amount_out) {
        let _ = ledger.credit_native(caller, amount_in);
        return Err(err);
    }
    market.commit(effects);

    info!(
        account = %caller,
        path = %quote.path,
        amount_in,
        amount_out,
        "native swap committed"
    );
    Ok(ExecutionResult {
        path: quote.path,
        amount_in,
        amount_out,
    })
}
