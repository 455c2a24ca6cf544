//! Route optimizer: multi-hop search across registered pools
//!
//! Enumerates candidate paths between two tokens, direct first and then
//! bridged through supported tokens, prices each candidate hop-by-hop
//! against a staged market view, and keeps the one with the greatest
//! final output. The candidate space is the cross-product of path
//! topology and the pool choice at every hop; bridge count and hop depth
//! stay small, so plain enumeration is enough.

use tracing::debug;
use viaduct_core::config::RouterConfig;
use viaduct_core::{Amount, TokenId};

use crate::market::Market;
use crate::quote::simulate_legs;
use crate::registry::PoolRegistry;
use crate::state::{Hop, Path, Pool, Quote, SwapError};

// ---------------------------------------------------------------------------
// Candidate enumeration
// ---------------------------------------------------------------------------

/// All token sequences from `token_in` to `token_out` with up to
/// `max_hops` hops: shorter sequences first, bridge tokens tried in
/// registration order. Endpoints never appear as bridges.
fn token_sequences(
    registry: &PoolRegistry,
    token_in: &TokenId,
    token_out: &TokenId,
    max_hops: usize,
) -> Vec<Vec<TokenId>> {
    let bridges: Vec<&TokenId> = registry
        .supported_tokens()
        .iter()
        .filter(|t| *t != token_in && *t != token_out)
        .collect();

    let mut sequences = Vec::new();
    for hops in 1..=max_hops {
        let mut picks = Vec::new();
        let mut current = Vec::new();
        pick_bridges(&bridges, hops - 1, &mut current, &mut picks);
        for intermediates in picks {
            let mut sequence = Vec::with_capacity(hops + 1);
            sequence.push(token_in.clone());
            sequence.extend(intermediates.into_iter().cloned());
            sequence.push(token_out.clone());
            sequences.push(sequence);
        }
    }
    sequences
}

/// Ordered selections of `count` distinct bridge tokens
fn pick_bridges<'a>(
    bridges: &[&'a TokenId],
    count: usize,
    current: &mut Vec<&'a TokenId>,
    out: &mut Vec<Vec<&'a TokenId>>,
) {
    if count == 0 {
        out.push(current.clone());
        return;
    }
    for bridge in bridges {
        if current.contains(bridge) {
            continue;
        }
        current.push(bridge);
        pick_bridges(bridges, count - 1, current, out);
        current.pop();
    }
}

/// Every way of choosing one registered pool per hop of the sequence,
/// in per-pair registration order. Empty when any pair has no pool.
fn pool_assignments<'r>(registry: &'r PoolRegistry, sequence: &[TokenId]) -> Vec<Vec<&'r Pool>> {
    let mut per_hop: Vec<&[Pool]> = Vec::with_capacity(sequence.len().saturating_sub(1));
    for pair in sequence.windows(2) {
        let pools = registry.pools_for(&pair[0], &pair[1]);
        if pools.is_empty() {
            return Vec::new();
        }
        per_hop.push(pools);
    }

    let mut assignments = Vec::new();
    let mut current = Vec::with_capacity(per_hop.len());
    fill_assignment(&per_hop, &mut current, &mut assignments);
    assignments
}

fn fill_assignment<'r>(
    per_hop: &[&'r [Pool]],
    current: &mut Vec<&'r Pool>,
    out: &mut Vec<Vec<&'r Pool>>,
) {
    let k = current.len();
    if k == per_hop.len() {
        out.push(current.clone());
        return;
    }
    for pool in per_hop[k] {
        current.push(pool);
        fill_assignment(per_hop, current, out);
        current.pop();
    }
}

fn build_path(sequence: &[TokenId], pools: &[&Pool]) -> Path {
    let hops = pools
        .iter()
        .enumerate()
        .map(|(k, pool)| Hop {
            pool_id: pool.pool_id.clone(),
            token_in: sequence[k].clone(),
            token_out: sequence[k + 1].clone(),
        })
        .collect();
    Path::new(hops)
}

// ---------------------------------------------------------------------------
// Best-route selection
// ---------------------------------------------------------------------------

/// Find the path delivering the most `token_out` for `amount_in`.
///
/// Candidates that fail to quote (no live state, illiquid pool, variant
/// mismatch) are skipped rather than failing the call. Ties on output go
/// to the candidate with fewer hops, then to the earlier-enumerated one,
/// so repeated calls against unchanged state return the same route.
pub fn calculate_best_route(
    registry: &PoolRegistry,
    market: &Market,
    config: &RouterConfig,
    token_in: &TokenId,
    token_out: &TokenId,
    amount_in: Amount,
) -> Result<Quote, SwapError> {
    for token in [token_in, token_out] {
        if !registry.is_token_supported(token) {
            return Err(SwapError::UnsupportedToken(token.to_string()));
        }
    }
    if token_in == token_out {
        return Err(SwapError::InvalidPath(
            "input and output token are the same".into(),
        ));
    }
    if amount_in == 0 {
        return Err(SwapError::InvalidAmount("zero input amount".into()));
    }

    let max_hops = config.max_hops.max(1);
    let mut best: Option<Quote> = None;
    let mut candidates = 0usize;

    for sequence in token_sequences(registry, token_in, token_out, max_hops) {
        for pools in pool_assignments(registry, &sequence) {
            candidates += 1;
            let legs: Vec<(&Pool, &TokenId)> =
                pools.iter().copied().zip(sequence.iter()).collect();
            let amount_out = match simulate_legs(market, &legs, amount_in) {
                Ok((amount_out, _)) => amount_out,
                Err(err) => {
                    debug!(error = %err, "route candidate skipped");
                    continue;
                }
            };
            let better = match &best {
                None => true,
                Some(current) => {
                    amount_out > current.amount_out
                        || (amount_out == current.amount_out
                            && pools.len() < current.path.hops.len())
                }
            };
            if better {
                best = Some(Quote {
                    path: build_path(&sequence, &pools),
                    amount_in,
                    amount_out,
                });
            }
        }
    }

    match best {
        Some(quote) => {
            debug!(
                candidates,
                path = %quote.path,
                amount_out = quote.amount_out,
                "best route selected"
            );
            Ok(quote)
        }
        None => Err(SwapError::NoRouteFound {
            from: token_in.to_string(),
            to: token_out.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
