//! Viaduct Swap Engine
//!
//! Route optimization and atomic execution across heterogeneous
//! liquidity pools: constant-product pairs, concentrated-liquidity
//! pools, and stable/crypto invariant minters.

pub mod calculator;
pub mod concentrated;
pub mod executor;
pub mod market;
pub mod quote;
pub mod registry;
pub mod router;
pub mod stable_swap;
pub mod state;

// Re-exports
pub use calculator::{apply_slippage, calculate_output, suggest_min_output};
pub use executor::{execute_swap, swap_native_to_token};
pub use market::{Ledger, Market, MinterState, PoolState, StagedEffects};
pub use quote::{quote_hop, simulate_legs, StagedMarket};
pub use registry::PoolRegistry;
pub use router::calculate_best_route;
pub use state::{ExecutionResult, Hop, Path, Pool, Protocol, Quote, SwapError};
