//! Viaduct-api: HTTP API layer for Viaduct
//!
//! Provides a RESTful surface over the swap engine: owner-gated
//! registration and market state installs, read-only quoting, and
//! atomic execution.

pub mod dto;
pub mod routes;
pub mod server;
pub mod state;

pub use server::*;
pub use state::AppState;
