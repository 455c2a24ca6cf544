//! Core type definitions for Viaduct

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token identity (contract address or symbolic handle)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub String);

impl TokenId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pool identity (pair contract address or registrar-chosen handle)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(pub String);

impl PoolId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account identity for the balance ledger and the registry owner gate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contract address (Curve-style minters and similar external handles)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this looks like a 0x-prefixed 20-byte hex address
    pub fn is_wellformed(&self) -> bool {
        match self.0.strip_prefix("0x") {
            Some(rest) => rest.len() == 40 && hex::decode(rest).is_ok(),
            None => false,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw integer token amount (smallest unit of the asset)
pub type Amount = u128;

/// Constants
pub mod constants {
    use super::Amount;

    /// Smallest-unit scale of the native asset (1 native = 10^18 units)
    pub const NATIVE_UNIT: Amount = 1_000_000_000_000_000_000;

    /// Denominator for concentrated-liquidity fee tiers
    /// (tiers are hundredths of a basis point: 500 = 0.05%)
    pub const FEE_TIER_DENOM: u64 = 1_000_000;

    /// Maximum coins a stable/crypto minter may hold
    pub const MAX_MINTER_COINS: usize = 8;
}
