//! Configuration types for Viaduct

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{AccountId, Error, Result, TokenId};

/// Route search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Maximum hops per candidate path: 1 = direct only, 2 = one bridge
    /// token, 3 = up to two bridge tokens. Values below 1 behave as 1.
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,
}

fn default_max_hops() -> usize {
    3
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
        }
    }
}

/// Market and ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Token the native asset wraps into before entering pool math
    pub wrapped_native: TokenId,

    /// Account allowed to register tokens/pools and install market state
    #[serde(default = "default_owner")]
    pub owner: AccountId,
}

fn default_owner() -> AccountId {
    AccountId::new("admin")
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            wrapped_native: TokenId::new("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"),
            owner: default_owner(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Market and ledger settings
    #[serde(default)]
    pub market: MarketConfig,

    /// Route search settings
    #[serde(default)]
    pub router: RouterConfig,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

fn default_api_port() -> u16 {
    19700
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            market: MarketConfig::default(),
            router: RouterConfig::default(),
            api_port: default_api_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("{}: {e}", path.as_ref().display())))?;
        serde_json::from_str(&raw).map_err(|e| Error::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.router.max_hops, 3);
        assert_eq!(config.market.owner.as_str(), "admin");
        assert_eq!(config.api_port, 19700);
        assert!(config.market.wrapped_native.as_str().starts_with("0x"));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.router.max_hops, config.router.max_hops);
        assert_eq!(parsed.market.wrapped_native, config.market.wrapped_native);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: AppConfig = serde_json::from_str(r#"{"api_port": 8080}"#).unwrap();
        assert_eq!(parsed.api_port, 8080);
        assert_eq!(parsed.router.max_hops, 3);
    }
}
