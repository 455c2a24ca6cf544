//! Application state shared across API handlers

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use viaduct_core::AppConfig;
use viaduct_swap::{Market, PoolRegistry};

/// Shared application state.
///
/// Quotes take read locks; registrations, state installs, and executions
/// take write locks. Every handler that holds both locks acquires the
/// registry before the market.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    registry: RwLock<PoolRegistry>,
    market: RwLock<Market>,
}

impl AppState {
    /// Create application state with default config
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create with a specific config; the registry owner comes from it
    pub fn with_config(config: AppConfig) -> Self {
        let registry = PoolRegistry::new(config.market.owner.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                registry: RwLock::new(registry),
                market: RwLock::new(Market::new()),
            }),
        }
    }

    /// Startup configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Read access to the pool registry
    pub async fn registry(&self) -> RwLockReadGuard<'_, PoolRegistry> {
        self.inner.registry.read().await
    }

    /// Write access to the pool registry
    pub async fn registry_mut(&self) -> RwLockWriteGuard<'_, PoolRegistry> {
        self.inner.registry.write().await
    }

    /// Read access to the market
    pub async fn market(&self) -> RwLockReadGuard<'_, Market> {
        self.inner.market.read().await
    }

    /// Write access to the market
    pub async fn market_mut(&self) -> RwLockWriteGuard<'_, Market> {
        self.inner.market.write().await
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
