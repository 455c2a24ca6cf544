//! Error types for Viaduct

use thiserror::Error;

/// Core errors that can occur in Viaduct
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for Viaduct operations
pub type Result<T> = std::result::Result<T, Error>;
