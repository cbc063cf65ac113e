//! Error types for the recommendation engine

use thiserror::Error;

/// Engine-wide error type
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Embedding provider error: {0}")]
    Embedding(String),

    #[error("Analysis provider error: {0}")]
    Analysis(String),

    #[error("Cache store error: {0}")]
    CacheStore(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Strategy '{strategy}' failed: {reason}")]
    Strategy { strategy: String, reason: String },

    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Circuit open for operation '{0}'")]
    CircuitOpen(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, EngineError>;
