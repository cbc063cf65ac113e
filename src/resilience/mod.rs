//! Resilient collaborator calls
//!
//! Every external call (embedding, LLM analysis) goes through one wrapper:
//! bounded timeout, circuit breaker, and an error instead of a hang. Callers
//! map the error to their documented fallback value.

pub mod breaker;

pub use breaker::{BreakerState, CircuitBreaker, CircuitBreakerConfig};

use crate::error::{EngineError, Result};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Shared guard for collaborator calls
pub struct ResilientCaller {
    breaker: CircuitBreaker,
}

impl ResilientCaller {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            breaker: CircuitBreaker::new(config),
        }
    }

    /// Run a collaborator call with a bounded timeout.
    ///
    /// A timeout counts as a failure for the circuit; an open circuit
    /// short-circuits without touching the collaborator at all.
    pub async fn call<T, Fut>(&self, operation: &str, timeout: Duration, fut: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        if self.breaker.is_open(operation) {
            warn!(operation, "circuit open, skipping collaborator call");
            return Err(EngineError::CircuitOpen(operation.to_string()));
        }

        match tokio::time::timeout(timeout, fut).await {
            Ok(Ok(value)) => {
                self.breaker.mark_success(operation);
                Ok(value)
            }
            Ok(Err(e)) => {
                self.breaker.mark_failure(operation);
                Err(e)
            }
            Err(_) => {
                self.breaker.mark_failure(operation);
                Err(EngineError::Timeout(timeout))
            }
        }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }
}

impl Default for ResilientCaller {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}
