//! Circuit breaker for collaborator protection

use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Circuit state for one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Normal operation
    Closed,
    /// Failing, reject calls
    Open,
    /// Testing whether the collaborator recovered
    HalfOpen,
}

#[derive(Debug, Clone)]
struct BreakerEntry {
    state: BreakerState,
    failure_count: usize,
    opened_at: Option<Instant>,
}

impl BreakerEntry {
    fn new() -> Self {
        Self {
            state: BreakerState::Closed,
            failure_count: 0,
            opened_at: None,
        }
    }
}

/// Circuit breaker configuration
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: usize,
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(30),
        }
    }
}

/// Per-operation circuit breaker
pub struct CircuitBreaker {
    breakers: DashMap<String, BreakerEntry>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            breakers: DashMap::new(),
            config,
        }
    }

    /// Whether calls for this operation should be rejected right now.
    ///
    /// An open circuit transitions to half-open once the reset timeout
    /// elapses, letting a single probe call through.
    pub fn is_open(&self, operation: &str) -> bool {
        let mut entry = self
            .breakers
            .entry(operation.to_string())
            .or_insert_with(BreakerEntry::new);

        match entry.state {
            BreakerState::Closed | BreakerState::HalfOpen => false,
            BreakerState::Open => match entry.opened_at {
                Some(opened_at) if opened_at.elapsed() >= self.config.reset_timeout => {
                    entry.state = BreakerState::HalfOpen;
                    false
                }
                Some(_) => true,
                None => true,
            },
        }
    }

    pub fn mark_success(&self, operation: &str) {
        let mut entry = self
            .breakers
            .entry(operation.to_string())
            .or_insert_with(BreakerEntry::new);
        entry.state = BreakerState::Closed;
        entry.failure_count = 0;
        entry.opened_at = None;
    }

    pub fn mark_failure(&self, operation: &str) {
        let mut entry = self
            .breakers
            .entry(operation.to_string())
            .or_insert_with(BreakerEntry::new);
        entry.failure_count += 1;
        // A failed half-open probe reopens immediately.
        if entry.failure_count >= self.config.failure_threshold
            || entry.state == BreakerState::HalfOpen
        {
            entry.state = BreakerState::Open;
            entry.opened_at = Some(Instant::now());
        }
    }

    pub fn state(&self, operation: &str) -> BreakerState {
        self.breakers
            .get(operation)
            .map(|e| e.state)
            .unwrap_or(BreakerState::Closed)
    }

    pub fn reset(&self, operation: &str) {
        self.breakers.remove(operation);
    }
}
