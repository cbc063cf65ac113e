//! Metrics collection for observability

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec_with_registry, register_histogram_with_registry, CounterVec, Histogram,
    Opts, Registry,
};
use std::sync::Arc;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> =
    Lazy::new(|| Arc::new(Metrics::new().expect("Failed to initialize metrics")));

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Request metrics
    pub recommendation_requests: CounterVec,
    pub recommendation_duration: Histogram,
    pub candidates_scored: Histogram,

    // Cache metrics
    pub cache_events: CounterVec,

    // Degradation metrics
    pub strategy_failures: CounterVec,
    pub fallback_substitutions: CounterVec,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let registry = Registry::new();

        let recommendation_requests = register_counter_vec_with_registry!(
            Opts::new(
                "recommendation_requests_total",
                "Total recommendation requests"
            ),
            &["engine", "status"],
            registry
        )?;

        let recommendation_duration = register_histogram_with_registry!(
            "recommendation_duration_seconds",
            "End-to-end recommendation latency in seconds",
            registry
        )?;

        let candidates_scored = register_histogram_with_registry!(
            "candidates_scored",
            "Candidates scored per request",
            registry
        )?;

        let cache_events = register_counter_vec_with_registry!(
            Opts::new("cache_events_total", "Recommendation cache events"),
            &["event"],
            registry
        )?;

        let strategy_failures = register_counter_vec_with_registry!(
            Opts::new(
                "strategy_failures_total",
                "Ensemble strategies excluded due to failure or timeout"
            ),
            &["strategy"],
            registry
        )?;

        let fallback_substitutions = register_counter_vec_with_registry!(
            Opts::new(
                "fallback_substitutions_total",
                "Component scores substituted with neutral fallbacks"
            ),
            &["factor"],
            registry
        )?;

        Ok(Self {
            registry,
            recommendation_requests,
            recommendation_duration,
            candidates_scored,
            cache_events,
            strategy_failures,
            fallback_substitutions,
        })
    }

    /// The underlying registry, for exposition by the embedding application
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
