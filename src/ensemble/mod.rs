//! Ensemble scoring: independent strategies fused into one ranking

pub mod aggregator;
pub mod strategy;

pub use aggregator::{EnsembleAggregator, EnsembleOutcome, ScoredCandidate};
pub use strategy::{
    default_strategies, AdaptiveStrategy, EmbeddingStrategy, KeywordStrategy, ScoringStrategy,
    StrategyScore,
};
