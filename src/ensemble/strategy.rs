//! Scoring strategies for the ensemble
//!
//! Each strategy is a full ranking pass over the candidate set with its own
//! weighting emphasis. Scores stay in the strategy's own range; the
//! aggregator normalizes before fusing.

use crate::analysis::models::ContentFeatures;
use crate::config::ScoringConfig;
use crate::context::models::Context;
use crate::error::Result;
use crate::scoring::{score_content, select, ScoreBreakdown, ScoringWeights};
use async_trait::async_trait;

/// One independently-configured scoring strategy
#[async_trait]
pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    /// Confidence used for tie-breaking between strategies
    fn confidence(&self) -> f32;
    /// Relative weight in the fused average
    fn weight(&self) -> f32;
    async fn score_all(
        &self,
        context: &Context,
        candidates: &[ContentFeatures],
    ) -> Result<Vec<StrategyScore>>;
}

/// A strategy's verdict on one candidate
#[derive(Debug, Clone)]
pub struct StrategyScore {
    pub content_id: String,
    pub score: f32,
    pub breakdown: ScoreBreakdown,
}

fn run_scorer(
    context: &Context,
    candidates: &[ContentFeatures],
    weights: &ScoringWeights,
    rules: &[crate::scoring::PenaltyRule],
    config: &ScoringConfig,
) -> Vec<StrategyScore> {
    candidates
        .iter()
        .map(|content| {
            let breakdown = score_content(context, content, weights, rules, config);
            StrategyScore {
                content_id: content.id.clone(),
                score: breakdown.total,
                breakdown,
            }
        })
        .collect()
}

/// Keyword-first matcher: technology and intent carry the score, embeddings
/// are never consulted.
pub struct KeywordStrategy {
    config: ScoringConfig,
}

impl KeywordStrategy {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    fn weights() -> ScoringWeights {
        ScoringWeights {
            technology: 0.45,
            semantic: 0.0,
            content_type: 0.10,
            intent: 0.15,
            difficulty: 0.10,
            quality: 0.20,
        }
    }
}

#[async_trait]
impl ScoringStrategy for KeywordStrategy {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn confidence(&self) -> f32 {
        0.7
    }

    fn weight(&self) -> f32 {
        0.25
    }

    async fn score_all(
        &self,
        context: &Context,
        candidates: &[ContentFeatures],
    ) -> Result<Vec<StrategyScore>> {
        Ok(run_scorer(
            context,
            candidates,
            &Self::weights(),
            &[],
            &self.config,
        ))
    }
}

/// Embedding-first matcher: semantic similarity dominates.
pub struct EmbeddingStrategy {
    config: ScoringConfig,
}

impl EmbeddingStrategy {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    fn weights() -> ScoringWeights {
        ScoringWeights {
            technology: 0.15,
            semantic: 0.55,
            content_type: 0.05,
            intent: 0.05,
            difficulty: 0.05,
            quality: 0.15,
        }
    }
}

#[async_trait]
impl ScoringStrategy for EmbeddingStrategy {
    fn name(&self) -> &'static str {
        "embedding"
    }

    fn confidence(&self) -> f32 {
        0.8
    }

    fn weight(&self) -> f32 {
        0.35
    }

    async fn score_all(
        &self,
        context: &Context,
        candidates: &[ContentFeatures],
    ) -> Result<Vec<StrategyScore>> {
        Ok(run_scorer(
            context,
            candidates,
            &Self::weights(),
            &[],
            &self.config,
        ))
    }
}

/// Adaptive strategy: weight vector and penalty rules from the weight
/// selector, keyed by the context itself.
pub struct AdaptiveStrategy {
    config: ScoringConfig,
}

impl AdaptiveStrategy {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ScoringStrategy for AdaptiveStrategy {
    fn name(&self) -> &'static str {
        "adaptive"
    }

    fn confidence(&self) -> f32 {
        0.9
    }

    fn weight(&self) -> f32 {
        0.4
    }

    async fn score_all(
        &self,
        context: &Context,
        candidates: &[ContentFeatures],
    ) -> Result<Vec<StrategyScore>> {
        let (weights, rules) = select(
            context.context_type,
            context.intent,
            context.skill_level,
            &self.config,
        );
        Ok(run_scorer(context, candidates, &weights, &rules, &self.config))
    }
}

/// The default three-strategy ensemble
pub fn default_strategies(config: &ScoringConfig) -> Vec<std::sync::Arc<dyn ScoringStrategy>> {
    vec![
        std::sync::Arc::new(AdaptiveStrategy::new(config.clone())),
        std::sync::Arc::new(EmbeddingStrategy::new(config.clone())),
        std::sync::Arc::new(KeywordStrategy::new(config.clone())),
    ]
}
