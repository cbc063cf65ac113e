//! Ensemble aggregation
//!
//! Runs every strategy concurrently over the same candidates, normalizes
//! each strategy's scores to [0, 1], and fuses them with a weighted average
//! plus a rank-agreement bonus. A strategy that fails or times out is
//! excluded and the remaining weights renormalize to sum to 1.

use crate::analysis::models::ContentFeatures;
use crate::config::EnsembleConfig;
use crate::context::models::Context;
use crate::ensemble::strategy::{ScoringStrategy, StrategyScore};
use crate::scoring::ScoreBreakdown;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A candidate with its fused score and representative breakdown
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub features: ContentFeatures,
    pub breakdown: ScoreBreakdown,
    /// Fused score on a 0-100 scale
    pub score: f32,
}

/// Aggregation result plus which strategies were excluded
#[derive(Debug, Default)]
pub struct EnsembleOutcome {
    pub ranked: Vec<ScoredCandidate>,
    pub failed_strategies: Vec<String>,
}

struct StrategyRun {
    name: &'static str,
    confidence: f32,
    weight: f32,
    scores: HashMap<String, StrategyScore>,
    normalized: HashMap<String, f32>,
    rank_bonus: HashMap<String, f32>,
}

/// Runs M independently-configured strategies and fuses their rankings
pub struct EnsembleAggregator {
    strategies: Vec<Arc<dyn ScoringStrategy>>,
    config: EnsembleConfig,
}

impl EnsembleAggregator {
    pub fn new(strategies: Vec<Arc<dyn ScoringStrategy>>, config: EnsembleConfig) -> Self {
        Self { strategies, config }
    }

    pub async fn aggregate(
        &self,
        context: &Context,
        candidates: &[ContentFeatures],
    ) -> EnsembleOutcome {
        if candidates.is_empty() || self.strategies.is_empty() {
            return EnsembleOutcome::default();
        }

        let context = Arc::new(context.clone());
        let candidates_shared: Arc<Vec<ContentFeatures>> = Arc::new(candidates.to_vec());
        let timeout = self.config.strategy_timeout();

        let handles: Vec<_> = self
            .strategies
            .iter()
            .map(|strategy| {
                let strategy = strategy.clone();
                let context = context.clone();
                let candidates = candidates_shared.clone();
                tokio::spawn(async move {
                    let name = strategy.name();
                    let confidence = strategy.confidence();
                    let weight = strategy.weight();
                    let result =
                        tokio::time::timeout(timeout, strategy.score_all(&context, &candidates))
                            .await;
                    (name, confidence, weight, result)
                })
            })
            .collect();

        let mut runs = Vec::new();
        let mut failed_strategies = Vec::new();
        for (idx, joined) in join_all(handles).await.into_iter().enumerate() {
            match joined {
                Ok((name, confidence, weight, Ok(Ok(scores)))) => {
                    runs.push(prepare_run(name, confidence, weight, scores));
                }
                Ok((name, _, _, Ok(Err(e)))) => {
                    warn!(strategy = name, error = %e, "strategy failed, excluding from ensemble");
                    failed_strategies.push(name.to_string());
                }
                Ok((name, _, _, Err(_))) => {
                    warn!(strategy = name, "strategy timed out, excluding from ensemble");
                    failed_strategies.push(name.to_string());
                }
                Err(e) => {
                    let name = self.strategies[idx].name();
                    warn!(strategy = name, error = %e, "strategy task panicked, excluding");
                    failed_strategies.push(name.to_string());
                }
            }
        }

        if runs.is_empty() {
            warn!("all ensemble strategies failed, returning empty ranking");
            return EnsembleOutcome {
                ranked: Vec::new(),
                failed_strategies,
            };
        }

        // Renormalize the surviving strategy weights to sum to 1.
        let total_weight: f32 = runs.iter().map(|r| r.weight).sum();
        for run in &mut runs {
            run.weight /= total_weight;
        }

        // Highest-confidence surviving strategy supplies the representative
        // breakdown and the first tie-break key.
        let best = runs
            .iter()
            .max_by(|a, b| {
                a.confidence
                    .partial_cmp(&b.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.name.cmp(b.name))
            })
            .expect("runs is nonempty");

        let mut ranked: Vec<ScoredCandidate> = candidates
            .iter()
            .filter_map(|candidate| {
                let id = &candidate.id;
                let breakdown = best.scores.get(id).map(|s| s.breakdown.clone())?;

                let mut fused = 0.0;
                let mut bonus = 0.0;
                for run in &runs {
                    fused += run.weight * run.normalized.get(id).copied().unwrap_or(0.5);
                    bonus += run.weight * run.rank_bonus.get(id).copied().unwrap_or(0.0);
                }
                let combined = fused + self.config.rank_bonus_weight * bonus;
                let score = combined / (1.0 + self.config.rank_bonus_weight) * 100.0;

                Some(ScoredCandidate {
                    features: candidate.clone(),
                    breakdown,
                    score,
                })
            })
            .collect();

        let best_raw: HashMap<&str, f32> = best
            .scores
            .iter()
            .map(|(id, s)| (id.as_str(), s.score))
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    let a_raw = best_raw.get(a.features.id.as_str()).copied().unwrap_or(0.0);
                    let b_raw = best_raw.get(b.features.id.as_str()).copied().unwrap_or(0.0);
                    b_raw.partial_cmp(&a_raw).unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| b.features.quality_score.cmp(&a.features.quality_score))
                .then_with(|| a.features.id.cmp(&b.features.id))
        });

        debug!(
            strategies = runs.len(),
            excluded = failed_strategies.len(),
            candidates = ranked.len(),
            "ensemble aggregation complete"
        );

        EnsembleOutcome {
            ranked,
            failed_strategies,
        }
    }
}

/// Min-max normalize a strategy's scores and compute its Borda-style rank
/// bonus in (0, 1].
fn prepare_run(
    name: &'static str,
    confidence: f32,
    weight: f32,
    scores: Vec<StrategyScore>,
) -> StrategyRun {
    let min = scores.iter().map(|s| s.score).fold(f32::INFINITY, f32::min);
    let max = scores
        .iter()
        .map(|s| s.score)
        .fold(f32::NEG_INFINITY, f32::max);
    let spread = max - min;

    let normalized: HashMap<String, f32> = scores
        .iter()
        .map(|s| {
            let norm = if spread > f32::EPSILON {
                (s.score - min) / spread
            } else {
                0.5
            };
            (s.content_id.clone(), norm)
        })
        .collect();

    let mut order: Vec<&StrategyScore> = scores.iter().collect();
    order.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.content_id.cmp(&b.content_id))
    });
    let n = order.len() as f32;
    let rank_bonus: HashMap<String, f32> = order
        .iter()
        .enumerate()
        .map(|(idx, s)| (s.content_id.clone(), (n - idx as f32) / n))
        .collect();

    let scores: HashMap<String, StrategyScore> = scores
        .into_iter()
        .map(|s| (s.content_id.clone(), s))
        .collect();

    StrategyRun {
        name,
        confidence,
        weight,
        scores,
        normalized,
        rank_bonus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::context::models::{ContextType, Difficulty, Intent, SkillLevel};
    use crate::ensemble::strategy::default_strategies;
    use crate::error::{EngineError, Result};
    use async_trait::async_trait;
    use std::time::Duration;

    struct FailingStrategy;

    #[async_trait]
    impl ScoringStrategy for FailingStrategy {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn confidence(&self) -> f32 {
            0.95
        }
        fn weight(&self) -> f32 {
            0.5
        }
        async fn score_all(
            &self,
            _context: &Context,
            _candidates: &[ContentFeatures],
        ) -> Result<Vec<StrategyScore>> {
            Err(EngineError::Strategy {
                strategy: "failing".to_string(),
                reason: "synthetic".to_string(),
            })
        }
    }

    struct SlowStrategy;

    #[async_trait]
    impl ScoringStrategy for SlowStrategy {
        fn name(&self) -> &'static str {
            "slow"
        }
        fn confidence(&self) -> f32 {
            0.95
        }
        fn weight(&self) -> f32 {
            0.5
        }
        async fn score_all(
            &self,
            _context: &Context,
            _candidates: &[ContentFeatures],
        ) -> Result<Vec<StrategyScore>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
    }

    fn context() -> Context {
        Context {
            technologies: ["rust".to_string()].into_iter().collect(),
            content_type_needed: None,
            difficulty: Difficulty::Unknown,
            intent: Intent::Implementation,
            key_concepts: vec!["async".to_string()],
            skill_level: SkillLevel::Unknown,
            context_type: ContextType::Project,
            combined_text: "implement async rust service".to_string(),
            embedding: None,
        }
    }

    fn candidate(id: &str, techs: &[&str], quality: u8) -> ContentFeatures {
        ContentFeatures {
            id: id.to_string(),
            title: id.to_string(),
            url: None,
            technologies: techs.iter().map(|t| t.to_string()).collect(),
            content_type: None,
            difficulty: Difficulty::Unknown,
            intent: Intent::Implementation,
            key_concepts: Vec::new(),
            quality_score: quality,
            embedding: None,
            enhanced: false,
        }
    }

    fn candidates() -> Vec<ContentFeatures> {
        vec![
            candidate("a", &["rust", "tokio"], 8),
            candidate("b", &["javascript"], 9),
            candidate("c", &["rust"], 5),
        ]
    }

    #[tokio::test]
    async fn test_ranked_output_is_sorted_descending() {
        let config = EnsembleConfig::default();
        let aggregator =
            EnsembleAggregator::new(default_strategies(&ScoringConfig::default()), config);
        let outcome = aggregator.aggregate(&context(), &candidates()).await;

        assert!(outcome.failed_strategies.is_empty());
        assert_eq!(outcome.ranked.len(), 3);
        for pair in outcome.ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(outcome.ranked[0].features.id, "a");
    }

    #[tokio::test]
    async fn test_failed_strategy_is_excluded_and_weights_renormalize() {
        let scoring = ScoringConfig::default();
        let mut strategies = default_strategies(&scoring);
        strategies.push(Arc::new(FailingStrategy));

        let with_failure =
            EnsembleAggregator::new(strategies, EnsembleConfig::default());
        let without_failure =
            EnsembleAggregator::new(default_strategies(&scoring), EnsembleConfig::default());

        let ctx = context();
        let cands = candidates();
        let degraded = with_failure.aggregate(&ctx, &cands).await;
        let baseline = without_failure.aggregate(&ctx, &cands).await;

        assert_eq!(degraded.failed_strategies, vec!["failing".to_string()]);
        // Renormalized weights make the surviving ensemble identical.
        for (d, b) in degraded.ranked.iter().zip(baseline.ranked.iter()) {
            assert_eq!(d.features.id, b.features.id);
            assert!((d.score - b.score).abs() < 1e-4);
        }
    }

    #[tokio::test]
    async fn test_timed_out_strategy_is_treated_as_failed() {
        let config = EnsembleConfig {
            strategy_timeout_ms: 50,
            ..Default::default()
        };
        let mut strategies = default_strategies(&ScoringConfig::default());
        strategies.push(Arc::new(SlowStrategy));

        let aggregator = EnsembleAggregator::new(strategies, config);
        let outcome = aggregator.aggregate(&context(), &candidates()).await;

        assert_eq!(outcome.failed_strategies, vec!["slow".to_string()]);
        assert_eq!(outcome.ranked.len(), 3);
    }

    #[tokio::test]
    async fn test_all_strategies_failing_yields_empty_ranking() {
        let aggregator = EnsembleAggregator::new(
            vec![Arc::new(FailingStrategy)],
            EnsembleConfig::default(),
        );
        let outcome = aggregator.aggregate(&context(), &candidates()).await;
        assert!(outcome.ranked.is_empty());
        assert_eq!(outcome.failed_strategies.len(), 1);
    }

    #[tokio::test]
    async fn test_candidate_order_does_not_change_result() {
        let aggregator = EnsembleAggregator::new(
            default_strategies(&ScoringConfig::default()),
            EnsembleConfig::default(),
        );
        let ctx = context();

        let forward = aggregator.aggregate(&ctx, &candidates()).await;
        let mut reversed_input = candidates();
        reversed_input.reverse();
        let reversed = aggregator.aggregate(&ctx, &reversed_input).await;

        let forward_ids: Vec<_> = forward.ranked.iter().map(|c| c.features.id.clone()).collect();
        let reversed_ids: Vec<_> =
            reversed.ranked.iter().map(|c| c.features.id.clone()).collect();
        assert_eq!(forward_ids, reversed_ids);
    }

    #[tokio::test]
    async fn test_empty_candidates_short_circuits() {
        let aggregator = EnsembleAggregator::new(
            default_strategies(&ScoringConfig::default()),
            EnsembleConfig::default(),
        );
        let outcome = aggregator.aggregate(&context(), &[]).await;
        assert!(outcome.ranked.is_empty());
        assert!(outcome.failed_strategies.is_empty());
    }
}
