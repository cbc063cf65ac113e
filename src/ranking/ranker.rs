//! Final ranking, filtering, and diversity control

use crate::config::RankingConfig;
use crate::context::models::Context;
use crate::engine::models::Recommendation;
use crate::ensemble::aggregator::ScoredCandidate;
use crate::ranking::reasons::build_reason;
use std::collections::BTreeSet;
use tracing::debug;

/// Per-request ranking parameters, resolved from the request with config
/// defaults filling the gaps.
#[derive(Debug, Clone)]
pub struct RankParams {
    pub max_recommendations: usize,
    pub min_score: f32,
    pub quality_threshold: u8,
    /// 0.0 disables the diversity pass entirely
    pub diversity_weight: f32,
}

impl RankParams {
    pub fn from_config(config: &RankingConfig) -> Self {
        Self {
            max_recommendations: config.max_recommendations,
            min_score: config.min_score,
            quality_threshold: config.quality_threshold,
            diversity_weight: 0.0,
        }
    }
}

/// Sorts, thresholds, deduplicates, and truncates scored candidates
#[derive(Debug, Clone)]
pub struct Ranker {
    config: RankingConfig,
}

impl Ranker {
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    pub fn rank(
        &self,
        context: &Context,
        candidates: Vec<ScoredCandidate>,
        params: &RankParams,
    ) -> Vec<Recommendation> {
        let mut kept: Vec<ScoredCandidate> = candidates
            .into_iter()
            .filter(|c| {
                c.score >= params.min_score && c.features.quality_score >= params.quality_threshold
            })
            .collect();

        kept.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.features.quality_score.cmp(&a.features.quality_score))
                .then_with(|| a.features.id.cmp(&b.features.id))
        });

        let mut adjusted = if params.diversity_weight > 0.0 {
            self.diversity_pass(kept, params)
        } else {
            kept
        };

        adjusted.truncate(params.max_recommendations);

        let recommendations: Vec<Recommendation> = adjusted
            .into_iter()
            .enumerate()
            .map(|(idx, candidate)| Recommendation {
                id: candidate.features.id.clone(),
                title: candidate.features.title.clone(),
                url: candidate.features.url.clone(),
                score: candidate.score,
                reason: build_reason(context, &candidate),
                rank: idx + 1,
                enhanced: candidate.features.enhanced,
                breakdown: candidate.breakdown,
            })
            .collect();

        debug!(returned = recommendations.len(), "ranking complete");
        recommendations
    }

    /// Penalize items whose technology set heavily overlaps an
    /// already-selected higher-ranked item.
    ///
    /// Walks in rank order so only previously selected items count against a
    /// candidate, then re-sorts by adjusted score. Items that were never
    /// penalized keep their relative order (the sort is stable).
    fn diversity_pass(
        &self,
        candidates: Vec<ScoredCandidate>,
        params: &RankParams,
    ) -> Vec<ScoredCandidate> {
        let threshold = self.config.diversity_overlap_threshold;
        let mut selected_techs: Vec<BTreeSet<String>> = Vec::new();
        let mut adjusted = Vec::with_capacity(candidates.len());

        for mut candidate in candidates {
            let overlap = selected_techs
                .iter()
                .map(|prior| jaccard(&candidate.features.technologies, prior))
                .fold(0.0f32, f32::max);

            if overlap > threshold {
                let penalty = params.diversity_weight * overlap;
                candidate.score *= 1.0 - penalty;
            }
            selected_techs.push(candidate.features.technologies.clone());
            adjusted.push(candidate);
        }

        adjusted.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        adjusted.retain(|c| c.score >= params.min_score);
        adjusted
    }
}

/// Jaccard overlap of two technology sets in [0, 1]
fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f32;
    let union = a.union(b).count() as f32;
    intersection / union
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::ContentFeatures;
    use crate::context::models::{ContextType, Difficulty, Intent, SkillLevel};
    use crate::scoring::{ScoreBreakdown, ScoringWeights};

    fn context() -> Context {
        Context {
            technologies: ["rust".to_string()].into_iter().collect(),
            content_type_needed: None,
            difficulty: Difficulty::Unknown,
            intent: Intent::General,
            key_concepts: Vec::new(),
            skill_level: SkillLevel::Unknown,
            context_type: ContextType::Learning,
            combined_text: String::new(),
            embedding: None,
        }
    }

    fn scored(id: &str, score: f32, quality: u8, techs: &[&str]) -> ScoredCandidate {
        ScoredCandidate {
            features: ContentFeatures {
                id: id.to_string(),
                title: id.to_string(),
                url: None,
                technologies: techs.iter().map(|t| t.to_string()).collect(),
                content_type: None,
                difficulty: Difficulty::Unknown,
                intent: Intent::General,
                key_concepts: Vec::new(),
                quality_score: quality,
                embedding: None,
                enhanced: false,
            },
            breakdown: ScoreBreakdown {
                technology: 50.0,
                semantic: 50.0,
                content_type: 50.0,
                intent: 50.0,
                difficulty: 50.0,
                quality: quality as f32 * 10.0,
                weights: ScoringWeights::uniform(),
                penalties: Vec::new(),
                fallbacks: Vec::new(),
                total: score,
            },
            score,
        }
    }

    fn ranker() -> Ranker {
        Ranker::new(RankingConfig::default())
    }

    #[test]
    fn test_sorted_by_score_then_quality_then_id() {
        let params = RankParams::from_config(&RankingConfig::default());
        let recs = ranker().rank(
            &context(),
            vec![
                scored("b", 70.0, 5, &["rust"]),
                scored("c", 80.0, 5, &["go"]),
                scored("a", 70.0, 9, &["python"]),
            ],
            &params,
        );
        let ids: Vec<_> = recs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(recs[0].rank, 1);
        assert_eq!(recs[2].rank, 3);
    }

    #[test]
    fn test_quality_threshold_is_enforced() {
        let mut params = RankParams::from_config(&RankingConfig::default());
        params.quality_threshold = 6;
        let recs = ranker().rank(
            &context(),
            vec![
                scored("a", 90.0, 5, &["rust"]),
                scored("b", 70.0, 8, &["go"]),
            ],
            &params,
        );
        assert_eq!(recs.len(), 1);
        assert!(recs.iter().all(|r| r.id != "a"));
    }

    #[test]
    fn test_min_score_filter() {
        let mut params = RankParams::from_config(&RankingConfig::default());
        params.min_score = 50.0;
        let recs = ranker().rank(
            &context(),
            vec![scored("a", 49.9, 9, &["rust"]), scored("b", 50.0, 9, &["go"])],
            &params,
        );
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].id, "b");
    }

    #[test]
    fn test_truncates_to_max_recommendations() {
        let mut params = RankParams::from_config(&RankingConfig::default());
        params.max_recommendations = 2;
        let recs = ranker().rank(
            &context(),
            (0..5)
                .map(|i| scored(&format!("c{}", i), 50.0 + i as f32, 5, &["rust"]))
                .collect(),
            &params,
        );
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn test_diversity_penalizes_near_duplicates() {
        let mut params = RankParams::from_config(&RankingConfig::default());
        params.diversity_weight = 1.0;
        let recs = ranker().rank(
            &context(),
            vec![
                scored("a", 90.0, 5, &["rust", "tokio"]),
                scored("b", 89.0, 5, &["rust", "tokio"]),
                scored("c", 60.0, 5, &["python"]),
            ],
            &params,
        );
        // "b" duplicates "a" and drops below "c" once penalized.
        let ids: Vec<_> = recs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids[0], "a");
        assert_eq!(ids[1], "c");
    }

    #[test]
    fn test_zero_diversity_weight_keeps_order() {
        let params = RankParams::from_config(&RankingConfig::default());
        let recs = ranker().rank(
            &context(),
            vec![
                scored("a", 90.0, 5, &["rust", "tokio"]),
                scored("b", 89.0, 5, &["rust", "tokio"]),
            ],
            &params,
        );
        let ids: Vec<_> = recs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let params = RankParams::from_config(&RankingConfig::default());
        let recs = ranker().rank(&context(), Vec::new(), &params);
        assert!(recs.is_empty());
    }
}
