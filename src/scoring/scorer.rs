//! Multi-factor relevance scorer
//!
//! Computes independent component scores between a context and a candidate's
//! features, then combines them under the supplied weights and penalty rules.
//! Scoring is pure and never fails: a factor without real signal scores its
//! documented neutral value and is recorded as a fallback.

use crate::analysis::models::ContentFeatures;
use crate::config::ScoringConfig;
use crate::context::models::{Context, Difficulty};
use crate::embedding::cosine_similarity;
use crate::scoring::breakdown::{Factor, ScoreBreakdown};
use crate::scoring::weights::{PenaltyRule, ScoringWeights};

/// Score one candidate against the context.
pub fn score_content(
    context: &Context,
    content: &ContentFeatures,
    weights: &ScoringWeights,
    rules: &[PenaltyRule],
    config: &ScoringConfig,
) -> ScoreBreakdown {
    debug_assert!(weights.is_normalized(), "weights must sum to 1.0");

    let mut fallbacks = Vec::new();

    let technology = technology_match(context, content, config);
    let semantic = match semantic_similarity(context, content) {
        Some(score) => score,
        None => {
            fallbacks.push(Factor::Semantic);
            config.neutral_score
        }
    };
    let content_type = content_type_alignment(context, content, config);
    let intent = intent_alignment(context, content, config);
    let difficulty = difficulty_alignment(context, content, config);
    let quality = quality_score(content);

    let mut breakdown = ScoreBreakdown {
        technology,
        semantic,
        content_type,
        intent,
        difficulty,
        quality,
        weights: weights.clone(),
        penalties: Vec::new(),
        fallbacks,
        total: 0.0,
    };
    breakdown.finalize(rules);
    breakdown
}

/// Technology overlap between the context set and the content set.
///
/// Exact matches count full credit, substring matches partial credit; the
/// ratio is taken against the context's technology count. No context
/// technologies is no signal (neutral); no content technologies is a weak
/// negative signal (low, not zero).
fn technology_match(context: &Context, content: &ContentFeatures, config: &ScoringConfig) -> f32 {
    if !context.has_technologies() {
        return config.neutral_score;
    }
    if content.technologies.is_empty() {
        return config.missing_tech_score;
    }

    let mut matched = 0.0f32;
    for tech in &context.technologies {
        if content.technologies.contains(tech) {
            matched += 1.0;
        } else if content
            .technologies
            .iter()
            .any(|c| related_tech(tech, c))
        {
            matched += config.partial_match_credit;
        }
    }

    let ratio = matched / context.technologies.len() as f32;
    (ratio * 100.0).clamp(0.0, 100.0)
}

/// Substring relation between two normalized technology names.
///
/// Requires at least 3 characters on both sides so single letters and short
/// abbreviations do not spuriously relate ("go" vs "mongodb").
fn related_tech(a: &str, b: &str) -> bool {
    a.len() >= 3 && b.len() >= 3 && (a.contains(b) || b.contains(a))
}

/// Cosine similarity rescaled from [-1, 1] to [0, 100].
///
/// `None` when either embedding is unavailable; the caller substitutes the
/// neutral value and flags the fallback.
fn semantic_similarity(context: &Context, content: &ContentFeatures) -> Option<f32> {
    let ctx_embedding = context.embedding.as_ref()?;
    let content_embedding = content.embedding.as_ref()?;
    let cosine = cosine_similarity(ctx_embedding, content_embedding);
    Some(((cosine + 1.0) / 2.0 * 100.0).clamp(0.0, 100.0))
}

fn content_type_alignment(
    context: &Context,
    content: &ContentFeatures,
    config: &ScoringConfig,
) -> f32 {
    match (context.content_type_needed, content.content_type) {
        (Some(needed), Some(actual)) if needed == actual => 100.0,
        (Some(_), Some(_)) => config.mismatch_score,
        _ => config.neutral_score,
    }
}

fn intent_alignment(context: &Context, content: &ContentFeatures, config: &ScoringConfig) -> f32 {
    use crate::context::models::Intent;
    match (context.intent, content.intent) {
        (Intent::General, _) | (_, Intent::General) => config.neutral_score,
        (a, b) if a == b => 100.0,
        _ => config.mismatch_score,
    }
}

/// Exact level 100, adjacent level partial, two levels apart low, unknown on
/// either side neutral.
fn difficulty_alignment(
    context: &Context,
    content: &ContentFeatures,
    config: &ScoringConfig,
) -> f32 {
    let wanted = context.difficulty;
    let actual = content.difficulty;
    match (wanted.rank(), actual.rank()) {
        (Some(a), Some(b)) => match a.abs_diff(b) {
            0 => 100.0,
            1 => config.adjacent_difficulty_score,
            _ => config.mismatch_score,
        },
        _ => {
            debug_assert!(wanted == Difficulty::Unknown || actual == Difficulty::Unknown);
            config.neutral_score
        }
    }
}

/// Monotonic in the stored quality score: 0-10 maps onto 0-100.
fn quality_score(content: &ContentFeatures) -> f32 {
    (content.quality_score.min(10) as f32) * 10.0
}
