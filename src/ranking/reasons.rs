//! Human-readable recommendation reasons

use crate::context::models::{Context, Intent};
use crate::ensemble::aggregator::ScoredCandidate;
use crate::scoring::Factor;

/// Build a short explanation from the strongest signals in the breakdown.
pub fn build_reason(context: &Context, candidate: &ScoredCandidate) -> String {
    let features = &candidate.features;
    let breakdown = &candidate.breakdown;
    let mut phrases: Vec<String> = Vec::new();

    let shared: Vec<&str> = context
        .technologies
        .intersection(&features.technologies)
        .map(|s| s.as_str())
        .collect();
    if !shared.is_empty() {
        phrases.push(format!("matches your stack ({})", shared.join(", ")));
    }

    if breakdown.semantic >= 70.0 && !breakdown.used_fallback(Factor::Semantic) {
        phrases.push("closely related to what you're working on".to_string());
    }

    if context.intent != Intent::General && context.intent == features.intent {
        phrases.push(format!("fits your {} focus", intent_label(context.intent)));
    }

    if let (Some(needed), Some(actual)) = (context.content_type_needed, features.content_type) {
        if needed == actual {
            phrases.push(format!("{:?} format you were looking for", actual).to_lowercase());
        }
    }

    if features.quality_score >= 8 {
        phrases.push(format!("highly rated ({}/10)", features.quality_score));
    }

    if phrases.is_empty() {
        return "Broadly related to your current context".to_string();
    }

    let mut reason = phrases.join("; ");
    if let Some(first) = reason.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    reason
}

fn intent_label(intent: Intent) -> &'static str {
    match intent {
        Intent::Learning => "learning",
        Intent::Implementation => "implementation",
        Intent::Troubleshooting => "troubleshooting",
        Intent::Optimization => "optimization",
        Intent::Research => "research",
        Intent::General => "general",
    }
}
