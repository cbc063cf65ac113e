//! Content feature analyzer
//!
//! Runs candidates through the same normalization and classification rules
//! as the context extractor. The shared `text` module is what makes
//! technology-set comparisons between the two sides meaningful.

use crate::analysis::llm::ValidatedAnalysis;
use crate::analysis::models::{CandidateContent, ContentFeatures};
use crate::config::ScoringConfig;
use crate::text;
use tracing::debug;

/// Derives `ContentFeatures` from raw candidate items
#[derive(Debug, Clone)]
pub struct ContentAnalyzer {
    config: ScoringConfig,
}

impl ContentAnalyzer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Analyze a candidate using keyword rules only. Pure, never fails.
    pub fn analyze(&self, candidate: &CandidateContent) -> ContentFeatures {
        let combined = format!("{} {}", candidate.title, candidate.text);

        let mut technologies: std::collections::BTreeSet<String> = candidate
            .technologies
            .iter()
            .filter_map(|t| text::normalize_technology(t))
            .collect();
        technologies.extend(text::detect_technologies(&combined));

        let content_type = candidate
            .content_type
            .or_else(|| text::classify_content_type(&combined));
        let difficulty = candidate
            .difficulty
            .unwrap_or_else(|| text::classify_difficulty(&combined));

        debug!(
            id = %candidate.id,
            technologies = technologies.len(),
            "analyzed candidate"
        );

        ContentFeatures {
            id: candidate.id.clone(),
            title: candidate.title.clone(),
            url: candidate.url.clone(),
            technologies,
            content_type,
            difficulty,
            intent: text::classify_intent(&combined),
            key_concepts: text::key_concepts(&combined, self.config.key_concepts_limit),
            quality_score: candidate.quality_score.min(10),
            embedding: candidate.embedding.clone(),
            enhanced: false,
        }
    }

    /// Merge a validated LLM analysis on top of keyword-derived features.
    ///
    /// Only fields the analysis actually provided are overridden; the
    /// technology union keeps everything the keyword pass found.
    pub fn enhance(&self, features: &mut ContentFeatures, analysis: ValidatedAnalysis) {
        features.technologies.extend(analysis.technologies);
        if let Some(content_type) = analysis.content_type {
            features.content_type = Some(content_type);
        }
        if let Some(difficulty) = analysis.difficulty {
            features.difficulty = difficulty;
        }
        if let Some(intent) = analysis.intent {
            features.intent = intent;
        }
        features.enhanced = true;
    }
}
