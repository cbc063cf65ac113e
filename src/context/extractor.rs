//! Context extraction from raw request input

use crate::config::ScoringConfig;
use crate::context::models::Context;
use crate::engine::models::RecommendationRequest;
use crate::scoring::weights::detect_context_type;
use crate::text;
use tracing::debug;

/// Turns raw user/project input into a structured `Context`.
///
/// Pure and infallible: missing or malformed fields become neutral values.
#[derive(Debug, Clone)]
pub struct ContextExtractor {
    config: ScoringConfig,
}

impl ContextExtractor {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn extract(&self, request: &RecommendationRequest) -> Context {
        let combined_text = request.combined_text();

        let mut technologies = request.technologies.normalized();
        technologies.extend(text::detect_technologies(&combined_text));

        let context_type = detect_context_type(
            request.project_id.is_some(),
            request.task_id.is_some(),
            &combined_text,
        );

        let context = Context {
            technologies,
            content_type_needed: text::classify_content_type(&combined_text),
            difficulty: text::classify_difficulty(&combined_text),
            intent: text::classify_intent(&combined_text),
            key_concepts: text::key_concepts(&combined_text, self.config.key_concepts_limit),
            skill_level: request.skill_level.unwrap_or_default(),
            context_type,
            combined_text,
            embedding: None,
        };

        debug!(
            technologies = context.technologies.len(),
            intent = ?context.intent,
            context_type = ?context.context_type,
            "extracted context"
        );

        context
    }
}
