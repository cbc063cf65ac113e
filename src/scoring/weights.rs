//! Adaptive weight selection
//!
//! Pure lookup: `(context_type, intent, skill_level)` determines the weight
//! vector and penalty rules a scorer run must apply. Weights always sum to
//! 1.0 after perturbation so totals stay comparable across context types.

use crate::config::ScoringConfig;
use crate::context::models::{ContextType, Intent, SkillLevel};
use crate::text;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Weight vector over the six scoring factors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub technology: f32,
    pub semantic: f32,
    pub content_type: f32,
    pub intent: f32,
    pub difficulty: f32,
    pub quality: f32,
}

impl ScoringWeights {
    /// Equal weight on every factor
    pub fn uniform() -> Self {
        Self {
            technology: 1.0 / 6.0,
            semantic: 1.0 / 6.0,
            content_type: 1.0 / 6.0,
            intent: 1.0 / 6.0,
            difficulty: 1.0 / 6.0,
            quality: 1.0 / 6.0,
        }
    }

    pub fn sum(&self) -> f32 {
        self.technology
            + self.semantic
            + self.content_type
            + self.intent
            + self.difficulty
            + self.quality
    }

    /// Scale so the vector sums to 1.0. A zero vector falls back to uniform.
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum <= f32::EPSILON {
            error!("weight vector sums to zero, falling back to uniform weights");
            *self = Self::uniform();
            return;
        }
        self.technology /= sum;
        self.semantic /= sum;
        self.content_type /= sum;
        self.intent /= sum;
        self.difficulty /= sum;
        self.quality /= sum;
    }

    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() < 1e-4
    }
}

/// A rule deducting points when several factors are low at once.
///
/// One spuriously high factor should not rescue an item the other factors
/// agree is irrelevant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyRule {
    /// Component score below which a factor counts as low
    pub threshold: f32,
    /// How many factors must be low for the rule to fire
    pub min_factors: usize,
    /// Points subtracted from the weighted total
    pub deduction: f32,
}

/// Base weight table keyed by context type. Every row sums to 1.0.
fn base_weights(context_type: ContextType) -> ScoringWeights {
    match context_type {
        ContextType::Learning => ScoringWeights {
            technology: 0.20,
            semantic: 0.20,
            content_type: 0.15,
            intent: 0.15,
            difficulty: 0.20,
            quality: 0.10,
        },
        ContextType::Project => ScoringWeights {
            technology: 0.35,
            semantic: 0.25,
            content_type: 0.05,
            intent: 0.15,
            difficulty: 0.05,
            quality: 0.15,
        },
        ContextType::Task => ScoringWeights {
            technology: 0.30,
            semantic: 0.30,
            content_type: 0.05,
            intent: 0.20,
            difficulty: 0.05,
            quality: 0.10,
        },
        ContextType::Research => ScoringWeights {
            technology: 0.15,
            semantic: 0.35,
            content_type: 0.10,
            intent: 0.10,
            difficulty: 0.10,
            quality: 0.20,
        },
        ContextType::Practice => ScoringWeights {
            technology: 0.25,
            semantic: 0.15,
            content_type: 0.15,
            intent: 0.15,
            difficulty: 0.20,
            quality: 0.10,
        },
    }
}

/// Select the weight vector and penalty rules for one scorer run.
///
/// Skill level and intent perturb individual base weights, then the vector
/// is renormalized so the sum-to-1.0 invariant holds for any combination.
pub fn select(
    context_type: ContextType,
    intent: Intent,
    skill_level: SkillLevel,
    config: &ScoringConfig,
) -> (ScoringWeights, Vec<PenaltyRule>) {
    let mut weights = base_weights(context_type);

    match skill_level {
        SkillLevel::Advanced => {
            weights.technology += 0.05;
            weights.difficulty = (weights.difficulty - 0.05).max(0.0);
        }
        SkillLevel::Beginner => {
            weights.difficulty += 0.05;
            weights.quality += 0.05;
            weights.technology = (weights.technology - 0.05).max(0.0);
        }
        SkillLevel::Intermediate | SkillLevel::Unknown => {}
    }

    match intent {
        Intent::Troubleshooting | Intent::Implementation => {
            weights.technology += 0.05;
        }
        Intent::Research => {
            weights.semantic += 0.05;
        }
        Intent::Learning | Intent::Optimization | Intent::General => {}
    }

    weights.normalize();
    debug_assert!(weights.is_normalized());

    let mut rules = vec![
        PenaltyRule {
            threshold: config.low_score_threshold,
            min_factors: 3,
            deduction: 15.0,
        },
        PenaltyRule {
            threshold: config.mismatch_score,
            min_factors: 2,
            deduction: 10.0,
        },
    ];
    // Troubleshooting tolerates irrelevance worst: a wrong suggestion costs
    // the user time they do not have.
    if intent == Intent::Troubleshooting {
        rules[0].deduction = 20.0;
    }

    (weights, rules)
}

/// Derive the context type from request signals.
///
/// Priority: project id > task id > keyword heuristics > `Learning`.
pub fn detect_context_type(has_project: bool, has_task: bool, request_text: &str) -> ContextType {
    if has_project {
        return ContextType::Project;
    }
    if has_task {
        return ContextType::Task;
    }
    text::classify_context_type(request_text).unwrap_or(ContextType::Learning)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_CONTEXT_TYPES: [ContextType; 5] = [
        ContextType::Learning,
        ContextType::Project,
        ContextType::Task,
        ContextType::Research,
        ContextType::Practice,
    ];
    const ALL_SKILLS: [SkillLevel; 4] = [
        SkillLevel::Beginner,
        SkillLevel::Intermediate,
        SkillLevel::Advanced,
        SkillLevel::Unknown,
    ];
    const ALL_INTENTS: [Intent; 6] = [
        Intent::Learning,
        Intent::Implementation,
        Intent::Troubleshooting,
        Intent::Optimization,
        Intent::Research,
        Intent::General,
    ];

    #[test]
    fn test_every_combination_normalizes() {
        let config = ScoringConfig::default();
        for ct in ALL_CONTEXT_TYPES {
            for skill in ALL_SKILLS {
                for intent in ALL_INTENTS {
                    let (weights, _) = select(ct, intent, skill, &config);
                    assert!(
                        weights.is_normalized(),
                        "weights for {:?}/{:?}/{:?} sum to {}",
                        ct,
                        intent,
                        skill,
                        weights.sum()
                    );
                }
            }
        }
    }

    #[test]
    fn test_advanced_skill_raises_technology_weight() {
        let config = ScoringConfig::default();
        let (base, _) = select(
            ContextType::Project,
            Intent::General,
            SkillLevel::Unknown,
            &config,
        );
        let (advanced, _) = select(
            ContextType::Project,
            Intent::General,
            SkillLevel::Advanced,
            &config,
        );
        assert!(advanced.technology > base.technology);
    }

    #[test]
    fn test_context_type_detection_priority() {
        assert_eq!(detect_context_type(true, true, ""), ContextType::Project);
        assert_eq!(detect_context_type(false, true, ""), ContextType::Task);
        assert_eq!(
            detect_context_type(false, false, "compare message queues"),
            ContextType::Research
        );
        assert_eq!(detect_context_type(false, false, ""), ContextType::Learning);
    }

    #[test]
    fn test_troubleshooting_penalty_is_stricter() {
        let config = ScoringConfig::default();
        let (_, general) = select(
            ContextType::Task,
            Intent::General,
            SkillLevel::Unknown,
            &config,
        );
        let (_, troubleshooting) = select(
            ContextType::Task,
            Intent::Troubleshooting,
            SkillLevel::Unknown,
            &config,
        );
        assert!(troubleshooting[0].deduction > general[0].deduction);
    }
}
