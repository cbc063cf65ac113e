//! Typed score breakdown
//!
//! Every factor is a named field so adding or removing one is a
//! compile-time-checked change, and `total` is a pure function of the
//! components, weights, and penalties recorded alongside it.

use crate::scoring::weights::{PenaltyRule, ScoringWeights};
use serde::{Deserialize, Serialize};

/// Identifies a single scoring factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Technology,
    Semantic,
    ContentType,
    Intent,
    Difficulty,
    Quality,
}

impl Factor {
    pub const ALL: [Factor; 6] = [
        Factor::Technology,
        Factor::Semantic,
        Factor::ContentType,
        Factor::Intent,
        Factor::Difficulty,
        Factor::Quality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::Technology => "technology",
            Factor::Semantic => "semantic",
            Factor::ContentType => "content_type",
            Factor::Intent => "intent",
            Factor::Difficulty => "difficulty",
            Factor::Quality => "quality",
        }
    }
}

/// A penalty that actually fired during scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedPenalty {
    /// Factors that were below the rule's threshold
    pub low_factors: Vec<Factor>,
    pub deduction: f32,
}

/// Per-factor component scores for one (context, content) pair
///
/// Component scores are on a 0-100 scale before weighting; `total` is the
/// weighted sum minus penalties, clamped to [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub technology: f32,
    pub semantic: f32,
    pub content_type: f32,
    pub intent: f32,
    pub difficulty: f32,
    pub quality: f32,
    pub weights: ScoringWeights,
    pub penalties: Vec<AppliedPenalty>,
    /// Factors that scored on a neutral fallback value instead of real signal
    pub fallbacks: Vec<Factor>,
    pub total: f32,
}

impl ScoreBreakdown {
    /// Component score for a factor
    pub fn factor(&self, factor: Factor) -> f32 {
        match factor {
            Factor::Technology => self.technology,
            Factor::Semantic => self.semantic,
            Factor::ContentType => self.content_type,
            Factor::Intent => self.intent,
            Factor::Difficulty => self.difficulty,
            Factor::Quality => self.quality,
        }
    }

    /// Weight applied to a factor
    pub fn weight(&self, factor: Factor) -> f32 {
        match factor {
            Factor::Technology => self.weights.technology,
            Factor::Semantic => self.weights.semantic,
            Factor::ContentType => self.weights.content_type,
            Factor::Intent => self.weights.intent,
            Factor::Difficulty => self.weights.difficulty,
            Factor::Quality => self.weights.quality,
        }
    }

    /// Weighted contribution of a factor to the pre-penalty total
    pub fn contribution(&self, factor: Factor) -> f32 {
        self.factor(factor) * self.weight(factor)
    }

    pub fn used_fallback(&self, factor: Factor) -> bool {
        self.fallbacks.contains(&factor)
    }

    /// Recompute the total from components, weights, and penalty rules.
    ///
    /// Pure: same inputs always produce the same total. Records which
    /// penalties fired on `self`.
    pub fn finalize(&mut self, rules: &[PenaltyRule]) {
        let weighted: f32 = Factor::ALL.iter().map(|f| self.contribution(*f)).sum();

        self.penalties.clear();
        let mut deductions = 0.0;
        for rule in rules {
            let low: Vec<Factor> = Factor::ALL
                .iter()
                .copied()
                .filter(|f| self.factor(*f) < rule.threshold)
                .collect();
            if low.len() >= rule.min_factors {
                deductions += rule.deduction;
                self.penalties.push(AppliedPenalty {
                    low_factors: low,
                    deduction: rule.deduction,
                });
            }
        }

        self.total = (weighted - deductions).clamp(0.0, 100.0);
    }
}
