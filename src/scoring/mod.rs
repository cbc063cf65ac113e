//! Multi-factor scoring: component scorers, typed breakdowns, adaptive weights

pub mod breakdown;
pub mod scorer;
pub mod weights;

pub use breakdown::{AppliedPenalty, Factor, ScoreBreakdown};
pub use scorer::score_content;
pub use weights::{detect_context_type, select, PenaltyRule, ScoringWeights};
