//! Ranking, filtering, and recommendation reasons

pub mod ranker;
pub mod reasons;

pub use ranker::{RankParams, Ranker};
pub use reasons::build_reason;
