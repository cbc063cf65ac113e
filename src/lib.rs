//! Content recommendation engine
//!
//! Recommends previously-saved content items against a user's current
//! project or task context. The pipeline: context extraction and content
//! feature analysis feed a multi-factor scorer whose weights adapt to the
//! detected context type; an ensemble fuses several independently-configured
//! scoring strategies; results are ranked, filtered for quality and
//! diversity, and cached per context fingerprint with singleflight
//! semantics.
//!
//! External collaborators (embedding provider, LLM analysis, cache store)
//! are injected behind traits and every one of them fails soft: the caller
//! always receives a valid, possibly empty, ranked list.

pub mod analysis;
pub mod cache;
pub mod config;
pub mod context;
pub mod embedding;
pub mod engine;
pub mod ensemble;
pub mod error;
pub mod metrics;
pub mod ranking;
pub mod resilience;
pub mod scoring;
pub mod text;

pub use analysis::{CandidateContent, ContentAnalyzer, ContentFeatures};
pub use cache::{CacheStore, MemoryCacheStore, RecommendationCache};
pub use config::EngineConfig;
pub use context::{Context, ContextExtractor};
pub use embedding::EmbeddingProvider;
pub use engine::{
    EnginePreference, Recommendation, RecommendationEngine, RecommendationRequest,
    RecommendationResponse,
};
pub use ensemble::{EnsembleAggregator, ScoringStrategy};
pub use error::{EngineError, Result};
pub use scoring::{ScoreBreakdown, ScoringWeights};
