//! Engine configuration
//!
//! All tuned thresholds live here as explicit values constructed once at
//! process start and threaded through the engine. Nothing reads the
//! environment after `EngineConfig::load` returns.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub ensemble: EnsembleConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub embedding: ProviderConfig,
    #[serde(default = "ProviderConfig::default_analysis")]
    pub analysis: ProviderConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            ensemble: EnsembleConfig::default(),
            cache: CacheConfig::default(),
            ranking: RankingConfig::default(),
            embedding: ProviderConfig::default(),
            analysis: ProviderConfig::default_analysis(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from an optional file plus `RECOMMEND__`-prefixed
    /// environment variables, falling back to defaults for anything unset.
    pub fn load(path: Option<&str>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("RECOMMEND").separator("__"))
            .build()
            .map_err(|e| EngineError::Configuration(e.to_string()))?;

        let cfg: EngineConfig = settings
            .try_deserialize()
            .map_err(|e| EngineError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate cross-field consistency
    pub fn validate(&self) -> Result<()> {
        if self.scoring.neutral_score < 0.0 || self.scoring.neutral_score > 100.0 {
            return Err(EngineError::Configuration(format!(
                "neutral_score out of range: {}",
                self.scoring.neutral_score
            )));
        }
        if !(0.0..=1.0).contains(&self.ranking.diversity_overlap_threshold) {
            return Err(EngineError::Configuration(format!(
                "diversity_overlap_threshold out of range: {}",
                self.ranking.diversity_overlap_threshold
            )));
        }
        if self.ensemble.strategy_timeout_ms == 0 {
            return Err(EngineError::Configuration(
                "strategy_timeout_ms must be nonzero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scoring thresholds and fallback values
///
/// The neutral/low values are the documented substitutes used when a factor
/// has no signal: a context without technologies gets the neutral mid-value,
/// content without technologies gets a low-but-nonzero value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Substitute when a factor has no signal on either side (0-100 scale)
    pub neutral_score: f32,
    /// Technology score when the content lists no technologies
    pub missing_tech_score: f32,
    /// Alignment score for a hard mismatch
    pub mismatch_score: f32,
    /// Alignment score for adjacent difficulty levels
    pub adjacent_difficulty_score: f32,
    /// Credit for a substring (non-exact) technology match, relative to 1.0
    pub partial_match_credit: f32,
    /// Component score under which a factor counts toward multi-factor penalties
    pub low_score_threshold: f32,
    /// Maximum key concepts extracted from free text
    pub key_concepts_limit: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            neutral_score: 50.0,
            missing_tech_score: 15.0,
            mismatch_score: 20.0,
            adjacent_difficulty_score: 60.0,
            partial_match_credit: 0.5,
            low_score_threshold: 30.0,
            key_concepts_limit: 10,
        }
    }
}

/// Ensemble aggregation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleConfig {
    /// Per-strategy timeout in milliseconds
    pub strategy_timeout_ms: u64,
    /// Weight of the rank-agreement bonus relative to the fused score
    pub rank_bonus_weight: f32,
}

impl EnsembleConfig {
    pub fn strategy_timeout(&self) -> Duration {
        Duration::from_millis(self.strategy_timeout_ms)
    }
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            strategy_timeout_ms: 2_000,
            rank_bonus_weight: 0.15,
        }
    }
}

/// Recommendation cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry time-to-live in seconds
    pub ttl_secs: u64,
    /// Maximum entries held by the in-memory store
    pub max_entries: u64,
    /// Key namespace prefix, also used for pattern invalidation
    pub key_prefix: String,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            max_entries: 10_000,
            key_prefix: "rec".to_string(),
        }
    }
}

/// Ranking and filtering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Default result count when the request does not specify one
    pub max_recommendations: usize,
    /// Minimum total score to keep a recommendation
    pub min_score: f32,
    /// Minimum quality score (0-10) to keep a recommendation
    pub quality_threshold: u8,
    /// Technology-set overlap above which a candidate counts as a near-duplicate
    pub diversity_overlap_threshold: f32,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_recommendations: 10,
            min_score: 0.0,
            quality_threshold: 0,
            diversity_overlap_threshold: 0.3,
        }
    }
}

/// Configuration for an HTTP collaborator (embedding or analysis provider)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_ms: u64,
    pub max_retries: usize,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn default_analysis() -> Self {
        Self {
            endpoint: "http://localhost:8080/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_ms: 10_000,
            max_retries: 2,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/v1/embeddings".to_string(),
            api_key: None,
            model: "text-embedding-3-small".to_string(),
            timeout_ms: 5_000,
            max_retries: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_invalid_diversity_threshold_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.ranking.diversity_overlap_threshold = 1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_strategy_timeout_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.ensemble.strategy_timeout_ms = 0;
        assert!(cfg.validate().is_err());
    }
}
