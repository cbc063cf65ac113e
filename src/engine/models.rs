//! Request and response models for the recommendation engine

use crate::context::models::SkillLevel;
use crate::scoring::ScoreBreakdown;
use crate::text;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Technology input accepted either as free text or as a list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TechInput {
    Text(String),
    List(Vec<String>),
}

impl Default for TechInput {
    fn default() -> Self {
        TechInput::Text(String::new())
    }
}

impl TechInput {
    /// Normalize through the shared alias table
    pub fn normalized(&self) -> BTreeSet<String> {
        match self {
            TechInput::Text(raw) => text::normalize_tech_list(raw),
            TechInput::List(items) => items
                .iter()
                .flat_map(|item| text::normalize_tech_list(item))
                .collect(),
        }
    }
}

/// Which scoring path the caller prefers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnginePreference {
    /// Pick based on available signal
    Auto,
    /// Keyword-weighted single scorer, no embeddings consulted
    Fast,
    /// Adaptive-weights single scorer
    Context,
    /// Full multi-strategy ensemble
    Ensemble,
}

impl Default for EnginePreference {
    fn default() -> Self {
        EnginePreference::Auto
    }
}

/// A recommendation request. Every field is optional input; missing fields
/// default to neutral values instead of failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: TechInput,
    #[serde(default)]
    pub user_interests: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub skill_level: Option<SkillLevel>,
    #[serde(default)]
    pub max_recommendations: Option<usize>,
    #[serde(default)]
    pub engine_preference: EnginePreference,
    /// 0.0 disables the diversity pass, 1.0 applies the full overlap penalty
    #[serde(default)]
    pub diversity_weight: f32,
    #[serde(default)]
    pub quality_threshold: Option<u8>,
    /// Marker the caller bumps whenever the candidate set changes
    #[serde(default)]
    pub candidate_set_version: Option<String>,
}

impl RecommendationRequest {
    /// Title, description, and interests concatenated for classification
    pub fn combined_text(&self) -> String {
        let mut parts = Vec::new();
        for part in [&self.title, &self.description, &self.user_interests] {
            if !part.trim().is_empty() {
                parts.push(part.trim());
            }
        }
        parts.join(" ")
    }
}

/// One ranked recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub url: Option<String>,
    pub score: f32,
    pub breakdown: ScoreBreakdown,
    pub reason: String,
    pub rank: usize,
    pub enhanced: bool,
}

/// Engine response: always a valid (possibly empty) ranked list.
///
/// Partial degradation shows up in `degraded`, never as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub request_id: Uuid,
    pub recommendations: Vec<Recommendation>,
    pub engine_used: String,
    pub from_cache: bool,
    pub degraded: Vec<String>,
    pub candidate_count: usize,
    pub elapsed_ms: u64,
    pub generated_at: DateTime<Utc>,
}
