//! Data models for candidate content analysis

use crate::context::models::{ContentType, Difficulty, Intent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A raw content item as delivered by the persistence collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateContent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub content_type: Option<ContentType>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// Externally-supplied quality score, 0-10
    #[serde(default)]
    pub quality_score: u8,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

/// Structured features derived from one content item.
///
/// Same descriptive shape as a `Context` so the scorer can compare the two;
/// `quality_score` and `embedding` are carried through from the candidate
/// unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentFeatures {
    pub id: String,
    pub title: String,
    pub url: Option<String>,
    pub technologies: BTreeSet<String>,
    pub content_type: Option<ContentType>,
    pub difficulty: Difficulty,
    pub intent: Intent,
    pub key_concepts: Vec<String>,
    pub quality_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Whether LLM analysis was merged on top of the keyword-derived features
    pub enhanced: bool,
}
