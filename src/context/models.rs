//! Data models for request context

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What the user is trying to accomplish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Learning,
    Implementation,
    Troubleshooting,
    Optimization,
    Research,
    General,
}

impl Default for Intent {
    fn default() -> Self {
        Intent::General
    }
}

/// Difficulty level of content or context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Unknown,
}

impl Difficulty {
    /// Ordinal position for adjacency comparisons, `None` for unknown
    pub fn rank(&self) -> Option<u8> {
        match self {
            Difficulty::Beginner => Some(0),
            Difficulty::Intermediate => Some(1),
            Difficulty::Advanced => Some(2),
            Difficulty::Unknown => None,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Unknown
    }
}

/// User skill level, used to perturb scoring weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Unknown,
}

impl Default for SkillLevel {
    fn default() -> Self {
        SkillLevel::Unknown
    }
}

/// Kind of working context the request was made from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextType {
    Learning,
    Project,
    Task,
    Research,
    Practice,
}

impl Default for ContextType {
    fn default() -> Self {
        ContextType::Learning
    }
}

/// Category of a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Tutorial,
    Article,
    Video,
    Documentation,
    Course,
    Tool,
}

/// Structured representation of the user's current request
///
/// Built once per recommendation request by the extractor and immutable
/// afterwards. Never persisted beyond the cache fingerprint derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub technologies: BTreeSet<String>,
    pub content_type_needed: Option<ContentType>,
    pub difficulty: Difficulty,
    pub intent: Intent,
    /// Top non-stopword tokens, frequency-ordered, deduplicated
    pub key_concepts: Vec<String>,
    pub skill_level: SkillLevel,
    pub context_type: ContextType,
    /// Concatenated request text, used for embedding the context
    pub combined_text: String,
    /// Context embedding, populated by the engine when a provider is available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Context {
    /// Check whether the context carries any technology signal
    pub fn has_technologies(&self) -> bool {
        !self.technologies.is_empty()
    }
}
