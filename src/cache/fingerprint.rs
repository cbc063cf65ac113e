//! Stable context fingerprints
//!
//! The fingerprint identifies one cacheable unit of work: the normalized
//! context, the caller's candidate-set version marker, and the engine
//! configuration in effect. Field order is fixed and collections are
//! sorted, so the same logical request always hashes identically.

use crate::context::models::Context;
use sha2::{Digest, Sha256};

/// Compute the hex-encoded SHA-256 fingerprint for a request.
pub fn fingerprint(context: &Context, candidate_set_version: &str, engine_marker: &str) -> String {
    let mut hasher = Sha256::new();

    // BTreeSet iterates sorted, giving a canonical order.
    for tech in &context.technologies {
        hasher.update(tech.as_bytes());
        hasher.update(b"\x1f");
    }
    hasher.update(b"\x1e");
    hasher.update(format!("{:?}", context.content_type_needed).as_bytes());
    hasher.update(b"\x1e");
    hasher.update(format!("{:?}", context.difficulty).as_bytes());
    hasher.update(b"\x1e");
    hasher.update(format!("{:?}", context.intent).as_bytes());
    hasher.update(b"\x1e");
    hasher.update(format!("{:?}", context.skill_level).as_bytes());
    hasher.update(b"\x1e");
    hasher.update(format!("{:?}", context.context_type).as_bytes());
    hasher.update(b"\x1e");
    for concept in &context.key_concepts {
        hasher.update(concept.as_bytes());
        hasher.update(b"\x1f");
    }
    hasher.update(b"\x1e");
    hasher.update(candidate_set_version.as_bytes());
    hasher.update(b"\x1e");
    hasher.update(engine_marker.as_bytes());

    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::models::{ContextType, Difficulty, Intent, SkillLevel};

    fn context(techs: &[&str]) -> Context {
        Context {
            technologies: techs.iter().map(|t| t.to_string()).collect(),
            content_type_needed: None,
            difficulty: Difficulty::Unknown,
            intent: Intent::General,
            key_concepts: vec!["cache".to_string()],
            skill_level: SkillLevel::Unknown,
            context_type: ContextType::Learning,
            combined_text: String::new(),
            embedding: None,
        }
    }

    #[test]
    fn test_fingerprint_is_stable_across_insertion_order() {
        // BTreeSet sorts, so insertion order cannot leak into the hash.
        let a = context(&["rust", "tokio", "serde"]);
        let b = context(&["serde", "rust", "tokio"]);
        assert_eq!(fingerprint(&a, "v1", "m"), fingerprint(&b, "v1", "m"));
    }

    #[test]
    fn test_fingerprint_changes_with_candidate_set_version() {
        let ctx = context(&["rust"]);
        assert_ne!(fingerprint(&ctx, "v1", "m"), fingerprint(&ctx, "v2", "m"));
    }

    #[test]
    fn test_fingerprint_changes_with_engine_marker() {
        let ctx = context(&["rust"]);
        assert_ne!(fingerprint(&ctx, "v1", "ensemble"), fingerprint(&ctx, "v1", "fast"));
    }

    #[test]
    fn test_fingerprint_ignores_embedding() {
        let mut with_embedding = context(&["rust"]);
        with_embedding.embedding = Some(vec![0.1, 0.2]);
        let without = context(&["rust"]);
        assert_eq!(
            fingerprint(&with_embedding, "v1", "m"),
            fingerprint(&without, "v1", "m")
        );
    }
}
