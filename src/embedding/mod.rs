//! Embedding provider contract and vector math

pub mod client;

pub use client::{HttpEmbeddingProvider, NoopEmbeddingProvider};

use crate::error::Result;
use async_trait::async_trait;

/// Opaque embedding collaborator: text in, vector out.
///
/// Implementations may block on network I/O and may fail; callers go through
/// the resilience wrapper and treat failures as "no embedding available".
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn encode(&self, text: &str) -> Result<Vec<f32>>;
}

/// Cosine similarity in [-1, 1].
///
/// Mismatched lengths and zero-norm vectors yield 0.0 (no signal) instead of
/// an error so a bad collaborator vector can never abort scoring.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
