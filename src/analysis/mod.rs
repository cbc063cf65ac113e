//! Candidate content analysis: keyword-derived features plus optional
//! LLM enhancement

pub mod analyzer;
pub mod llm;
pub mod models;

pub use analyzer::ContentAnalyzer;
pub use llm::{validate, HttpLlmAnalyzer, LlmAnalysisProvider, RawAnalysis, ValidatedAnalysis};
pub use models::{CandidateContent, ContentFeatures};
