//! Request context: structured models and extraction

pub mod extractor;
pub mod models;

pub use extractor::ContextExtractor;
pub use models::{ContentType, Context, ContextType, Difficulty, Intent, SkillLevel};
