//! LLM-backed content analysis
//!
//! The provider is optional and untrusted: responses are validated
//! field-by-field against the shared rule tables before anything is merged
//! into content features. A malformed or missing field degrades to the
//! keyword-derived value, never to an error.

use crate::context::models::{ContentType, Difficulty, Intent};
use crate::error::{EngineError, Result};
use crate::text;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ProviderConfig;

/// Structured analysis provider contract
#[async_trait]
pub trait LlmAnalysisProvider: Send + Sync {
    /// Analyze free text into structured content features
    async fn analyze(&self, text: &str) -> Result<RawAnalysis>;
}

/// Untrusted analysis payload as returned by the provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAnalysis {
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Analysis after validation against the shared rule tables
#[derive(Debug, Clone, Default)]
pub struct ValidatedAnalysis {
    pub technologies: BTreeSet<String>,
    pub content_type: Option<ContentType>,
    pub difficulty: Option<Difficulty>,
    pub intent: Option<Intent>,
    pub summary: Option<String>,
}

/// Validate a raw analysis.
///
/// Technology names are re-normalized through the shared alias table;
/// enum-like strings that do not parse are dropped rather than failing.
pub fn validate(raw: RawAnalysis) -> ValidatedAnalysis {
    let technologies = raw
        .technologies
        .iter()
        .filter_map(|t| text::normalize_technology(t))
        .collect();

    let content_type = raw.content_type.as_deref().and_then(parse_content_type);
    let difficulty = raw.difficulty.as_deref().and_then(parse_difficulty);
    let intent = raw.intent.as_deref().and_then(parse_intent);

    ValidatedAnalysis {
        technologies,
        content_type,
        difficulty,
        intent,
        summary: raw.summary.filter(|s| !s.trim().is_empty()),
    }
}

fn parse_content_type(s: &str) -> Option<ContentType> {
    match s.trim().to_lowercase().as_str() {
        "tutorial" => Some(ContentType::Tutorial),
        "article" => Some(ContentType::Article),
        "video" => Some(ContentType::Video),
        "documentation" => Some(ContentType::Documentation),
        "course" => Some(ContentType::Course),
        "tool" => Some(ContentType::Tool),
        _ => None,
    }
}

fn parse_difficulty(s: &str) -> Option<Difficulty> {
    match s.trim().to_lowercase().as_str() {
        "beginner" => Some(Difficulty::Beginner),
        "intermediate" => Some(Difficulty::Intermediate),
        "advanced" => Some(Difficulty::Advanced),
        _ => None,
    }
}

fn parse_intent(s: &str) -> Option<Intent> {
    match s.trim().to_lowercase().as_str() {
        "learning" => Some(Intent::Learning),
        "implementation" => Some(Intent::Implementation),
        "troubleshooting" => Some(Intent::Troubleshooting),
        "optimization" => Some(Intent::Optimization),
        "research" => Some(Intent::Research),
        _ => None,
    }
}

/// LLM analyzer using an OpenAI-compatible chat completions API
pub struct HttpLlmAnalyzer {
    client: Client,
    config: ProviderConfig,
}

impl HttpLlmAnalyzer {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| EngineError::Analysis(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn build_prompt(&self, text: &str) -> String {
        format!(
            "Analyze the following content item and respond with a single JSON object \
            with keys: technologies (array of strings), content_type (one of tutorial, \
            article, video, documentation, course, tool), difficulty (beginner, \
            intermediate, advanced), intent (learning, implementation, troubleshooting, \
            optimization, research), summary (one sentence).\n\n{}",
            text
        )
    }
}

#[async_trait]
impl LlmAnalysisProvider for HttpLlmAnalyzer {
    async fn analyze(&self, text: &str) -> Result<RawAnalysis> {
        if text.trim().is_empty() {
            return Ok(RawAnalysis::default());
        }

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You are a content analysis service. Respond with JSON only."
                        .to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: self.build_prompt(text),
                },
            ],
            temperature: Some(0.0),
        };

        let mut last_error = None;
        for attempt in 0..self.config.max_retries.max(1) {
            if attempt > 0 {
                debug!("Retry attempt {} for content analysis", attempt);
                tokio::time::sleep(Duration::from_millis(100 * (1 << attempt))).await;
            }

            let mut req = self.client.post(&self.config.endpoint).json(&request);
            if let Some(ref api_key) = self.config.api_key {
                req = req.header("Authorization", format!("Bearer {}", api_key));
            }

            match req.send().await {
                Ok(response) => {
                    if !response.status().is_success() {
                        let status = response.status();
                        last_error = Some(EngineError::Analysis(format!("HTTP {}", status)));
                        continue;
                    }
                    match response.json::<ChatCompletionResponse>().await {
                        Ok(resp) => {
                            let content = resp
                                .choices
                                .first()
                                .map(|c| c.message.content.as_str())
                                .unwrap_or_default();
                            match serde_json::from_str::<RawAnalysis>(content) {
                                Ok(analysis) => return Ok(analysis),
                                Err(e) => {
                                    last_error = Some(EngineError::Analysis(format!(
                                        "Malformed analysis payload: {}",
                                        e
                                    )));
                                }
                            }
                        }
                        Err(e) => {
                            last_error = Some(EngineError::Analysis(format!(
                                "Failed to parse response: {}",
                                e
                            )));
                        }
                    }
                }
                Err(e) => {
                    last_error = Some(EngineError::Analysis(e.to_string()));
                }
            }
        }

        warn!(
            "Content analysis failed after {} attempts",
            self.config.max_retries.max(1)
        );
        Err(last_error.unwrap_or_else(|| EngineError::Analysis("unknown failure".to_string())))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
