//! HTTP embedding client for OpenAI-compatible embedding endpoints

use crate::config::ProviderConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Embedding provider backed by an OpenAI-compatible `/embeddings` endpoint
pub struct HttpEmbeddingProvider {
    client: Client,
    config: ProviderConfig,
}

impl HttpEmbeddingProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| EngineError::Embedding(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(EngineError::Embedding("empty input text".to_string()));
        }

        let request = EmbeddingRequest {
            model: self.config.model.clone(),
            input: text.to_string(),
        };

        let mut last_error = None;
        for attempt in 0..self.config.max_retries.max(1) {
            if attempt > 0 {
                debug!("Retry attempt {} for embedding", attempt);
                tokio::time::sleep(Duration::from_millis(100 * (1 << attempt))).await;
            }

            let mut req = self.client.post(&self.config.endpoint).json(&request);
            if let Some(ref api_key) = self.config.api_key {
                req = req.header("Authorization", format!("Bearer {}", api_key));
            }

            match req.send().await {
                Ok(response) => {
                    if !response.status().is_success() {
                        last_error =
                            Some(EngineError::Embedding(format!("HTTP {}", response.status())));
                        continue;
                    }
                    match response.json::<EmbeddingResponse>().await {
                        Ok(resp) => {
                            if let Some(item) = resp.data.into_iter().next() {
                                return Ok(item.embedding);
                            }
                            last_error =
                                Some(EngineError::Embedding("empty data in response".to_string()));
                        }
                        Err(e) => {
                            last_error = Some(EngineError::Embedding(format!(
                                "Failed to parse response: {}",
                                e
                            )));
                        }
                    }
                }
                Err(e) => {
                    last_error = Some(EngineError::Embedding(e.to_string()));
                }
            }
        }

        warn!(
            "Embedding failed after {} attempts",
            self.config.max_retries.max(1)
        );
        Err(last_error.unwrap_or_else(|| EngineError::Embedding("unknown failure".to_string())))
    }
}

/// Provider used when no embedding collaborator is configured.
///
/// Always fails, which downstream treats as "semantic similarity
/// unavailable" and substitutes the neutral fallback.
pub struct NoopEmbeddingProvider;

#[async_trait]
impl EmbeddingProvider for NoopEmbeddingProvider {
    async fn encode(&self, _text: &str) -> Result<Vec<f32>> {
        Err(EngineError::Embedding("no provider configured".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}
