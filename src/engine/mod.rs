//! Recommendation engine facade
//!
//! Wires the extractor, analyzer, scorer strategies, ensemble, ranker, and
//! cache into one entry point. The caller always gets a valid (possibly
//! empty) ranked list; degradation is reported in the response metadata.

pub mod models;

pub use models::{
    EnginePreference, Recommendation, RecommendationRequest, RecommendationResponse, TechInput,
};

use crate::analysis::models::{CandidateContent, ContentFeatures};
use crate::analysis::{validate, ContentAnalyzer, LlmAnalysisProvider};
use crate::cache::{fingerprint, CacheOutcome, CacheStore, MemoryCacheStore, RecommendationCache};
use crate::config::EngineConfig;
use crate::context::models::Context;
use crate::context::ContextExtractor;
use crate::embedding::{EmbeddingProvider, NoopEmbeddingProvider};
use crate::ensemble::aggregator::ScoredCandidate;
use crate::ensemble::strategy::{AdaptiveStrategy, KeywordStrategy, ScoringStrategy};
use crate::ensemble::{default_strategies, EnsembleAggregator};
use crate::metrics::METRICS;
use crate::ranking::{RankParams, Ranker};
use crate::resilience::ResilientCaller;
use chrono::Utc;
use futures::future::join_all;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Resolved scoring path for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineKind {
    Fast,
    Context,
    Ensemble,
}

impl EngineKind {
    fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Fast => "fast",
            EngineKind::Context => "context",
            EngineKind::Ensemble => "ensemble",
        }
    }
}

/// The recommendation engine
pub struct RecommendationEngine {
    config: EngineConfig,
    extractor: ContextExtractor,
    analyzer: ContentAnalyzer,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    llm_provider: Option<Arc<dyn LlmAnalysisProvider>>,
    caller: ResilientCaller,
    aggregator: EnsembleAggregator,
    fast_strategy: KeywordStrategy,
    context_strategy: AdaptiveStrategy,
    ranker: Ranker,
    cache: RecommendationCache,
}

impl RecommendationEngine {
    /// Create an engine with explicit collaborators
    pub fn new(
        config: EngineConfig,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        llm_provider: Option<Arc<dyn LlmAnalysisProvider>>,
        cache_store: Arc<dyn CacheStore>,
    ) -> Self {
        let scoring = config.scoring.clone();
        Self {
            extractor: ContextExtractor::new(scoring.clone()),
            analyzer: ContentAnalyzer::new(scoring.clone()),
            aggregator: EnsembleAggregator::new(
                default_strategies(&scoring),
                config.ensemble.clone(),
            ),
            fast_strategy: KeywordStrategy::new(scoring.clone()),
            context_strategy: AdaptiveStrategy::new(scoring),
            ranker: Ranker::new(config.ranking.clone()),
            cache: RecommendationCache::new(cache_store, config.cache.clone()),
            caller: ResilientCaller::default(),
            embedding_provider,
            llm_provider,
            config,
        }
    }

    /// In-process defaults: memory cache store, no embedding or LLM
    /// collaborators (both degrade to keyword-only behavior).
    pub fn with_defaults(config: EngineConfig) -> Self {
        let store = Arc::new(MemoryCacheStore::new(config.cache.max_entries));
        Self::new(config, Arc::new(NoopEmbeddingProvider), None, store)
    }

    /// Produce ranked recommendations for a request over a candidate set.
    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
        candidates: &[CandidateContent],
    ) -> RecommendationResponse {
        let started = Instant::now();
        let request_id = Uuid::new_v4();
        let mut degraded: Vec<String> = Vec::new();

        let mut context = self.extractor.extract(request);

        let want_embedding = request.engine_preference != EnginePreference::Fast;
        if want_embedding && !context.combined_text.is_empty() {
            match self
                .caller
                .call(
                    "embed_context",
                    self.config.embedding.timeout(),
                    self.embedding_provider.encode(&context.combined_text),
                )
                .await
            {
                Ok(vector) => context.embedding = Some(vector),
                Err(e) => {
                    warn!(error = %e, "context embedding unavailable, semantic factor will use fallback");
                    METRICS
                        .fallback_substitutions
                        .with_label_values(&["semantic"])
                        .inc();
                    degraded.push("semantic_similarity".to_string());
                }
            }
        }

        let features = self.analyze_candidates(candidates, &mut degraded).await;
        METRICS.candidates_scored.observe(features.len() as f64);

        let kind = self.resolve_engine(request.engine_preference, &context, &features);
        let params = self.rank_params(request);

        let marker = format!(
            "{}|max={}|min={}|q={}|div={:.2}",
            kind.as_str(),
            params.max_recommendations,
            params.min_score,
            params.quality_threshold,
            params.diversity_weight,
        );
        let version = request
            .candidate_set_version
            .as_deref()
            .unwrap_or("default");
        let fp = fingerprint(&context, version, &marker);

        let strategy_failures: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let compute_failures = strategy_failures.clone();
        let result = self
            .cache
            .get_or_compute(&fp, || async move {
                let (scored, failed) = self.score_candidates(kind, &context, &features).await;
                if let Ok(mut slot) = compute_failures.lock() {
                    *slot = failed;
                }
                Ok(self.ranker.rank(&context, scored, &params))
            })
            .await;

        let (recommendations, outcome) = match result {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "recommendation computation failed, returning empty list");
                degraded.push("computation".to_string());
                (Vec::new(), CacheOutcome::Bypassed)
            }
        };

        if let Ok(failed) = strategy_failures.lock() {
            for name in failed.iter() {
                METRICS
                    .strategy_failures
                    .with_label_values(&[name.as_str()])
                    .inc();
                degraded.push(format!("strategy:{}", name));
            }
        }

        let elapsed = started.elapsed();
        METRICS
            .recommendation_requests
            .with_label_values(&[kind.as_str(), "ok"])
            .inc();
        METRICS.recommendation_duration.observe(elapsed.as_secs_f64());

        info!(
            %request_id,
            engine = kind.as_str(),
            returned = recommendations.len(),
            from_cache = outcome == CacheOutcome::Hit,
            elapsed_ms = elapsed.as_millis() as u64,
            "recommendation request complete"
        );

        RecommendationResponse {
            request_id,
            recommendations,
            engine_used: kind.as_str().to_string(),
            from_cache: outcome == CacheOutcome::Hit,
            degraded,
            candidate_count: candidates.len(),
            elapsed_ms: elapsed.as_millis() as u64,
            generated_at: Utc::now(),
        }
    }

    /// Signal that the candidate set changed: cached rankings are stale.
    pub async fn invalidate_cache(&self) {
        if let Err(e) = self.cache.invalidate_all().await {
            warn!(error = %e, "cache invalidation failed");
        }
    }

    /// Analyze all candidates, optionally enhancing through the LLM
    /// collaborator. Enhancement failures degrade to keyword features.
    async fn analyze_candidates(
        &self,
        candidates: &[CandidateContent],
        degraded: &mut Vec<String>,
    ) -> Vec<ContentFeatures> {
        let mut features: Vec<ContentFeatures> =
            candidates.iter().map(|c| self.analyzer.analyze(c)).collect();

        let llm = match &self.llm_provider {
            Some(llm) => llm.clone(),
            None => return features,
        };

        let results = join_all(candidates.iter().map(|candidate| {
            let llm = llm.clone();
            let text = format!("{} {}", candidate.title, candidate.text);
            async move {
                self.caller
                    .call(
                        "analyze_content",
                        self.config.analysis.timeout(),
                        llm.analyze(&text),
                    )
                    .await
            }
        }))
        .await;

        let mut failures = 0usize;
        for (feature, result) in features.iter_mut().zip(results) {
            match result {
                Ok(raw) => self.analyzer.enhance(feature, validate(raw)),
                Err(e) => {
                    debug!(id = %feature.id, error = %e, "content analysis fallback");
                    failures += 1;
                }
            }
        }
        if failures > 0 {
            METRICS
                .fallback_substitutions
                .with_label_values(&["analysis"])
                .inc_by(failures as f64);
            degraded.push("content_analysis".to_string());
        }

        features
    }

    fn resolve_engine(
        &self,
        preference: EnginePreference,
        context: &Context,
        features: &[ContentFeatures],
    ) -> EngineKind {
        match preference {
            EnginePreference::Fast => EngineKind::Fast,
            EnginePreference::Context => EngineKind::Context,
            EnginePreference::Ensemble => EngineKind::Ensemble,
            EnginePreference::Auto => {
                let have_embeddings = context.embedding.is_some()
                    && features.iter().any(|f| f.embedding.is_some());
                if have_embeddings {
                    EngineKind::Ensemble
                } else {
                    EngineKind::Context
                }
            }
        }
    }

    fn rank_params(&self, request: &RecommendationRequest) -> RankParams {
        let defaults = &self.config.ranking;
        RankParams {
            max_recommendations: request
                .max_recommendations
                .unwrap_or(defaults.max_recommendations),
            min_score: defaults.min_score,
            quality_threshold: request
                .quality_threshold
                .unwrap_or(defaults.quality_threshold),
            diversity_weight: request.diversity_weight.clamp(0.0, 1.0),
        }
    }

    /// Run the resolved scoring path; single-strategy paths reuse the
    /// ensemble's strategy implementations directly.
    async fn score_candidates(
        &self,
        kind: EngineKind,
        context: &Context,
        features: &[ContentFeatures],
    ) -> (Vec<ScoredCandidate>, Vec<String>) {
        match kind {
            EngineKind::Ensemble => {
                let outcome = self.aggregator.aggregate(context, features).await;
                (outcome.ranked, outcome.failed_strategies)
            }
            EngineKind::Fast => {
                self.run_single(&self.fast_strategy, context, features).await
            }
            EngineKind::Context => {
                self.run_single(&self.context_strategy, context, features)
                    .await
            }
        }
    }

    async fn run_single(
        &self,
        strategy: &dyn ScoringStrategy,
        context: &Context,
        features: &[ContentFeatures],
    ) -> (Vec<ScoredCandidate>, Vec<String>) {
        match strategy.score_all(context, features).await {
            Ok(scores) => {
                let scored = features
                    .iter()
                    .zip(scores)
                    .map(|(feature, score)| ScoredCandidate {
                        features: feature.clone(),
                        score: score.score,
                        breakdown: score.breakdown,
                    })
                    .collect();
                (scored, Vec::new())
            }
            Err(e) => {
                warn!(strategy = strategy.name(), error = %e, "scoring strategy failed");
                (Vec::new(), vec![strategy.name().to_string()])
            }
        }
    }
}
