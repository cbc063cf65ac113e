//! Integration tests for the recommendation engine
//!
//! These tests exercise the full pipeline through the public API: context
//! extraction, analysis, ensemble scoring, ranking, and the recommendation
//! cache.

use async_trait::async_trait;
use recommend_engine::engine::TechInput;
use recommend_engine::error::Result;
use recommend_engine::{
    CandidateContent, EmbeddingProvider, EngineConfig, EnginePreference, MemoryCacheStore,
    RecommendationEngine, RecommendationRequest,
};
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Deterministic embedding provider for tests: maps text to a small vector
/// of letter-group frequencies so related texts land near each other.
struct TermFrequencyEmbedder;

#[async_trait]
impl EmbeddingProvider for TermFrequencyEmbedder {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        let buckets = [
            ["java", "jvm", "bytecode"],
            ["react", "javascript", "frontend"],
            ["rust", "tokio", "async"],
            ["sql", "database", "query"],
        ];
        let vector = buckets
            .iter()
            .map(|words| {
                words
                    .iter()
                    .map(|w| lower.matches(w).count() as f32)
                    .sum::<f32>()
            })
            .collect();
        Ok(vector)
    }
}

fn engine_with_embeddings() -> RecommendationEngine {
    let config = EngineConfig::default();
    let store = Arc::new(MemoryCacheStore::new(config.cache.max_entries));
    RecommendationEngine::new(config, Arc::new(TermFrequencyEmbedder), None, store)
}

fn candidate(
    id: &str,
    title: &str,
    text: &str,
    techs: &[&str],
    quality: u8,
    embedding: Option<Vec<f32>>,
) -> CandidateContent {
    CandidateContent {
        id: id.to_string(),
        title: title.to_string(),
        text: text.to_string(),
        technologies: techs.iter().map(|t| t.to_string()).collect(),
        content_type: None,
        difficulty: None,
        quality_score: quality,
        url: Some(format!("https://example.test/{}", id)),
        embedding,
    }
}

fn corpus() -> Vec<CandidateContent> {
    vec![
        candidate(
            "java-agents",
            "Java bytecode instrumentation",
            "implement agents that rewrite jvm bytecode with asm",
            &["java", "asm"],
            9,
            Some(vec![3.0, 0.0, 0.0, 0.0]),
        ),
        candidate(
            "react-native",
            "React Native overview",
            "building mobile apps with react and javascript",
            &["react-native", "javascript"],
            8,
            Some(vec![0.0, 3.0, 0.0, 0.0]),
        ),
        candidate(
            "tokio-book",
            "Async Rust with Tokio",
            "implement async services in rust with tokio",
            &["rust", "tokio"],
            7,
            Some(vec![0.0, 0.0, 3.0, 0.0]),
        ),
        candidate(
            "sql-tuning",
            "SQL query tuning",
            "optimize slow database queries",
            &["sql", "postgresql"],
            6,
            Some(vec![0.0, 0.0, 0.0, 3.0]),
        ),
    ]
}

#[tokio::test]
async fn test_ensemble_pipeline_ranks_by_relevance() {
    init_tracing();
    let engine = engine_with_embeddings();
    let request = RecommendationRequest {
        title: "JVM instrumentation".to_string(),
        description: "implement a java agent that rewrites bytecode".to_string(),
        technologies: TechInput::List(vec!["java".to_string(), "asm".to_string()]),
        engine_preference: EnginePreference::Ensemble,
        ..Default::default()
    };

    let response = engine.recommend(&request, &corpus()).await;

    assert_eq!(response.engine_used, "ensemble");
    assert_eq!(response.recommendations[0].id, "java-agents");
    // Every rank is assigned and contiguous.
    for (idx, rec) in response.recommendations.iter().enumerate() {
        assert_eq!(rec.rank, idx + 1);
    }
    // Scores are sorted descending.
    for pair in response.recommendations.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_auto_selects_ensemble_when_embeddings_available() {
    let engine = engine_with_embeddings();
    let request = RecommendationRequest {
        title: "async rust services".to_string(),
        technologies: TechInput::Text("rust".to_string()),
        ..Default::default()
    };

    let response = engine.recommend(&request, &corpus()).await;
    assert_eq!(response.engine_used, "ensemble");
    assert_eq!(response.recommendations[0].id, "tokio-book");
}

#[tokio::test]
async fn test_candidate_order_invariance_end_to_end() {
    let engine = engine_with_embeddings();
    let request = RecommendationRequest {
        title: "java bytecode agent".to_string(),
        technologies: TechInput::Text("java, asm".to_string()),
        candidate_set_version: Some("v1".to_string()),
        ..Default::default()
    };

    let forward = engine.recommend(&request, &corpus()).await;

    let engine = engine_with_embeddings();
    let mut reversed = corpus();
    reversed.reverse();
    let backward = engine.recommend(&request, &reversed).await;

    let forward_ids: Vec<_> = forward.recommendations.iter().map(|r| r.id.clone()).collect();
    let backward_ids: Vec<_> = backward.recommendations.iter().map(|r| r.id.clone()).collect();
    assert_eq!(forward_ids, backward_ids);

    for (a, b) in forward
        .recommendations
        .iter()
        .zip(backward.recommendations.iter())
    {
        assert!((a.score - b.score).abs() < 1e-4);
    }
}

#[tokio::test]
async fn test_equivalent_tech_inputs_share_a_cache_entry() {
    let engine = engine_with_embeddings();
    let candidates = corpus();

    let as_text = RecommendationRequest {
        title: "rust services".to_string(),
        technologies: TechInput::Text("rust, tokio".to_string()),
        ..Default::default()
    };
    let as_list = RecommendationRequest {
        title: "rust services".to_string(),
        technologies: TechInput::List(vec!["rust".to_string(), "tokio".to_string()]),
        ..Default::default()
    };

    let first = engine.recommend(&as_text, &candidates).await;
    let second = engine.recommend(&as_list, &candidates).await;

    // Normalization makes the two requests the same cacheable unit of work.
    assert!(!first.from_cache);
    assert!(second.from_cache);
}

#[tokio::test]
async fn test_bumping_candidate_set_version_misses_the_cache() {
    let engine = engine_with_embeddings();
    let candidates = corpus();

    let mut request = RecommendationRequest {
        title: "rust services".to_string(),
        candidate_set_version: Some("v1".to_string()),
        ..Default::default()
    };
    let _ = engine.recommend(&request, &candidates).await;

    request.candidate_set_version = Some("v2".to_string());
    let bumped = engine.recommend(&request, &candidates).await;
    assert!(!bumped.from_cache);
}

#[tokio::test]
async fn test_concurrent_identical_requests_agree() {
    let engine = Arc::new(engine_with_embeddings());
    let candidates = Arc::new(corpus());

    let request = || RecommendationRequest {
        title: "java bytecode agent".to_string(),
        technologies: TechInput::Text("java".to_string()),
        ..Default::default()
    };

    let a = {
        let engine = engine.clone();
        let candidates = candidates.clone();
        let request = request();
        tokio::spawn(async move { engine.recommend(&request, &candidates).await })
    };
    let b = {
        let engine = engine.clone();
        let candidates = candidates.clone();
        let request = request();
        tokio::spawn(async move { engine.recommend(&request, &candidates).await })
    };

    let (a, b) = tokio::join!(a, b);
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(
        serde_json::to_string(&a.recommendations).unwrap(),
        serde_json::to_string(&b.recommendations).unwrap()
    );
}

#[tokio::test]
async fn test_diversity_weight_demotes_near_duplicates() {
    let engine = engine_with_embeddings();
    let candidates = vec![
        candidate(
            "tokio-a",
            "Async Rust with Tokio",
            "implement async rust services",
            &["rust", "tokio"],
            8,
            None,
        ),
        candidate(
            "tokio-b",
            "Tokio in practice",
            "implement async rust with tokio",
            &["rust", "tokio"],
            8,
            None,
        ),
        candidate(
            "sql-tuning",
            "SQL query tuning",
            "optimize slow database queries",
            &["sql", "postgresql"],
            7,
            None,
        ),
    ];

    let request = RecommendationRequest {
        title: "implement async rust".to_string(),
        technologies: TechInput::Text("rust".to_string()),
        diversity_weight: 1.0,
        ..Default::default()
    };

    let response = engine.recommend(&request, &candidates).await;
    let ids: Vec<_> = response.recommendations.iter().map(|r| r.id.as_str()).collect();
    // The duplicate tokio item is pushed below the sql item.
    assert_eq!(ids[1], "sql-tuning");
}

#[tokio::test]
async fn test_response_serializes_for_transport() -> anyhow::Result<()> {
    let engine = engine_with_embeddings();
    let request = RecommendationRequest {
        title: "rust".to_string(),
        ..Default::default()
    };
    let response = engine.recommend(&request, &corpus()).await;

    let json = serde_json::to_string(&response)?;
    assert!(json.contains("recommendations"));
    assert!(json.contains("engine_used"));

    let parsed: recommend_engine::RecommendationResponse = serde_json::from_str(&json)?;
    assert_eq!(parsed.recommendations.len(), response.recommendations.len());
    Ok(())
}

#[tokio::test]
async fn test_request_with_no_fields_still_succeeds() {
    let engine = engine_with_embeddings();
    let response = engine
        .recommend(&RecommendationRequest::default(), &corpus())
        .await;
    // No context signal: everything scores on neutral values, nothing fails.
    assert_eq!(response.recommendations.len(), 4);
}
