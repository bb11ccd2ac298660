//! Tests for the multi-platform generation pipeline.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::PgPool;

use postcraft_core::classify::GenerationErrorKind;
use postcraft_core::orchestrator::{
    GenerateError, GenerationContext, GenerationRequest, OutcomeStatus, run_generation,
    run_report,
};
use postcraft_core::provider::{ProviderError, TextGenerator};
use postcraft_db::models::{Platform, Tone};
use postcraft_db::queries::posts;
use postcraft_test_utils::{create_test_db, drop_test_db};

// ===========================================================================
// Scripted generator
// ===========================================================================

/// Replays a fixed sequence of responses and records every instruction.
struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn new(responses: Vec<Result<String, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "gemini-2.5-flash"
    }

    async fn generate(&self, instructions: &str) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(instructions.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::unstructured("script exhausted")))
    }
}

fn context(pool: &PgPool, generator: Arc<ScriptedGenerator>) -> GenerationContext {
    GenerationContext::new(pool.clone(), generator)
}

// ===========================================================================
// Tests
// ===========================================================================

#[tokio::test]
async fn single_platform_generates_one_record() {
    let (pool, db_name) = create_test_db().await;
    let generator = ScriptedGenerator::new(vec![Ok(
        "  Decaf? In this economy? ☕ #coffee  \n".to_string(),
    )]);
    let ctx = context(&pool, generator.clone());

    let request = GenerationRequest::parse("coffee", &["twitter"], "funny").unwrap();
    let generated = run_generation(&ctx, &request).await.expect("should succeed");

    assert_eq!(generated.len(), 1);
    let post = &generated[0];
    assert_eq!(post.platform, Platform::Twitter);
    assert_eq!(post.tone, Tone::Funny);
    assert_eq!(post.prompt, "coffee");
    assert_eq!(post.content, "Decaf? In this economy? ☕ #coffee");
    assert_eq!(post.character_count as usize, post.content.chars().count());
    assert!(post.character_count <= 280);

    let stored = posts::list_posts(&pool).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, post.id);

    let calls = generator.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains("User's prompt/topic: coffee"));
    assert!(calls[0].contains("280 characters"));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn long_output_is_truncated_to_platform_limit() {
    let (pool, db_name) = create_test_db().await;
    let generator = ScriptedGenerator::new(vec![Ok("x".repeat(500))]);
    let ctx = context(&pool, generator);

    let request = GenerationRequest::parse("anything", &["twitter"], "casual").unwrap();
    let generated = run_generation(&ctx, &request).await.unwrap();

    let post = &generated[0];
    assert_eq!(post.character_count, 280);
    assert!(post.content.ends_with("..."));
    assert_eq!(post.content.chars().count(), 280);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn platforms_are_generated_in_request_order() {
    let (pool, db_name) = create_test_db().await;
    let generator = ScriptedGenerator::new(vec![
        Ok("for linkedin".to_string()),
        Ok("for instagram".to_string()),
        Ok("for facebook".to_string()),
    ]);
    let ctx = context(&pool, generator.clone());

    let request = GenerationRequest::parse(
        "product launch",
        &["linkedin", "instagram", "facebook"],
        "professional",
    )
    .unwrap();
    let generated = run_generation(&ctx, &request).await.unwrap();

    let platforms: Vec<Platform> = generated.iter().map(|p| p.platform).collect();
    assert_eq!(
        platforms,
        vec![Platform::Linkedin, Platform::Instagram, Platform::Facebook]
    );
    assert_eq!(generated[1].content, "for instagram");

    let calls = generator.calls();
    assert!(calls[0].contains("3000 characters"));
    assert!(calls[1].contains("2200 characters"));
    assert!(calls[2].contains("2000 characters"));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn failure_midway_leaves_earlier_posts_persisted() {
    let (pool, db_name) = create_test_db().await;
    let generator = ScriptedGenerator::new(vec![
        Ok("twitter post".to_string()),
        Err(ProviderError::http(
            500,
            Some("INTERNAL".into()),
            "backend overloaded",
        )),
        Ok("never requested".to_string()),
    ]);
    let ctx = context(&pool, generator.clone());

    let request =
        GenerationRequest::parse("coffee", &["twitter", "linkedin", "facebook"], "funny").unwrap();
    let err = run_generation(&ctx, &request)
        .await
        .expect_err("linkedin failure should abort the batch");

    match &err {
        GenerateError::Generation { error, persisted } => {
            assert_eq!(error.kind, GenerationErrorKind::Generic);
            assert_eq!(error.platform, Some(Platform::Linkedin));
            assert_eq!(persisted.len(), 1);
        }
        other => panic!("expected generation error, got {other:?}"),
    }

    // Twitter was committed before the failure; facebook never ran.
    let stored = posts::list_posts(&pool).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].platform, Platform::Twitter);
    assert_eq!(err.persisted(), &[stored[0].id]);
    assert_eq!(generator.calls().len(), 2);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn authorization_failure_is_classified() {
    let (pool, db_name) = create_test_db().await;
    let generator = ScriptedGenerator::new(vec![Err(ProviderError::http(
        403,
        Some("PERMISSION_DENIED".into()),
        "Method doesn't allow unregistered callers",
    ))]);
    let ctx = context(&pool, generator);

    let request = GenerationRequest::parse("coffee", &["instagram"], "engaging").unwrap();
    let err = run_generation(&ctx, &request).await.unwrap_err();

    assert_eq!(err.kind(), "authorization");
    assert_eq!(err.platform(), Some(Platform::Instagram));
    assert!(err.persisted().is_empty());
    assert_eq!(posts::count_posts(&pool).await.unwrap(), 0);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn report_mode_continues_past_failures() {
    let (pool, db_name) = create_test_db().await;
    let generator = ScriptedGenerator::new(vec![
        Ok("twitter post".to_string()),
        Err(ProviderError::unstructured("models/gemini-x not found")),
        Ok("facebook post".to_string()),
    ]);
    let ctx = context(&pool, generator);

    let request =
        GenerationRequest::parse("coffee", &["twitter", "linkedin", "facebook"], "funny").unwrap();
    let report = run_report(&ctx, &request).await;

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.outcomes[0].status,
        OutcomeStatus::Generated { .. }
    ));
    match &report.outcomes[1].status {
        OutcomeStatus::Failed { kind, .. } => assert_eq!(kind, "model_not_found"),
        other => panic!("expected failure for linkedin, got {other:?}"),
    }
    assert_eq!(report.outcomes[1].platform, Platform::Linkedin);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["outcomes"][0]["status"], "generated");
    assert_eq!(json["outcomes"][0]["platform"], "twitter");
    assert_eq!(json["outcomes"][1]["status"], "failed");

    assert_eq!(posts::count_posts(&pool).await.unwrap(), 2);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn empty_provider_output_is_stored() {
    let (pool, db_name) = create_test_db().await;
    let generator = ScriptedGenerator::new(vec![Ok("   ".to_string())]);
    let ctx = context(&pool, generator);

    let request = GenerationRequest::parse("silence", &["facebook"], "casual").unwrap();
    let generated = run_generation(&ctx, &request).await.unwrap();

    assert_eq!(generated[0].content, "");
    assert_eq!(generated[0].character_count, 0);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn persistence_failure_aborts_batch() {
    let (pool, db_name) = create_test_db().await;
    let generator = ScriptedGenerator::new(vec![
        Ok("first".to_string()),
        Ok("second".to_string()),
    ]);
    let ctx = context(&pool, generator);

    // Drop the table after the pool is handed over so every insert fails.
    sqlx::query("DROP TABLE posts").execute(&pool).await.unwrap();

    let request = GenerationRequest::parse("coffee", &["twitter", "facebook"], "funny").unwrap();
    let err = run_generation(&ctx, &request).await.unwrap_err();

    assert!(matches!(
        err,
        GenerateError::Persistence {
            platform: Platform::Twitter,
            ..
        }
    ));
    assert_eq!(err.kind(), "persistence");
    assert!(err.persisted().is_empty());

    pool.close().await;
    drop_test_db(&db_name).await;
}
