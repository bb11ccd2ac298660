//! Sequential multi-platform generation: validate the request, then for each
//! platform compile the prompt, call the provider, enforce the limit and
//! persist the post.
//!
//! Two result shapes are offered:
//! - [`run_generation`] aborts at the first failing platform. Posts for
//!   earlier platforms stay persisted; their ids are carried on the error.
//! - [`run_report`] attempts every platform and returns one
//!   [`PlatformOutcome`] per platform.

use std::sync::Arc;

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use postcraft_db::models::{GeneratedPost, Platform, Tone};
use postcraft_db::queries::posts::{self as post_db, NewPost};

use crate::classify::{self, GenerationError};
use crate::enforce;
use crate::platform;
use crate::prompt;
use crate::provider::TextGenerator;

// ---------------------------------------------------------------------------
// Context and request
// ---------------------------------------------------------------------------

/// Process-wide collaborators, built once at startup and injected.
#[derive(Clone)]
pub struct GenerationContext {
    pub pool: PgPool,
    pub generator: Arc<dyn TextGenerator>,
}

impl GenerationContext {
    pub fn new(pool: PgPool, generator: Arc<dyn TextGenerator>) -> Self {
        Self { pool, generator }
    }
}

/// A validated generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Caller's topic, kept verbatim.
    pub topic: String,
    /// Requested platforms in request order, without duplicates.
    pub platforms: Vec<Platform>,
    pub tone: Tone,
}

impl GenerationRequest {
    /// Validate raw caller input.
    ///
    /// Rejects a blank topic, an empty platform list, unknown platform ids
    /// and unknown tones. Repeated platforms are kept once, at their first
    /// position.
    pub fn parse<S: AsRef<str>>(
        topic: &str,
        platforms: &[S],
        tone: &str,
    ) -> Result<Self, GenerateError> {
        if topic.trim().is_empty() {
            return Err(GenerateError::Validation(
                "topic and at least one platform are required".to_string(),
            ));
        }
        if platforms.is_empty() {
            return Err(GenerateError::Validation(
                "topic and at least one platform are required".to_string(),
            ));
        }

        let mut parsed: Vec<Platform> = Vec::with_capacity(platforms.len());
        for id in platforms {
            let p = platform::parse_platform(id.as_ref())
                .map_err(|e| GenerateError::Validation(e.to_string()))?;
            if !parsed.contains(&p) {
                parsed.push(p);
            }
        }

        let tone = tone
            .parse::<Tone>()
            .map_err(|e| GenerateError::Validation(e.to_string()))?;

        Ok(Self {
            topic: topic.to_string(),
            platforms: parsed,
            tone,
        })
    }
}

// ---------------------------------------------------------------------------
// Errors and outcomes
// ---------------------------------------------------------------------------

/// Failure of a generation call.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Caller input was malformed. Nothing was generated or stored.
    #[error("{0}")]
    Validation(String),

    /// The provider call for one platform failed.
    #[error("{error}")]
    Generation {
        error: GenerationError,
        /// Posts already stored for earlier platforms in the batch.
        persisted: Vec<Uuid>,
    },

    /// Storing the post for one platform failed.
    #[error("failed to persist {platform} post: {error:#}")]
    Persistence {
        platform: Platform,
        error: anyhow::Error,
        persisted: Vec<Uuid>,
    },
}

impl GenerateError {
    /// Ids of posts stored before the batch was aborted.
    pub fn persisted(&self) -> &[Uuid] {
        match self {
            Self::Validation(_) => &[],
            Self::Generation { persisted, .. } | Self::Persistence { persisted, .. } => persisted,
        }
    }

    /// Platform whose pipeline failed, when the failure is platform-specific.
    pub fn platform(&self) -> Option<Platform> {
        match self {
            Self::Validation(_) => None,
            Self::Generation { error, .. } => error.platform,
            Self::Persistence { platform, .. } => Some(*platform),
        }
    }

    /// Short machine-readable category.
    pub fn kind(&self) -> String {
        match self {
            Self::Validation(_) => "validation".to_string(),
            Self::Generation { error, .. } => error.kind.to_string(),
            Self::Persistence { .. } => "persistence".to_string(),
        }
    }
}

/// Result of one platform's pipeline in report mode.
#[derive(Debug, Serialize)]
pub struct PlatformOutcome {
    pub platform: Platform,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Generated { post: GeneratedPost },
    Failed { kind: String, message: String },
}

/// Per-platform outcomes for a whole request.
#[derive(Debug, Serialize)]
pub struct GenerationReport {
    pub outcomes: Vec<PlatformOutcome>,
}

impl GenerationReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Generated { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Why a single platform's pipeline failed.
enum PlatformFailure {
    Generation(GenerationError),
    Persistence(Platform, anyhow::Error),
}

impl PlatformFailure {
    fn into_error(self, persisted: Vec<Uuid>) -> GenerateError {
        match self {
            Self::Generation(error) => GenerateError::Generation { error, persisted },
            Self::Persistence(platform, error) => GenerateError::Persistence {
                platform,
                error,
                persisted,
            },
        }
    }

    fn into_status(self) -> OutcomeStatus {
        match self {
            Self::Generation(error) => OutcomeStatus::Failed {
                kind: error.kind.to_string(),
                message: error.message,
            },
            Self::Persistence(platform, error) => OutcomeStatus::Failed {
                kind: "persistence".to_string(),
                message: format!("failed to persist {platform} post: {error:#}"),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run compile -> generate -> enforce -> persist for one platform.
async fn generate_one(
    ctx: &GenerationContext,
    request: &GenerationRequest,
    platform: Platform,
) -> Result<GeneratedPost, PlatformFailure> {
    let profile = platform::profile(platform);
    let instructions = prompt::compile(&request.topic, platform, request.tone, profile);

    let raw = ctx
        .generator
        .generate(&instructions)
        .await
        .map_err(|e| {
            let classified = classify::classify(&e, ctx.generator.model(), Some(platform));
            tracing::warn!(
                platform = %platform,
                kind = %classified.kind,
                detail = %classified.detail,
                "generation failed"
            );
            PlatformFailure::Generation(classified)
        })?;

    let content = enforce::enforce(&raw, profile.character_limit);
    let character_count = enforce::char_count(&content);
    if character_count < raw.trim().chars().count() {
        tracing::debug!(
            platform = %platform,
            limit = profile.character_limit,
            "provider output truncated to fit limit"
        );
    }

    let new_post = NewPost {
        prompt: &request.topic,
        platform,
        tone: request.tone,
        content: &content,
        character_count: character_count as i32,
    };

    let post = post_db::insert_post(&ctx.pool, &new_post)
        .await
        .map_err(|e| {
            tracing::warn!(platform = %platform, error = %format!("{e:#}"), "persisting post failed");
            PlatformFailure::Persistence(platform, e)
        })?;

    tracing::info!(
        post_id = %post.id,
        platform = %platform,
        characters = character_count,
        "post generated"
    );

    Ok(post)
}

/// Generate and persist one post per requested platform, in order.
///
/// The first failing platform aborts the batch. Posts already stored for
/// earlier platforms are not rolled back; the returned error lists them
/// via [`GenerateError::persisted`].
pub async fn run_generation(
    ctx: &GenerationContext,
    request: &GenerationRequest,
) -> Result<Vec<GeneratedPost>, GenerateError> {
    let mut posts: Vec<GeneratedPost> = Vec::with_capacity(request.platforms.len());

    for &platform in &request.platforms {
        match generate_one(ctx, request, platform).await {
            Ok(post) => posts.push(post),
            Err(failure) => {
                let persisted: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
                if !persisted.is_empty() {
                    tracing::warn!(
                        platform = %platform,
                        persisted = persisted.len(),
                        "batch aborted after earlier platforms were stored"
                    );
                }
                return Err(failure.into_error(persisted));
            }
        }
    }

    Ok(posts)
}

/// Attempt every requested platform and report each outcome.
///
/// A failure on one platform does not stop the others.
pub async fn run_report(ctx: &GenerationContext, request: &GenerationRequest) -> GenerationReport {
    let mut outcomes = Vec::with_capacity(request.platforms.len());

    for &platform in &request.platforms {
        let status = match generate_one(ctx, request, platform).await {
            Ok(post) => OutcomeStatus::Generated { post },
            Err(failure) => failure.into_status(),
        };
        outcomes.push(PlatformOutcome { platform, status });
    }

    let report = GenerationReport { outcomes };
    tracing::info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "generation report complete"
    );
    report
}
