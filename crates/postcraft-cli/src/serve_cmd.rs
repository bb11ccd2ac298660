use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use postcraft_core::orchestrator::{
    GenerateError, GenerationContext, GenerationRequest, PlatformOutcome, run_generation,
    run_report,
};
use postcraft_core::probe::{self, KeyDisplay};
use postcraft_db::models::{GeneratedPost, Platform};
use postcraft_db::queries::posts as post_db;

use crate::config::ServerConfig;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
    kind: Option<String>,
    platform: Option<Platform>,
    persisted: Option<Vec<Uuid>>,
}

impl AppError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            kind: None,
            platform: None,
            persisted: None,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        let mut err = Self::new(StatusCode::BAD_REQUEST, msg);
        err.kind = Some("validation".to_string());
        err
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}"))
    }
}

impl From<GenerateError> for AppError {
    fn from(err: GenerateError) -> Self {
        let status = match err {
            GenerateError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let persisted = match err {
            GenerateError::Validation(_) => None,
            _ => Some(err.persisted().to_vec()),
        };
        let message = match &err {
            GenerateError::Generation { error, .. } => error.message.clone(),
            other => other.to_string(),
        };
        Self {
            status,
            message,
            kind: Some(err.kind()),
            platform: err.platform(),
            persisted,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let mut body = serde_json::json!({ "error": self.message });
        if let Some(kind) = self.kind {
            body["kind"] = serde_json::json!(kind);
        }
        if let Some(platform) = self.platform {
            body["platform"] = serde_json::json!(platform);
        }
        if let Some(persisted) = self.persisted {
            body["persisted"] = serde_json::json!(persisted);
        }
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    #[serde(default, alias = "prompt")]
    pub topic: String,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub tone: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateParams {
    /// `report` returns per-platform outcomes instead of aborting.
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub posts: Vec<GeneratedPost>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub outcomes: Vec<PlatformOutcome>,
    pub succeeded: usize,
    pub failed: usize,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub ctx: GenerationContext,
    pub key: KeyDisplay,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/posts", get(list_posts))
        .route("/api/posts/generate", post(generate))
        .route("/api/posts/test-api-key", get(test_api_key))
        .route("/api/posts/{id}", get(get_post).delete(delete_post))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, server: &ServerConfig) -> Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = format!("{}:{}", server.bind, server.port).parse()?;
    tracing::info!("postcraft serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("postcraft serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "message": "PostCraft server is running",
    }))
}

async fn list_posts(State(state): State<AppState>) -> Result<axum::response::Response, AppError> {
    let posts = post_db::list_posts(&state.ctx.pool)
        .await
        .map_err(AppError::internal)?;

    Ok(Json(posts).into_response())
}

async fn generate(
    State(state): State<AppState>,
    Query(params): Query<GenerateParams>,
    body: Result<Json<GenerateBody>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(body) = body?;
    let request = GenerationRequest::parse(&body.topic, &body.platforms, &body.tone)?;

    match params.mode.as_deref() {
        None | Some("abort") => {
            let posts = run_generation(&state.ctx, &request).await?;
            let count = posts.len();
            Ok(Json(GenerateResponse { posts, count }).into_response())
        }
        Some("report") => {
            let report = run_report(&state.ctx, &request).await;
            let succeeded = report.succeeded();
            let failed = report.failed();
            Ok(Json(ReportResponse {
                outcomes: report.outcomes,
                succeeded,
                failed,
            })
            .into_response())
        }
        Some(other) => Err(AppError::bad_request(format!(
            "unknown mode {other:?} (expected abort or report)"
        ))),
    }
}

fn parse_post_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::bad_request(format!("invalid post id: {raw}")))
}

async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, AppError> {
    let id = parse_post_id(&id)?;
    let post = post_db::get_post(&state.ctx.pool, id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::not_found("Post not found"))?;

    Ok(Json(post).into_response())
}

async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, AppError> {
    let id = parse_post_id(&id)?;
    let deleted = post_db::delete_post(&state.ctx.pool, id)
        .await
        .map_err(AppError::internal)?;

    if !deleted {
        return Err(AppError::not_found("Post not found"));
    }

    tracing::info!(post_id = %id, "post deleted");
    Ok(Json(serde_json::json!({ "message": "Post deleted successfully" })).into_response())
}

async fn test_api_key(State(state): State<AppState>) -> axum::response::Response {
    let report = probe::probe(state.ctx.generator.as_ref(), state.key.clone()).await;
    let status = if report.is_success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(report)).into_response()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
