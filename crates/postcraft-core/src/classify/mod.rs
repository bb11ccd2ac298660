//! Map provider failures into a fixed taxonomy with remediation hints.
//!
//! Structured fields (detail reasons, provider status code, HTTP status)
//! are looked up in declarative tables first. Only when they are absent or
//! unrecognised does classification fall back to substring matching over the
//! provider's text, which depends on provider wording and is best-effort.

use std::fmt;

use postcraft_db::models::Platform;
use serde::Serialize;

use crate::provider::ProviderError;
use crate::provider::config::{KNOWN_MODELS, MODEL_ENV};

/// Category of a failed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationErrorKind {
    Authorization,
    ModelNotFound,
    Generic,
}

impl fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Authorization => "authorization",
            Self::ModelNotFound => "model_not_found",
            Self::Generic => "generic",
        };
        f.write_str(s)
    }
}

/// A classified provider failure. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    /// User-facing message including remediation steps.
    pub message: String,
    /// Platform being generated when the failure happened, if any.
    pub platform: Option<Platform>,
    /// The provider's original error text.
    pub detail: String,
}

impl GenerationError {
    /// Individual remediation steps for this kind, for display as a list.
    pub fn suggestions(&self, model: &str) -> Vec<String> {
        match self.kind {
            GenerationErrorKind::Authorization => vec![
                "Verify your API key at https://aistudio.google.com/app/apikey".to_string(),
                "Make sure there are no extra spaces or quotes around GEMINI_API_KEY".to_string(),
                "Ensure the key is in the expected format (usually starts with AIza...)"
                    .to_string(),
                "Create a new API key if the current one does not work".to_string(),
            ],
            GenerationErrorKind::ModelNotFound => vec![
                format!("Model {model:?} is not available"),
                format!("Available models: {}", KNOWN_MODELS.join(", ")),
                format!("Set {MODEL_ENV} to use a different model"),
            ],
            GenerationErrorKind::Generic => Vec::new(),
        }
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.platform {
            Some(p) => write!(f, "{p}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for GenerationError {}

// ---------------------------------------------------------------------------
// Classification tables
// ---------------------------------------------------------------------------

/// Detail reasons (`error.details[].reason`). Most specific, checked first.
const DETAIL_REASONS: &[(&str, GenerationErrorKind)] = &[
    ("API_KEY_INVALID", GenerationErrorKind::Authorization),
    ("API_KEY_SERVICE_BLOCKED", GenerationErrorKind::Authorization),
    ("API_KEY_HTTP_REFERRER_BLOCKED", GenerationErrorKind::Authorization),
    ("API_KEY_IP_ADDRESS_BLOCKED", GenerationErrorKind::Authorization),
];

/// Provider status codes (Google RPC status names).
const STRUCTURED_CODES: &[(&str, GenerationErrorKind)] = &[
    ("PERMISSION_DENIED", GenerationErrorKind::Authorization),
    ("UNAUTHENTICATED", GenerationErrorKind::Authorization),
    ("NOT_FOUND", GenerationErrorKind::ModelNotFound),
];

const HTTP_STATUSES: &[(u16, GenerationErrorKind)] = &[
    (401, GenerationErrorKind::Authorization),
    (403, GenerationErrorKind::Authorization),
    (404, GenerationErrorKind::ModelNotFound),
];

/// Fallback markers, checked in order against the raw text.
const TEXT_MARKERS: &[(&str, GenerationErrorKind)] = &[
    ("API_KEY", GenerationErrorKind::Authorization),
    ("403", GenerationErrorKind::Authorization),
    ("Forbidden", GenerationErrorKind::Authorization),
    ("404", GenerationErrorKind::ModelNotFound),
    ("not found", GenerationErrorKind::ModelNotFound),
];

fn classify_structured(error: &ProviderError) -> Option<GenerationErrorKind> {
    let by_reason = error.reasons.iter().find_map(|reason| {
        DETAIL_REASONS
            .iter()
            .find(|(r, _)| *r == reason.as_str())
            .map(|(_, kind)| *kind)
    });

    let by_code = error.code.as_deref().and_then(|code| {
        STRUCTURED_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, kind)| *kind)
    });

    by_reason.or(by_code).or_else(|| {
        error.status.and_then(|status| {
            HTTP_STATUSES
                .iter()
                .find(|(s, _)| *s == status)
                .map(|(_, kind)| *kind)
        })
    })
}

fn classify_text(text: &str) -> Option<GenerationErrorKind> {
    TEXT_MARKERS
        .iter()
        .find(|(marker, _)| text.contains(marker))
        .map(|(_, kind)| *kind)
}

/// Classify a provider failure.
///
/// `model` is the configured model id, named in the model-not-found
/// message. `platform` records which platform was being generated.
pub fn classify(
    error: &ProviderError,
    model: &str,
    platform: Option<Platform>,
) -> GenerationError {
    let detail = error.to_string();
    let kind = classify_structured(error)
        .or_else(|| classify_text(&detail))
        .unwrap_or(GenerationErrorKind::Generic);

    let message = match kind {
        GenerationErrorKind::Authorization => "Invalid or missing Gemini API key. \
             Please verify GEMINI_API_KEY in your environment or config file. \
             Make sure the key is correct and has no extra spaces or quotes, \
             or regenerate it if it has been revoked. \
             You can check the key with GET /api/posts/test-api-key."
            .to_string(),
        GenerationErrorKind::ModelNotFound => format!(
            "Model {model:?} not found. Available models: {}. \
             Set {MODEL_ENV} to use a different model.",
            KNOWN_MODELS.join(", ")
        ),
        GenerationErrorKind::Generic => format!("Failed to generate post: {}", error.message),
    };

    GenerationError {
        kind,
        message,
        platform,
        detail,
    }
}
