//! Gemini `generateContent` backend.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::GeminiConfig;
use super::error::ProviderError;
use super::trait_def::TextGenerator;

/// HTTP client for the Gemini REST API.
///
/// One instance is built at startup and shared behind an
/// `Arc<dyn TextGenerator>`; it holds no mutable state.
pub struct GeminiClient {
    config: GeminiConfig,
    http_client: HttpClient,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            http_client: HttpClient::new(),
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}

/// Turn a non-success response body into a [`ProviderError`].
///
/// Uses the `{"error": {...}}` envelope when present, keeping the
/// `details[].reason` values, otherwise the raw body (or the status line
/// when the body is empty).
fn error_from_body(status: reqwest::StatusCode, body: &str) -> ProviderError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let reasons = envelope
                .error
                .details
                .into_iter()
                .filter_map(|d| d.reason)
                .collect();
            ProviderError::http(
                status.as_u16(),
                envelope.error.status,
                envelope.error.message.unwrap_or_else(|| body.to_string()),
            )
            .with_reasons(reasons)
        }
        Err(_) if body.trim().is_empty() => {
            ProviderError::http(status.as_u16(), None, status.to_string())
        }
        Err(_) => ProviderError::http(status.as_u16(), None, body.to_string()),
    }
}

/// A non-success response whose body could not be read.
fn error_from_unreadable_body(
    status: reqwest::StatusCode,
    err: &dyn std::fmt::Display,
) -> ProviderError {
    ProviderError::http(
        status.as_u16(),
        None,
        format!("{status} (failed to read error body: {err})"),
    )
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "unspecified".to_string());
        return Err(ProviderError::unstructured(format!(
            "response contained no candidates (block reason: {reason})"
        )));
    };

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();
    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, instructions: &str) -> Result<String, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: instructions }],
            }],
        };

        debug!(model = %self.config.model, chars = instructions.len(), "sending generateContent");

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", self.config.api_key())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::unstructured(format!("network error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(match response.text().await {
                Ok(body) => error_from_body(status, &body),
                Err(e) => error_from_unreadable_body(status, &e),
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::unstructured(format!("failed to parse response: {e}")))?;

        extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn error_envelope_is_parsed() {
        let body = r#"{"error":{"code":403,"message":"API key not valid. Please pass a valid API key.","status":"PERMISSION_DENIED"}}"#;
        let err = error_from_body(StatusCode::FORBIDDEN, body);
        assert_eq!(err.status, Some(403));
        assert_eq!(err.code.as_deref(), Some("PERMISSION_DENIED"));
        assert!(err.message.starts_with("API key not valid"));
    }

    #[test]
    fn invalid_key_detail_reasons_are_kept() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"@type":"type.googleapis.com/google.rpc.ErrorInfo","reason":"API_KEY_INVALID","domain":"googleapis.com","metadata":{"service":"generativelanguage.googleapis.com"}},{"@type":"type.googleapis.com/google.rpc.LocalizedMessage","locale":"en-US","message":"API key not valid. Please pass a valid API key."}]}}"#;
        let err = error_from_body(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.status, Some(400));
        assert_eq!(err.code.as_deref(), Some("INVALID_ARGUMENT"));
        assert_eq!(err.reasons, vec!["API_KEY_INVALID".to_string()]);
        assert!(err.to_string().contains("API_KEY_INVALID"));
    }

    #[test]
    fn non_json_error_body_is_kept_raw() {
        let err = error_from_body(StatusCode::BAD_GATEWAY, "upstream exploded");
        assert_eq!(err.status, Some(502));
        assert_eq!(err.code, None);
        assert_eq!(err.message, "upstream exploded");
    }

    #[test]
    fn empty_error_body_uses_status_line() {
        let err = error_from_body(StatusCode::NOT_FOUND, "");
        assert_eq!(err.message, "404 Not Found");
    }

    #[test]
    fn unreadable_body_keeps_read_error() {
        let err = error_from_unreadable_body(StatusCode::BAD_GATEWAY, &"connection closed early");
        assert_eq!(err.status, Some(502));
        assert_eq!(
            err.message,
            "502 Bad Gateway (failed to read error body: connection closed early)"
        );
    }

    #[test]
    fn text_parts_are_concatenated() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"Hello "},{"text":"world"}],"role":"model"}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(extract_text(parsed).unwrap(), "Hello world");
    }

    #[test]
    fn blocked_prompt_is_an_error() {
        let json = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let err = extract_text(parsed).unwrap_err();
        assert!(err.message.contains("SAFETY"));
    }

    #[test]
    fn endpoint_uses_configured_model() {
        let cfg = GeminiConfig::new(Some("k"), Some("gemini-2.5-pro"), Some("http://localhost:1/v1beta"))
            .unwrap();
        let client = GeminiClient::new(cfg);
        assert_eq!(
            client.endpoint(),
            "http://localhost:1/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }
}
