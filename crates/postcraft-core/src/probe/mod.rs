//! Diagnostic probe: one generation call to confirm the configured
//! credential and model are usable.

use serde::Serialize;

use crate::classify::{self, GenerationErrorKind};
use crate::prompt::PROBE_INSTRUCTION;
use crate::provider::{GeminiConfig, TextGenerator};

/// Key details safe to show to an operator.
#[derive(Debug, Clone, Serialize)]
pub struct KeyDisplay {
    pub api_key_length: usize,
    pub api_key_prefix: String,
}

impl From<&GeminiConfig> for KeyDisplay {
    fn from(config: &GeminiConfig) -> Self {
        Self {
            api_key_length: config.key_len(),
            api_key_prefix: config.masked_key(),
        }
    }
}

/// Outcome of a probe call.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProbeReport {
    Success {
        success: bool,
        message: String,
        test_response: String,
        #[serde(flatten)]
        key: KeyDisplay,
        model: String,
    },
    Failure {
        success: bool,
        error: String,
        kind: GenerationErrorKind,
        message: String,
        details: String,
        suggestions: Vec<String>,
        #[serde(flatten)]
        key: KeyDisplay,
        model: String,
    },
}

impl ProbeReport {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Send the fixed probe instruction and report the result.
pub async fn probe(generator: &dyn TextGenerator, key: KeyDisplay) -> ProbeReport {
    let model = generator.model().to_string();

    match generator.generate(PROBE_INSTRUCTION).await {
        Ok(text) => {
            tracing::info!(model = %model, "probe succeeded");
            ProbeReport::Success {
                success: true,
                message: "API key is valid and working".to_string(),
                test_response: text,
                key,
                model,
            }
        }
        Err(e) => {
            let classified = classify::classify(&e, &model, None);
            tracing::warn!(model = %model, kind = %classified.kind, "probe failed");
            let suggestions = classified.suggestions(&model);
            ProbeReport::Failure {
                success: false,
                error: "API key test failed".to_string(),
                kind: classified.kind,
                message: classified.message,
                details: classified.detail,
                suggestions,
                key,
                model,
            }
        }
    }
}
