//! Provider configuration: credential, model and endpoint.

use std::fmt;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Models known to accept `generateContent` requests.
pub const KNOWN_MODELS: &[&str] = &["gemini-2.5-flash", "gemini-2.5-pro", "gemini-2.5-flash-lite"];

/// Gemini REST endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "GEMINI_MODEL";
pub const BASE_URL_ENV: &str = "GEMINI_BASE_URL";

/// Number of leading key characters shown by [`GeminiConfig::masked_key`].
const MASK_PREFIX_LEN: usize = 10;

/// Startup-time configuration failures. These are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "GEMINI_API_KEY is not set; export it or add `api_key` under [gemini] in the config file"
    )]
    MissingApiKey,

    #[error("model name must not be blank")]
    BlankModel,
}

/// Resolved provider settings.
///
/// Built once at startup; an absent or blank credential is rejected here
/// rather than on the first generation call.
#[derive(Clone)]
pub struct GeminiConfig {
    api_key: String,
    pub model: String,
    pub base_url: String,
}

impl GeminiConfig {
    /// Validate and build a config. The key and model are trimmed.
    pub fn new(
        api_key: Option<&str>,
        model: Option<&str>,
        base_url: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?
            .to_string();

        let model = match model {
            Some(m) if m.trim().is_empty() => return Err(ConfigError::BlankModel),
            Some(m) => m.trim().to_string(),
            None => DEFAULT_MODEL.to_string(),
        };

        let base_url = base_url
            .map(|u| u.trim().trim_end_matches('/'))
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string();

        Ok(Self {
            api_key,
            model,
            base_url,
        })
    }

    /// Build a config from `GEMINI_API_KEY`, `GEMINI_MODEL` and `GEMINI_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var(API_KEY_ENV).ok();
        let model = std::env::var(MODEL_ENV).ok();
        let base_url = std::env::var(BASE_URL_ENV).ok();
        Self::new(api_key.as_deref(), model.as_deref(), base_url.as_deref())
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The first few characters of the key followed by `...`, for display.
    pub fn masked_key(&self) -> String {
        let prefix: String = self.api_key.chars().take(MASK_PREFIX_LEN).collect();
        format!("{prefix}...")
    }

    /// Key length in characters, for display.
    pub fn key_len(&self) -> usize {
        self.api_key.chars().count()
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.masked_key())
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}
