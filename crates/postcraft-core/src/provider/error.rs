//! Raw provider failure, passed to the classifier without interpretation.

use std::fmt;

/// A failed provider call.
///
/// `status` and `code` are filled in only when the provider returned them
/// (HTTP status and the structured status string such as
/// `PERMISSION_DENIED`). `reasons` holds the machine-readable reasons from
/// the error's detail entries, e.g. `API_KEY_INVALID`. `message` is always
/// the provider's own text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub status: Option<u16>,
    pub code: Option<String>,
    pub reasons: Vec<String>,
    pub message: String,
}

impl ProviderError {
    /// A failure with no structured fields, e.g. a transport error.
    pub fn unstructured(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            reasons: Vec::new(),
            message: message.into(),
        }
    }

    /// A failure from an HTTP response.
    pub fn http(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            code,
            reasons: Vec::new(),
            message: message.into(),
        }
    }

    /// Attach detail reasons reported alongside the error.
    pub fn with_reasons(mut self, reasons: Vec<String>) -> Self {
        self.reasons = reasons;
        self
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, &self.code) {
            (Some(status), Some(code)) => write!(f, "[{status} {code}] {}", self.message)?,
            (Some(status), None) => write!(f, "[{status}] {}", self.message)?,
            (None, Some(code)) => write!(f, "[{code}] {}", self.message)?,
            (None, None) => f.write_str(&self.message)?,
        }
        if !self.reasons.is_empty() {
            write!(f, " (reason: {})", self.reasons.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ProviderError {}
