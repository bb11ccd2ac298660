//! The `TextGenerator` trait -- one instruction in, one block of text out.

use async_trait::async_trait;

use super::error::ProviderError;

/// A backend able to turn instruction text into generated text.
///
/// Implementations make exactly one provider call per [`generate`] and do
/// not retry, time out, or interpret failures; the raw provider error is
/// returned as a [`ProviderError`] for the classifier.
///
/// [`generate`]: TextGenerator::generate
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short backend name used in logs (e.g. "gemini").
    fn name(&self) -> &str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Send `instructions` to the provider and return its raw text.
    async fn generate(&self, instructions: &str) -> Result<String, ProviderError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn TextGenerator) {}
};
