use async_trait::async_trait;

use super::context_builder::Prompt;
use super::error::RagError;

const PLACEHOLDER_PREFIX: &str = "This is a placeholder answer generated using retrieved context. ";

/// Produces the answer text for a rendered prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &Prompt) -> Result<String, RagError>;
}

/// Deterministic stand-in for a language model: a fixed sentence followed by
/// the top-ranked source, if any.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderGenerator;

#[async_trait]
impl Generator for PlaceholderGenerator {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String, RagError> {
        let top_source = prompt.sources.first().map(String::as_str).unwrap_or("");
        Ok(format!("{}{}", PLACEHOLDER_PREFIX, top_source))
    }
}
