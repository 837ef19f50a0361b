//! Hosted-model clients used by the term classifier.

mod claude;
mod error;
mod openai;
mod provider;

pub use claude::ClaudeClient;
pub use error::LLMError;
pub use openai::OpenAIClient;
pub use provider::Provider;

use async_trait::async_trait;

/// Trait for Large Language Model providers.
///
/// The classifier only needs a single, non-streamed answer, so this is the
/// whole surface.
#[async_trait]
pub trait LLM: Send + Sync {
    /// Complete `prompt` under the `system` instruction.
    async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String, LLMError>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}

#[async_trait]
impl LLM for Box<dyn LLM> {
    async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String, LLMError> {
        (**self).complete_with_system(system, prompt).await
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}
