use super::{ClaudeClient, LLMError, OpenAIClient, LLM};
use crate::config::LLMConfig;

/// LLM provider selection.
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI-compatible endpoint (default)
    OpenAI {
        base_url: String,
        api_key: Option<String>,
        model: String,
    },
    /// Anthropic Claude
    Anthropic {
        api_url: String,
        api_key: Option<String>,
        model: String,
    },
    /// Local Ollama instance
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Resolves a provider from config, filling URL, model and key from
    /// defaults and the environment.
    pub fn from_config(config: &LLMConfig) -> Result<Self, LLMError> {
        let base_url = config.base_url_or_default();
        let model = config.model_or_default();
        let api_key = config.api_key_or_env();

        match config.provider.to_lowercase().as_str() {
            "openai" | "openrouter" | "openai-compatible" => Ok(Provider::OpenAI {
                base_url,
                api_key,
                model,
            }),
            "anthropic" | "claude" => Ok(Provider::Anthropic {
                api_url: base_url,
                api_key,
                model,
            }),
            "ollama" => Ok(Provider::Ollama { base_url, model }),
            other => Err(LLMError::UnknownProvider(other.to_string())),
        }
    }

    /// Creates the client.
    pub fn build(self, max_tokens: u32) -> Result<Box<dyn LLM>, LLMError> {
        match self {
            Provider::OpenAI {
                base_url,
                api_key,
                model,
            } => Ok(Box::new(
                OpenAIClient::new(base_url, api_key.unwrap_or_default(), model)
                    .with_max_tokens(max_tokens),
            )),
            Provider::Anthropic {
                api_url,
                api_key,
                model,
            } => {
                let key = api_key.ok_or(LLMError::MissingApiKey)?;
                Ok(Box::new(
                    ClaudeClient::new(key)
                        .with_api_url(api_url)
                        .with_model(model)
                        .with_max_tokens(max_tokens),
                ))
            }
            Provider::Ollama { base_url, model } => Ok(Box::new(
                OpenAIClient::new(base_url, "", model).with_max_tokens(max_tokens),
            )),
        }
    }
}
