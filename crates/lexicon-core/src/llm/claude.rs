use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{LLMError, LLM};
use crate::config::{
    DEFAULT_ANTHROPIC_API_VERSION, DEFAULT_ANTHROPIC_MODEL, DEFAULT_ANTHROPIC_URL,
    DEFAULT_MAX_TOKENS,
};

/// Anthropic messages API client.
pub struct ClaudeClient {
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
    client: Client,
}

impl ClaudeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_ANTHROPIC_URL.to_string(),
            model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            client: Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the API URL (for proxies).
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

#[async_trait]
impl LLM for ClaudeClient {
    async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String, LLMError> {
        let request = ClaudeRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", DEFAULT_ANTHROPIC_API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if status == 429 {
            return Err(LLMError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LLMError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        Ok(parsed.text())
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
}

impl ClaudeResponse {
    /// Concatenated text blocks.
    fn text(self) -> String {
        self.content
            .into_iter()
            .filter(|block| block.content_type == "text")
            .map(|block| block.text)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}
