//! OpenAI Chat Completions backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{check_status, http_client, GenerateOptions, LlmError, LlmProvider, ProviderKind};

pub const DEFAULT_MODEL: &str = "gpt-4o";
const API_BASE: &str = "https://api.openai.com/v1";

// OpenAI-compatible request/response
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: String,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api_key: api_key.into().trim().to_string(),
            base_url: API_BASE.to_string(),
            client: http_client(timeout),
        }
    }

    /// Base URL up to and including the API version (default `https://api.openai.com/v1`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        ProviderKind::OpenAi.as_str()
    }

    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: options.model_or(DEFAULT_MODEL),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: options.temperature,
            max_tokens: options.max_tokens(),
        };
        let res = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|source| LlmError::Http {
                provider: ProviderKind::OpenAi,
                source,
            })?;
        let res = check_status(ProviderKind::OpenAi, res).await?;
        let parsed: ChatResponse = res.json().await.map_err(|source| LlmError::Http {
            provider: ProviderKind::OpenAi,
            source,
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or(LlmError::EmptyResponse(ProviderKind::OpenAi))
    }
}
