//! Anthropic Messages API backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{check_status, http_client, GenerateOptions, LlmError, LlmProvider, ProviderKind};

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const API_BASE: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api_key: api_key.into().trim().to_string(),
            base_url: API_BASE.to_string(),
            client: http_client(timeout),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        ProviderKind::Anthropic.as_str()
    }

    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, LlmError> {
        let body = MessagesRequest {
            model: options.model_or(DEFAULT_MODEL),
            max_tokens: options.max_tokens(),
            temperature: options.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };
        let res = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|source| LlmError::Http {
                provider: ProviderKind::Anthropic,
                source,
            })?;
        let res = check_status(ProviderKind::Anthropic, res).await?;
        let parsed: MessagesResponse = res.json().await.map_err(|source| LlmError::Http {
            provider: ProviderKind::Anthropic,
            source,
        })?;

        let text = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(text),
                ResponseBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n");
        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse(ProviderKind::Anthropic));
        }
        Ok(text)
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}
