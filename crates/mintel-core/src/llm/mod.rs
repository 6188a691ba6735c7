//! Text generation backends behind one capability: `generate(prompt, options) -> text`.
//!
//! Three HTTP backends (Anthropic Messages, OpenAI Chat Completions, Gemini generateContent)
//! and a [`LlmGateway`] that picks one by credential availability: Anthropic > OpenAI > Gemini.

pub mod anthropic;
pub mod gateway;
pub mod gemini;
pub mod openai;

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub use anthropic::AnthropicProvider;
pub use gateway::LlmGateway;
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

/// Used when neither the caller nor the backend sets a limit.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

/// Backend identity, in selection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
    Gemini,
}

impl ProviderKind {
    pub const PRIORITY: [ProviderKind; 3] = [
        ProviderKind::Anthropic,
        ProviderKind::OpenAi,
        ProviderKind::Gemini,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
        }
    }

    /// Environment variable holding this backend's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => anthropic::DEFAULT_MODEL,
            ProviderKind::OpenAi => openai::DEFAULT_MODEL,
            ProviderKind::Gemini => gemini::DEFAULT_MODEL,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "openai" | "gpt" => Ok(ProviderKind::OpenAi),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            other => Err(LlmError::UnknownProvider(other.to_string())),
        }
    }
}

/// Per-call knobs. Unset fields take the backend's defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateOptions {
    pub model: Option<String>,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Force a backend instead of the gateway's priority choice.
    pub provider: Option<ProviderKind>,
}

impl GenerateOptions {
    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    fn model_or(&self, default: &str) -> String {
        self.model.clone().unwrap_or_else(|| default.to_string())
    }

    fn max_tokens(&self) -> u32 {
        self.max_output_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("No LLM API key found. Set ANTHROPIC_API_KEY, OPENAI_API_KEY, or GEMINI_API_KEY")]
    NotConfigured,

    #[error("{0} was requested but {var} is not set", var = .0.api_key_var())]
    ProviderNotConfigured(ProviderKind),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("{provider} request failed: {source}")]
    Http {
        provider: ProviderKind,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error {status}: {body}")]
    Status {
        provider: ProviderKind,
        status: u16,
        body: String,
    },

    #[error("{0} response contained no text")]
    EmptyResponse(ProviderKind),
}

impl LlmError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, LlmError::Http { source, .. } if source.is_timeout())
    }
}

/// One text-generation capability.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, LlmError>;
}

/// Shared HTTP client with a whole-request timeout. A zero timeout means none.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    let builder = reqwest::Client::builder();
    let builder = if timeout.is_zero() {
        builder
    } else {
        builder.timeout(timeout)
    };
    builder.build().unwrap_or_else(|_| reqwest::Client::new())
}

/// Map a non-success response to [`LlmError::Status`].
pub(crate) async fn check_status(
    provider: ProviderKind,
    res: reqwest::Response,
) -> Result<reqwest::Response, LlmError> {
    if res.status().is_success() {
        return Ok(res);
    }
    let status = res.status().as_u16();
    let body = res.text().await.unwrap_or_default();
    Err(LlmError::Status {
        provider,
        status,
        body,
    })
}
