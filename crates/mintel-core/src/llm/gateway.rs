//! Credential-driven backend selection.

use async_trait::async_trait;
use std::time::Duration;

use super::{
    AnthropicProvider, GeminiProvider, GenerateOptions, LlmError, LlmProvider, OpenAiProvider,
    ProviderKind,
};

const ENV_PREFERRED_PROVIDER: &str = "MINTEL_LLM_PROVIDER";

/// Configured backends in priority order, plus an optional preferred one.
#[derive(Default)]
pub struct LlmGateway {
    backends: Vec<(ProviderKind, Box<dyn LlmProvider>)>,
    preferred: Option<ProviderKind>,
}

impl LlmGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `ANTHROPIC_API_KEY` / `OPENAI_API_KEY` / `GEMINI_API_KEY`; blank keys count as
    /// unset. `MINTEL_LLM_PROVIDER` names a preferred backend.
    pub fn from_env(timeout: Duration) -> Self {
        let mut gateway = Self::new();
        for kind in ProviderKind::PRIORITY {
            let Some(key) = std::env::var(kind.api_key_var())
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
            else {
                continue;
            };
            let backend: Box<dyn LlmProvider> = match kind {
                ProviderKind::Anthropic => Box::new(AnthropicProvider::new(key, timeout)),
                ProviderKind::OpenAi => Box::new(OpenAiProvider::new(key, timeout)),
                ProviderKind::Gemini => Box::new(GeminiProvider::new(key, timeout)),
            };
            gateway = gateway.with_backend(kind, backend);
        }

        if let Ok(raw) = std::env::var(ENV_PREFERRED_PROVIDER) {
            match raw.parse::<ProviderKind>() {
                Ok(kind) => gateway = gateway.prefer(kind),
                Err(e) => tracing::warn!(target: "mintel::llm", error = %e, "Ignoring {}", ENV_PREFERRED_PROVIDER),
            }
        }
        gateway
    }

    /// Register a backend. A second backend for the same kind replaces the first.
    pub fn with_backend(mut self, kind: ProviderKind, backend: Box<dyn LlmProvider>) -> Self {
        self.backends.retain(|(k, _)| *k != kind);
        self.backends.push((kind, backend));
        self.backends.sort_by_key(|(k, _)| {
            ProviderKind::PRIORITY
                .iter()
                .position(|p| p == k)
                .unwrap_or(usize::MAX)
        });
        self
    }

    /// Use `kind` ahead of the priority order when it is configured.
    pub fn prefer(mut self, kind: ProviderKind) -> Self {
        self.preferred = Some(kind);
        self
    }

    /// Backend a call without `options.provider` would use.
    pub fn active_provider(&self) -> Option<ProviderKind> {
        self.preferred
            .filter(|p| self.backend(*p).is_some())
            .or_else(|| self.backends.first().map(|(k, _)| *k))
    }

    pub fn is_configured(&self) -> bool {
        !self.backends.is_empty()
    }

    fn backend(&self, kind: ProviderKind) -> Option<&dyn LlmProvider> {
        self.backends
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, b)| b.as_ref())
    }
}

#[async_trait]
impl LlmProvider for LlmGateway {
    fn name(&self) -> &str {
        self.active_provider()
            .map(|k| k.as_str())
            .unwrap_or("none")
    }

    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, LlmError> {
        let kind = match options.provider {
            Some(kind) => kind,
            None => self.active_provider().ok_or(LlmError::NotConfigured)?,
        };
        let backend = self
            .backend(kind)
            .ok_or(LlmError::ProviderNotConfigured(kind))?;
        tracing::debug!(target: "mintel::llm", provider = %kind, prompt_chars = prompt.len(), "Generating");
        backend.generate(prompt, options).await
    }
}
