//! The model capability: translation, summarisation and scoring.
//!
//! The text-recovery core never talks to a model directly. It is handed a
//! [`ModelClient`], which keeps it testable without network access: tests
//! inject a canned client, production code gets a [`ProviderClient`] backed
//! by an `edgequake-llm` provider.
//!
//! ## Retry strategy
//!
//! Each call is wrapped in the configured timeout and retried with
//! exponential backoff (`retry_backoff_ms * 2^attempt`): with a 500 ms base
//! and 3 retries the waits are 500 ms → 1 s → 2 s.

use crate::config::ProcessingConfig;
use crate::error::{ModelError, PdfTextError};
use crate::prompts::TRANSLATION_PROMPT;
use crate::report::{parse_score, PlagiarismScore};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, info, warn};

/// Model used when a provider is named without a model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// A text-in, text-out model.
///
/// Only [`complete`](ModelClient::complete) is required; the stage methods
/// are built on it.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// One completion: `system` sets the task, `user` carries the content.
    async fn complete(&self, system: &str, user: &str) -> Result<String, ModelError>;

    /// Translate Devanagari text to English.
    async fn translate(&self, text: &str) -> Result<String, ModelError> {
        self.complete(TRANSLATION_PROMPT, text).await
    }

    /// Apply `instructions` to `text`.
    async fn summarize(&self, text: &str, instructions: &str) -> Result<String, ModelError> {
        self.complete(instructions, text).await
    }

    /// Score `text` against `rubric`.
    async fn score(&self, text: &str, rubric: &str) -> Result<PlagiarismScore, ModelError> {
        let reply = self.complete(rubric, text).await?;
        parse_score(&reply)
    }
}

/// Result of [`translate`]: the translation, or the untranslated text and
/// the reason translation failed.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationOutcome {
    pub text: String,
    pub error: Option<ModelError>,
}

/// Translate `text`, falling back to the input when the model call fails.
///
/// Never returns an error: a failed translation still leaves a usable
/// document.
pub async fn translate(client: &dyn ModelClient, text: &str) -> TranslationOutcome {
    if text.trim().is_empty() {
        return TranslationOutcome {
            text: text.to_string(),
            error: None,
        };
    }
    let start = Instant::now();
    match client.translate(text).await {
        Ok(translated) => {
            debug!(
                "Translated {} chars in {:?}",
                text.chars().count(),
                start.elapsed()
            );
            TranslationOutcome {
                text: translated.trim().to_string(),
                error: None,
            }
        }
        Err(e) => {
            warn!("Translation failed, keeping untranslated text: {}", e);
            TranslationOutcome {
                text: text.to_string(),
                error: Some(e),
            }
        }
    }
}

// ── Provider-backed client ───────────────────────────────────────────────

/// Call settings of a [`ProviderClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub temperature: f32,
    pub max_tokens: usize,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub api_timeout_secs: u64,
}

impl ModelSettings {
    pub fn from_config(config: &ProcessingConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
            api_timeout_secs: config.api_timeout_secs,
        }
    }

    fn options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }
}

/// [`ModelClient`] over an `edgequake-llm` provider.
pub struct ProviderClient {
    provider: Arc<dyn LLMProvider>,
    settings: ModelSettings,
}

impl ProviderClient {
    pub fn new(provider: Arc<dyn LLMProvider>, settings: ModelSettings) -> Self {
        Self { provider, settings }
    }
}

#[async_trait]
impl ModelClient for ProviderClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ModelError> {
        let messages = vec![ChatMessage::system(system), ChatMessage::user(user)];
        let options = self.settings.options();
        let limit = Duration::from_secs(self.settings.api_timeout_secs);
        let max_retries = self.settings.max_retries;

        let mut last_err = ModelError::RequestFailed {
            retries: 0,
            detail: "no attempt made".to_string(),
        };

        for attempt in 0..=max_retries {
            if attempt > 0 {
                let backoff = backoff_ms(self.settings.retry_backoff_ms, attempt);
                warn!(
                    "Model call: retry {}/{} after {}ms",
                    attempt, max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            match timeout(limit, self.provider.chat(&messages, Some(&options))).await {
                Ok(Ok(response)) => {
                    debug!(
                        "Model call: {} input tokens, {} output tokens",
                        response.prompt_tokens, response.completion_tokens
                    );
                    if response.content.trim().is_empty() {
                        return Err(ModelError::InvalidResponse(
                            "model returned an empty response".into(),
                        ));
                    }
                    return Ok(response.content);
                }
                Ok(Err(e)) => {
                    warn!("Model call: attempt {} failed: {}", attempt + 1, e);
                    last_err = ModelError::RequestFailed {
                        retries: max_retries,
                        detail: e.to_string(),
                    };
                }
                Err(_) => {
                    warn!(
                        "Model call: attempt {} timed out after {}s",
                        attempt + 1,
                        self.settings.api_timeout_secs
                    );
                    last_err = ModelError::Timeout {
                        secs: self.settings.api_timeout_secs,
                    };
                }
            }
        }

        Err(last_err)
    }
}

// ── Client resolution ────────────────────────────────────────────────────

/// Default model for a named provider.
pub fn default_model_for(provider: &str) -> &'static str {
    match provider {
        "openai" => "gpt-4.1-nano",
        "anthropic" => "claude-sonnet-4-20250514",
        _ => DEFAULT_MODEL,
    }
}

fn create_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, PdfTextError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        PdfTextError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the model client, from most-specific to least-specific:
///
/// 1. the injected `config.client`
/// 2. `config.provider_name` with `config.model` (or that provider's default)
/// 3. `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL` when both are set
/// 4. OpenAI when `OPENAI_API_KEY` is set
/// 5. `ProviderFactory::from_env()` auto-detection
pub fn resolve_client(config: &ProcessingConfig) -> Result<Arc<dyn ModelClient>, PdfTextError> {
    if let Some(ref client) = config.client {
        return Ok(Arc::clone(client));
    }

    let provider = resolve_provider(config)?;
    info!(
        "Model provider resolved ({})",
        config.provider_name.as_deref().unwrap_or("auto")
    );
    Ok(Arc::new(ProviderClient::new(
        provider,
        ModelSettings::from_config(config),
    )))
}

fn resolve_provider(config: &ProcessingConfig) -> Result<Arc<dyn LLMProvider>, PdfTextError> {
    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(default_model_for(name));
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(default_model_for("openai"));
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| PdfTextError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY, OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

/// Delay before retry `attempt` (1-based): `base * 2^(attempt-1)`, saturating.
fn backoff_ms(base: u64, attempt: u32) -> u64 {
    base.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)))
}
