//! Translation stage: one provider call per element, in document order.
//!
//! [`translate_layout`] walks every page and element sequentially and
//! attaches exactly one `translated_text` to each. The provider sits behind
//! the [`Translator`] trait; [`LlmTranslator`] is the production
//! implementation over `edgequake-llm`.
//!
//! ## Retry Strategy
//!
//! A failed call is retried up to `max_retries` times with exponential
//! backoff (`retry_backoff_ms * 2^(attempt-1)`): 500 ms → 1 s → 2 s with the
//! defaults. When the retries run out the error aborts the run. With a
//! checkpoint configured, every page finished before the failure is kept.

use crate::config::TranslationConfig;
use crate::error::DocTranslateError;
use crate::layout::LayoutDocument;
use crate::pipeline::checkpoint;
use crate::pipeline::postprocess::clean_translation;
use crate::prompts::{translation_request, TRANSLATION_SYSTEM_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// Translates one piece of text between two language tags.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Provider name used in logs and errors.
    fn name(&self) -> &str;

    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, DocTranslateError>;
}

/// [`Translator`] backed by an LLM chat-completion provider.
pub struct LlmTranslator {
    name: String,
    provider: Arc<dyn LLMProvider>,
    system_prompt: String,
    options: CompletionOptions,
}

impl LlmTranslator {
    pub fn new(name: impl Into<String>, provider: Arc<dyn LLMProvider>, config: &TranslationConfig) -> Self {
        Self {
            name: name.into(),
            provider,
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| TRANSLATION_SYSTEM_PROMPT.to_string()),
            options: build_options(config),
        }
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, DocTranslateError> {
        let messages = vec![
            ChatMessage::system(&self.system_prompt),
            ChatMessage::user(translation_request(text, source_lang, target_lang)),
        ];

        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(|e| DocTranslateError::ProviderCallFailed {
                provider: self.name.clone(),
                detail: e.to_string(),
            })?;
        debug!(
            "{} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );

        Ok(clean_translation(&response.content))
    }
}

/// Build `CompletionOptions` from the translation config.
fn build_options(config: &TranslationConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Instantiate a named provider with the given model.
pub fn create_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, DocTranslateError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        DocTranslateError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the translator, from most-specific to least-specific:
///
/// 1. **Pre-built translator** (`config.translator`)
/// 2. **Pre-built provider** (`config.provider`) wrapped in [`LlmTranslator`]
/// 3. **Named provider + model** via [`ProviderFactory::create_llm_provider`],
///    which reads the matching API key (`OPENAI_API_KEY`, ...) from the
///    environment
pub fn resolve_translator(
    config: &TranslationConfig,
) -> Result<Arc<dyn Translator>, DocTranslateError> {
    if let Some(ref translator) = config.translator {
        return Ok(Arc::clone(translator));
    }

    info!(
        "Getting provider for LLM: {} ({})",
        config.provider_name, config.model
    );
    let provider = match config.provider {
        Some(ref p) => Arc::clone(p),
        None => create_provider(&config.provider_name, &config.model)?,
    };
    Ok(Arc::new(LlmTranslator::new(
        config.provider_name.clone(),
        provider,
        config,
    )))
}

/// Counters reported by [`translate_layout`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationStats {
    /// Elements translated by a provider call in this run.
    pub translated: usize,
    /// Elements whose translation was restored from a checkpoint.
    pub reused: usize,
    /// Elements with no text; given an empty translation without a call.
    pub empty: usize,
    /// Provider calls made, retries included.
    pub provider_calls: usize,
}

/// Translate every element of `layout` in place.
///
/// Elements that already carry a translation are left untouched, which
/// makes a second call on the same document a no-op.
pub async fn translate_layout(
    layout: &mut LayoutDocument,
    translator: &dyn Translator,
    config: &TranslationConfig,
) -> Result<TranslationStats, DocTranslateError> {
    info!(
        "Translating layout from {} to {} using provider: {}",
        config.source_lang,
        config.target_lang,
        translator.name()
    );

    let mut stats = TranslationStats::default();
    if let Some(ref path) = config.checkpoint_path {
        stats.reused = checkpoint::restore(layout, path).await?;
    }

    let total_pages = layout.pages.len();
    let progress = config.progress_callback.as_ref();

    for page_idx in 0..total_pages {
        let page_number = layout.pages[page_idx].page_number;
        if let Some(cb) = progress {
            cb.on_page_start(page_number, total_pages);
        }

        for element_idx in 0..layout.pages[page_idx].layout_elements.len() {
            let element = &mut layout.pages[page_idx].layout_elements[element_idx];

            if element.translated_text.is_none() {
                if element.has_text() {
                    let (translated, calls) = translate_with_retry(
                        translator,
                        &element.text,
                        config,
                        page_number,
                        element_idx,
                    )
                    .await?;
                    stats.provider_calls += calls;
                    stats.translated += 1;
                    element.translated_text = Some(translated);
                } else {
                    stats.empty += 1;
                    element.translated_text = Some(String::new());
                }
            }

            if let Some(cb) = progress {
                let chars = element
                    .translated_text
                    .as_deref()
                    .map(|t| t.chars().count())
                    .unwrap_or(0);
                cb.on_element_translated(page_number, element_idx, chars);
            }
        }

        if let Some(ref path) = config.checkpoint_path {
            checkpoint::save(layout, path).await?;
        }
        if let Some(cb) = progress {
            cb.on_page_complete(page_number, total_pages);
        }
    }

    info!(
        "Translation done: {} translated, {} reused, {} empty, {} provider calls",
        stats.translated, stats.reused, stats.empty, stats.provider_calls
    );
    Ok(stats)
}

/// Delay before retry number `attempt` (1-based). Saturates instead of
/// overflowing for large attempt counts.
fn backoff_ms(base_ms: u64, attempt: u32) -> u64 {
    base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)))
}

/// One element, with retry. Returns the translation and the number of
/// calls it took.
async fn translate_with_retry(
    translator: &dyn Translator,
    text: &str,
    config: &TranslationConfig,
    page_number: usize,
    element_idx: usize,
) -> Result<(String, usize), DocTranslateError> {
    let mut last_err: Option<String> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = backoff_ms(config.retry_backoff_ms, attempt);
            warn!(
                "Page {} element {}: retry {}/{} after {}ms",
                page_number, element_idx, attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match translator
            .translate(text, &config.source_lang, &config.target_lang)
            .await
        {
            Ok(translated) => {
                debug!(
                    "Page {} element {}: {} → {} chars",
                    page_number,
                    element_idx,
                    text.chars().count(),
                    translated.chars().count()
                );
                return Ok((translated, attempt as usize + 1));
            }
            Err(e) => {
                warn!(
                    "Page {} element {}: attempt {} failed: {}",
                    page_number,
                    element_idx,
                    attempt + 1,
                    e
                );
                last_err = Some(e.to_string());
            }
        }
    }

    Err(DocTranslateError::TranslationFailed {
        page: page_number,
        element: element_idx,
        retries: config.max_retries,
        detail: last_err.unwrap_or_else(|| "Unknown error".to_string()),
    })
}
