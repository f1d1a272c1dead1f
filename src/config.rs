//! Configuration types for document translation.
//!
//! All pipeline behaviour is controlled through [`TranslationConfig`], built
//! via its [`TranslationConfigBuilder`]. The defaults reproduce the classic
//! setup: `chipperv1` layout model, `openai` / `gpt-3.5-turbo` translation at
//! temperature 0.8, PDF input.

use crate::error::DocTranslateError;
use crate::pipeline::model::LayoutModel;
use crate::pipeline::translate::Translator;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Default layout model name.
pub const DEFAULT_LAYOUT_MODEL: &str = "chipperv1";

/// Default partition-service endpoint.
pub const DEFAULT_LAYOUT_API_URL: &str = "https://api.unstructuredapp.io/general/v0/general";

/// Default translation provider.
pub const DEFAULT_PROVIDER: &str = "openai";

/// Default translation model.
pub const DEFAULT_LLM_MODEL: &str = "gpt-3.5-turbo";

/// Upper bound for [`TranslationConfigBuilder::max_retries`].
pub const MAX_RETRIES: u32 = 10;

/// Kind of input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    #[default]
    Pdf,
    Image,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Image => "image",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = DocTranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(FileType::Pdf),
            "image" => Ok(FileType::Image),
            _ => Err(DocTranslateError::UnsupportedFileType {
                value: s.to_string(),
            }),
        }
    }
}

/// Default fonts applied to the output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStyle {
    /// Latin font of the `Normal` style.
    pub font_name: String,
    /// East-Asian font of the `Normal` style.
    pub east_asia_font: String,
    /// Body font size in points.
    pub font_size_pt: usize,
}

impl Default for DocumentStyle {
    fn default() -> Self {
        Self {
            font_name: "Times New Roman".to_string(),
            east_asia_font: "宋体".to_string(),
            font_size_pt: 10,
        }
    }
}

/// Configuration for a document translation run.
///
/// Built via [`TranslationConfig::builder()`].
///
/// # Example
/// ```rust
/// use doc_translate::{FileType, TranslationConfig};
///
/// let config = TranslationConfig::builder()
///     .source_lang("English")
///     .target_lang("French")
///     .file_type(FileType::Pdf)
///     .build()
///     .unwrap();
/// assert_eq!(config.layout_model_name, "chipperv1");
/// ```
#[derive(Clone)]
pub struct TranslationConfig {
    /// Language tag of the input document, passed verbatim to the provider.
    pub source_lang: String,

    /// Language tag to translate into.
    pub target_lang: String,

    /// Kind of input. Default: [`FileType::Pdf`].
    pub file_type: FileType,

    // ── Layout ───────────────────────────────────────────────────────────
    /// Layout model name. Default: `chipperv1`. `vlm:<model>` selects the
    /// vision backend.
    pub layout_model_name: String,

    /// Pre-constructed layout model. Takes precedence over `layout_model_name`.
    pub layout_model: Option<Arc<dyn LayoutModel>>,

    /// Ask the partition service to infer table structure. Default: true.
    pub extract_tables: bool,

    /// Partition-service endpoint.
    pub layout_api_url: String,

    /// Partition-service API key, sent as `unstructured-api-key`.
    pub layout_api_key: Option<String>,

    /// Timeout for one partition request in seconds. Default: 300.
    pub layout_timeout_secs: u64,

    /// Rasterisation DPI for the vision backend. Range: 72–400. Default: 150.
    pub dpi: u32,

    /// Longest rendered edge in pixels for the vision backend. Default: 2000.
    pub max_rendered_pixels: u32,

    /// PDF user password (vision backend).
    pub password: Option<String>,

    // ── Translation ──────────────────────────────────────────────────────
    /// Provider name handed to `ProviderFactory`. Default: `openai`.
    pub provider_name: String,

    /// LLM model identifier. Default: `gpt-3.5-turbo`.
    pub model: String,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Pre-constructed translator. Takes precedence over `provider`.
    pub translator: Option<Arc<dyn Translator>>,

    /// Sampling temperature. Default: 0.8.
    pub temperature: f32,

    /// Maximum tokens per translation reply. Default: 2048.
    pub max_tokens: usize,

    /// Retries per element after a failed provider call. Default: 3.
    /// The builder caps it at [`MAX_RETRIES`].
    ///
    /// The delay doubles after each attempt starting at `retry_backoff_ms`.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds. Default: 500.
    pub retry_backoff_ms: u64,

    /// Custom translation system prompt. If None, uses the built-in one.
    pub system_prompt: Option<String>,

    /// Write the translated layout here after every page and resume from it.
    pub checkpoint_path: Option<PathBuf>,

    // ── Output ───────────────────────────────────────────────────────────
    /// Fonts of the generated document.
    pub document_style: DocumentStyle,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional progress callback. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_lang: String::new(),
            target_lang: String::new(),
            file_type: FileType::default(),
            layout_model_name: DEFAULT_LAYOUT_MODEL.to_string(),
            layout_model: None,
            extract_tables: true,
            layout_api_url: DEFAULT_LAYOUT_API_URL.to_string(),
            layout_api_key: None,
            layout_timeout_secs: 300,
            dpi: 150,
            max_rendered_pixels: 2000,
            password: None,
            provider_name: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            provider: None,
            translator: None,
            temperature: 0.8,
            max_tokens: 2048,
            max_retries: 3,
            retry_backoff_ms: 500,
            system_prompt: None,
            checkpoint_path: None,
            document_style: DocumentStyle::default(),
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for TranslationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationConfig")
            .field("source_lang", &self.source_lang)
            .field("target_lang", &self.target_lang)
            .field("file_type", &self.file_type)
            .field("layout_model_name", &self.layout_model_name)
            .field("layout_model", &self.layout_model.as_ref().map(|m| m.name().to_string()))
            .field("extract_tables", &self.extract_tables)
            .field("layout_api_url", &self.layout_api_url)
            .field("layout_api_key", &self.layout_api_key.as_ref().map(|_| "<redacted>"))
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("translator", &self.translator.as_ref().map(|t| t.name().to_string()))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("checkpoint_path", &self.checkpoint_path)
            .field("document_style", &self.document_style)
            .finish()
    }
}

impl TranslationConfig {
    /// Create a new builder for `TranslationConfig`.
    pub fn builder() -> TranslationConfigBuilder {
        TranslationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`TranslationConfig`].
#[derive(Debug)]
pub struct TranslationConfigBuilder {
    config: TranslationConfig,
}

impl TranslationConfigBuilder {
    pub fn source_lang(mut self, lang: impl Into<String>) -> Self {
        self.config.source_lang = lang.into();
        self
    }

    pub fn target_lang(mut self, lang: impl Into<String>) -> Self {
        self.config.target_lang = lang.into();
        self
    }

    pub fn file_type(mut self, file_type: FileType) -> Self {
        self.config.file_type = file_type;
        self
    }

    pub fn layout_model_name(mut self, name: impl Into<String>) -> Self {
        self.config.layout_model_name = name.into();
        self
    }

    pub fn layout_model(mut self, model: Arc<dyn LayoutModel>) -> Self {
        self.config.layout_model = Some(model);
        self
    }

    pub fn extract_tables(mut self, v: bool) -> Self {
        self.config.extract_tables = v;
        self
    }

    pub fn layout_api_url(mut self, url: impl Into<String>) -> Self {
        self.config.layout_api_url = url.into();
        self
    }

    pub fn layout_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.layout_api_key = Some(key.into());
        self
    }

    pub fn layout_timeout_secs(mut self, secs: u64) -> Self {
        self.config.layout_timeout_secs = secs.max(1);
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = name.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.config.translator = Some(translator);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n.min(MAX_RETRIES);
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn checkpoint_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.checkpoint_path = Some(path.into());
        self
    }

    pub fn document_style(mut self, style: DocumentStyle) -> Self {
        self.config.document_style = style;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<TranslationConfig, DocTranslateError> {
        let c = &self.config;
        if c.source_lang.trim().is_empty() {
            return Err(DocTranslateError::InvalidConfig(
                "source language must not be empty".into(),
            ));
        }
        if c.target_lang.trim().is_empty() {
            return Err(DocTranslateError::InvalidConfig(
                "target language must not be empty".into(),
            ));
        }
        if c.layout_model.is_none() && c.layout_model_name.trim().is_empty() {
            return Err(DocTranslateError::InvalidConfig(
                "layout model name must not be empty".into(),
            ));
        }
        if c.document_style.font_size_pt == 0 {
            return Err(DocTranslateError::InvalidConfig(
                "font size must be ≥ 1pt".into(),
            ));
        }
        Ok(self.config)
    }
}
