//! Vision-LLM layout backend (`vlm:<model>`).
//!
//! Each page is rasterised ([`crate::pipeline::raster`]), PNG-encoded
//! ([`crate::pipeline::encode`]) and shown to a vision model together with
//! [`LAYOUT_SYSTEM_PROMPT`]. The model answers with a JSON object listing
//! the page's regions, which is decoded into [`LayoutElement`]s.
//!
//! Pages are sent one at a time, in order. A page whose reply is not valid
//! JSON aborts detection with [`DocTranslateError::LayoutParseFailed`].

use crate::config::{FileType, TranslationConfig};
use crate::error::DocTranslateError;
use crate::layout::{BoundingBox, LayoutDocument, LayoutElement, PageLayout};
use crate::pipeline::model::{LayoutModel, VISION_PREFIX};
use crate::pipeline::postprocess::strip_code_fences;
use crate::pipeline::raster::{self, RasterOptions};
use crate::pipeline::{encode, translate};
use crate::prompts::LAYOUT_SYSTEM_PROMPT;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Layout model backed by a vision-capable LLM.
pub struct VisionLayoutModel {
    name: String,
    provider: Arc<dyn LLMProvider>,
    raster: RasterOptions,
}

impl VisionLayoutModel {
    /// Build the backend for `llm_model` using the configured provider.
    pub fn new(llm_model: String, config: &TranslationConfig) -> Result<Self, DocTranslateError> {
        let provider = match config.provider {
            Some(ref p) => Arc::clone(p),
            None => translate::create_provider(&config.provider_name, &llm_model)?,
        };
        Ok(Self::with_provider(llm_model, provider, config))
    }

    pub fn with_provider(
        llm_model: String,
        provider: Arc<dyn LLMProvider>,
        config: &TranslationConfig,
    ) -> Self {
        Self {
            name: format!("{VISION_PREFIX}{llm_model}"),
            provider,
            raster: RasterOptions {
                dpi: config.dpi,
                max_rendered_pixels: config.max_rendered_pixels,
                password: config.password.clone(),
            },
        }
    }

    async fn detect_page(
        &self,
        page: usize,
        image: &image::DynamicImage,
    ) -> Result<Vec<LayoutElement>, DocTranslateError> {
        let image_data = encode::encode_page(page + 1, image)?;
        let messages = vec![
            ChatMessage::system(LAYOUT_SYSTEM_PROMPT),
            ChatMessage::user_with_images("", vec![image_data]),
        ];
        let options = CompletionOptions {
            temperature: Some(0.0),
            max_tokens: Some(4096),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| DocTranslateError::LayoutRequestFailed {
                endpoint: self.name.clone(),
                detail: e.to_string(),
            })?;
        debug!(
            "Page {}: {} input tokens, {} output tokens",
            page + 1,
            response.prompt_tokens,
            response.completion_tokens
        );

        parse_vision_reply(page + 1, &response.content, &self.name)
    }
}

#[async_trait]
impl LayoutModel for VisionLayoutModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn detect(
        &self,
        path: &Path,
        file_type: FileType,
    ) -> Result<LayoutDocument, DocTranslateError> {
        let images = match file_type {
            FileType::Pdf => raster::render_pdf_pages(path, &self.raster).await?,
            FileType::Image => {
                raster::load_image_page(path, self.raster.max_rendered_pixels).await?
            }
        };
        info!("Detecting layout of {} pages with {}", images.len(), self.name);

        let mut doc = LayoutDocument::default();
        for (page_number, image) in &images {
            let layout_elements = self.detect_page(*page_number, image).await?;
            doc.pages.push(PageLayout {
                page_number: *page_number,
                layout_elements,
            });
        }
        Ok(doc)
    }
}

#[derive(Debug, Deserialize)]
struct VisionReply {
    #[serde(default)]
    elements: Vec<VisionElement>,
}

#[derive(Debug, Deserialize)]
struct VisionElement {
    #[serde(rename = "type")]
    element_type: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    bbox: Option<[f64; 4]>,
    #[serde(default)]
    prob: Option<f64>,
}

/// Decode a vision reply for 1-indexed `page`. A bare JSON array is
/// accepted as well as the `{"elements": [...]}` object the prompt asks for.
fn parse_vision_reply(
    page: usize,
    content: &str,
    source: &str,
) -> Result<Vec<LayoutElement>, DocTranslateError> {
    let json = strip_code_fences(content);
    let elements = if json.trim_start().starts_with('[') {
        serde_json::from_str::<Vec<VisionElement>>(&json)
    } else {
        serde_json::from_str::<VisionReply>(&json).map(|r| r.elements)
    }
    .map_err(|e| DocTranslateError::LayoutParseFailed {
        page,
        detail: e.to_string(),
    })?;

    Ok(elements
        .into_iter()
        .map(|v| LayoutElement {
            element_type: v.element_type,
            text: v.text,
            bbox: v
                .bbox
                .map(|[x1, y1, x2, y2]| BoundingBox::new(x1, y1, x2, y2))
                .unwrap_or_default(),
            source: source.to_string(),
            prob: v.prob,
            image_path: None,
            parent: None,
            translated_text: None,
        })
        .collect())
}
