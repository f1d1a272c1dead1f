//! Partition-service layout backend.
//!
//! Sends the whole input file to an Unstructured-compatible
//! `general/v0/general` endpoint with the `hi_res` strategy and the chosen
//! detection model, then reshapes the flat element list it returns into a
//! [`LayoutDocument`].
//!
//! ## Response shape
//!
//! ```json
//! [
//!   {
//!     "type": "Title",
//!     "element_id": "5ef1d1117721f0472c1ad825991d7d37",
//!     "text": "Attention Is All You Need",
//!     "metadata": {
//!       "page_number": 1,
//!       "parent_id": null,
//!       "detection_class_prob": 0.91,
//!       "coordinates": { "points": [[x1, y1], [x1, y2], [x2, y2], [x2, y1]] }
//!     }
//!   }
//! ]
//! ```
//!
//! Elements are grouped by `page_number` in order of first appearance;
//! within a page the service's order is kept.

use crate::config::{FileType, TranslationConfig};
use crate::error::DocTranslateError;
use crate::layout::{BoundingBox, LayoutDocument, LayoutElement, PageLayout};
use crate::pipeline::input::read_error;
use crate::pipeline::model::LayoutModel;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Layout model served by a partition service.
pub struct UnstructuredModel {
    model_name: String,
    endpoint: String,
    api_key: Option<String>,
    extract_tables: bool,
    client: reqwest::Client,
}

impl UnstructuredModel {
    pub fn new(
        model_name: impl Into<String>,
        config: &TranslationConfig,
    ) -> Result<Self, DocTranslateError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.layout_timeout_secs))
            .build()
            .map_err(|e| DocTranslateError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            model_name: model_name.into(),
            endpoint: config.layout_api_url.clone(),
            api_key: config.layout_api_key.clone(),
            extract_tables: config.extract_tables,
            client,
        })
    }

    fn form(&self, file_name: String, bytes: Vec<u8>) -> Form {
        Form::new()
            .part("files", Part::bytes(bytes).file_name(file_name))
            .text("strategy", "hi_res")
            .text("hi_res_model_name", self.model_name.clone())
            .text("coordinates", "true")
            .text("pdf_infer_table_structure", self.extract_tables.to_string())
    }
}

#[async_trait]
impl LayoutModel for UnstructuredModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn detect(
        &self,
        path: &Path,
        file_type: FileType,
    ) -> Result<LayoutDocument, DocTranslateError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| read_error(path, &e))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("input.{}", default_extension(file_type)));

        info!(
            "Partitioning {} ({} bytes) with {} at {}",
            file_name,
            bytes.len(),
            self.model_name,
            self.endpoint
        );

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("accept", "application/json")
            .multipart(self.form(file_name, bytes));
        if let Some(ref key) = self.api_key {
            request = request.header("unstructured-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DocTranslateError::LayoutRequestFailed {
                endpoint: self.endpoint.clone(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DocTranslateError::LayoutRequestFailed {
                endpoint: self.endpoint.clone(),
                detail: e.to_string(),
            })?;

        if !status.is_success() {
            return Err(DocTranslateError::LayoutApiError {
                status: status.as_u16(),
                body: truncate(&body, 500),
            });
        }

        let elements: Vec<ApiElement> =
            serde_json::from_str(&body).map_err(|e| DocTranslateError::LayoutParseFailed {
                page: 0,
                detail: e.to_string(),
            })?;
        debug!("Partition service returned {} elements", elements.len());

        Ok(group_by_page(elements, &self.model_name))
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct ApiElement {
    #[serde(rename = "type")]
    element_type: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    metadata: ApiMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct ApiMetadata {
    page_number: Option<usize>,
    parent_id: Option<String>,
    detection_class_prob: Option<f64>,
    image_path: Option<String>,
    coordinates: Option<ApiCoordinates>,
}

#[derive(Debug, Deserialize)]
struct ApiCoordinates {
    #[serde(default)]
    points: Vec<[f64; 2]>,
}

/// Reshape the flat element list into pages.
///
/// Service page numbers are 1-indexed; [`PageLayout::page_number`] is
/// 0-indexed. Elements without a page number stay on the current page.
pub(crate) fn group_by_page(elements: Vec<ApiElement>, source: &str) -> LayoutDocument {
    let mut doc = LayoutDocument::default();

    for api in elements {
        let page_number = match api.metadata.page_number {
            Some(n) => n.saturating_sub(1),
            None => doc.pages.last().map(|p| p.page_number).unwrap_or(0),
        };

        let page_idx = match doc.pages.iter().position(|p| p.page_number == page_number) {
            Some(idx) => idx,
            None => {
                doc.pages.push(PageLayout {
                    page_number,
                    layout_elements: Vec::new(),
                });
                doc.pages.len() - 1
            }
        };

        let bbox = api
            .metadata
            .coordinates
            .as_ref()
            .and_then(|c| BoundingBox::from_points(&c.points))
            .unwrap_or_default();

        doc.pages[page_idx].layout_elements.push(LayoutElement {
            element_type: api.element_type,
            text: api.text,
            bbox,
            source: source.to_string(),
            prob: api.metadata.detection_class_prob,
            image_path: api.metadata.image_path,
            parent: api.metadata.parent_id,
            translated_text: None,
        });
    }

    doc
}

fn default_extension(file_type: FileType) -> &'static str {
    match file_type {
        FileType::Pdf => "pdf",
        FileType::Image => "png",
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{cut}\u{2026}")
    }
}
