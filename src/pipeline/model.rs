//! Layout model resolution.
//!
//! A [`LayoutModel`] turns an input file into a [`LayoutDocument`].
//! [`init_model`] resolves the configured model name to a backend:
//!
//! | Name | Backend |
//! |------|---------|
//! | `chipper`, `chipperv1`–`v3`, `yolox*`, `detectron2_*` | [`UnstructuredModel`] (partition service) |
//! | `vlm:<llm-model>` | [`VisionLayoutModel`] (pdfium + vision LLM) |
//!
//! A pre-built model in [`TranslationConfig::layout_model`] bypasses the
//! registry entirely, which is how tests inject a stub.

use crate::config::{FileType, TranslationConfig};
use crate::error::DocTranslateError;
use crate::layout::LayoutDocument;
use crate::pipeline::unstructured::UnstructuredModel;
use crate::pipeline::vision::VisionLayoutModel;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Model names served by the partition service.
pub const HOSTED_MODELS: &[&str] = &[
    "chipper",
    "chipperv1",
    "chipperv2",
    "chipperv3",
    "yolox",
    "yolox_tiny",
    "yolox_quantized",
    "detectron2_onnx",
    "detectron2_lp",
];

/// Prefix selecting the vision-LLM backend.
pub const VISION_PREFIX: &str = "vlm:";

/// A document-layout inference model.
#[async_trait]
pub trait LayoutModel: Send + Sync {
    /// Name used in logs and as the `source` tag of produced elements.
    fn name(&self) -> &str;

    /// Detect the layout of `path`, which has already been validated as
    /// `file_type`.
    async fn detect(
        &self,
        path: &Path,
        file_type: FileType,
    ) -> Result<LayoutDocument, DocTranslateError>;
}

/// Which backend a model name selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSpec {
    Hosted(String),
    Vision(String),
}

/// Classify a model name without constructing anything.
pub fn parse_model_name(name: &str) -> Result<ModelSpec, DocTranslateError> {
    let name = name.trim();
    if let Some(llm_model) = name.strip_prefix(VISION_PREFIX) {
        if llm_model.is_empty() {
            return Err(DocTranslateError::ModelNotFound {
                name: name.to_string(),
                known: HOSTED_MODELS.join(", "),
            });
        }
        return Ok(ModelSpec::Vision(llm_model.to_string()));
    }
    let lower = name.to_ascii_lowercase();
    if HOSTED_MODELS.contains(&lower.as_str()) {
        return Ok(ModelSpec::Hosted(lower));
    }
    Err(DocTranslateError::ModelNotFound {
        name: name.to_string(),
        known: HOSTED_MODELS.join(", "),
    })
}

/// Initialise the layout model named in `config`.
pub fn init_model(config: &TranslationConfig) -> Result<Arc<dyn LayoutModel>, DocTranslateError> {
    if let Some(ref model) = config.layout_model {
        info!("Using pre-built layout model {}", model.name());
        return Ok(Arc::clone(model));
    }

    info!("Initializing model {}", config.layout_model_name);
    match parse_model_name(&config.layout_model_name)? {
        ModelSpec::Hosted(name) => Ok(Arc::new(UnstructuredModel::new(name, config)?)),
        ModelSpec::Vision(llm_model) => Ok(Arc::new(VisionLayoutModel::new(llm_model, config)?)),
    }
}

/// Run layout inference on a resolved input.
pub async fn get_layout(
    model: &dyn LayoutModel,
    path: &Path,
    file_type: FileType,
) -> Result<LayoutDocument, DocTranslateError> {
    info!(
        "Getting layout for {} of type {} with {}",
        path.display(),
        file_type,
        model.name()
    );
    let layout = model.detect(path, file_type).await?;
    info!(
        "Layout parsed: {} pages, {} elements",
        layout.pages.len(),
        layout.total_elements()
    );
    Ok(layout)
}
