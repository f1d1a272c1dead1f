//! End-to-end entry points.
//!
//! [`convert`] runs the three stages strictly in order:
//!
//! 1. layout inference ([`extract_layout`])
//! 2. per-element translation ([`translate_layout`])
//! 3. rendering to `.docx` ([`render_document`])
//!
//! Each stage finishes before the next starts, and elements are handled one
//! at a time in page order, so the output preserves the reading order the
//! layout model reported.

use crate::config::TranslationConfig;
use crate::error::DocTranslateError;
use crate::layout::LayoutDocument;
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::model::{get_layout, init_model};
use crate::pipeline::translate::{resolve_translator, translate_layout};
use crate::pipeline::{checkpoint, input};
use crate::render::render_document;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Translate a document and write `<output_dir>/<output_file>.docx`.
///
/// # Arguments
/// * `input_str`   - local path or HTTP/HTTPS URL of a PDF or image
/// * `output_dir`  - created if missing
/// * `output_file` - file name without the `.docx` extension
/// * `config`      - run configuration
///
/// # Errors
/// Any stage failure aborts the run. In particular one element whose
/// translation still fails after `max_retries` retries returns
/// [`DocTranslateError::TranslationFailed`] and no document is written.
pub async fn convert(
    input_str: impl AsRef<str>,
    output_dir: impl AsRef<Path>,
    output_file: &str,
    config: &TranslationConfig,
) -> Result<ConversionOutput, DocTranslateError> {
    let total_start = Instant::now();

    // ── Step 1: Layout ───────────────────────────────────────────────────
    let layout_start = Instant::now();
    let layout = extract_layout(input_str, config).await?;
    let layout_duration_ms = layout_start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_layout_ready(layout.pages.len(), layout.total_elements());
    }

    // ── Steps 2–3: Translate and render ──────────────────────────────────
    let mut output = translate_and_render(layout, output_dir, output_file, config).await?;
    output.stats.layout_duration_ms = layout_duration_ms;
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Translation complete: {} elements, {} blocks, {}ms total",
        output.stats.total_elements, output.stats.rendered_blocks, output.stats.total_duration_ms
    );
    Ok(output)
}

/// Translate an already extracted layout and render it.
///
/// Useful for re-rendering a layout exported with `--layout-json`, or for
/// callers that run their own layout inference.
pub async fn translate_and_render(
    mut layout: LayoutDocument,
    output_dir: impl AsRef<Path>,
    output_file: &str,
    config: &TranslationConfig,
) -> Result<ConversionOutput, DocTranslateError> {
    let translation_start = Instant::now();
    let translator = resolve_translator(config)?;
    let translation = translate_layout(&mut layout, translator.as_ref(), config).await?;
    let translation_duration_ms = translation_start.elapsed().as_millis() as u64;

    let render_start = Instant::now();
    let report = render_document(
        &layout,
        output_dir.as_ref(),
        output_file,
        &config.document_style,
    )
    .await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(report.rendered_blocks, report.skipped_elements());
    }

    let mut stats = ConversionStats::from_stages(&layout, &translation, &report);
    stats.translation_duration_ms = translation_duration_ms;
    stats.render_duration_ms = render_duration_ms;
    stats.total_duration_ms = translation_duration_ms + render_duration_ms;

    Ok(ConversionOutput {
        layout,
        output_path: report.output_path,
        stats,
    })
}

/// Run layout inference only.
///
/// Needs the layout backend but no translation provider (unless the
/// backend is a `vlm:` model).
pub async fn extract_layout(
    input_str: impl AsRef<str>,
    config: &TranslationConfig,
) -> Result<LayoutDocument, DocTranslateError> {
    let input_str = input_str.as_ref();
    info!("Starting translation of {} ({})", input_str, config.file_type);

    let resolved =
        input::resolve_input(input_str, config.file_type, config.download_timeout_secs).await?;
    let model = init_model(config)?;
    // `resolved` keeps a downloaded file alive until inference is done.
    get_layout(model.as_ref(), resolved.path(), config.file_type).await
}

/// Write `layout` as pretty JSON, atomically.
pub async fn write_layout_json(
    layout: &LayoutDocument,
    path: impl AsRef<Path>,
) -> Result<(), DocTranslateError> {
    checkpoint::save(layout, path.as_ref()).await
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    output_dir: impl AsRef<Path>,
    output_file: &str,
    config: &TranslationConfig,
) -> Result<ConversionOutput, DocTranslateError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DocTranslateError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_str, output_dir, output_file, config))
}
