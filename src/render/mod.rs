//! Rendering of a translated layout into a `.docx` document.
//!
//! Elements are visited in page order, then element order. Each one is
//! mapped through [`block_for`]; kinds with no mapping are skipped and
//! counted in the [`RenderReport`].

pub mod block;
pub mod docx;
pub mod kind;

pub use block::{block_for, Alignment, Block, RunStyle, PICTURE_PLACEHOLDER, TABLE_PLACEHOLDER};
pub use docx::OutputDocument;
pub use kind::ElementKind;

use crate::config::DocumentStyle;
use crate::error::DocTranslateError;
use crate::layout::LayoutDocument;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of [`render_document`].
#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    pub output_path: PathBuf,
    pub rendered_blocks: usize,
    /// Unrecognised type tag → number of elements skipped.
    pub skipped_types: BTreeMap<String, usize>,
}

impl RenderReport {
    pub fn skipped_elements(&self) -> usize {
        self.skipped_types.values().sum()
    }
}

/// Append one block per recognised element of `layout` to a new document.
///
/// Returns the document and the per-type skip counts. Nothing is written.
pub fn build_document(
    layout: &LayoutDocument,
    style: &DocumentStyle,
) -> (OutputDocument, BTreeMap<String, usize>) {
    let mut doc = OutputDocument::new(style.clone());
    let mut skipped: BTreeMap<String, usize> = BTreeMap::new();

    for (_, _, element) in layout.elements() {
        let kind = ElementKind::from_tag(&element.element_type);
        let text = element.translated_text.as_deref().unwrap_or("");
        match block_for(&kind, text) {
            Some(block) => doc.append(block),
            None => {
                let count = skipped.entry(kind.as_tag().to_string()).or_insert(0);
                if *count == 0 {
                    warn!("Skipping elements of unrecognised type '{}'", kind);
                }
                *count += 1;
            }
        }
    }

    (doc, skipped)
}

/// Render `layout` to `<output_dir>/<output_file>.docx`.
pub async fn render_document(
    layout: &LayoutDocument,
    output_dir: &Path,
    output_file: &str,
    style: &DocumentStyle,
) -> Result<RenderReport, DocTranslateError> {
    let output_path = output_path(output_dir, output_file);
    let (doc, skipped_types) = build_document(layout, style);

    doc.save(&output_path).await?;

    let report = RenderReport {
        output_path,
        rendered_blocks: doc.len(),
        skipped_types,
    };
    info!(
        "Wrote {} ({} blocks, {} skipped)",
        report.output_path.display(),
        report.rendered_blocks,
        report.skipped_elements()
    );
    Ok(report)
}

/// `<output_dir>/<output_file>.docx`. An existing `.docx` suffix is kept.
pub fn output_path(output_dir: &Path, output_file: &str) -> PathBuf {
    if output_file.to_lowercase().ends_with(".docx") {
        output_dir.join(output_file)
    } else {
        output_dir.join(format!("{output_file}.docx"))
    }
}
