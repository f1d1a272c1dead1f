//! Result types returned by the conversion entry points.

use crate::layout::LayoutDocument;
use crate::pipeline::translate::TranslationStats;
use crate::render::RenderReport;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutput {
    /// The layout with every element's `translated_text` filled in.
    pub layout: LayoutDocument,
    /// Path of the written `.docx`.
    pub output_path: PathBuf,
    pub stats: ConversionStats,
}

/// Counters and timings for one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionStats {
    pub total_pages: usize,
    pub total_elements: usize,

    /// Elements translated by a provider call in this run.
    pub translated_elements: usize,
    /// Elements restored from a checkpoint.
    pub reused_elements: usize,
    /// Elements with no text.
    pub empty_elements: usize,
    /// Provider calls, retries included.
    pub provider_calls: usize,

    pub rendered_blocks: usize,
    pub skipped_elements: usize,
    /// Unrecognised type tag → count.
    pub skipped_types: BTreeMap<String, usize>,

    pub layout_duration_ms: u64,
    pub translation_duration_ms: u64,
    pub render_duration_ms: u64,
    pub total_duration_ms: u64,
}

impl ConversionStats {
    /// Fold the per-stage reports into one set of counters. Timings are
    /// filled in by the caller.
    pub fn from_stages(
        layout: &LayoutDocument,
        translation: &TranslationStats,
        render: &RenderReport,
    ) -> Self {
        Self {
            total_pages: layout.pages.len(),
            total_elements: layout.total_elements(),
            translated_elements: translation.translated,
            reused_elements: translation.reused,
            empty_elements: translation.empty,
            provider_calls: translation.provider_calls,
            rendered_blocks: render.rendered_blocks,
            skipped_elements: render.skipped_elements(),
            skipped_types: render.skipped_types.clone(),
            ..Default::default()
        }
    }
}
