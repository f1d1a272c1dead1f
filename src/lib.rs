//! # doc-translate
//!
//! Translate PDF documents and page images into formatted Word documents.
//!
//! A layout model splits every page into typed regions (title, text, list,
//! table, picture, ...). Each region's text is translated on its own by an
//! LLM, and the translations are written back into a `.docx` with
//! formatting chosen by region type: headings for titles, italics for
//! abstracts, bullets for lists, placeholders for pictures and tables.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / image
//!  │
//!  ├─ 1. Input      resolve local file or download from URL
//!  ├─ 2. Layout     partition service (chipperv1, yolox, ...) or vlm:<model>
//!  ├─ 3. Translate  one LLM call per element, in order, with retries
//!  └─ 4. Render     element type → docx block, saved atomically
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc_translate::{convert, TranslationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads UNSTRUCTURED_API_KEY and OPENAI_API_KEY from the environment.
//!     let config = TranslationConfig::builder()
//!         .source_lang("English")
//!         .target_lang("French")
//!         .build()?;
//!     let output = convert("paper.pdf", "out", "paper_fr", &config).await?;
//!     println!("wrote {}", output.output_path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc-translate` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Layout Models
//!
//! | Name | Backend |
//! |------|---------|
//! | `chipperv1` (default), `yolox`, `detectron2_onnx`, ... | Unstructured partition API (`hi_res` strategy) |
//! | `vlm:gpt-4.1-nano`, `vlm:<any vision model>` | pages rasterised with pdfium, regions read by a vision LLM |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod render;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DocumentStyle, FileType, TranslationConfig, TranslationConfigBuilder};
pub use convert::{convert, convert_sync, extract_layout, translate_and_render, write_layout_json};
pub use error::DocTranslateError;
pub use layout::{BoundingBox, LayoutDocument, LayoutElement, PageLayout};
pub use output::{ConversionOutput, ConversionStats};
pub use pipeline::model::{get_layout, init_model, LayoutModel};
pub use pipeline::translate::{translate_layout, LlmTranslator, TranslationStats, Translator};
pub use progress::{NoopProgressCallback, ProgressCallback, TranslationProgressCallback};
pub use render::{block_for, render_document, Block, ElementKind, OutputDocument, RenderReport};
