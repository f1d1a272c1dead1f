//! Pipeline stages for document translation.
//!
//! Each submodule implements one step. Stages run one after another and
//! never overlap.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ model ──▶ (unstructured | raster ▶ encode ▶ vision) ──▶ translate ──▶ crate::render
//! (path/URL) (init)          layout inference                      (LLM)         (docx)
//! ```
//!
//! 1. [`input`]        - validate the file against its declared [`crate::FileType`]
//! 2. [`model`]        - resolve a layout model by name
//! 3. [`unstructured`] - partition-service backend (`chipperv1`, `yolox`, ...)
//! 4. [`raster`], [`encode`], [`vision`] - vision-LLM backend (`vlm:<model>`)
//! 5. [`translate`]    - one provider call per element, with retry/backoff
//! 6. [`checkpoint`]   - per-page persistence of translated layout
//! 7. [`postprocess`]  - cleanup of raw LLM replies

pub mod checkpoint;
pub mod encode;
pub mod input;
pub mod model;
pub mod postprocess;
pub mod raster;
pub mod translate;
pub mod unstructured;
pub mod vision;
