//! Error types for the doc-translate library.
//!
//! Every failure that stops a run is a [`DocTranslateError`]. Unlike a
//! page-oriented converter there is no partial-success mode: one element
//! whose translation still fails after its retries aborts the whole run,
//! so the output never mixes translated and untranslated regions.
//!
//! Element types the renderer does not recognise are *not* errors. They are
//! counted in [`crate::render::RenderReport`] instead.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the doc-translate library.
#[derive(Debug, Error)]
pub enum DocTranslateError {
    // ── Usage errors ──────────────────────────────────────────────────────
    /// `--file-type` was neither `pdf` nor `image`.
    #[error("Unsupported file type '{value}'. Expected one of: pdf, image")]
    UnsupportedFileType { value: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// `--file-type pdf` was given but the file is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// `--file-type image` was given but the image format is not recognised.
    #[error("File is not a supported image: '{path}': {detail}")]
    NotAnImage { path: PathBuf, detail: String },

    // ── Layout errors ─────────────────────────────────────────────────────
    /// No layout model is registered under this name.
    #[error("Unknown layout model '{name}'.\nKnown models: {known}, or vlm:<llm-model>")]
    ModelNotFound { name: String, known: String },

    /// The partition service could not be reached.
    #[error("Layout request to '{endpoint}' failed: {detail}")]
    LayoutRequestFailed { endpoint: String, detail: String },

    /// The partition service answered with a non-success status.
    #[error("Layout service returned HTTP {status}: {body}")]
    LayoutApiError { status: u16, body: String },

    /// The layout reply could not be decoded into elements.
    #[error("Could not parse layout for page {page}: {detail}")]
    LayoutParseFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
The vlm: layout backend rasterises PDF pages with pdfium.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use a specific copy.\n\
  • Or install pdfium where the system loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium-render or image decoding failed for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── Translation errors ────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// One provider call failed. The translation stage retries these.
    #[error("Provider '{provider}' call failed: {detail}")]
    ProviderCallFailed { provider: String, detail: String },

    /// A translation call failed after every retry.
    #[error("Translation of page {page}, element {element} failed after {retries} retries: {detail}")]
    TranslationFailed {
        page: usize,
        element: usize,
        retries: u32,
        detail: String,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// docx-rs could not pack the document.
    #[error("Failed to build document '{path}': {detail}")]
    DocxBuildFailed { path: PathBuf, detail: String },

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Checkpoint file exists but could not be read or decoded.
    #[error("Checkpoint '{path}' is unusable: {detail}")]
    CheckpointFailed { path: PathBuf, detail: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocTranslateError {
    /// True for errors caused by how the program was invoked rather than by
    /// a collaborator failing.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            DocTranslateError::UnsupportedFileType { .. } | DocTranslateError::InvalidConfig(_)
        )
    }
}
