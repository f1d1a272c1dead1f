//! CLI binary for doc-translate.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `TranslationConfig` and prints a summary.

use anyhow::{Context, Result};
use clap::Parser;
use doc_translate::config::{
    DEFAULT_LAYOUT_API_URL, DEFAULT_LAYOUT_MODEL, DEFAULT_LLM_MODEL, DEFAULT_PROVIDER,
};
use doc_translate::{
    convert, extract_layout, write_layout_json, DocTranslateError, FileType, ProgressCallback,
    TranslationConfig, TranslationProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Progress bar over elements, with one log line per finished page.
struct CliProgressCallback {
    bar: ProgressBar,
    page_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    /// Spinner until the layout is known; `on_layout_ready` sets the length.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Layout");
        bar.set_message("Detecting page regions…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_started: Mutex::new(None),
        })
    }
}

impl TranslationProgressCallback for CliProgressCallback {
    fn on_layout_ready(&self, total_pages: usize, total_elements: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>4}/{len} elements  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_elements as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Translating");
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            green("◆"),
            bold(&format!(
                "Layout ready: {total_pages} pages, {total_elements} elements"
            ))
        ));
    }

    fn on_page_start(&self, page_number: usize, total_pages: usize) {
        if let Ok(mut started) = self.page_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar
            .set_message(format!("page {}/{}", page_number + 1, total_pages));
    }

    fn on_element_translated(&self, _page_number: usize, _element_index: usize, _chars: usize) {
        self.bar.inc(1);
    }

    fn on_page_complete(&self, page_number: usize, total_pages: usize) {
        let elapsed_ms = self
            .page_started
            .lock()
            .ok()
            .and_then(|mut started| started.take())
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_number + 1,
            total_pages,
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
    }

    fn on_conversion_complete(&self, rendered_blocks: usize, skipped_elements: usize) {
        self.bar.finish_and_clear();
        if skipped_elements == 0 {
            eprintln!(
                "{} {} blocks rendered",
                green("✔"),
                bold(&rendered_blocks.to_string())
            );
        } else {
            eprintln!(
                "{} {} blocks rendered  ({} elements of unknown type skipped)",
                yellow("⚠"),
                bold(&rendered_blocks.to_string()),
                yellow(&skipped_elements.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # English PDF to French .docx (writes out/paper_fr.docx)
  doc-translate --input-file paper.pdf --output-dir out --output-file paper_fr \
    --source-lang English --target-lang French

  # Scanned page image, German to English, with a different LLM
  doc-translate --input-file scan.png --file-type image \
    --output-dir out --output-file scan_en \
    --source-lang German --target-lang English \
    --provider anthropic --llm-model claude-sonnet-4-20250514

  # Vision-LLM layout instead of the partition service
  doc-translate --model-name vlm:gpt-4.1-nano ...

  # Resume a long document after an interruption
  doc-translate --checkpoint out/paper.checkpoint.json ...

  # Inspect the detected layout only (no translation provider needed)
  doc-translate --layout-only ... > layout.json

LAYOUT MODELS:
  chipperv1 (default), yolox, yolox_quantized, detectron2_onnx, ...
      Unstructured partition API, hi_res strategy.
  vlm:<model>
      Pages rasterised with pdfium and read by a vision LLM from --provider.

ENVIRONMENT VARIABLES:
  UNSTRUCTURED_API_KEY     Partition-service API key
  UNSTRUCTURED_API_URL     Partition-service endpoint
  OPENAI_API_KEY           OpenAI API key
  ANTHROPIC_API_KEY        Anthropic API key
  GEMINI_API_KEY           Google Gemini API key
  DOC_TRANSLATE_PROVIDER   Override provider (openai, anthropic, gemini, ollama)
  DOC_TRANSLATE_LLM_MODEL  Override translation model ID
  PDFIUM_LIB_PATH          Path to libpdfium for the vlm: backend
"#;

/// Translate PDF and image documents into formatted Word documents.
#[derive(Parser, Debug)]
#[command(
    name = "doc-translate",
    version,
    about = "Translate PDF and image documents into formatted Word documents",
    long_about = "Detect the layout of a PDF or page image, translate every text region with an \
LLM, and write the result as a .docx whose formatting follows the detected region types \
(titles become headings, lists become lists, pictures and tables become placeholders).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input document: local path or HTTP/HTTPS URL.
    #[arg(long)]
    input_file: String,

    /// Directory for the generated document (created if missing).
    #[arg(long)]
    output_dir: PathBuf,

    /// Output file name, without the .docx extension.
    #[arg(long)]
    output_file: String,

    /// Language of the input document.
    #[arg(long)]
    source_lang: String,

    /// Language to translate into.
    #[arg(long)]
    target_lang: String,

    /// Layout model name, or vlm:<model> for the vision backend.
    #[arg(long, default_value = DEFAULT_LAYOUT_MODEL)]
    model_name: String,

    /// Input kind: pdf or image.
    #[arg(long, default_value = "pdf")]
    file_type: String,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "DOC_TRANSLATE_PROVIDER", default_value = DEFAULT_PROVIDER)]
    provider: String,

    /// LLM model ID used for translation.
    #[arg(long, env = "DOC_TRANSLATE_LLM_MODEL", default_value = DEFAULT_LLM_MODEL)]
    llm_model: String,

    /// LLM temperature (0.0–2.0).
    #[arg(long, default_value_t = 0.8)]
    temperature: f32,

    /// Retries per element on provider failure.
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Partition-service endpoint.
    #[arg(long, env = "UNSTRUCTURED_API_URL", default_value = DEFAULT_LAYOUT_API_URL)]
    layout_api_url: String,

    /// Partition-service API key.
    #[arg(long, env = "UNSTRUCTURED_API_KEY", hide_env_values = true)]
    layout_api_key: Option<String>,

    /// Skip table-structure inference.
    #[arg(long)]
    no_tables: bool,

    /// PDF user password (vlm: backend).
    #[arg(long)]
    password: Option<String>,

    /// Rasterisation DPI for the vlm: backend (72–400).
    #[arg(long, default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Longest rendered page edge in pixels for the vlm: backend.
    #[arg(long, default_value_t = 2000)]
    max_pixels: u32,

    /// Checkpoint file: written after every page, resumed from when present.
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Also write the translated layout as JSON to this path.
    #[arg(long)]
    layout_json: Option<PathBuf>,

    /// Print the detected layout as JSON and stop.
    #[arg(long)]
    layout_only: bool,

    /// Disable progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs unless --verbose is given.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.layout_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── File type ────────────────────────────────────────────────────────
    let file_type = FileType::from_str(&cli.file_type).unwrap_or_else(|e| usage_exit(&e));

    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn TranslationProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, file_type, progress_cb).unwrap_or_else(|e| usage_exit(&e));

    // ── Layout-only mode ─────────────────────────────────────────────────
    if cli.layout_only {
        let layout = extract_layout(&cli.input_file, &config)
            .await
            .context("Layout extraction failed")?;
        let json = layout
            .to_json_pretty()
            .context("Failed to serialise layout")?;
        println!("{json}");
        return Ok(());
    }

    // ── Run translation ──────────────────────────────────────────────────
    let output = match convert(&cli.input_file, &cli.output_dir, &cli.output_file, &config).await
    {
        Ok(output) => output,
        Err(e) if e.is_usage_error() => usage_exit(&e),
        Err(e) => return Err(e).context("Translation failed"),
    };

    if let Some(ref path) = cli.layout_json {
        write_layout_json(&output.layout, path)
            .await
            .with_context(|| format!("Failed to write layout JSON to {}", path.display()))?;
    }

    if !cli.quiet {
        let stats = &output.stats;
        eprintln!(
            "{}  {} pages  {} elements  {}ms  →  {}",
            if stats.skipped_elements == 0 {
                green("✔")
            } else {
                yellow("⚠")
            },
            stats.total_pages,
            stats.total_elements,
            stats.total_duration_ms,
            bold(&output.output_path.display().to_string()),
        );
        eprintln!(
            "   {} translated  /  {} from checkpoint  /  {} provider calls",
            dim(&stats.translated_elements.to_string()),
            dim(&stats.reused_elements.to_string()),
            dim(&stats.provider_calls.to_string()),
        );
        for (tag, count) in &stats.skipped_types {
            eprintln!("   {} skipped {count} × '{tag}'", yellow("!"));
        }
    }

    Ok(())
}

/// Log a usage error and exit with status 1.
fn usage_exit(e: &DocTranslateError) -> ! {
    tracing::error!("{e}");
    std::process::exit(1)
}

/// Map CLI args to `TranslationConfig`.
fn build_config(
    cli: &Cli,
    file_type: FileType,
    progress: Option<ProgressCallback>,
) -> Result<TranslationConfig, DocTranslateError> {
    let mut builder = TranslationConfig::builder()
        .source_lang(&cli.source_lang)
        .target_lang(&cli.target_lang)
        .file_type(file_type)
        .layout_model_name(&cli.model_name)
        .extract_tables(!cli.no_tables)
        .layout_api_url(&cli.layout_api_url)
        .dpi(cli.dpi)
        .max_rendered_pixels(cli.max_pixels)
        .provider_name(&cli.provider)
        .model(&cli.llm_model)
        .temperature(cli.temperature)
        .max_retries(cli.max_retries);

    if let Some(ref key) = cli.layout_api_key {
        builder = builder.layout_api_key(key);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(ref path) = cli.checkpoint {
        builder = builder.checkpoint_path(path);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build()
}
