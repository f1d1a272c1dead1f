//! Offline integration tests for the full translate-and-render pipeline.
//!
//! Layout inference and translation are replaced by in-process stubs, so
//! these tests need no network, API keys or pdfium.

use async_trait::async_trait;
use doc_translate::render::{build_document, Block, PICTURE_PLACEHOLDER, TABLE_PLACEHOLDER};
use doc_translate::{
    convert, DocTranslateError, DocumentStyle, FileType, LayoutDocument, LayoutElement,
    LayoutModel, PageLayout, TranslationConfig, TranslationProgressCallback, Translator,
};
use regex::Regex;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Stubs ────────────────────────────────────────────────────────────────────

/// Returns a fixed layout and counts how often it was asked.
struct FixedLayout {
    layout: LayoutDocument,
    calls: AtomicUsize,
}

impl FixedLayout {
    fn new(layout: LayoutDocument) -> Arc<Self> {
        Arc::new(Self {
            layout,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LayoutModel for FixedLayout {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn detect(
        &self,
        _path: &Path,
        _file_type: FileType,
    ) -> Result<LayoutDocument, DocTranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.layout.clone())
    }
}

/// Looks translations up in a dictionary, falling back to `<lang>:<text>`.
#[derive(Default)]
struct DictTranslator {
    dict: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl DictTranslator {
    fn with(pairs: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            dict: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Translator for DictTranslator {
    fn name(&self) -> &str {
        "dict"
    }

    async fn translate(
        &self,
        text: &str,
        _source_lang: &str,
        target_lang: &str,
    ) -> Result<String, DocTranslateError> {
        self.calls.lock().unwrap().push(text.to_string());
        Ok(self
            .dict
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("{target_lang}:{text}")))
    }
}

/// Always fails.
struct DownTranslator {
    calls: AtomicUsize,
}

#[async_trait]
impl Translator for DownTranslator {
    fn name(&self) -> &str {
        "down"
    }

    async fn translate(
        &self,
        _text: &str,
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<String, DocTranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DocTranslateError::ProviderCallFailed {
            provider: "down".into(),
            detail: "HTTP 503".into(),
        })
    }
}

#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<String>>,
}

impl TranslationProgressCallback for EventLog {
    fn on_layout_ready(&self, total_pages: usize, total_elements: usize) {
        self.push(format!("layout {total_pages}/{total_elements}"));
    }
    fn on_page_start(&self, page_number: usize, _total_pages: usize) {
        self.push(format!("start {page_number}"));
    }
    fn on_element_translated(&self, page_number: usize, element_index: usize, _chars: usize) {
        self.push(format!("element {page_number}.{element_index}"));
    }
    fn on_page_complete(&self, page_number: usize, _total_pages: usize) {
        self.push(format!("done {page_number}"));
    }
    fn on_conversion_complete(&self, rendered_blocks: usize, skipped_elements: usize) {
        self.push(format!("complete {rendered_blocks}/{skipped_elements}"));
    }
}

impl EventLog {
    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn page(page_number: usize, elements: &[(&str, &str)]) -> PageLayout {
    PageLayout {
        page_number,
        layout_elements: elements
            .iter()
            .map(|(tag, text)| LayoutElement::new(*tag, *text))
            .collect(),
    }
}

/// A file that passes the PDF magic check.
fn fake_pdf(dir: &Path) -> PathBuf {
    let path = dir.join("input.pdf");
    std::fs::write(&path, b"%PDF-1.7\n%stub\n").unwrap();
    path
}

fn config(
    layout: Arc<FixedLayout>,
    translator: Arc<dyn Translator>,
    max_retries: u32,
) -> TranslationConfig {
    TranslationConfig::builder()
        .source_lang("English")
        .target_lang("French")
        .layout_model(layout)
        .translator(translator)
        .max_retries(max_retries)
        .retry_backoff_ms(1)
        .build()
        .unwrap()
}

fn blocks_of(layout: &LayoutDocument) -> Vec<Block> {
    build_document(layout, &DocumentStyle::default())
        .0
        .blocks()
        .to_vec()
}

fn document_xml(docx: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(docx)).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn hello_becomes_one_bonjour_paragraph() {
    let dir = tempfile::tempdir().unwrap();
    let input = fake_pdf(dir.path());
    let layout = FixedLayout::new(LayoutDocument {
        pages: vec![page(0, &[("text", "Hello")])],
    });
    let translator = DictTranslator::with(&[("Hello", "Bonjour")]);
    let cfg = config(layout.clone(), translator.clone(), 0);

    let out_dir = dir.path().join("out");
    let output = convert(input.to_str().unwrap(), &out_dir, "hello_fr", &cfg)
        .await
        .unwrap();

    assert_eq!(layout.calls.load(Ordering::SeqCst), 1);
    assert_eq!(translator.calls(), vec!["Hello"]);
    assert_eq!(blocks_of(&output.layout), vec![Block::plain("Bonjour")]);
    assert_eq!(output.stats.rendered_blocks, 1);
    assert_eq!(output.stats.provider_calls, 1);

    assert_eq!(output.output_path, out_dir.join("hello_fr.docx"));
    let bytes = std::fs::read(&output.output_path).unwrap();
    assert_eq!(&bytes[..2], b"PK", "docx must be a zip archive");

    let document = document_xml(&bytes);
    let paragraphs = Regex::new(r"<w:p[ >]").unwrap();
    assert_eq!(paragraphs.find_iter(&document).count(), 1, "{document}");
    assert!(document.contains(">Bonjour</w:t>"), "{document}");
    assert!(!document.contains("Hello"));
}

#[tokio::test]
async fn order_is_preserved_across_pages() {
    let dir = tempfile::tempdir().unwrap();
    let input = fake_pdf(dir.path());
    let layout = FixedLayout::new(LayoutDocument {
        pages: vec![
            page(0, &[("title", "a"), ("text", "b"), ("list-item", "c")]),
            page(1, &[("headline", "d"), ("text", "e")]),
        ],
    });
    let translator = DictTranslator::with(&[]);
    let cfg = config(layout, translator.clone(), 0);

    let output = convert(input.to_str().unwrap(), dir.path(), "out", &cfg)
        .await
        .unwrap();

    assert_eq!(translator.calls(), vec!["a", "b", "c", "d", "e"]);
    let texts: Vec<String> = blocks_of(&output.layout)
        .iter()
        .map(|b| b.text().to_string())
        .collect();
    assert_eq!(
        texts,
        vec!["French:a", "French:b", "French:c", "French:d", "French:e"]
    );
}

#[tokio::test]
async fn formatting_follows_element_types() {
    let dir = tempfile::tempdir().unwrap();
    let input = fake_pdf(dir.path());
    let mut picture = LayoutElement::new("picture", "");
    picture.image_path = Some("/tmp/figure-1.png".into());
    let layout = FixedLayout::new(LayoutDocument {
        pages: vec![PageLayout {
            page_number: 0,
            layout_elements: vec![
                LayoutElement::new("Title", "T"),
                LayoutElement::new("Headline", "H"),
                LayoutElement::new("Subheadline", "S"),
                picture,
                LayoutElement::new("Table", "<table><tr><td>1</td></tr></table>"),
                LayoutElement::new("PageBreak", ""),
                LayoutElement::new("Sidebar", "ignored"),
            ],
        }],
    });
    let translator = DictTranslator::with(&[("T", "t"), ("H", "h"), ("S", "s")]);
    let cfg = config(layout, translator, 0);

    let output = convert(input.to_str().unwrap(), dir.path(), "out", &cfg)
        .await
        .unwrap();

    let blocks = blocks_of(&output.layout);
    assert_eq!(
        blocks,
        vec![
            Block::Heading {
                level: 1,
                text: "t".into()
            },
            Block::Heading {
                level: 2,
                text: "h".into()
            },
            Block::Heading {
                level: 3,
                text: "s".into()
            },
            Block::Placeholder {
                text: PICTURE_PLACEHOLDER
            },
            Block::Placeholder {
                text: TABLE_PLACEHOLDER
            },
        ]
    );
    assert_eq!(output.stats.skipped_elements, 2);
    assert_eq!(output.stats.skipped_types.get("pagebreak"), Some(&1));
    assert_eq!(output.stats.skipped_types.get("sidebar"), Some(&1));
}

#[tokio::test]
async fn empty_elements_get_empty_translation_without_a_call() {
    let dir = tempfile::tempdir().unwrap();
    let input = fake_pdf(dir.path());
    let layout = FixedLayout::new(LayoutDocument {
        pages: vec![page(0, &[("picture", ""), ("text", "  \n "), ("text", "x")])],
    });
    let translator = DictTranslator::with(&[]);
    let cfg = config(layout, translator.clone(), 0);

    let output = convert(input.to_str().unwrap(), dir.path(), "out", &cfg)
        .await
        .unwrap();

    assert_eq!(translator.calls(), vec!["x"]);
    assert_eq!(output.stats.empty_elements, 2);
    assert!(output
        .layout
        .elements()
        .all(|(_, _, e)| e.translated_text.is_some()));
}

#[tokio::test]
async fn checkpoint_resume_skips_translated_elements() {
    let dir = tempfile::tempdir().unwrap();
    let input = fake_pdf(dir.path());
    let checkpoint = dir.path().join("run.checkpoint.json");
    let doc = LayoutDocument {
        pages: vec![page(0, &[("text", "one")]), page(1, &[("text", "two")])],
    };

    let first = DictTranslator::with(&[("one", "un"), ("two", "deux")]);
    let mut cfg = config(FixedLayout::new(doc.clone()), first.clone(), 0);
    cfg.checkpoint_path = Some(checkpoint.clone());
    convert(input.to_str().unwrap(), dir.path(), "out", &cfg)
        .await
        .unwrap();
    assert_eq!(first.calls().len(), 2);
    assert!(checkpoint.exists());

    let second = DictTranslator::with(&[]);
    let mut cfg = config(FixedLayout::new(doc), second.clone(), 0);
    cfg.checkpoint_path = Some(checkpoint);
    let output = convert(input.to_str().unwrap(), dir.path(), "out", &cfg)
        .await
        .unwrap();

    assert!(second.calls().is_empty());
    assert_eq!(output.stats.reused_elements, 2);
    assert_eq!(
        blocks_of(&output.layout),
        vec![Block::plain("un"), Block::plain("deux")]
    );
}

#[tokio::test]
async fn exhausted_retries_abort_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = fake_pdf(dir.path());
    let layout = FixedLayout::new(LayoutDocument {
        pages: vec![page(0, &[("text", "Hello")])],
    });
    let translator = Arc::new(DownTranslator {
        calls: AtomicUsize::new(0),
    });
    let cfg = config(layout, translator.clone(), 2);

    let err = convert(input.to_str().unwrap(), dir.path(), "out", &cfg)
        .await
        .unwrap_err();

    match err {
        DocTranslateError::TranslationFailed {
            page,
            element,
            retries,
            ..
        } => {
            assert_eq!((page, element, retries), (0, 0, 2));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(translator.calls.load(Ordering::SeqCst), 3);
    assert!(!dir.path().join("out.docx").exists());
}

#[tokio::test]
async fn wrong_file_content_fails_before_layout() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.pdf");
    std::fs::write(&input, b"plain text, not a pdf").unwrap();
    let layout = FixedLayout::new(LayoutDocument::default());
    let cfg = config(layout.clone(), DictTranslator::with(&[]), 0);

    let err = convert(input.to_str().unwrap(), dir.path(), "out", &cfg)
        .await
        .unwrap_err();

    assert!(matches!(err, DocTranslateError::NotAPdf { .. }), "{err:?}");
    assert_eq!(layout.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn progress_events_follow_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let input = fake_pdf(dir.path());
    let layout = FixedLayout::new(LayoutDocument {
        pages: vec![
            page(0, &[("title", "a"), ("unknown", "b")]),
            page(1, &[("text", "c")]),
        ],
    });
    let log = Arc::new(EventLog::default());
    let mut cfg = config(layout, DictTranslator::with(&[]), 0);
    cfg.progress_callback = Some(log.clone());

    convert(input.to_str().unwrap(), dir.path(), "out", &cfg)
        .await
        .unwrap();

    assert_eq!(
        *log.events.lock().unwrap(),
        vec![
            "layout 2/3",
            "start 0",
            "element 0.0",
            "element 0.1",
            "done 0",
            "start 1",
            "element 1.0",
            "done 1",
            "complete 2/1",
        ]
    );
}
