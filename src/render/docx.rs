//! `.docx` assembly with docx-rs.
//!
//! [`OutputDocument`] collects [`Block`]s in append order and turns them into
//! a Word document only when saved. Styles and numbering definitions are
//! registered once, up front, for every document.

use crate::config::DocumentStyle;
use crate::error::DocTranslateError;
use crate::pipeline::checkpoint::write_atomic;
use crate::render::block::{Alignment, Block, RunStyle, LINK_COLOR};
use docx_rs::{
    AbstractNumbering, AlignmentType, Docx, IndentLevel, Level, LevelJc, LevelText,
    NumberFormat, Numbering, NumberingId, Paragraph, Run, RunFonts, Start, Style, StyleType,
};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

// `Docx::new()` already registers numbering id 1 (decimal), so our lists
// use ids past the defaults.
const BULLET_NUMBERING: usize = 10;
const DECIMAL_NUMBERING: usize = 11;

/// Heading style ids and their sizes relative to the body size.
const HEADINGS: [(&str, &str, usize); 3] = [
    ("Heading1", "Heading 1", 8),
    ("Heading2", "Heading 2", 6),
    ("Heading3", "Heading 3", 4),
];

/// A document under construction.
#[derive(Debug, Clone)]
pub struct OutputDocument {
    style: DocumentStyle,
    blocks: Vec<Block>,
}

impl OutputDocument {
    pub fn new(style: DocumentStyle) -> Self {
        Self {
            style,
            blocks: Vec::new(),
        }
    }

    pub fn append(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Blocks in the order they were appended.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Pack the document into `.docx` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, String> {
        let docx = self
            .blocks
            .iter()
            .fold(base_document(&self.style), |docx, block| {
                docx.add_paragraph(paragraph_for(block))
            });

        let mut buf = Cursor::new(Vec::new());
        docx.build().pack(&mut buf).map_err(|e| e.to_string())?;
        Ok(buf.into_inner())
    }

    /// Pack and atomically write the document to `path`.
    pub async fn save(&self, path: &Path) -> Result<(), DocTranslateError> {
        let bytes = self
            .to_bytes()
            .map_err(|detail| DocTranslateError::DocxBuildFailed {
                path: path.to_path_buf(),
                detail,
            })?;
        debug!("Writing {} bytes to {}", bytes.len(), path.display());
        write_atomic(path, &bytes).await
    }
}

// ── Document skeleton ────────────────────────────────────────────────────

fn base_document(style: &DocumentStyle) -> Docx {
    // docx sizes are in half-points.
    let body = style.font_size_pt * 2;

    let fonts = RunFonts::new()
        .ascii(&style.font_name)
        .hi_ansi(&style.font_name)
        .east_asia(&style.east_asia_font);

    let docx = Docx::new()
        .default_fonts(fonts)
        .default_size(body)
        .add_abstract_numbering(list_definition(BULLET_NUMBERING, "bullet", "•"))
        .add_numbering(Numbering::new(BULLET_NUMBERING, BULLET_NUMBERING))
        .add_abstract_numbering(list_definition(DECIMAL_NUMBERING, "decimal", "%1."))
        .add_numbering(Numbering::new(DECIMAL_NUMBERING, DECIMAL_NUMBERING));

    HEADINGS.iter().fold(docx, |docx, (id, name, extra)| {
        docx.add_style(
            Style::new(*id, StyleType::Paragraph)
                .name(*name)
                .bold()
                .size(body + extra),
        )
    })
}

fn list_definition(id: usize, format: &str, text: &str) -> AbstractNumbering {
    AbstractNumbering::new(id).add_level(Level::new(
        0,
        Start::new(1),
        NumberFormat::new(format),
        LevelText::new(text),
        LevelJc::new("left"),
    ))
}

// ── Blocks ───────────────────────────────────────────────────────────────

fn paragraph_for(block: &Block) -> Paragraph {
    match block {
        Block::Heading { level, text } => Paragraph::new()
            .style(&format!("Heading{level}"))
            .add_run(Run::new().add_text(text)),
        Block::Paragraph {
            text,
            alignment,
            run,
        } => {
            let run = match run {
                RunStyle::Plain => Run::new().add_text(text),
                RunStyle::Italic => Run::new().add_text(text).italic(),
                RunStyle::Link => Run::new().add_text(text).color(LINK_COLOR).underline("single"),
            };
            let paragraph = Paragraph::new().add_run(run);
            match alignment {
                Alignment::Left => paragraph,
                Alignment::Center => paragraph.align(AlignmentType::Center),
                Alignment::Right => paragraph.align(AlignmentType::Right),
            }
        }
        Block::ListItem { text, numbered } => {
            let id = if *numbered {
                DECIMAL_NUMBERING
            } else {
                BULLET_NUMBERING
            };
            Paragraph::new()
                .add_run(Run::new().add_text(text))
                .numbering(NumberingId::new(id), IndentLevel::new(0))
        }
        Block::Placeholder { text } => Paragraph::new().add_run(Run::new().add_text(*text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::collections::HashMap;
    use std::io::Read;

    fn part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    /// numId -> numFmt of level 0, resolved the way Word does (first
    /// definition of an id wins).
    fn list_formats(numbering_xml: &str) -> HashMap<String, String> {
        let abstract_re =
            Regex::new(r#"(?s)<w:abstractNum\b[^>]*w:abstractNumId="(\d+)"[^>]*>(.*?)</w:abstractNum>"#)
                .unwrap();
        let fmt_re = Regex::new(r#"<w:numFmt w:val="([A-Za-z]+)""#).unwrap();
        let num_re =
            Regex::new(r#"(?s)<w:num\b[^>]*w:numId="(\d+)"[^>]*>(.*?)</w:num>"#).unwrap();
        let link_re = Regex::new(r#"<w:abstractNumId w:val="(\d+)""#).unwrap();

        let mut formats: HashMap<String, String> = HashMap::new();
        for caps in abstract_re.captures_iter(numbering_xml) {
            if let Some(fmt) = fmt_re.captures(&caps[2]) {
                formats
                    .entry(caps[1].to_string())
                    .or_insert_with(|| fmt[1].to_string());
            }
        }

        let mut lists: HashMap<String, String> = HashMap::new();
        for caps in num_re.captures_iter(numbering_xml) {
            let Some(link) = link_re.captures(&caps[2]) else {
                continue;
            };
            if let Some(fmt) = formats.get(&link[1]) {
                lists
                    .entry(caps[1].to_string())
                    .or_insert_with(|| fmt.clone());
            }
        }
        lists
    }

    #[test]
    fn blocks_keep_append_order() {
        let mut doc = OutputDocument::new(DocumentStyle::default());
        assert!(doc.is_empty());
        doc.append(Block::plain("first"));
        doc.append(Block::plain("second"));
        let texts: Vec<_> = doc.blocks().iter().map(Block::text).collect();
        assert_eq!(texts, ["first", "second"]);
    }

    #[test]
    fn packed_document_is_a_zip() {
        let mut doc = OutputDocument::new(DocumentStyle::default());
        doc.append(Block::plain("Bonjour"));
        let bytes = doc.to_bytes().unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/doc.docx");
        OutputDocument::new(DocumentStyle::default())
            .save(&path)
            .await
            .unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn list_items_resolve_to_their_own_numbering_format() {
        let mut doc = OutputDocument::new(DocumentStyle::default());
        doc.append(Block::ListItem {
            text: "point".into(),
            numbered: false,
        });
        doc.append(Block::ListItem {
            text: "step".into(),
            numbered: true,
        });
        let bytes = doc.to_bytes().unwrap();

        let lists = list_formats(&part(&bytes, "word/numbering.xml"));
        let num_re = Regex::new(r#"<w:numId w:val="(\d+)""#).unwrap();
        let document = part(&bytes, "word/document.xml");
        let used: Vec<&str> = num_re
            .captures_iter(&document)
            .map(|c| c.get(1).unwrap().as_str())
            .collect();

        assert_eq!(used.len(), 2, "document.xml: {document}");
        assert_eq!(lists.get(used[0]).map(String::as_str), Some("bullet"));
        assert_eq!(lists.get(used[1]).map(String::as_str), Some("decimal"));
    }

    #[test]
    fn formatting_reaches_the_document_xml() {
        let mut doc = OutputDocument::new(DocumentStyle::default());
        for level in 1..=3 {
            doc.append(Block::Heading {
                level,
                text: format!("h{level}"),
            });
        }
        doc.append(Block::Paragraph {
            text: "page 3".into(),
            alignment: Alignment::Right,
            run: RunStyle::Plain,
        });
        doc.append(Block::Paragraph {
            text: "Figure 1".into(),
            alignment: Alignment::Center,
            run: RunStyle::Italic,
        });
        doc.append(Block::Paragraph {
            text: "https://example.com".into(),
            alignment: Alignment::Left,
            run: RunStyle::Link,
        });
        let bytes = doc.to_bytes().unwrap();

        let styles = part(&bytes, "word/styles.xml");
        let document = part(&bytes, "word/document.xml");
        for id in ["Heading1", "Heading2", "Heading3"] {
            assert!(styles.contains(&format!(r#"w:styleId="{id}""#)), "{id}");
            assert!(
                document.contains(&format!(r#"<w:pStyle w:val="{id}""#)),
                "{id}"
            );
        }
        assert!(document.contains(r#"<w:jc w:val="right""#));
        assert!(document.contains(r#"<w:jc w:val="center""#));
        assert!(document.contains("<w:i "));
        assert!(document.contains(&format!(r#"<w:color w:val="{LINK_COLOR}""#)));
        assert!(document.contains(r#"<w:u w:val="single""#));
        assert!(document.contains(">https://example.com</w:t>"));
    }
}
