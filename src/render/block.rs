//! The element-type → block dispatch table.

use crate::render::kind::ElementKind;
use serde::Serialize;

pub const PICTURE_PLACEHOLDER: &str = "***Picture Placeholder***";
pub const TABLE_PLACEHOLDER: &str = "***Table Placeholder***";

pub const FOOTER_PREFIX: &str = "[Footer] ";
pub const HEADER_PREFIX: &str = "[Header] ";
pub const METADATA_PREFIX: &str = "[Metadata] ";

/// Colour of link runs, as a hex RGB string.
pub const LINK_COLOR: &str = "0000FF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// Run-level formatting applied to a paragraph's single text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStyle {
    #[default]
    Plain,
    Italic,
    /// Blue underlined run.
    Link,
}

/// One unit of the output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum Block {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
        alignment: Alignment,
        run: RunStyle,
    },
    ListItem {
        text: String,
        numbered: bool,
    },
    /// Fixed marker for content that is not reconstructed.
    Placeholder {
        text: &'static str,
    },
}

impl Block {
    pub fn plain(text: impl Into<String>) -> Self {
        Block::Paragraph {
            text: text.into(),
            alignment: Alignment::Left,
            run: RunStyle::Plain,
        }
    }

    fn aligned(text: &str, alignment: Alignment) -> Self {
        Block::Paragraph {
            text: text.to_string(),
            alignment,
            run: RunStyle::Plain,
        }
    }

    fn styled(text: &str, run: RunStyle) -> Self {
        Block::Paragraph {
            text: text.to_string(),
            alignment: Alignment::Left,
            run,
        }
    }

    fn heading(level: u8, text: &str) -> Self {
        Block::Heading {
            level,
            text: text.to_string(),
        }
    }

    fn list_item(text: &str, numbered: bool) -> Self {
        Block::ListItem {
            text: text.to_string(),
            numbered,
        }
    }

    /// Visible text of the block.
    pub fn text(&self) -> &str {
        match self {
            Block::Heading { text, .. }
            | Block::Paragraph { text, .. }
            | Block::ListItem { text, .. } => text,
            Block::Placeholder { text } => text,
        }
    }
}

/// Map an element kind and its translated text to a block.
///
/// Returns `None` only for [`ElementKind::Unrecognized`].
pub fn block_for(kind: &ElementKind, text: &str) -> Option<Block> {
    let block = match kind {
        ElementKind::Title => Block::heading(1, text),
        ElementKind::Headline => Block::heading(2, text),
        ElementKind::Subheadline => Block::heading(3, text),
        ElementKind::Abstract => Block::styled(text, RunStyle::Italic),
        ElementKind::Address | ElementKind::Author | ElementKind::PageNumber => {
            Block::aligned(text, Alignment::Right)
        }
        ElementKind::Caption => Block::aligned(text, Alignment::Center),
        ElementKind::Footer => Block::plain(format!("{FOOTER_PREFIX}{text}")),
        ElementKind::Header => Block::plain(format!("{HEADER_PREFIX}{text}")),
        ElementKind::Metadata => Block::plain(format!("{METADATA_PREFIX}{text}")),
        ElementKind::Link => Block::styled(text, RunStyle::Link),
        ElementKind::List => Block::list_item(text, false),
        ElementKind::ListItem => Block::list_item(text, true),
        ElementKind::Picture | ElementKind::Chart => Block::Placeholder {
            text: PICTURE_PLACEHOLDER,
        },
        ElementKind::Table => Block::Placeholder {
            text: TABLE_PLACEHOLDER,
        },
        ElementKind::Text
        | ElementKind::Threading
        | ElementKind::Value
        | ElementKind::Advertisement
        | ElementKind::FieldName
        | ElementKind::Formula
        | ElementKind::Misc => Block::plain(text),
        ElementKind::Unrecognized(_) => return None,
    };
    Some(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(tag: &str, text: &str) -> Option<Block> {
        block_for(&ElementKind::from_tag(tag), text)
    }

    #[test]
    fn heading_levels() {
        assert_eq!(block("title", "A"), Some(Block::heading(1, "A")));
        assert_eq!(block("headline", "B"), Some(Block::heading(2, "B")));
        assert_eq!(block("subheadline", "C"), Some(Block::heading(3, "C")));
    }

    #[test]
    fn alignment_and_run_styles() {
        assert_eq!(
            block("author", "Jane"),
            Some(Block::aligned("Jane", Alignment::Right))
        );
        assert_eq!(
            block("page number", "4"),
            Some(Block::aligned("4", Alignment::Right))
        );
        assert_eq!(
            block("caption", "Fig. 1"),
            Some(Block::aligned("Fig. 1", Alignment::Center))
        );
        assert_eq!(
            block("abstract", "Summary"),
            Some(Block::styled("Summary", RunStyle::Italic))
        );
        assert_eq!(
            block("link", "https://example.org"),
            Some(Block::styled("https://example.org", RunStyle::Link))
        );
    }

    #[test]
    fn prefixed_paragraphs() {
        assert_eq!(block("footer", "p. 3").unwrap().text(), "[Footer] p. 3");
        assert_eq!(block("header", "Chapter 1").unwrap().text(), "[Header] Chapter 1");
        assert_eq!(block("metadata", "v2").unwrap().text(), "[Metadata] v2");
    }

    #[test]
    fn lists() {
        assert_eq!(block("list", "a"), Some(Block::list_item("a", false)));
        assert_eq!(block("list-item", "b"), Some(Block::list_item("b", true)));
    }

    #[test]
    fn placeholders_ignore_text() {
        for tag in ["picture", "chart", "Image"] {
            assert_eq!(block(tag, "whatever").unwrap().text(), PICTURE_PLACEHOLDER);
        }
        assert_eq!(block("table", "<tr><td>1</td></tr>").unwrap().text(), TABLE_PLACEHOLDER);
    }

    #[test]
    fn plain_paragraph_kinds() {
        for tag in [
            "text",
            "threading",
            "value",
            "advertisement",
            "field-name",
            "formula",
            "misc",
        ] {
            assert_eq!(block(tag, "x"), Some(Block::plain("x")), "tag {tag}");
        }
    }

    #[test]
    fn unrecognized_kind_has_no_block() {
        assert_eq!(block("page-break", "x"), None);
        assert_eq!(block("", "x"), None);
    }
}
