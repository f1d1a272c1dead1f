//! Element type tags.
//!
//! Detectors report free-form type strings. [`ElementKind::from_tag`] maps
//! them onto the closed set the renderer knows, keeping anything else as
//! [`ElementKind::Unrecognized`] so it can be counted instead of vanishing.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Title,
    Headline,
    Subheadline,
    Abstract,
    Address,
    Author,
    PageNumber,
    Caption,
    Footer,
    Header,
    Metadata,
    Link,
    List,
    ListItem,
    Picture,
    Chart,
    Table,
    Text,
    Threading,
    Value,
    Advertisement,
    FieldName,
    Formula,
    Misc,
    /// Normalised tag with no mapping.
    Unrecognized(String),
}

impl ElementKind {
    /// Parse a detector tag, ignoring case and surrounding whitespace.
    ///
    /// Besides the renderer's own vocabulary this accepts the category
    /// names used by partition services (`NarrativeText`, `ListItem`,
    /// `Image`, `FigureCaption`, `PageNumber`, ...).
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_lowercase();
        match tag.as_str() {
            "title" => ElementKind::Title,
            "headline" => ElementKind::Headline,
            "subheadline" => ElementKind::Subheadline,
            "abstract" => ElementKind::Abstract,
            "address" => ElementKind::Address,
            "author" => ElementKind::Author,
            "page number" | "page-number" | "pagenumber" => ElementKind::PageNumber,
            "caption" | "figurecaption" => ElementKind::Caption,
            "footer" => ElementKind::Footer,
            "header" => ElementKind::Header,
            "metadata" => ElementKind::Metadata,
            "link" => ElementKind::Link,
            "list" => ElementKind::List,
            "list-item" | "listitem" => ElementKind::ListItem,
            "picture" | "image" | "figure" => ElementKind::Picture,
            "chart" => ElementKind::Chart,
            "table" => ElementKind::Table,
            "text" | "narrativetext" | "uncategorizedtext" => ElementKind::Text,
            "threading" => ElementKind::Threading,
            "value" => ElementKind::Value,
            "advertisement" => ElementKind::Advertisement,
            "field-name" => ElementKind::FieldName,
            "formula" => ElementKind::Formula,
            "misc" => ElementKind::Misc,
            _ => ElementKind::Unrecognized(tag),
        }
    }

    /// Canonical tag, as used by the `vlm:` layout prompt.
    pub fn as_tag(&self) -> &str {
        match self {
            ElementKind::Title => "title",
            ElementKind::Headline => "headline",
            ElementKind::Subheadline => "subheadline",
            ElementKind::Abstract => "abstract",
            ElementKind::Address => "address",
            ElementKind::Author => "author",
            ElementKind::PageNumber => "page number",
            ElementKind::Caption => "caption",
            ElementKind::Footer => "footer",
            ElementKind::Header => "header",
            ElementKind::Metadata => "metadata",
            ElementKind::Link => "link",
            ElementKind::List => "list",
            ElementKind::ListItem => "list-item",
            ElementKind::Picture => "picture",
            ElementKind::Chart => "chart",
            ElementKind::Table => "table",
            ElementKind::Text => "text",
            ElementKind::Threading => "threading",
            ElementKind::Value => "value",
            ElementKind::Advertisement => "advertisement",
            ElementKind::FieldName => "field-name",
            ElementKind::Formula => "formula",
            ElementKind::Misc => "misc",
            ElementKind::Unrecognized(tag) => tag,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, ElementKind::Unrecognized(_))
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}
