//! Layout data model shared by every pipeline stage.
//!
//! A [`LayoutDocument`] is the plain nested structure produced by layout
//! inference: pages in document order, each holding its detected elements
//! in reading order. Translation fills in [`LayoutElement::translated_text`]
//! in place and rendering walks the same structure, so page and element
//! order never change after extraction.
//!
//! The structure serialises to JSON as
//!
//! ```json
//! { "pages": [ { "page_number": 0, "layout_elements": [ { "type": "title", ... } ] } ] }
//! ```
//!
//! which is the format used by `--layout-json` and by checkpoints.

use serde::{Deserialize, Serialize};

/// Extracted layout of a whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub pages: Vec<PageLayout>,
}

/// One page of extracted layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// 0-indexed position of the page in the source document.
    pub page_number: usize,
    pub layout_elements: Vec<LayoutElement>,
}

/// Axis-aligned bounding box in the detector's coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Smallest box enclosing every point. `None` when `points` is empty.
    pub fn from_points(points: &[[f64; 2]]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bbox = Self::new(first[0], first[1], first[0], first[1]);
        for [x, y] in rest {
            bbox.x1 = bbox.x1.min(*x);
            bbox.y1 = bbox.y1.min(*y);
            bbox.x2 = bbox.x2.max(*x);
            bbox.y2 = bbox.y2.max(*y);
        }
        Some(bbox)
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }
}

/// One detected region of a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutElement {
    /// Type tag as reported by the detector (`"Title"`, `"text"`, `"List-item"`, ...).
    #[serde(rename = "type")]
    pub element_type: String,
    /// Text extracted from the region.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub bbox: BoundingBox,
    /// Detector that produced the element.
    #[serde(default)]
    pub source: String,
    /// Detection confidence, when the detector reports one.
    #[serde(default)]
    pub prob: Option<f64>,
    /// Path of a cropped image of the region, when the detector saved one.
    #[serde(default)]
    pub image_path: Option<String>,
    /// Reference to an enclosing element. Carried through as-is.
    #[serde(default)]
    pub parent: Option<String>,
    /// Set by the translation stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
}

impl LayoutElement {
    pub fn new(element_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            element_type: element_type.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// Whether the element carries text worth sending to a provider.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

impl LayoutDocument {
    pub fn total_elements(&self) -> usize {
        self.pages.iter().map(|p| p.layout_elements.len()).sum()
    }

    /// Elements with text that have not been translated yet.
    pub fn pending_elements(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| &p.layout_elements)
            .filter(|e| e.has_text() && e.translated_text.is_none())
            .count()
    }

    /// Iterate `(page_number, element_index, element)` in document order.
    pub fn elements(&self) -> impl Iterator<Item = (usize, usize, &LayoutElement)> {
        self.pages.iter().flat_map(|page| {
            page.layout_elements
                .iter()
                .enumerate()
                .map(move |(i, e)| (page.page_number, i, e))
        })
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LayoutDocument {
        LayoutDocument {
            pages: vec![
                PageLayout {
                    page_number: 0,
                    layout_elements: vec![
                        LayoutElement::new("Title", "Hello"),
                        LayoutElement::new("Picture", ""),
                    ],
                },
                PageLayout {
                    page_number: 1,
                    layout_elements: vec![LayoutElement::new("Text", "World")],
                },
            ],
        }
    }

    #[test]
    fn bbox_from_points_takes_extremes() {
        let points = [[10.0, 20.0], [10.0, 80.0], [50.0, 80.0], [50.0, 20.0]];
        let bbox = BoundingBox::from_points(&points).unwrap();
        assert_eq!(bbox, BoundingBox::new(10.0, 20.0, 50.0, 80.0));
        assert_eq!(bbox.width(), 40.0);
        assert_eq!(bbox.height(), 60.0);
    }

    #[test]
    fn bbox_from_no_points_is_none() {
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn counts_and_pending() {
        let mut doc = sample();
        assert_eq!(doc.total_elements(), 3);
        // The picture has no text and is never pending.
        assert_eq!(doc.pending_elements(), 2);
        doc.pages[0].layout_elements[0].translated_text = Some("Bonjour".into());
        assert_eq!(doc.pending_elements(), 1);
    }

    #[test]
    fn elements_iterates_in_document_order() {
        let doc = sample();
        let order: Vec<(usize, usize, &str)> = doc
            .elements()
            .map(|(p, i, e)| (p, i, e.element_type.as_str()))
            .collect();
        assert_eq!(order, vec![(0, 0, "Title"), (0, 1, "Picture"), (1, 0, "Text")]);
    }

    #[test]
    fn json_uses_type_key_and_omits_missing_translation() {
        let json = sample().to_json_pretty().unwrap();
        assert!(json.contains("\"type\": \"Title\""));
        assert!(json.contains("\"layout_elements\""));
        assert!(!json.contains("translated_text"));
    }

    #[test]
    fn json_round_trip_keeps_parent_opaque() {
        let mut doc = sample();
        doc.pages[1].layout_elements[0].parent = Some("a1b2c3".into());
        doc.pages[1].layout_elements[0].translated_text = Some("Monde".into());
        let back = LayoutDocument::from_json(&doc.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn minimal_element_json_fills_defaults() {
        let doc = LayoutDocument::from_json(
            r#"{"pages":[{"page_number":0,"layout_elements":[{"type":"text"}]}]}"#,
        )
        .unwrap();
        let e = &doc.pages[0].layout_elements[0];
        assert_eq!(e.text, "");
        assert_eq!(e.bbox, BoundingBox::default());
        assert!(e.prob.is_none());
    }
}
