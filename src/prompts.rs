//! Prompts sent to LLM providers.
//!
//! Two conversations use an LLM: translating one element's text, and (for
//! `vlm:` layout models) detecting the layout of a page image. Both live here
//! so unit tests can inspect them without a provider.
//!
//! Callers can override the translation system prompt via
//! [`crate::config::TranslationConfig::system_prompt`].

/// Default system prompt for translating a single layout element.
pub const TRANSLATION_SYSTEM_PROMPT: &str = r#"You are a professional translator working on one region of a larger document.

Rules:
1. Translate the text from the source language into the target language.
2. Preserve meaning, tone, numbers, proper nouns, URLs and e-mail addresses.
3. Keep line breaks where the original has them.
4. If the text is already in the target language, or cannot be translated
   (a formula, a code, an identifier), return it unchanged.
5. Output ONLY the translation. No quotes, no notes, no explanations,
   no Markdown fences."#;

/// Build the user message for one translation request.
pub fn translation_request(original_text: &str, source_lang: &str, target_lang: &str) -> String {
    format!(
        "Translate the following text from {source_lang} to {target_lang}.\n\n\
         Text:\n\"\"\"\n{original_text}\n\"\"\""
    )
}

/// System prompt for the `vlm:` layout backend.
///
/// The model must answer with a JSON object the vision backend can decode
/// into [`crate::layout::LayoutElement`]s.
pub const LAYOUT_SYSTEM_PROMPT: &str = r#"You are a document layout analyser. You receive one page image.

Segment the page into regions in natural reading order and classify each one
with exactly one of these types:

title, headline, subheadline, abstract, author, address, text, list,
list-item, caption, footer, header, page number, metadata, link, formula,
table, picture, chart, advertisement, field-name, value, threading, misc

For each region report:
- "type": one of the types above
- "text": the exact text inside the region ("" for pictures and charts)
- "bbox": [x1, y1, x2, y2] in pixels of the image, top-left origin
- "prob": your confidence between 0 and 1

Answer with ONLY this JSON object and nothing else:
{"elements": [{"type": "...", "text": "...", "bbox": [0, 0, 0, 0], "prob": 0.0}]}"#;
